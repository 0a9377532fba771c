//! Task lifecycle use-cases.
//!
//! # Responsibility
//! - Coordinate validation, conflict checks, reminder scheduling and
//!   persistence for every task mutation.
//! - Dispatch actions chosen on a fired reminder.
//! - Broadcast a `TaskEvent` after each committed mutation.
//!
//! # Invariants
//! - Mutations are serialized behind one async lock; a reminder action runs
//!   its resolve, cancel, reschedule and persist steps without interleaving.
//! - Old handles are voided before new ones are installed, and the persisted
//!   `notif_id` lists exactly the handles installed by the last mutation.
//! - Completed tasks hold no reminders.
//! - When persisting fails after new reminders were installed, those
//!   reminders are voided before the error is returned.
//!
//! # See also
//! - schedule::scheduler
//! - schedule::conflict

use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::model::reminder::{ReminderAction, ReminderHandle};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch, TaskValidationError, TimeRange};
use crate::repo::task_store::TaskStore;
use crate::schedule::conflict::{find_conflicts, Candidate, ConflictScope};
use crate::schedule::scheduler::ReminderScheduler;
use crate::service::error::{TaskError, TaskResult};
use crate::service::events::TaskEvent;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex};

/// How a detected time conflict is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictResolution {
    /// Fail with `TaskError::ConflictDetected` so the caller can ask the user.
    #[default]
    Ask,
    /// The user already confirmed; commit despite conflicts.
    Proceed,
}

/// Sort order for the completed-task history. Newest first by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOrder {
    Ascending,
    #[default]
    Descending,
}

/// Result of handling a fired reminder's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderActionOutcome {
    Updated(Task),
    Deleted(TaskId),
    /// The caller should open its editor for this task. Nothing was mutated.
    OpenEditor(TaskId),
}

/// Single entry point for task mutations.
pub struct TaskLifecycleController {
    store: TaskStore,
    scheduler: ReminderScheduler,
    clock: Arc<dyn Clock>,
    conflict_scope: ConflictScope,
    op_lock: Mutex<()>,
    events: broadcast::Sender<TaskEvent>,
}

impl TaskLifecycleController {
    pub fn new(
        store: TaskStore,
        scheduler: ReminderScheduler,
        clock: Arc<dyn Clock>,
        config: &CoreConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            store,
            scheduler,
            clock,
            conflict_scope: config.conflict_scope,
            op_lock: Mutex::new(()),
            events,
        }
    }

    /// Subscribes to change events. Only events sent after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }

    /// Creates a task and installs its reminders.
    ///
    /// # Contract
    /// - Rejects an empty title and `end < start` before touching storage.
    /// - With `ConflictResolution::Ask`, any overlap fails with
    ///   `ConflictDetected` and nothing is committed.
    /// - Returns the persisted task including its reminder handles.
    pub async fn create(
        &self,
        request: NewTask,
        resolution: ConflictResolution,
    ) -> TaskResult<Task> {
        let started_at = Instant::now();
        request.validate()?;
        let range = TimeRange::new(request.start_time, request.end_time)?;

        let _guard = self.op_lock.lock().await;
        let existing = self.store.list().await?;
        let candidate = Candidate {
            date: request.date,
            range,
        };
        self.check_conflicts("task_create", &candidate, &existing, None, resolution)?;

        let mut task = Task::from_new(&request, self.clock.now_utc());
        task.notif_id = self.scheduler.schedule_all(&task).await;
        self.persist("task_create", &task).await?;

        info!(
            "event=task_create module=service status=ok task_id={} reminders={} duration_ms={}",
            task.id,
            task.notif_id.len(),
            started_at.elapsed().as_millis()
        );
        self.emit(TaskEvent::Created(task.clone()));
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// # Contract
    /// - Any patch naming `date`, `start_time`, `end_time` or `alert_type`
    ///   re-checks conflicts like `create`, excluding the task itself.
    /// - Timing changes and completion changes replace all reminders.
    /// - Title, category and recurrence changes leave reminders untouched.
    /// - An empty patch returns the stored task unchanged.
    pub async fn update(
        &self,
        id: TaskId,
        patch: TaskPatch,
        resolution: ConflictResolution,
    ) -> TaskResult<Task> {
        let _guard = self.op_lock.lock().await;
        let existing = self.store.list().await?;
        let current = existing
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or(TaskError::TaskNotFound(id))?;
        if patch.is_empty() {
            return Ok(current);
        }

        let mut next = current.clone();
        patch.apply_to(&mut next);
        next.validate()?;

        if patch.touches_timing() {
            let candidate = Candidate::of(&next);
            self.check_conflicts("task_update", &candidate, &existing, Some(id), resolution)?;
        }

        let reschedule = patch.touches_timing() || next.completed != current.completed;
        if reschedule {
            self.replace_reminders(&mut next).await;
        }
        next.updated_at = self.clock.now_utc();
        self.persist("task_update", &next).await?;

        info!(
            "event=task_update module=service status=ok task_id={} rescheduled={} reminders={}",
            next.id,
            reschedule,
            next.notif_id.len()
        );
        self.emit(TaskEvent::Updated(next.clone()));
        Ok(next)
    }

    /// Flips completion. Completing voids all reminders; reopening re-plans
    /// them, so instants already in the past are not reinstalled.
    pub async fn toggle_complete(&self, id: TaskId) -> TaskResult<Task> {
        let _guard = self.op_lock.lock().await;
        let task = self.require(id).await?;
        let completed = !task.completed;
        self.set_completed_locked(task, completed).await
    }

    /// Moves the task to the next calendar day at the same start time.
    pub async fn push_to_tomorrow(&self, id: TaskId) -> TaskResult<Task> {
        let _guard = self.op_lock.lock().await;
        let task = self.require(id).await?;
        self.push_to_tomorrow_locked(task).await
    }

    /// Voids reminders, records the task in the deleted history and removes
    /// it from the active list.
    pub async fn delete(&self, id: TaskId) -> TaskResult<TaskId> {
        let _guard = self.op_lock.lock().await;
        let task = self.require(id).await?;
        self.delete_locked(task).await
    }

    /// Handles the action a user picked on a fired reminder.
    ///
    /// # Contract
    /// - Fails with `ReminderNotFound` when no active task lists `handle`.
    /// - `Complete` marks the task completed; repeating it is harmless.
    /// - `Edit` never mutates state.
    pub async fn on_reminder_action(
        &self,
        handle: &ReminderHandle,
        action: ReminderAction,
    ) -> TaskResult<ReminderActionOutcome> {
        let _guard = self.op_lock.lock().await;
        let task = self
            .scheduler
            .find_task_by_handle(&self.store, handle)
            .await?
            .ok_or_else(|| {
                warn!(
                    "event=reminder_action module=service status=error error_code=reminder_not_found action={}",
                    action.as_identifier()
                );
                TaskError::ReminderNotFound(handle.clone())
            })?;

        info!(
            "event=reminder_action module=service status=ok task_id={} action={}",
            task.id,
            action.as_identifier()
        );
        match action {
            ReminderAction::Complete => self
                .set_completed_locked(task, true)
                .await
                .map(ReminderActionOutcome::Updated),
            ReminderAction::PushToTomorrow => self
                .push_to_tomorrow_locked(task)
                .await
                .map(ReminderActionOutcome::Updated),
            ReminderAction::Delete => self
                .delete_locked(task)
                .await
                .map(ReminderActionOutcome::Deleted),
            ReminderAction::Edit => Ok(ReminderActionOutcome::OpenEditor(task.id)),
        }
    }

    pub async fn get(&self, id: TaskId) -> TaskResult<Task> {
        self.require(id).await
    }

    pub async fn list(&self) -> TaskResult<Vec<Task>> {
        Ok(self.store.list().await?)
    }

    /// Active tasks on `date`, ordered by start time.
    pub async fn tasks_on(&self, date: NaiveDate) -> TaskResult<Vec<Task>> {
        let mut tasks = self.store.tasks_on(date).await?;
        tasks.sort_by_key(|task| (task.start_time, task.end_time));
        Ok(tasks)
    }

    pub async fn dates_with_tasks(&self) -> TaskResult<BTreeSet<NaiveDate>> {
        Ok(self.store.dates_with_tasks().await?)
    }

    /// Completed active tasks ordered by date, then start time.
    pub async fn completed_history(&self, order: HistoryOrder) -> TaskResult<Vec<Task>> {
        let mut completed: Vec<Task> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|task| task.completed)
            .collect();
        completed.sort_by_key(Task::due_at);
        if order == HistoryOrder::Descending {
            completed.reverse();
        }
        Ok(completed)
    }

    /// Deleted tasks, oldest deletion first.
    pub async fn deleted_tasks(&self) -> TaskResult<Vec<Task>> {
        Ok(self.store.deleted().await?)
    }

    async fn require(&self, id: TaskId) -> TaskResult<Task> {
        self.store
            .get(id)
            .await?
            .ok_or(TaskError::TaskNotFound(id))
    }

    async fn set_completed_locked(&self, mut task: Task, completed: bool) -> TaskResult<Task> {
        if completed && task.completed && task.notif_id.is_empty() {
            return Ok(task);
        }
        task.completed = completed;
        self.replace_reminders(&mut task).await;
        task.updated_at = self.clock.now_utc();
        self.persist("task_toggle_complete", &task).await?;

        info!(
            "event=task_toggle_complete module=service status=ok task_id={} completed={} reminders={}",
            task.id,
            task.completed,
            task.notif_id.len()
        );
        self.emit(TaskEvent::Updated(task.clone()));
        Ok(task)
    }

    async fn push_to_tomorrow_locked(&self, mut task: Task) -> TaskResult<Task> {
        let next_date = task.date.succ_opt().ok_or_else(|| {
            TaskError::Validation(TaskValidationError::InvalidDate(task.date.to_string()))
        })?;
        task.date = next_date;
        self.replace_reminders(&mut task).await;
        task.updated_at = self.clock.now_utc();
        self.persist("task_push_to_tomorrow", &task).await?;

        info!(
            "event=task_push_to_tomorrow module=service status=ok task_id={} date={} reminders={}",
            task.id,
            task.date,
            task.notif_id.len()
        );
        self.emit(TaskEvent::Updated(task.clone()));
        Ok(task)
    }

    async fn delete_locked(&self, task: Task) -> TaskResult<TaskId> {
        self.scheduler.cancel_all(&task.notif_id).await;

        let now = self.clock.now_utc();
        let mut record = task.clone();
        record.notif_id.clear();
        record.updated_at = now;
        record.deleted_at = Some(now);
        self.store.append_deleted(&record).await.map_err(|err| {
            error!(
                "event=task_delete module=service status=error error_code=storage_error task_id={} error={}",
                task.id, err
            );
            TaskError::from(err)
        })?;
        self.store.remove(task.id).await?;

        info!(
            "event=task_delete module=service status=ok task_id={}",
            task.id
        );
        self.emit(TaskEvent::Deleted { id: task.id });
        Ok(task.id)
    }

    /// Voids every handle `task` lists, then installs a fresh set unless the
    /// task is completed.
    async fn replace_reminders(&self, task: &mut Task) {
        let previous = std::mem::take(&mut task.notif_id);
        self.scheduler.cancel_all(&previous).await;
        if !task.completed {
            task.notif_id = self.scheduler.schedule_all(task).await;
        }
    }

    fn check_conflicts(
        &self,
        op: &str,
        candidate: &Candidate,
        existing: &[Task],
        exclude_task_id: Option<TaskId>,
        resolution: ConflictResolution,
    ) -> TaskResult<()> {
        let conflicting = find_conflicts(candidate, existing, exclude_task_id, self.conflict_scope);
        if conflicting.is_empty() {
            return Ok(());
        }
        match resolution {
            ConflictResolution::Ask => {
                info!(
                    "event={} module=service status=error error_code=conflict_detected conflicts={}",
                    op,
                    conflicting.len()
                );
                Err(TaskError::ConflictDetected { conflicting })
            }
            ConflictResolution::Proceed => {
                info!(
                    "event=conflict_override module=service status=ok op={} conflicts={}",
                    op,
                    conflicting.len()
                );
                Ok(())
            }
        }
    }

    async fn persist(&self, op: &str, task: &Task) -> TaskResult<()> {
        if let Err(err) = self.store.put(task).await {
            error!(
                "event={} module=service status=error error_code=storage_error task_id={} voided={} error={}",
                op,
                task.id,
                task.notif_id.len(),
                err
            );
            self.scheduler.cancel_all(&task.notif_id).await;
            return Err(err.into());
        }
        Ok(())
    }

    fn emit(&self, event: TaskEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}
