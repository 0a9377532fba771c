//! Reminder lifecycle against an external delivery facility.
//!
//! # Responsibility
//! - Install the planned reminders of a task and collect their handles.
//! - Void handles on cancel, tolerating handles that no longer exist.
//! - Resolve a task from one of its handles.
//!
//! # Invariants
//! - Never mutates the task store.
//! - A facility failure for one instant never aborts the others.

use crate::clock::Clock;
use crate::model::reminder::ReminderHandle;
use crate::model::task::Task;
use crate::reminder::facility::ReminderFacility;
use crate::repo::task_store::{StoreResult, TaskStore};
use crate::schedule::planner::plan_for_task;
use log::{info, warn};
use std::sync::Arc;

/// Bridge between planned instants and a reminder facility.
#[derive(Clone)]
pub struct ReminderScheduler {
    facility: Arc<dyn ReminderFacility>,
    clock: Arc<dyn Clock>,
}

impl ReminderScheduler {
    pub fn new(facility: Arc<dyn ReminderFacility>, clock: Arc<dyn Clock>) -> Self {
        Self { facility, clock }
    }

    /// Plans reminders for `task` against the current time and arranges each.
    ///
    /// Returns one handle per instant the facility accepted. An empty result
    /// (alert `none`, or everything already past) is success.
    pub async fn schedule_all(&self, task: &Task) -> Vec<ReminderHandle> {
        let instants = plan_for_task(task, self.clock.now_local());
        let planned = instants.len();
        let mut handles = Vec::with_capacity(planned);

        for instant in instants {
            match self
                .facility
                .arrange(instant.fire_at, instant.message.as_str())
                .await
            {
                Ok(handle) => handles.push(handle),
                Err(err) => warn!(
                    "event=reminder_arrange module=scheduler status=error error_code=scheduling_error task_id={} fire_at={} error={}",
                    task.id,
                    instant.fire_at,
                    err
                ),
            }
        }

        info!(
            "event=reminder_schedule module=scheduler status=ok task_id={} alert_type={} planned={} arranged={}",
            task.id,
            task.alert_type.as_tag(),
            planned,
            handles.len()
        );
        handles
    }

    /// Best-effort void of every handle. Safe to repeat.
    pub async fn cancel_all(&self, handles: &[ReminderHandle]) {
        if handles.is_empty() {
            return;
        }

        let mut failed = 0usize;
        for handle in handles {
            if let Err(err) = self.facility.void(handle).await {
                failed += 1;
                warn!(
                    "event=reminder_void module=scheduler status=error handle={} error={}",
                    handle, err
                );
            }
        }

        info!(
            "event=reminder_cancel module=scheduler status=ok requested={} failed={}",
            handles.len(),
            failed
        );
    }

    /// Finds the active task that owns `handle`.
    pub async fn find_task_by_handle(
        &self,
        store: &TaskStore,
        handle: &ReminderHandle,
    ) -> StoreResult<Option<Task>> {
        store.find_by_handle(handle).await
    }
}
