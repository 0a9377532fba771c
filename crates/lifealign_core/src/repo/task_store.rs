//! Task store over the key-value contract.
//!
//! # Responsibility
//! - Serialize the active task list and the deleted-task history as JSON
//!   arrays under two well-known keys.
//! - Provide id, date and reminder-handle lookups over the active list.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before serializing.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Ids are unique within the active list.

use crate::model::reminder::ReminderHandle;
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::repo::kv_store::{KeyValueStore, KvError};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Key holding the JSON array of active tasks.
pub const TASKS_KEY: &str = "lifealign.tasks";
/// Key holding the JSON array of deleted tasks.
pub const DELETED_TASKS_KEY: &str = "lifealign.deleted_tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure surfaced to callers as a storage error.
#[derive(Debug)]
pub enum StoreError {
    Kv(KvError),
    Serialization(serde_json::Error),
    Validation(TaskValidationError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "task serialization failed: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Durable mapping from task id to task, plus retained deleted tasks.
#[derive(Clone)]
pub struct TaskStore {
    kv: Arc<dyn KeyValueStore>,
}

impl TaskStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Returns every active task in insertion order.
    pub async fn list(&self) -> StoreResult<Vec<Task>> {
        let tasks = self.read_list(TASKS_KEY).await?;
        let mut seen = BTreeSet::new();
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(StoreError::InvalidData(format!(
                    "duplicate task id {} under `{TASKS_KEY}`",
                    task.id
                )));
            }
        }
        Ok(tasks)
    }

    pub async fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.list().await?.into_iter().find(|task| task.id == id))
    }

    /// Replaces the whole active list.
    pub async fn save_all(&self, tasks: &[Task]) -> StoreResult<()> {
        self.write_list(TASKS_KEY, tasks).await
    }

    /// Inserts `task`, or replaces the stored task with the same id.
    pub async fn put(&self, task: &Task) -> StoreResult<()> {
        let mut tasks = self.list().await?;
        match tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => tasks.push(task.clone()),
        }
        self.save_all(&tasks).await
    }

    /// Removes a task from the active list and returns it.
    pub async fn remove(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let mut tasks = self.list().await?;
        let Some(index) = tasks.iter().position(|task| task.id == id) else {
            return Ok(None);
        };
        let removed = tasks.remove(index);
        self.save_all(&tasks).await?;
        Ok(Some(removed))
    }

    /// Finds the active task whose `notif_id` lists `handle`.
    pub async fn find_by_handle(&self, handle: &ReminderHandle) -> StoreResult<Option<Task>> {
        let found = self
            .list()
            .await?
            .into_iter()
            .find(|task| task.holds_handle(handle));
        debug!(
            "event=task_lookup_by_handle module=repo status=ok found={}",
            found.is_some()
        );
        Ok(found)
    }

    /// Active tasks scheduled on `date`.
    pub async fn tasks_on(&self, date: NaiveDate) -> StoreResult<Vec<Task>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|task| task.date == date)
            .collect())
    }

    /// Distinct days that carry at least one active task, ascending.
    pub async fn dates_with_tasks(&self) -> StoreResult<BTreeSet<NaiveDate>> {
        Ok(self.list().await?.iter().map(|task| task.date).collect())
    }

    /// Retained deleted tasks, oldest deletion first.
    pub async fn deleted(&self) -> StoreResult<Vec<Task>> {
        self.read_list(DELETED_TASKS_KEY).await
    }

    /// Appends one record to the deleted-task history.
    pub async fn append_deleted(&self, task: &Task) -> StoreResult<()> {
        if task.deleted_at.is_none() {
            return Err(StoreError::InvalidData(format!(
                "task {} appended to history without deletedAt",
                task.id
            )));
        }
        let mut deleted = self.deleted().await?;
        deleted.push(task.clone());
        self.write_list(DELETED_TASKS_KEY, &deleted).await
    }

    async fn read_list(&self, key: &str) -> StoreResult<Vec<Task>> {
        let Some(raw) = self.kv.read(key).await? else {
            return Ok(Vec::new());
        };
        let tasks: Vec<Task> = serde_json::from_str(&raw)?;
        for task in &tasks {
            task.validate().map_err(|err| {
                StoreError::InvalidData(format!("task {} under `{key}`: {err}", task.id))
            })?;
        }
        Ok(tasks)
    }

    async fn write_list(&self, key: &str, tasks: &[Task]) -> StoreResult<()> {
        for task in tasks {
            task.validate()?;
        }
        let raw = serde_json::to_string(tasks)?;
        self.kv.write(key, &raw).await?;
        Ok(())
    }
}
