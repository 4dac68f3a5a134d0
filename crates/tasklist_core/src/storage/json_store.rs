use crate::error::AppError;
use crate::model::Task;
use crate::storage::KeyValueStorage;
use tracing::{debug, warn};

pub const TASKS_KEY: &str = "tasks";

/// Mirrors the task collection into the `"tasks"` slot as a JSON array.
#[derive(Debug)]
pub struct TaskPersistence<S> {
    storage: S,
}

impl<S: KeyValueStorage> TaskPersistence<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the stored collection. An absent, unreadable or undecodable slot
    /// yields an empty collection.
    pub fn load(&self) -> Vec<Task> {
        let content = match self.storage.get(TASKS_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!(key = TASKS_KEY, "no stored tasks");
                return Vec::new();
            }
            Err(err) => {
                warn!(key = TASKS_KEY, error = %err, "failed to read stored tasks");
                return Vec::new();
            }
        };

        match decode_tasks(&content) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(key = TASKS_KEY, error = %err, "discarding undecodable stored tasks");
                Vec::new()
            }
        }
    }

    /// Overwrites the slot with the whole collection.
    pub fn save(&mut self, tasks: &[Task]) -> Result<(), AppError> {
        let content = encode_tasks(tasks)?;
        self.storage.set(TASKS_KEY, &content)?;
        debug!(key = TASKS_KEY, count = tasks.len(), "saved tasks");
        Ok(())
    }
}

pub fn decode_tasks(content: &str) -> Result<Vec<Task>, AppError> {
    Ok(serde_json::from_str(content)?)
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    Ok(serde_json::to_string(tasks)?)
}
