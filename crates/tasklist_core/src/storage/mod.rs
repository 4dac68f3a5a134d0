//! Durable key/value slots backing the task collection.

use crate::error::AppError;
use std::collections::HashMap;

pub mod file_store;
pub mod json_store;

pub use file_store::FileStorage;
pub use json_store::{TASKS_KEY, TaskPersistence};

/// A string-valued key/value store. Writes overwrite the whole slot.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

/// Process-local storage, lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        let mut storage = Self::default();
        storage.slots.insert(key.into(), value.into());
        storage
    }

    /// Number of `set` calls observed since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStorage, MemoryStorage};

    #[test]
    fn memory_storage_overwrites_slot() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("tasks").unwrap(), None);

        storage.set("tasks", "[]").unwrap();
        storage.set("tasks", "[1]").unwrap();

        assert_eq!(storage.get("tasks").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.write_count(), 2);
    }
}
