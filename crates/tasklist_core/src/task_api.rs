use crate::error::AppError;
use crate::model::{Task, TaskId, TaskPatch};
use crate::storage::{KeyValueStorage, TaskPersistence};
use crate::store::{TaskAction, TaskStore};
use tracing::info;

/// A [`TaskStore`] whose collection is written through to storage after
/// every mutation.
#[derive(Debug)]
pub struct TaskManager<S> {
    store: TaskStore,
    persistence: TaskPersistence<S>,
}

impl<S: KeyValueStorage> TaskManager<S> {
    /// Hydrates the store from `storage` and writes the hydrated collection
    /// back once.
    pub fn open(storage: S) -> Result<Self, AppError> {
        let persistence = TaskPersistence::new(storage);
        let tasks = persistence.load();
        info!(count = tasks.len(), "hydrated tasks");

        let mut manager = Self {
            store: TaskStore::with_tasks(tasks),
            persistence,
        };
        manager.persist()?;
        Ok(manager)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        self.persistence.storage()
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn search_query(&self) -> &str {
        self.store.search_query()
    }

    pub fn search(&self) -> Vec<&Task> {
        self.store.search()
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.store.find(id)
    }

    pub fn add_task(&mut self, task: Task) -> Result<(), AppError> {
        self.store.add_task(task);
        self.persist()
    }

    pub fn update_task(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<usize, AppError> {
        let updated = self.store.update_task(id, patch);
        self.persist()?;
        Ok(updated)
    }

    pub fn delete_task(&mut self, id: &TaskId) -> Result<usize, AppError> {
        let removed = self.store.delete_task(id);
        self.persist()?;
        Ok(removed)
    }

    /// Changes the filter only; nothing is written.
    pub fn set_search_query<Q: Into<String>>(&mut self, query: Q) {
        self.store.set_search_query(query);
    }

    pub fn add_new_task<T: Into<String>>(&mut self, title: T) -> Result<TaskId, AppError> {
        let id = self.store.add_new_task(title);
        self.persist()?;
        Ok(id)
    }

    pub fn update_existing_task<T: Into<String>>(
        &mut self,
        id: &TaskId,
        new_title: T,
    ) -> Result<usize, AppError> {
        self.update_task(id, &TaskPatch::title(new_title))
    }

    pub fn set_task_completed(&mut self, id: &TaskId, completed: bool) -> Result<usize, AppError> {
        self.update_task(id, &TaskPatch::completed(completed))
    }

    pub fn delete_task_by_id(&mut self, id: &TaskId) -> Result<usize, AppError> {
        self.delete_task(id)
    }

    pub fn dispatch(&mut self, action: TaskAction) -> Result<usize, AppError> {
        let mutates = action.mutates_collection();
        let affected = self.store.dispatch(action);
        if mutates {
            self.persist()?;
        }
        Ok(affected)
    }

    fn persist(&mut self) -> Result<(), AppError> {
        self.persistence.save(self.store.tasks())
    }
}
