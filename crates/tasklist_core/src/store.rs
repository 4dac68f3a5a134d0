//! In-memory task collection and the active search filter.
//!
//! The store never fails: operations naming an id that is not present leave
//! the collection untouched and report zero affected tasks.

use crate::model::{Task, TaskId, TaskPatch};
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
    search_query: String,
}

/// Reducer form of the store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    AddTask(Task),
    UpdateTask { id: TaskId, patch: TaskPatch },
    DeleteTask(TaskId),
    SetSearchQuery(String),
}

impl TaskAction {
    pub fn mutates_collection(&self) -> bool {
        !matches!(self, Self::SetSearchQuery(_))
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            search_query: String::new(),
        }
    }

    /// The full collection in insertion order, ignoring the search query.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn add_task(&mut self, task: Task) {
        debug!(id = %task.id, "add task");
        self.tasks.push(task);
    }

    /// Merges `patch` into every task with a matching id.
    pub fn update_task(&mut self, id: &TaskId, patch: &TaskPatch) -> usize {
        let mut updated = 0;
        for task in self.tasks.iter_mut().filter(|task| &task.id == id) {
            task.apply(patch);
            updated += 1;
        }
        debug!(%id, updated, "update task");
        updated
    }

    /// Removes every task with a matching id.
    pub fn delete_task(&mut self, id: &TaskId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.id != id);
        let removed = before - self.tasks.len();
        debug!(%id, removed, "delete task");
        removed
    }

    pub fn set_search_query<Q: Into<String>>(&mut self, query: Q) {
        self.search_query = query.into();
    }

    /// Tasks whose title contains the search query, case-insensitively, in
    /// collection order. An empty query matches every task.
    pub fn search(&self) -> Vec<&Task> {
        let lowered = self.search_query.to_lowercase();
        self.tasks
            .iter()
            .filter(|task| task.matches_query(&lowered))
            .collect()
    }

    pub fn add_new_task<S: Into<String>>(&mut self, title: S) -> TaskId {
        let task = Task::new(title);
        let id = task.id.clone();
        self.add_task(task);
        id
    }

    pub fn update_existing_task<S: Into<String>>(&mut self, id: &TaskId, new_title: S) -> usize {
        self.update_task(id, &TaskPatch::title(new_title))
    }

    pub fn set_task_completed(&mut self, id: &TaskId, completed: bool) -> usize {
        self.update_task(id, &TaskPatch::completed(completed))
    }

    pub fn delete_task_by_id(&mut self, id: &TaskId) -> usize {
        self.delete_task(id)
    }

    /// Applies an action and returns how many tasks it touched.
    pub fn dispatch(&mut self, action: TaskAction) -> usize {
        match action {
            TaskAction::AddTask(task) => {
                self.add_task(task);
                1
            }
            TaskAction::UpdateTask { id, patch } => self.update_task(&id, &patch),
            TaskAction::DeleteTask(id) => self.delete_task(&id),
            TaskAction::SetSearchQuery(query) => {
                self.set_search_query(query);
                0
            }
        }
    }
}
