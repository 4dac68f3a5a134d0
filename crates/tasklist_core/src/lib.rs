pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod store;
pub mod task_api;

pub use error::AppError;
pub use model::{Task, TaskId, TaskPatch};
pub use store::{TaskAction, TaskStore};
pub use task_api::TaskManager;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Task, TaskId};

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: TaskId::new("task-1"),
            title: "demo".to_string(),
            completed: false,
        };

        assert_eq!(task.id.as_str(), "task-1");
        assert_eq!(task.title, "demo");
        assert!(!task.completed);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_input("missing title");
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.message(), "missing title");
        assert_eq!(err.to_string(), "invalid_input - missing title");
    }
}
