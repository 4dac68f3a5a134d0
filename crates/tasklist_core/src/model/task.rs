use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a task within a collection.
///
/// New ids are random UUIDs. Snapshots written by older front ends stored
/// numeric ids, so decoding also accepts a JSON number and keeps its decimal
/// form as the id text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawTaskId", into = "String")]
pub struct TaskId(String);

impl TaskId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTaskId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawTaskId> for TaskId {
    fn from(raw: RawTaskId) -> Self {
        match raw {
            RawTaskId::Text(text) => Self(text),
            RawTaskId::Number(number) => Self(number_to_id_text(&number)),
        }
    }
}

/// Renders whole numbers without a fractional part, so `1e3` and `1000`
/// name the same task.
fn number_to_id_text(number: &serde_json::Number) -> String {
    if let Some(value) = number.as_u64() {
        return value.to_string();
    }
    if let Some(value) = number.as_i64() {
        return value.to_string();
    }
    match number.as_f64() {
        Some(value) if value == 0.0 => "0".to_string(),
        Some(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 => {
            format!("{value:.0}")
        }
        _ => number.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Builds a pending task with a freshly generated id.
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            id: TaskId::generate(),
            title: title.into(),
            completed: false,
        }
    }

    pub fn matches_query(&self, lowered_query: &str) -> bool {
        lowered_query.is_empty() || self.title.to_lowercase().contains(lowered_query)
    }

    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = patch.title.as_ref() {
            self.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Partial update merged into a task. Only the `Some` fields are written.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn title<S: Into<String>>(title: S) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskId, TaskPatch};

    #[test]
    fn generated_ids_are_distinct() {
        let first = TaskId::generate();
        let second = TaskId::generate();
        assert_ne!(first, second);
    }

    #[test]
    fn numeric_id_decodes_as_text() {
        let task: Task = serde_json::from_str(r#"{"id": 1703030400000, "title": "demo"}"#).unwrap();
        assert_eq!(task.id.as_str(), "1703030400000");
        assert!(!task.completed);
    }

    #[test]
    fn whole_float_id_decodes_without_fraction() {
        let task: Task = serde_json::from_str(r#"{"id": 1e3, "title": "demo"}"#).unwrap();
        assert_eq!(task.id.as_str(), "1000");

        let task: Task = serde_json::from_str(r#"{"id": -2.0, "title": "demo"}"#).unwrap();
        assert_eq!(task.id.as_str(), "-2");

        let task: Task = serde_json::from_str(r#"{"id": 0.25, "title": "demo"}"#).unwrap();
        assert_eq!(task.id.as_str(), "0.25");
    }

    #[test]
    fn id_encodes_as_string() {
        let task = Task {
            id: TaskId::new("0.42"),
            title: "demo".to_string(),
            completed: true,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": "0.42", "title": "demo", "completed": true})
        );
    }

    #[test]
    fn apply_only_touches_patched_fields() {
        let mut task = Task {
            id: TaskId::new("task-1"),
            title: "old".to_string(),
            completed: false,
        };

        task.apply(&TaskPatch::completed(true));
        assert_eq!(task.title, "old");
        assert!(task.completed);

        task.apply(&TaskPatch::title("new"));
        assert_eq!(task.title, "new");
        assert!(task.completed);
    }

    #[test]
    fn matches_query_ignores_case() {
        let task = Task::new("Call Mom");
        assert!(task.matches_query("mom"));
        assert!(task.matches_query(""));
        assert!(!task.matches_query("milk"));
    }
}
