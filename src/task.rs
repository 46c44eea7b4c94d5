use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::storage::{Collection, Record};

/// Color used for labels that a task references but the board does not know.
pub const FALLBACK_LABEL_COLOR: &str = "#E5E7EB";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Board columns, left to right.
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn column(self) -> usize {
        match self {
            TaskStatus::NotStarted => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Completed => 2,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task status: {0:?}")]
pub struct InvalidStatus(pub String);

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Storage key; never written into the record body.
    #[serde(skip)]
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;
}

/// What the user typed into the add form; turned into a [`Task`] by the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub labels: BTreeSet<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_label(mut self, name: impl Into<String>) -> Self {
        self.labels.insert(name.into());
        self
    }

    /// Adds the label if absent, removes it otherwise.
    pub fn toggle_label(&mut self, name: &str) {
        if !self.labels.remove(name) {
            self.labels.insert(name.to_string());
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

impl Record for Label {
    const COLLECTION: Collection = Collection::Labels;
}

/// Labels written on first run, when storage holds none.
pub fn default_labels() -> Vec<Label> {
    vec![
        Label::new("重要", "#EF4444"),
        Label::new("緊急", "#F59E0B"),
        Label::new("進行中", "#3B82F6"),
        Label::new("完了", "#10B981"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("not_started", TaskStatus::NotStarted)]
    #[case("in_progress", TaskStatus::InProgress)]
    #[case("completed", TaskStatus::Completed)]
    fn status_parses_its_own_name(#[case] raw: &str, #[case] expected: TaskStatus) {
        assert_eq!(raw.parse::<TaskStatus>(), Ok(expected));
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    #[case("done")]
    #[case("Completed")]
    #[case("")]
    fn unknown_status_is_rejected(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<TaskStatus>(),
            Err(InvalidStatus(raw.to_string()))
        );
    }

    #[test]
    fn task_record_body_omits_id() {
        let now = Utc::now();
        let task = Task {
            id: TaskId(7),
            title: "Buy milk".into(),
            description: String::new(),
            status: TaskStatus::InProgress,
            labels: BTreeSet::from(["重要".to_string()]),
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["status"], "in_progress");
        assert!(value.get("createdAt").is_some());

        let back: Task = serde_json::from_value(value).unwrap();
        assert_eq!(back.id, TaskId::default());
        assert_eq!(back.title, task.title);
    }

    #[test]
    fn toggle_label_flips_membership() {
        let mut draft = TaskDraft::new("x");
        draft.toggle_label("緊急");
        assert!(draft.labels.contains("緊急"));
        draft.toggle_label("緊急");
        assert!(draft.labels.is_empty());
    }

    #[test]
    fn task_id_parses_draggable_ids() {
        assert_eq!("42".parse::<TaskId>(), Ok(TaskId(42)));
        assert!("task-42".parse::<TaskId>().is_err());
    }
}
