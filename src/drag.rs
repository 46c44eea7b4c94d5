//! Drop events, as produced by a drag gesture on the board.

use crate::task::{Task, TaskId, TaskStatus};

/// A position inside a droppable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragLocation {
    pub droppable_id: String,
    pub index: usize,
}

impl DragLocation {
    pub fn new(droppable_id: impl Into<String>, index: usize) -> Self {
        Self {
            droppable_id: droppable_id.into(),
            index,
        }
    }

    pub fn column(status: TaskStatus, index: usize) -> Self {
        Self::new(status.as_str(), index)
    }
}

/// Result of releasing a dragged card.
///
/// `destination` is `None` when the card was released outside every column.
/// `draggable_id` is the task id rendered as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
    pub draggable_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoDestination,
    InvalidDraggableId(String),
    InvalidStatus(String),
    TaskNotFound(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The task changed in memory; `persisted` is false when the write failed.
    Moved { task: Task, persisted: bool },
    Skipped(SkipReason),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}
