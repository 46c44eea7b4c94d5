use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};

use crate::celebration::Celebration;
use crate::clock::{Clock, SystemClock};
use crate::drag::{DropEvent, MoveOutcome, SkipReason};
use crate::storage::{Storage, StorageResult};
use crate::task::{
    default_labels, Label, Task, TaskDraft, TaskId, TaskStatus, FALLBACK_LABEL_COLOR,
};

/// In-memory board state, kept in step with its storage.
#[derive(Debug)]
pub struct KanbanBoard<S, C = SystemClock> {
    storage: S,
    clock: C,
    tasks: Vec<Task>,
    labels: Vec<Label>,
    celebration: Celebration,
}

impl<S: Storage, C: Clock> KanbanBoard<S, C> {
    /// Reads tasks and labels from `storage`, seeding the default labels when
    /// none are stored yet.
    pub fn load(storage: S, clock: C, celebration: Celebration) -> StorageResult<Self> {
        let mut board = Self {
            storage,
            clock,
            tasks: Vec::new(),
            labels: Vec::new(),
            celebration,
        };

        board.tasks = board
            .storage
            .get_all::<Task>()?
            .into_iter()
            .map(|(id, mut task)| {
                task.id = TaskId(id);
                task
            })
            .collect();

        board.labels = board
            .storage
            .get_all::<Label>()?
            .into_iter()
            .map(|(_, label)| label)
            .collect();
        if board.labels.is_empty() {
            board.seed_labels()?;
        }

        info!(
            "loaded {} tasks and {} labels",
            board.tasks.len(),
            board.labels.len()
        );
        board.after_change();
        Ok(board)
    }

    fn seed_labels(&mut self) -> StorageResult<()> {
        for label in default_labels() {
            self.storage.add(&label)?;
            self.labels.push(label);
        }
        debug!("seeded {} default labels", self.labels.len());
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn count_by_status(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    /// Color of the named label, or the fallback for names no label carries.
    pub fn label_color(&self, name: &str) -> &str {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map_or(FALLBACK_LABEL_COLOR, |l| l.color.as_str())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn celebrating(&self) -> bool {
        self.celebration.is_active(self.clock.now())
    }

    /// Clears the celebration once its delay is over.
    pub fn tick(&mut self) {
        self.celebration.expire(self.clock.now());
    }

    /// Creates a task from `draft`. Returns `Ok(None)` without touching
    /// anything when the title is blank.
    pub fn add_task(&mut self, draft: TaskDraft) -> StorageResult<Option<TaskId>> {
        if draft.title.trim().is_empty() {
            debug!("ignoring task draft with empty title");
            return Ok(None);
        }

        let now = self.clock.now();
        let mut task = Task {
            id: TaskId::default(),
            title: draft.title,
            description: draft.description,
            status: draft.status.unwrap_or_default(),
            labels: draft.labels,
            created_at: now,
            updated_at: now,
        };

        let id = TaskId(self.storage.add(&task)?);
        task.id = id;
        info!("added task {id} {:?}", task.title);
        self.tasks.push(task);
        self.after_change();
        Ok(Some(id))
    }

    /// Moves a task to the status named by `destination`.
    ///
    /// Any status may be reached from any other. Unknown statuses and ids are
    /// logged and leave the board unchanged.
    pub fn move_task(&mut self, task_id: TaskId, destination: &str) -> MoveOutcome {
        let status = match destination.parse::<TaskStatus>() {
            Ok(status) => status,
            Err(err) => {
                error!("{err}");
                return MoveOutcome::Skipped(SkipReason::InvalidStatus(destination.to_string()));
            }
        };

        let Some(index) = self.tasks.iter().position(|t| t.id == task_id) else {
            error!("task not found: {task_id}");
            return MoveOutcome::Skipped(SkipReason::TaskNotFound(task_id));
        };

        let previous = &self.tasks[index];
        let updated = Task {
            status,
            updated_at: next_update_time(previous.updated_at, self.clock.now()),
            ..previous.clone()
        };
        debug!("task {task_id}: {} -> {status}", previous.status);
        self.tasks[index] = updated.clone();
        self.after_change();

        // The local move stands even if storage rejects it.
        let persisted = match self.storage.put(task_id.0, &updated) {
            Ok(()) => true,
            Err(err) => {
                error!("failed to update task {task_id}: {err}");
                false
            }
        };

        MoveOutcome::Moved {
            task: updated,
            persisted,
        }
    }

    /// Applies a drop event from the board view.
    pub fn handle_drop(&mut self, event: &DropEvent) -> MoveOutcome {
        let Some(destination) = &event.destination else {
            return MoveOutcome::Skipped(SkipReason::NoDestination);
        };

        match event.draggable_id.parse::<TaskId>() {
            Ok(id) => self.move_task(id, &destination.droppable_id),
            Err(_) => {
                warn!("drop carried a non-numeric draggable id {:?}", event.draggable_id);
                MoveOutcome::Skipped(SkipReason::InvalidDraggableId(event.draggable_id.clone()))
            }
        }
    }

    fn after_change(&mut self) {
        let now = self.clock.now();
        self.celebration.observe(&self.tasks, now);
    }
}

/// `now`, or one millisecond past `previous` if the clock has not moved on.
fn next_update_time(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
