//! Terminal kanban board: tasks with labels moved between three status
//! columns, persisted to a local JSON record store.

pub mod celebration;
pub mod clock;
pub mod config;
pub mod drag;
pub mod i18n;
pub mod kanban_board;
pub mod storage;
pub mod task;
pub mod terminal;
pub mod ui;

pub use kanban_board::KanbanBoard;
