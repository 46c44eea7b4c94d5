//! One-shot "everything is done" signal.
//!
//! Raised when the task list is non-empty and fully completed, cleared after a
//! fixed delay. It re-arms only once some task has left `completed`.

use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::task::Task;

pub const DEFAULT_DELAY_SECS: u64 = 3;

/// Longest delay accepted from configuration.
const MAX_DELAY_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Celebration {
    delay: Duration,
    raised_at: Option<DateTime<Utc>>,
    armed: bool,
}

impl Default for Celebration {
    fn default() -> Self {
        Self::from_secs(DEFAULT_DELAY_SECS)
    }
}

impl Celebration {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            raised_at: None,
            armed: true,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::seconds(secs.min(MAX_DELAY_SECS) as i64))
    }

    /// Re-evaluates after the task list changed. Returns true when the signal
    /// was raised by this call.
    pub fn observe(&mut self, tasks: &[Task], now: DateTime<Utc>) -> bool {
        let all_completed = !tasks.is_empty() && tasks.iter().all(Task::is_completed);
        if !all_completed {
            self.armed = true;
            return false;
        }
        if !self.armed {
            return false;
        }
        self.armed = false;
        self.raised_at = Some(now);
        info!("all {} tasks completed", tasks.len());
        true
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.raised_at
            .is_some_and(|raised| now < raised + self.delay)
    }

    /// Drops the signal once its delay has elapsed.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        if self.raised_at.is_some() && !self.is_active(now) {
            self.raised_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskId, TaskStatus};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn task(status: TaskStatus) -> Task {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: TaskId(1),
            title: "t".into(),
            description: String::new(),
            status,
            labels: Default::default(),
            created_at: at,
            updated_at: at,
        }
    }

    #[fixture]
    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    #[rstest]
    fn empty_board_never_celebrates(t0: DateTime<Utc>) {
        let mut signal = Celebration::default();
        assert!(!signal.observe(&[], t0));
        assert!(!signal.is_active(t0));
    }

    #[rstest]
    fn raised_then_cleared_after_delay(t0: DateTime<Utc>) {
        let mut signal = Celebration::default();
        let done = [task(TaskStatus::Completed), task(TaskStatus::Completed)];

        assert!(signal.observe(&done, t0));
        assert!(signal.is_active(t0 + Duration::milliseconds(2_999)));
        assert!(!signal.is_active(t0 + Duration::seconds(3)));

        signal.expire(t0 + Duration::seconds(3));
        assert!(signal.raised_at.is_none());
    }

    #[rstest]
    fn stays_quiet_while_continuously_completed(t0: DateTime<Utc>) {
        let mut signal = Celebration::default();
        let done = [task(TaskStatus::Completed)];

        assert!(signal.observe(&done, t0));
        assert!(!signal.observe(&done, t0 + Duration::seconds(10)));
        assert!(!signal.is_active(t0 + Duration::seconds(10)));

        assert!(!signal.observe(&[task(TaskStatus::InProgress)], t0 + Duration::seconds(11)));
        assert!(signal.observe(&done, t0 + Duration::seconds(12)));
        assert!(signal.is_active(t0 + Duration::seconds(12)));
    }

    #[rstest]
    fn partial_completion_does_not_raise(t0: DateTime<Utc>) {
        let mut signal = Celebration::default();
        let mixed = [task(TaskStatus::Completed), task(TaskStatus::NotStarted)];
        assert!(!signal.observe(&mixed, t0));
    }
}
