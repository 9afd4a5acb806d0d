//! Single-shot delayed tasks driven by an injected simulation clock.

use std::time::Duration;

/// Identifier allocated to a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// What a scheduled task does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskPurpose {
    /// Runs one automatic spread step.
    SpreadStep,
    /// Moves on to the next level after the win transition.
    AdvanceLevel,
    /// Restarts the current level after the lose transition.
    RestartLevel,
}

/// Task waiting for the clock to reach its due time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    /// Identifier allocated when the task was scheduled.
    pub id: TaskId,
    /// Action performed when the task fires.
    pub purpose: TaskPurpose,
    /// Clock reading at which the task fires.
    pub due: Duration,
    /// Level generation that was current when the task was scheduled.
    pub generation: u64,
}

/// Ordered queue of single-shot tasks.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    /// Creates an empty scheduler with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock reading.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Queues a task that fires once `delay` has elapsed.
    pub fn schedule(&mut self, purpose: TaskPurpose, delay: Duration, generation: u64) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.tasks.push(ScheduledTask {
            id,
            purpose,
            due: self.now.saturating_add(delay),
            generation,
        });
        id
    }

    /// Drops a pending task, reporting whether it was still queued.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    /// Removes the earliest task due at or before `horizon`.
    ///
    /// The clock moves forward to the task's due time so that anything the
    /// task schedules is measured from the moment it fired. Ties fire in
    /// scheduling order.
    pub fn pop_due(&mut self, horizon: Duration) -> Option<ScheduledTask> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= horizon)
            .min_by_key(|(_, task)| (task.due, task.id))
            .map(|(index, _)| index)?;
        let task = self.tasks.remove(index);
        self.now = self.now.max(task.due);
        Some(task)
    }

    /// Moves the clock forward to `horizon` once every due task has fired.
    pub fn settle(&mut self, horizon: Duration) {
        self.now = self.now.max(horizon);
    }

    /// Counts the queued tasks with the provided purpose.
    #[must_use]
    pub fn pending(&self, purpose: TaskPurpose) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.purpose == purpose)
            .count()
    }
}
