//! Fixed-interval sampling task.

/// Current state of a sampling task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Not scheduled (target out of view)
    Idle,
    /// Firing at a fixed interval while the target is visible
    Running,
    /// Torn down; never fires again until restarted
    Cancelled,
}

/// Platform-agnostic scheduler for visibility-gated sampling.
///
/// The task does not own a timer. The caller polls it from whatever clock it
/// has (an animation frame, an interval, a test loop) and the task answers
/// whether a tick is due. Ticks are rate-limited to `interval_ms`, so a
/// caller polling faster than the interval never gets overlapping ticks.
///
/// The task schedules itself when the target becomes visible and
/// cancels itself when visibility is lost.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{SamplingTask, TaskState};
///
/// let mut task = SamplingTask::new(10);
/// assert!(!task.poll(0));
///
/// task.set_visible(true, 0);
/// assert!(task.poll(0));
/// assert!(!task.poll(5));
/// assert!(task.poll(10));
///
/// task.set_visible(false, 12);
/// assert_eq!(task.state(), TaskState::Idle);
/// assert!(!task.poll(100));
///
/// task.cancel();
/// task.set_visible(true, 200);
/// assert_eq!(task.state(), TaskState::Cancelled);
/// ```
#[derive(Clone, Debug)]
pub struct SamplingTask {
    /// Minimum time between ticks
    interval_ms: u32,
    /// Current state
    state: TaskState,
    /// Earliest time the next tick may fire
    next_due_ms: u64,
    /// Number of ticks fired since creation or restart
    ticks: u64,
}

impl SamplingTask {
    /// Create an idle task with the given interval (at least 1 ms).
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            state: TaskState::Idle,
            next_due_ms: 0,
            ticks: 0,
        }
    }

    /// Minimum time between ticks.
    #[inline]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Change the interval (at least 1 ms).
    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms.max(1);
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// True while scheduled.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == TaskState::Running
    }

    /// Ticks fired since creation or restart.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Time of the next allowed tick, if running.
    pub fn next_due_ms(&self) -> Option<u64> {
        (self.state == TaskState::Running).then_some(self.next_due_ms)
    }

    /// Feed the target's visibility.
    ///
    /// Becoming visible schedules an immediate tick; losing visibility
    /// unschedules the task. Has no effect once cancelled.
    pub fn set_visible(&mut self, visible: bool, now_ms: u64) {
        match (self.state, visible) {
            (TaskState::Idle, true) => {
                tracing::trace!(now_ms, "sampling task scheduled");
                self.state = TaskState::Running;
                self.next_due_ms = now_ms;
            }
            (TaskState::Running, false) => {
                tracing::trace!(now_ms, "sampling task unscheduled");
                self.state = TaskState::Idle;
            }
            _ => {}
        }
    }

    /// Returns true when a tick is due, and reschedules the next one.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.state != TaskState::Running || now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms = now_ms + self.interval_ms as u64;
        self.ticks += 1;
        true
    }

    /// Tear the task down. Subsequent polls never fire.
    pub fn cancel(&mut self) {
        if self.state != TaskState::Cancelled {
            tracing::debug!(ticks = self.ticks, "sampling task cancelled");
        }
        self.state = TaskState::Cancelled;
    }

    /// Bring a cancelled task back to idle (owner mounted again).
    pub fn restart(&mut self) {
        self.state = TaskState::Idle;
        self.next_due_ms = 0;
        self.ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit() {
        let mut task = SamplingTask::new(10);
        task.set_visible(true, 100);

        let fired: Vec<u64> = (100..150).filter(|&t| task.poll(t)).collect();
        assert_eq!(fired, vec![100, 110, 120, 130, 140]);
        assert_eq!(task.ticks(), 5);
    }

    #[test]
    fn test_late_poll_does_not_burst() {
        let mut task = SamplingTask::new(10);
        task.set_visible(true, 0);
        assert!(task.poll(0));
        // A long stall fires once, then waits a full interval again
        assert!(task.poll(95));
        assert!(!task.poll(100));
        assert!(task.poll(105));
    }

    #[test]
    fn test_visibility_gating() {
        let mut task = SamplingTask::new(10);
        assert!(!task.poll(0));
        assert_eq!(task.next_due_ms(), None);

        task.set_visible(true, 0);
        assert_eq!(task.state(), TaskState::Running);
        assert!(task.poll(0));

        task.set_visible(false, 3);
        assert_eq!(task.state(), TaskState::Idle);
        assert!(!task.poll(20));

        task.set_visible(true, 30);
        assert!(task.poll(30));
    }

    #[test]
    fn test_cancel_and_restart() {
        let mut task = SamplingTask::new(10);
        task.set_visible(true, 0);
        task.cancel();
        assert!(!task.poll(50));
        task.set_visible(true, 60);
        assert_eq!(task.state(), TaskState::Cancelled);

        task.restart();
        assert_eq!(task.state(), TaskState::Idle);
        task.set_visible(true, 70);
        assert!(task.poll(70));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut task = SamplingTask::new(0);
        assert_eq!(task.interval_ms(), 1);
        task.set_interval(0);
        assert_eq!(task.interval_ms(), 1);
    }
}
