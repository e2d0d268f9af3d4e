/// Debounced auto-save timer.
///
/// The timer is armed on every edit and fires once the edits have been quiet
/// for the configured interval. It never runs on its own and never reads the
/// wall clock: the host polls it from its frame loop with its own instant, and
/// an edit's countdown starts at the first poll after it.
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct AutoSave {
    /// Quiet period before firing. `None` disables auto-save.
    interval: Option<Duration>,
    /// An edit happened since the last poll; the next poll starts the countdown.
    pending: bool,
    /// When the pending save is due, once the countdown has started.
    deadline: Option<Instant>,
}

impl AutoSave {
    /// An auto-save that fires `interval` after the last edit.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            ..Self::default()
        }
    }

    /// An auto-save that never fires.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    /// Whether a save is pending.
    pub fn is_armed(&self) -> bool {
        self.pending || self.deadline.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Changes the interval. Disabling cancels any pending save.
    pub fn set_interval(&mut self, interval: Option<Duration>) {
        self.interval = interval;
        if interval.is_none() {
            self.cancel();
        }
    }

    /// Restarts the countdown from the next `poll`. No-op when disabled.
    pub fn arm(&mut self) {
        if self.interval.is_some() {
            self.pending = true;
            self.deadline = None;
        }
    }

    /// Restarts the countdown from `now`. No-op when disabled.
    pub fn arm_at(&mut self, now: Instant) {
        if let Some(interval) = self.interval {
            self.pending = false;
            self.deadline = Some(now + interval);
        }
    }

    pub fn cancel(&mut self) {
        self.pending = false;
        self.deadline = None;
    }

    /// Returns `true` exactly once when the deadline has passed, disarming
    /// the timer.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.pending {
            self.arm_at(now);
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(30);

    #[test]
    fn test_disabled_never_fires() {
        let mut timer = AutoSave::disabled();
        let now = Instant::now();
        timer.arm_at(now);
        assert!(!timer.is_armed());
        assert!(!timer.poll(now + Duration::from_secs(3600)));
    }

    #[test]
    fn test_fires_after_interval() {
        let mut timer = AutoSave::new(INTERVAL);
        let start = Instant::now();
        timer.arm_at(start);
        assert!(!timer.poll(start + Duration::from_secs(29)));
        assert!(timer.poll(start + INTERVAL));
    }

    #[test]
    fn test_fires_only_once() {
        let mut timer = AutoSave::new(INTERVAL);
        let start = Instant::now();
        timer.arm_at(start);
        assert!(timer.poll(start + INTERVAL));
        assert!(!timer.poll(start + INTERVAL * 2));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearming_pushes_deadline_back() {
        let mut timer = AutoSave::new(INTERVAL);
        let start = Instant::now();
        timer.arm_at(start);
        timer.arm_at(start + Duration::from_secs(20));
        // 30s after the first edit but only 10s after the second
        assert!(!timer.poll(start + INTERVAL));
        assert!(timer.poll(start + Duration::from_secs(50)));
    }

    #[test]
    fn test_cancel() {
        let mut timer = AutoSave::new(INTERVAL);
        let start = Instant::now();
        timer.arm_at(start);
        timer.cancel();
        assert!(!timer.poll(start + INTERVAL));
    }

    #[test]
    fn test_arm_counts_from_next_poll() {
        let mut timer = AutoSave::new(INTERVAL);
        let start = Instant::now();
        timer.arm();
        assert!(timer.is_armed());
        // First poll after the edit starts the countdown.
        assert!(!timer.poll(start + Duration::from_secs(100)));
        assert!(!timer.poll(start + Duration::from_secs(129)));
        assert!(timer.poll(start + Duration::from_secs(130)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_arm_restarts_started_countdown() {
        let mut timer = AutoSave::new(INTERVAL);
        let start = Instant::now();
        timer.arm_at(start);
        timer.arm();
        assert!(!timer.poll(start + Duration::from_secs(20)));
        assert!(!timer.poll(start + INTERVAL));
        assert!(timer.poll(start + Duration::from_secs(50)));
    }

    #[test]
    fn test_arm_when_disabled_is_noop() {
        let mut timer = AutoSave::disabled();
        timer.arm();
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_disabling_cancels_pending() {
        let mut timer = AutoSave::new(INTERVAL);
        let start = Instant::now();
        timer.arm_at(start);
        timer.set_interval(None);
        assert!(!timer.is_enabled());
        assert!(!timer.poll(start + INTERVAL));
    }
}
