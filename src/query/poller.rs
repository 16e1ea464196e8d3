use std::thread;
use std::time::{Duration, Instant};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Paces the evaluations of one explicit wait.
///
/// Poll `n` is due `interval * n` after the start, so slow predicates do not
/// stretch the cadence. The last sleep is cut short at the deadline, which
/// gives the condition one final evaluation right at the timeout.
#[derive(Debug, Clone)]
pub struct PollerTicker {
    timeout: Duration,
    interval: Duration,
    start: Instant,
    cur_tries: u32,
}

impl PollerTicker {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self::starting_at(Instant::now(), timeout, interval)
    }

    /// A ticker whose deadline is measured from `start` rather than from now.
    pub fn starting_at(start: Instant, timeout: Duration, interval: Duration) -> Self {
        PollerTicker {
            timeout,
            interval: interval.max(MIN_INTERVAL),
            start,
            cur_tries: 0,
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.start.elapsed() >= self.timeout
    }

    /// Sleep until the next poll is due. Returns `false` once the deadline has passed.
    pub fn tick(&mut self) -> bool {
        self.cur_tries += 1;

        let actual_elapsed = self.start.elapsed();
        if actual_elapsed >= self.timeout {
            return false;
        }

        let due = (self.interval * self.cur_tries).min(self.timeout);
        if actual_elapsed < due {
            thread::sleep(due - actual_elapsed);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_ticker_does_not_sleep() {
        let mut ticker = PollerTicker::new(Duration::ZERO, Duration::from_secs(5));
        let before = Instant::now();
        assert!(!ticker.tick());
        assert!(before.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn last_tick_lands_on_deadline() {
        let timeout = Duration::from_millis(120);
        let mut ticker = PollerTicker::new(timeout, Duration::from_millis(50));
        let mut ticks = 0;
        while ticker.tick() {
            ticks += 1;
        }
        // 50ms, 100ms, clamped 120ms.
        assert_eq!(ticks, 3);
        let elapsed = ticker.elapsed();
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(100));
    }

    #[test]
    fn zero_interval_is_floored() {
        let mut ticker = PollerTicker::new(Duration::from_millis(10), Duration::ZERO);
        let mut ticks = 0;
        while ticker.tick() {
            ticks += 1;
        }
        assert!(ticks >= 1 && ticks <= 11);
    }
}
