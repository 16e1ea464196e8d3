use std::time::{Duration, Instant};

use log::debug;

use crate::config::WaitPolicy;
use crate::driver::Driver;
use crate::error::{PageError, PageResult};
use crate::query::{PollerTicker, Probe};

/// What a wait does when its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnTimeout {
    /// Fail with [`PageError::Timeout`].
    Raise,
    /// Return [`WaitOutcome::TimedOut`].
    ReturnFalse,
}

impl OnTimeout {
    pub fn from_reraise(reraise: bool) -> Self {
        if reraise {
            OnTimeout::Raise
        } else {
            OnTimeout::ReturnFalse
        }
    }
}

/// How an explicit wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// The condition held and produced a value.
    Found(T),
    /// The condition held because the element is absent.
    Absent,
    /// The deadline passed under [`OnTimeout::ReturnFalse`].
    TimedOut,
}

impl<T> WaitOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, WaitOutcome::Found(_))
    }

    /// `Found` or `Absent`.
    pub fn is_satisfied(&self) -> bool {
        !self.is_timed_out()
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, WaitOutcome::TimedOut)
    }

    pub fn found(self) -> Option<T> {
        match self {
            WaitOutcome::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> WaitOutcome<&T> {
        match self {
            WaitOutcome::Found(value) => WaitOutcome::Found(value),
            WaitOutcome::Absent => WaitOutcome::Absent,
            WaitOutcome::TimedOut => WaitOutcome::TimedOut,
        }
    }

    pub fn map<U, F>(self, f: F) -> WaitOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            WaitOutcome::Found(value) => WaitOutcome::Found(f(value)),
            WaitOutcome::Absent => WaitOutcome::Absent,
            WaitOutcome::TimedOut => WaitOutcome::TimedOut,
        }
    }
}

/// Explicit wait, configured with the builder pattern.
///
/// # Example:
/// ```
/// use pageobject_sync::driver::mock::{MockDriver, MockNode};
/// use pageobject_sync::query::{conditions, ElementState, Waiter, WaitOutcome};
/// use pageobject_sync::{Locator, WaitPolicy};
/// use std::time::Duration;
///
/// let driver = MockDriver::new();
/// driver.add(MockNode::new(Locator::id("banner")));
/// let outcome = Waiter::new(&driver, &WaitPolicy::default())
///     .with_timeout(Duration::from_secs(1))
///     .target("banner")
///     .condition(ElementState::Visible.name())
///     .until(conditions::element_in_state(
///         Locator::id("banner"),
///         None,
///         ElementState::Visible,
///         false,
///     ))?;
/// assert!(outcome.is_found());
/// # Ok::<(), pageobject_sync::PageError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Waiter<'a> {
    driver: &'a dyn Driver,
    timeout: Duration,
    interval: Duration,
    started_at: Option<Instant>,
    ignore_stale: bool,
    target: String,
    condition: String,
    on_timeout: OnTimeout,
}

impl<'a> Waiter<'a> {
    pub fn new(driver: &'a dyn Driver, policy: &WaitPolicy) -> Self {
        Waiter {
            driver,
            timeout: policy.timeout,
            interval: policy.interval,
            started_at: None,
            ignore_stale: false,
            target: String::from("element"),
            condition: String::from("ready"),
            on_timeout: OnTimeout::from_reraise(policy.reraise),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Measure the deadline from `start`, so a follow-up wait shares the
    /// deadline of the wait it replaces.
    pub fn starting_at(mut self, start: Instant) -> Self {
        self.started_at = Some(start);
        self
    }

    /// Keep polling through stale-reference failures. Only safe for
    /// conditions that look elements up again on every evaluation.
    pub fn ignore_stale(mut self, ignore: bool) -> Self {
        self.ignore_stale = ignore;
        self
    }

    /// What is being waited for, as reported on timeout.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// The state being waited for, as reported on timeout.
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn on_timeout(mut self, on_timeout: OnTimeout) -> Self {
        self.on_timeout = on_timeout;
        self
    }

    pub fn reraise(self, reraise: bool) -> Self {
        self.on_timeout(OnTimeout::from_reraise(reraise))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll `predicate` until it holds or the deadline passes.
    ///
    /// Not-found failures count as "not yet". Stale failures count as "not
    /// yet" only with [`Waiter::ignore_stale`]. Every other error ends the
    /// wait immediately.
    pub fn until<T, F>(self, mut predicate: F) -> PageResult<WaitOutcome<T>>
    where
        F: FnMut(&dyn Driver) -> PageResult<Probe<T>>,
    {
        debug!(
            "waiting up to {:?} for {} to become {}",
            self.timeout, self.target, self.condition
        );
        let start = self.started_at.unwrap_or_else(Instant::now);
        let mut ticker = PollerTicker::starting_at(start, self.timeout, self.interval);
        loop {
            match predicate(self.driver) {
                Ok(Probe::Met(value)) => return Ok(WaitOutcome::Found(value)),
                Ok(Probe::Absent) => return Ok(WaitOutcome::Absent),
                Ok(Probe::Unmet) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) if self.ignore_stale && e.is_stale() => {}
                Err(e) => return Err(e),
            }

            if !ticker.tick() {
                break;
            }
        }

        match self.on_timeout {
            OnTimeout::Raise => Err(PageError::Timeout {
                target: self.target,
                condition: self.condition,
                timeout: self.timeout,
            }),
            OnTimeout::ReturnFalse => {
                debug!("{} did not become {} within {:?}", self.target, self.condition, self.timeout);
                Ok(WaitOutcome::TimedOut)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockDriver, MockNode};
    use crate::locator::Locator;
    use crate::query::{conditions, ElementState};

    fn fast() -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(200), Duration::from_millis(20), true)
    }

    #[test]
    fn raise_waits_out_the_full_timeout() {
        let driver = MockDriver::new();
        let start = Instant::now();
        let err = Waiter::new(&driver, &fast())
            .target("ghost")
            .condition("present")
            .until(conditions::element_in_state(Locator::id("ghost"), None, ElementState::Present, false))
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn return_false_reports_timed_out() {
        let driver = MockDriver::new();
        let outcome = Waiter::new(&driver, &fast())
            .reraise(false)
            .until(conditions::all_present(Locator::id("ghost")))
            .unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }

    #[test]
    fn stale_ends_the_wait_unless_ignored() {
        let driver = MockDriver::new();
        let id = driver.add(MockNode::new(Locator::id("row")));
        let handle = driver.find_element(&Locator::id("row")).unwrap();
        driver.invalidate(id);

        let err = Waiter::new(&driver, &fast())
            .until(conditions::handle_in_state(handle.clone(), ElementState::Visible))
            .unwrap_err();
        assert!(err.is_stale());

        let outcome = Waiter::new(&driver, &fast())
            .ignore_stale(true)
            .reraise(false)
            .until(conditions::handle_in_state(handle, ElementState::Visible))
            .unwrap();
        assert!(outcome.is_timed_out());
    }

    #[test]
    fn other_errors_propagate_immediately() {
        let driver = MockDriver::new();
        let start = Instant::now();
        let err = Waiter::new(&driver, &fast())
            .until(|_: &dyn Driver| -> PageResult<Probe<()>> { Err(PageError::Driver("boom".into())) })
            .unwrap_err();
        assert!(matches!(err, PageError::Driver(_)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn shared_start_shortens_the_deadline() {
        let driver = MockDriver::new();
        let start = Instant::now() - Duration::from_millis(150);
        let begun = Instant::now();
        let outcome = Waiter::new(&driver, &fast())
            .starting_at(start)
            .reraise(false)
            .until(conditions::all_present(Locator::id("ghost")))
            .unwrap();
        assert!(outcome.is_timed_out());
        assert!(begun.elapsed() < Duration::from_millis(150));
    }
}
