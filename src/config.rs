use std::sync::OnceLock;
use std::time::Duration;

use log::warn;

pub const TIMEOUT_ENV: &str = "PAGEOBJECT_TIMEOUT";
pub const INTERVAL_ENV: &str = "PAGEOBJECT_POLL_INTERVAL_MS";
pub const RERAISE_ENV: &str = "PAGEOBJECT_RERAISE";

/// Timeout, polling interval and timeout policy for explicit waits.
///
/// Every `Page`, `Element` and `Elements` carries one. By default that is the
/// process-wide snapshot from [`WaitPolicy::global`]; pass your own with
/// `with_policy` to isolate a suite from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// How long a wait polls before it gives up.
    pub timeout: Duration,
    /// Time between two evaluations of the condition.
    pub interval: Duration,
    /// `true`: a timed out wait is an error. `false`: it reports `TimedOut`.
    pub reraise: bool,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy {
            timeout: Duration::from_secs(30),
            interval: Duration::from_millis(500),
            reraise: true,
        }
    }
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration, reraise: bool) -> Self {
        WaitPolicy {
            timeout,
            interval,
            reraise,
        }
    }

    /// The policy read from the environment on first use.
    ///
    /// Later changes to the environment are not observed.
    pub fn global() -> WaitPolicy {
        static GLOBAL: OnceLock<WaitPolicy> = OnceLock::new();
        *GLOBAL.get_or_init(|| WaitPolicy::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Build a policy from `lookup`, falling back to the defaults for missing
    /// or invalid entries.
    pub fn from_lookup<F>(lookup: F) -> WaitPolicy
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut policy = WaitPolicy::default();
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match parse_seconds(&raw) {
                Some(timeout) => policy.timeout = timeout,
                None => warn!("ignoring {}={:?}: expected a number of seconds", TIMEOUT_ENV, raw),
            }
        }
        if let Some(raw) = lookup(INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => policy.interval = Duration::from_millis(ms),
                _ => warn!("ignoring {}={:?}: expected milliseconds > 0", INTERVAL_ENV, raw),
            }
        }
        if let Some(raw) = lookup(RERAISE_ENV) {
            match parse_bool(&raw) {
                Some(reraise) => policy.reraise = reraise,
                None => warn!("ignoring {}={:?}: expected true or false", RERAISE_ENV, raw),
            }
        }
        policy
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_reraise(mut self, reraise: bool) -> Self {
        self.reraise = reraise;
        self
    }
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn policy_from(pairs: &[(&str, &str)]) -> WaitPolicy {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        WaitPolicy::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(policy_from(&[]), WaitPolicy::default());
        assert_eq!(WaitPolicy::default().timeout, Duration::from_secs(30));
        assert!(WaitPolicy::default().reraise);
    }

    #[test]
    fn reads_all_three_settings() {
        let policy = policy_from(&[
            (TIMEOUT_ENV, "2.5"),
            (INTERVAL_ENV, "100"),
            (RERAISE_ENV, "no"),
        ]);
        assert_eq!(policy.timeout, Duration::from_millis(2500));
        assert_eq!(policy.interval, Duration::from_millis(100));
        assert!(!policy.reraise);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let policy = policy_from(&[
            (TIMEOUT_ENV, "-1"),
            (INTERVAL_ENV, "0"),
            (RERAISE_ENV, "maybe"),
        ]);
        assert_eq!(policy, WaitPolicy::default());
    }
}
