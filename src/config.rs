use crate::connection::config::AdminConfig;
use crate::core::{DEFAULT_SET_NAME, REMOVED_MEMBER_STATE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay between bootstrap attempts. Attempts are never capped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before the second attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for any delay, in milliseconds.
    pub max_backoff_ms: u64,
    /// Growth factor per attempt; 1 keeps the delay fixed.
    pub multiplier: u32,
}

impl RetryPolicy {
    /// Same delay before every retry.
    pub fn fixed(delay: Duration) -> Self {
        let ms = delay.as_millis() as u64;
        Self {
            initial_backoff_ms: ms,
            max_backoff_ms: ms,
            multiplier: 1,
        }
    }

    /// Doubling delay starting at `initial`, capped at `max`.
    pub fn capped_exponential(initial: Duration, max: Duration) -> Self {
        Self {
            initial_backoff_ms: initial.as_millis() as u64,
            max_backoff_ms: max.as_millis() as u64,
            multiplier: 2,
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff_ms;
        let max = self.max_backoff_ms.max(base);
        let factor = (self.multiplier.max(1) as u64).saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(base.saturating_mul(factor).min(max))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(5))
    }
}

/// Controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Host names to discover nodes from
    pub hostnames: Vec<String>,

    /// Keep reconciling membership after bootstrap
    pub watch: bool,

    /// Replica set name written into every config
    pub set_name: String,

    /// Member state code treated as removed/down
    pub removed_state: i32,

    /// Delay policy between bootstrap attempts
    pub retry: RetryPolicy,

    /// Idle time between watch passes
    pub watch_interval: Duration,

    /// Admin interface settings
    pub admin: AdminConfig,
}

impl ControllerConfig {
    pub fn new<I, S>(hostnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hostnames: hostnames.into_iter().map(Into::into).collect(),
            watch: false,
            set_name: DEFAULT_SET_NAME.to_string(),
            removed_state: REMOVED_MEMBER_STATE,
            retry: RetryPolicy::default(),
            watch_interval: Duration::from_secs(5),
            admin: AdminConfig::default(),
        }
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn set_name(mut self, name: &str) -> Self {
        self.set_name = name.to_string();
        self
    }

    pub fn removed_state(mut self, state: i32) -> Self {
        self.removed_state = state;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    pub fn admin(mut self, admin: AdminConfig) -> Self {
        self.admin = admin;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.hostnames.is_empty() {
            return Err("at least one host name is required".to_string());
        }

        if self.hostnames.iter().any(|host| host.trim().is_empty()) {
            return Err("host names cannot be empty".to_string());
        }

        if self.set_name.trim().is_empty() {
            return Err("set_name cannot be empty".to_string());
        }

        if self.watch_interval.is_zero() {
            return Err("watch_interval must be > 0".to_string());
        }

        self.admin.validate()
    }
}
