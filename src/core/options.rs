//! Reader options and retry policy validation.
//!
//! Options are plain data with eager validation: misuse is rejected when the
//! reader is constructed, before any background task starts. The refresh
//! interval additionally has a floor so a misconfigured-but-positive value
//! cannot hot-loop against the store.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{TidelineError, TidelineResult};

/// Lowest refresh interval the engine will run at. Positive intervals below
/// the floor are clamped up to it.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Retry and timeout policy for store operations.
///
/// One logical operation gets at most `max_attempts` tries inside a single
/// `op_timeout` budget. Delays between attempts grow exponentially from
/// `base_delay`, clamped at `max_delay`, with randomized jitter so many
/// clients recovering together do not retry in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum attempts per logical operation, first try included.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,

    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,

    /// Whether to randomize each delay within [0.85, 1.15).
    pub jitter: bool,

    /// Hard ceiling per logical operation, all retries included.
    pub op_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(10),
            jitter: true,
            op_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Validate the policy.
    pub fn validate(&self) -> TidelineResult<()> {
        if self.max_attempts == 0 {
            return Err(TidelineError::invalid_options(
                "retry max_attempts must be at least 1",
            ));
        }
        if self.base_delay.is_zero() {
            return Err(TidelineError::invalid_options(
                "retry base_delay must be positive",
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(TidelineError::invalid_options(
                "retry backoff_multiplier must be at least 1.0",
            ));
        }
        if self.max_delay < self.base_delay {
            return Err(TidelineError::invalid_options(
                "retry max_delay must not be below base_delay",
            ));
        }
        if self.op_timeout.is_zero() {
            return Err(TidelineError::invalid_options(
                "retry op_timeout must be positive",
            ));
        }
        Ok(())
    }
}

/// Options for constructing a [`crate::ConfigReader`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderOptions {
    /// Application whose entries this reader serves.
    pub application: String,

    /// Interval between delta refresh cycles. Must be positive; values
    /// below [`MIN_REFRESH_INTERVAL`] are clamped up to it.
    pub refresh_interval: Duration,

    /// When set, every n-th refresh cycle performs a full reload instead of
    /// a delta. A full reload is the only way the cache observes entries
    /// that were deactivated or renamed since the last full load.
    pub resync_after_ticks: Option<u32>,

    /// Resilience policy wrapped around every store operation.
    pub retry: RetryPolicy,
}

impl ReaderOptions {
    /// Options for the given application with default interval and policy.
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            refresh_interval: Duration::from_secs(30),
            resync_after_ticks: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Same options with a different refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Same options with a periodic full resync every `ticks` cycles.
    pub fn with_resync_after_ticks(mut self, ticks: u32) -> Self {
        self.resync_after_ticks = Some(ticks);
        self
    }

    /// Same options with a different retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The refresh interval the engine actually runs at.
    pub fn effective_interval(&self) -> Duration {
        self.refresh_interval.max(MIN_REFRESH_INTERVAL)
    }

    /// Validate the options.
    pub fn validate(&self) -> TidelineResult<()> {
        if self.application.trim().is_empty() {
            return Err(TidelineError::invalid_options("application is required"));
        }
        if self.refresh_interval.is_zero() {
            return Err(TidelineError::invalid_options(
                "refresh_interval must be positive",
            ));
        }
        if self.resync_after_ticks == Some(0) {
            return Err(TidelineError::invalid_options(
                "resync_after_ticks must be at least 1 when set",
            ));
        }
        self.retry.validate()
    }
}
