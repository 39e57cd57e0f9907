//! Retry/timeout decorator over any store.
//!
//! `ResilientStore` implements the same [`ConfigStore`] contract as the
//! store it wraps, executing every operation under a
//! [`RetryPolicy`]: bounded attempts with exponential backoff and
//! randomized jitter, all inside one hard time budget. Errors whose
//! [`is_retriable`](crate::TidelineError::is_retriable) is false, such as
//! cancellation and uniqueness violations, propagate after exactly one
//! attempt. A failure is always surfaced to the caller; the wrapper never
//! converts it into an empty success.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::entry::{ConfigEntry, EntryId};
use crate::core::error::{TidelineError, TidelineResult};
use crate::core::options::RetryPolicy;
use crate::store::ConfigStore;

/// [`ConfigStore`] decorator applying a [`RetryPolicy`] to every operation.
#[derive(Debug)]
pub struct ResilientStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: ConfigStore> ResilientStore<S> {
    /// Wrap a store with the given policy. The policy is validated eagerly.
    pub fn new(inner: S, policy: RetryPolicy) -> TidelineResult<Self> {
        policy.validate()?;
        Ok(Self { inner, policy })
    }

    /// The active policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Run one logical operation under the policy: bounded attempts inside
    /// a single time budget covering all of them.
    async fn execute<T, F, Fut>(&self, operation: &'static str, attempt: F) -> TidelineResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = TidelineResult<T>>,
    {
        let budget = self.policy.op_timeout;
        match tokio::time::timeout(budget, self.run_attempts(operation, attempt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    budget_ms = budget.as_millis() as u64,
                    "store operation exceeded its time budget"
                );
                Err(TidelineError::timeout(operation, budget))
            }
        }
    }

    async fn run_attempts<T, F, Fut>(&self, operation: &'static str, attempt: F) -> TidelineResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = TidelineResult<T>>,
    {
        let mut delay = self.policy.base_delay;

        for n in 1..=self.policy.max_attempts {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retriable() => return Err(err),
                Err(err) if n == self.policy.max_attempts => {
                    tracing::warn!(
                        operation,
                        attempts = n,
                        error = %err,
                        "store operation failed; retries exhausted"
                    );
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(
                        operation,
                        attempt = n,
                        error = %err,
                        "store operation failed; retrying"
                    );
                    tokio::time::sleep(jittered(delay, self.policy.jitter)).await;
                    delay = next_delay(delay, &self.policy);
                }
            }
        }

        Err(TidelineError::internal(format!(
            "{} exited the retry loop without a result",
            operation
        )))
    }
}

/// Next backoff delay: scaled by the multiplier, clamped at the policy cap.
fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    current
        .mul_f64(policy.backoff_multiplier)
        .min(policy.max_delay)
}

/// Randomize a delay within [0.85, 1.15) so many clients recovering from
/// the same outage do not retry in lockstep.
fn jittered(delay: Duration, jitter: bool) -> Duration {
    if !jitter {
        return delay;
    }
    let factor = rand::random::<f64>() * 0.3 + 0.85;
    delay.mul_f64(factor)
}

#[async_trait]
impl<S: ConfigStore> ConfigStore for ResilientStore<S> {
    async fn active_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        self.execute("active_entries", || self.inner.active_entries(application))
            .await
    }

    async fn all_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        self.execute("all_entries", || self.inner.all_entries(application))
            .await
    }

    async fn active_entries_updated_since(
        &self,
        application: &str,
        since: DateTime<Utc>,
    ) -> TidelineResult<Vec<ConfigEntry>> {
        self.execute("active_entries_updated_since", || {
            self.inner.active_entries_updated_since(application, since)
        })
        .await
    }

    async fn create(&self, entry: ConfigEntry) -> TidelineResult<ConfigEntry> {
        self.execute("create", || self.inner.create(entry.clone()))
            .await
    }

    async fn update(
        &self,
        id: &EntryId,
        application: &str,
        entry: ConfigEntry,
    ) -> TidelineResult<Option<ConfigEntry>> {
        self.execute("update", || {
            self.inner.update(id, application, entry.clone())
        })
        .await
    }

    async fn set_active(
        &self,
        id: &EntryId,
        application: &str,
        active: bool,
    ) -> TidelineResult<bool> {
        self.execute("set_active", || {
            self.inner.set_active(id, application, active)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_scales_and_clamps() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(3),
            ..RetryPolicy::default()
        };

        let second = next_delay(Duration::from_secs(1), &policy);
        assert_eq!(second, Duration::from_secs(2));

        let third = next_delay(second, &policy);
        assert_eq!(third, Duration::from_secs(3));

        let capped = next_delay(third, &policy);
        assert_eq!(capped, Duration::from_secs(3));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let delay = Duration::from_secs(10);
        for _ in 0..100 {
            let j = jittered(delay, true);
            assert!(j >= Duration::from_millis(8_500));
            assert!(j < Duration::from_millis(11_500));
        }
    }

    #[test]
    fn test_jitter_disabled_is_identity() {
        let delay = Duration::from_millis(250);
        assert_eq!(jittered(delay, false), delay);
    }
}
