//! Bounded retry with a randomized, widening backoff.
//!
//! Remote registries tend to throttle bursts of publishes coming from parallel
//! CI jobs. The executor therefore waits a random interval before *every*
//! attempt, the first one included, and grows that interval after each failure
//! by adding a fresh random increment. The growth is additive, not
//! multiplicative.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Largest upper bound accepted for a single backoff range.
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// A random interval `[min, min + span)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffRange {
    pub min: Duration,
    pub span: Duration,
}

impl BackoffRange {
    pub const fn new(min: Duration, span: Duration) -> Self {
        Self { min, span }
    }

    pub const fn from_secs(min: u64, span: u64) -> Self {
        Self::new(Duration::from_secs(min), Duration::from_secs(span))
    }

    /// A range that always yields zero.
    pub const fn zero() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Exclusive upper bound of the range, saturating at `Duration::MAX`.
    pub fn upper(&self) -> Duration {
        self.min.saturating_add(self.span)
    }

    /// Draws a duration uniformly, at millisecond resolution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let span_ms = u64::try_from(self.span.as_millis()).unwrap_or(u64::MAX);
        if span_ms == 0 {
            return self.min;
        }
        self.min
            .saturating_add(Duration::from_millis(rng.gen_range(0..span_ms)))
    }

    fn validate(&self, name: &str) -> Result<()> {
        match self.min.checked_add(self.span) {
            Some(upper) if upper <= MAX_BACKOFF => Ok(()),
            _ => Err(Error::InvalidRetryPolicy(format!(
                "{} must stay within {:?}",
                name, MAX_BACKOFF
            ))),
        }
    }
}

/// Attempt budget and backoff shape for one retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Range the first wait is drawn from.
    pub initial_backoff: BackoffRange,
    /// Range each increment added to the wait after a failure is drawn from.
    pub backoff_growth: BackoffRange,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_backoff: BackoffRange::from_secs(1, 9),
            backoff_growth: BackoffRange::from_secs(1, 19),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// A policy that never waits. Mostly useful in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: BackoffRange::zero(),
            backoff_growth: BackoffRange::zero(),
        }
    }

    pub fn with_initial_backoff(mut self, range: BackoffRange) -> Self {
        self.initial_backoff = range;
        self
    }

    pub fn with_backoff_growth(mut self, range: BackoffRange) -> Self {
        self.backoff_growth = range;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        self.initial_backoff.validate("initial_backoff")?;
        self.backoff_growth.validate("backoff_growth")
    }
}

/// Attempt counter and current wait of one retried call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    interval: Duration,
}

impl RetryState {
    fn start<R: Rng + ?Sized>(policy: &RetryPolicy, rng: &mut R) -> Self {
        Self {
            attempt: 1,
            interval: policy.initial_backoff.sample(rng),
        }
    }

    fn advance<R: Rng + ?Sized>(&mut self, policy: &RetryPolicy, rng: &mut R) {
        self.attempt += 1;
        self.interval = self
            .interval
            .saturating_add(policy.backoff_growth.sample(rng));
    }

    #[inline]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Suspends the retrying flow between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Re-invokes a flaky operation until it succeeds or the budget runs out.
///
/// The operation must be safe to run more than once; nothing here deduplicates
/// side effects of a failed attempt.
pub struct Retrier<R = StdRng, S = TokioSleeper> {
    policy: RetryPolicy,
    rng: R,
    sleeper: S,
    cancel: Option<CancellationToken>,
    label: String,
}

impl Retrier {
    /// Creates a retrier seeded from system entropy and sleeping on the tokio timer.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy allows no attempt at all.
    pub fn new(policy: RetryPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            rng: StdRng::from_entropy(),
            sleeper: TokioSleeper,
            cancel: None,
            label: "operation".to_string(),
        })
    }
}

impl<R: Rng, S: Sleeper> Retrier<R, S> {
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Retrier<R2, S> {
        Retrier {
            policy: self.policy,
            rng,
            sleeper: self.sleeper,
            cancel: self.cancel,
            label: self.label,
        }
    }

    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Retrier<R, S2> {
        Retrier {
            policy: self.policy,
            rng: self.rng,
            sleeper,
            cancel: self.cancel,
            label: self.label,
        }
    }

    /// Stops retrying once `token` is cancelled, including mid-wait.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Name of the operation used in log messages.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Runs `operation` under the retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetryExhausted`] wrapping the last failure once
    /// `max_attempts` invocations all failed, or [`Error::Cancelled`] if the
    /// cancellation token fired first.
    pub async fn run<F, Fut, T>(&mut self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.policy.max_attempts;
        let mut state = RetryState::start(&self.policy, &mut self.rng);

        loop {
            self.wait(state.interval()).await?;

            debug!(
                attempt = state.attempt(),
                max_attempts,
                "Running {}", self.label
            );
            match operation().await {
                Ok(value) => {
                    if state.attempt() > 1 {
                        info!(
                            "{} succeeded after {} attempts",
                            self.label,
                            state.attempt()
                        );
                    }
                    return Ok(value);
                }
                Err(e) if state.attempt() >= max_attempts => {
                    return Err(Error::RetryExhausted {
                        attempts: state.attempt(),
                        last_error: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "Attempt {}/{}: {} failed, retrying...",
                        state.attempt(),
                        max_attempts,
                        self.label
                    );
                    state.advance(&self.policy, &mut self.rng);
                }
            }
        }
    }

    async fn wait(&self, interval: Duration) -> Result<()> {
        let Some(token) = &self.cancel else {
            self.sleeper.sleep(interval).await;
            return Ok(());
        };

        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            _ = token.cancelled() => Err(Error::Cancelled),
            _ = self.sleeper.sleep(interval) => Ok(()),
        }
    }
}

/// Runs `operation` under `policy` with the default random source and timer.
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retrier = Retrier::new(policy)?;
    retrier.run(operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_sample_stays_in_range() {
        let range = BackoffRange::from_secs(1, 9);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let d = range.sample(&mut rng);
            assert!(d >= range.min && d < range.upper(), "{:?} out of range", d);
        }
    }

    #[test]
    fn test_sample_zero_span_is_min() {
        let range = BackoffRange::new(Duration::from_millis(250), Duration::ZERO);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(range.sample(&mut rng), Duration::from_millis(250));
    }

    #[test]
    fn test_state_grows_by_growth_increment() {
        let policy = RetryPolicy::new(3)
            .with_initial_backoff(BackoffRange::from_secs(2, 5))
            .with_backoff_growth(BackoffRange::from_secs(3, 7));
        let mut rng = StepRng::new(0, 0);

        let mut state = RetryState::start(&policy, &mut rng);
        assert_eq!(state.attempt(), 1);
        assert_eq!(state.interval(), Duration::from_secs(2));

        state.advance(&policy, &mut rng);
        assert_eq!(state.attempt(), 2);
        assert_eq!(state.interval(), Duration::from_secs(5));

        state.advance(&policy, &mut rng);
        assert_eq!(state.interval(), Duration::from_secs(8));
    }

    #[test]
    fn test_state_growth_saturates() {
        let policy = RetryPolicy::new(3)
            .with_initial_backoff(BackoffRange::new(Duration::MAX, Duration::ZERO))
            .with_backoff_growth(BackoffRange::new(Duration::MAX, Duration::from_secs(5)));
        let mut rng = StdRng::seed_from_u64(3);

        let mut state = RetryState::start(&policy, &mut rng);
        state.advance(&policy, &mut rng);
        assert_eq!(state.interval(), Duration::MAX);
        assert_eq!(policy.backoff_growth.upper(), Duration::MAX);
    }

    #[test]
    fn test_huge_span_samples_without_truncation() {
        // 18_446_744_073_709_552_000ms, which wraps to 384ms when truncated to u64.
        let range = BackoffRange::new(Duration::ZERO, Duration::from_secs(18_446_744_073_709_552));
        let mut rng = StdRng::seed_from_u64(11);
        let samples: Vec<Duration> = (0..16).map(|_| range.sample(&mut rng)).collect();
        assert!(samples.iter().any(|d| *d > Duration::from_secs(1_000_000)));
    }

    #[test]
    fn test_oversized_ranges_rejected() {
        let huge = BackoffRange::new(Duration::from_secs(u64::MAX), Duration::from_secs(1));
        assert!(RetryPolicy::new(3).with_initial_backoff(huge).validate().is_err());
        assert!(RetryPolicy::new(3).with_backoff_growth(huge).validate().is_err());

        let past_cap = BackoffRange::new(MAX_BACKOFF, Duration::from_secs(1));
        assert!(RetryPolicy::new(3).with_backoff_growth(past_cap).validate().is_err());

        let at_cap = BackoffRange::new(MAX_BACKOFF - Duration::from_secs(1), Duration::from_secs(1));
        assert!(RetryPolicy::new(3).with_backoff_growth(at_cap).validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(RetryPolicy::immediate(0).validate().is_err());
        assert!(Retrier::new(RetryPolicy::immediate(0)).is_err());
        assert!(RetryPolicy::default().validate().is_ok());
    }
}
