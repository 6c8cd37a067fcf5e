use std::{fmt, time::Duration};

use rand::Rng;

/// Strategy computing the delay before retry attempt `attempt` (0-based).
///
/// Pure apart from the jitter RNG. No maximum-delay cap is applied here;
/// callers needing one must clamp the result themselves.
pub trait Backoff: fmt::Debug + Send + Sync {
    fn next_delay(&self, attempt: u32) -> Duration;
}

/// Flat delay plus uniform jitter.
#[derive(Debug, Clone)]
pub struct ConstantBackoff {
    pub base: Duration,
    pub jitter: Duration,
}

impl ConstantBackoff {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }
}

impl Backoff for ConstantBackoff {
    fn next_delay(&self, _attempt: u32) -> Duration {
        self.base + jitter_within(self.jitter)
    }
}

/// `base * multiplier^attempt` plus uniform jitter.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub multiplier: f64,
    pub jitter: Duration,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, multiplier: f64, jitter: Duration) -> Self {
        Self {
            base,
            multiplier,
            jitter,
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            multiplier: 2.0,
            jitter: Duration::from_millis(50),
        }
    }
}

impl Backoff for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Duration {
        let scaled = self.base.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.max(0.0)) + jitter_within(self.jitter)
    }
}

fn jitter_within(jitter: Duration) -> Duration {
    if jitter.is_zero() {
        return Duration::ZERO;
    }
    jitter.mul_f64(rand::thread_rng().gen_range(0.0..1.0))
}
