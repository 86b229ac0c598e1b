//! Bounded readiness polling with jittered backoff and a hard deadline.

use crate::error::{BlitzError, Result};
use rand::Rng;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct Poll {
    /// Delay before the second check.
    pub interval: Duration,
    /// Upper bound for the delay after backoff is applied.
    pub max_interval: Duration,
    /// Growth factor per attempt; 1.0 keeps the interval fixed.
    pub multiplier: f64,
    /// Each delay is scaled by a random factor in `[1 - jitter, 1 + jitter]`.
    pub jitter: f64,
    /// The check is never retried after this much time has passed.
    pub timeout: Duration,
}

impl Poll {
    /// A fixed interval with light jitter.
    pub fn fixed(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            max_interval: interval,
            multiplier: 1.0,
            jitter: 0.1,
            timeout,
        }
    }

    /// Exponential backoff starting at `interval`, capped at `max_interval`.
    pub fn backoff(interval: Duration, max_interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            max_interval,
            multiplier: 2.0,
            jitter: 0.2,
            timeout,
        }
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Call `check` until it returns true or the deadline passes.
    ///
    /// Sleeps are clamped to the time left before the deadline, so a check that
    /// never succeeds fails no earlier than `timeout` and no later than
    /// `timeout` plus one interval. Returns the elapsed time on success.
    pub fn until<F>(&self, what: &str, mut check: F) -> Result<Duration>
    where
        F: FnMut() -> bool,
    {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut delay = self.interval;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if check() {
                tracing::debug!("{what} ready after {attempts} attempt(s)");
                return Ok(start.elapsed());
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!("gave up waiting for {what} after {attempts} attempt(s)");
                return Err(BlitzError::Timeout {
                    what: what.to_string(),
                    after: now - start,
                });
            }

            std::thread::sleep(self.jittered(delay).min(deadline - now));
            delay = delay.mul_f64(self.multiplier).min(self.max_interval);
        }
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let factor = rand::thread_rng().gen_range(1.0 - self.jitter..=1.0 + self.jitter);
        delay.mul_f64(factor)
    }
}
