//! Caller-side retry of transient store failures.
//!
//! The ledger and pricing engine never retry on their own. A caller that wants
//! to resubmit a request after [`market::ExchangeError::TransientStore`] wraps the call
//! in [`retry_transient`].

use log::warn;
use market::Result;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(50),
            factor: 2.0,
            max: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let max = max.as_secs_f64();
                let seconds = base.as_secs_f64() * factor.powi(attempt as i32);
                // A NaN or negative factor must not reach `from_secs_f64`.
                let seconds = if seconds.is_nan() {
                    max
                } else {
                    seconds.clamp(0.0, max)
                };
                let delay = Duration::from_secs_f64(seconds);
                if !jitter {
                    return delay;
                }
                let spread = delay.as_millis() as u64 / 2;
                let offset = rand::thread_rng().gen_range(0..=spread * 2);
                Duration::from_millis(delay.as_millis() as u64 - spread + offset)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }
}

/// Runs `op`, retrying while it fails with a retryable error and attempts
/// remain. Other errors are returned at once.
pub fn retry_transient<T>(policy: RetryPolicy, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.backoff.delay(attempt);
                warn!(
                    "Attempt {} failed ({err}), retrying in {}ms",
                    attempt + 1,
                    delay.as_millis()
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market::{ExchangeError, StoreError};
    use std::cell::Cell;

    fn unavailable() -> ExchangeError {
        StoreError::Unavailable("disk".into()).into()
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_millis(500),
            jitter: false,
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(5), Duration::from_millis(500));
    }

    #[test]
    fn test_odd_factors_stay_in_range() {
        let negative = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: -2.0,
            max: Duration::from_millis(500),
            jitter: false,
        };
        assert_eq!(negative.delay(1), Duration::ZERO);
        assert_eq!(negative.delay(2), Duration::from_millis(400));

        let nan = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: f64::NAN,
            max: Duration::from_millis(500),
            jitter: true,
        };
        assert!(nan.delay(3) <= Duration::from_millis(750));
    }

    #[test]
    fn test_jitter_stays_within_half() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 1.0,
            max: Duration::from_secs(1),
            jitter: true,
        };
        for _ in 0..100 {
            let d = backoff.delay(0).as_millis();
            assert!((50..=150).contains(&d));
        }
    }

    #[test]
    fn test_retries_transient_until_success() {
        let calls = Cell::new(0);
        let out = retry_transient(RetryPolicy::fixed(Duration::ZERO, 3), || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(unavailable())
            } else {
                Ok(7)
            }
        });
        assert_eq!(out, Ok(7));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let calls = Cell::new(0);
        let out: Result<()> = retry_transient(RetryPolicy::fixed(Duration::ZERO, 2), || {
            calls.set(calls.get() + 1);
            Err(unavailable())
        });
        assert!(out.unwrap_err().is_retryable());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_domain_errors_are_not_retried() {
        let calls = Cell::new(0);
        let out: Result<()> = retry_transient(RetryPolicy::fixed(Duration::ZERO, 5), || {
            calls.set(calls.get() + 1);
            Err(ExchangeError::InsufficientFunds {
                required: 2.0,
                available: 1.0,
            })
        });
        assert!(out.is_err());
        assert_eq!(calls.get(), 1);
    }
}
