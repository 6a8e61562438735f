//! Response classification and backoff policy.
//!
//! Every response (or transport failure) resolves to a [`Disposition`]:
//! accept the page, wait and retry the identical request, or abort the run.
//! Per logical request the engine walks a small state machine — pending,
//! retry-pending, accepted, fatal — bounded by the attempt ceiling.

use std::time::Duration;

use crate::http::{HttpError, HttpResponse};

/// Total attempts allowed per logical request, the first included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;

/// Mandated wait after a 429. The API does not reliably surface a numeric
/// `Retry-After` header, so a constant is used instead of reading one.
pub const RATE_LIMIT_WAIT: Duration = Duration::from_secs(2);

/// Outcome of classifying one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Success; hand the body to record extraction.
    Accept,
    /// Transient failure; sleep for `after`, then re-issue the same request.
    Retry { after: Duration },
    /// Failure that will not resolve by retrying; abort extraction.
    Fatal { reason: String },
}

/// Delay schedule between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally with ±50% jitter.
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
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(60),
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
                let scale = factor.powi(attempt as i32);
                let capped = (base.as_secs_f64() * scale).min(max.as_secs_f64());
                let mut delay = Duration::from_secs_f64(capped);

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms = delay.as_millis() as i64 + (offset as i64 - jitter_ms as i64);
                    delay = Duration::from_millis(total_ms.max(0) as u64);
                }

                delay
            }
        }
    }
}

/// Retry rules for one logical request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempt ceiling; reaching it on a retryable failure escalates.
    pub max_attempts: u32,
    /// Fixed wait after a 429. Counts against the same attempt budget.
    pub rate_limit_wait: Duration,
    /// Schedule for server errors and transport failures.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_wait: RATE_LIMIT_WAIT,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    /// Classify a response received on attempt number `attempt` (1-based).
    pub fn classify(&self, response: &HttpResponse, attempt: u32) -> Disposition {
        match response.status {
            429 => Disposition::Retry {
                after: self.rate_limit_wait,
            },
            status @ 400..=499 => Disposition::Fatal {
                reason: format!("{} Client Error: {}", status, response.reason),
            },
            500..=599 => Disposition::Retry {
                after: self.backoff.delay(attempt.saturating_sub(1)),
            },
            200..=399 => Disposition::Accept,
            status => Disposition::Fatal {
                reason: format!("{status} Unexpected Status"),
            },
        }
    }

    /// Classify a transport failure received on attempt number `attempt`.
    pub fn classify_transport(&self, error: &HttpError, attempt: u32) -> Disposition {
        if error.retryable() {
            Disposition::Retry {
                after: self.backoff.delay(attempt.saturating_sub(1)),
            }
        } else {
            Disposition::Fatal {
                reason: format!("transport failure: {}", error.message()),
            }
        }
    }

    pub const fn attempts_remaining(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_without_jitter() -> RetryPolicy {
        RetryPolicy {
            backoff: Backoff::Exponential {
                base: Duration::from_secs(1),
                factor: 2.0,
                max: Duration::from_secs(60),
                jitter: false,
            },
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn rate_limit_gets_fixed_two_second_wait() {
        let policy = RetryPolicy::default();
        let response = HttpResponse::new(429, "");

        for attempt in [1, 5, 14] {
            assert_eq!(
                policy.classify(&response, attempt),
                Disposition::Retry {
                    after: Duration::from_secs(2)
                }
            );
        }
    }

    #[test]
    fn client_errors_are_fatal_without_retry() {
        let policy = RetryPolicy::default();

        for status in [400, 401, 403, 404, 499] {
            let disposition = policy.classify(&HttpResponse::new(status, ""), 1);
            assert!(
                matches!(disposition, Disposition::Fatal { .. }),
                "status {status} must be fatal"
            );
        }
    }

    #[test]
    fn server_errors_retry_on_backoff_schedule() {
        let policy = policy_without_jitter();

        assert_eq!(
            policy.classify(&HttpResponse::new(500, ""), 1),
            Disposition::Retry {
                after: Duration::from_secs(1)
            }
        );
        assert_eq!(
            policy.classify(&HttpResponse::new(503, ""), 3),
            Disposition::Retry {
                after: Duration::from_secs(4)
            }
        );
    }

    #[test]
    fn success_and_redirect_statuses_are_accepted() {
        let policy = RetryPolicy::default();

        for status in [200, 201, 204, 301, 399] {
            assert_eq!(
                policy.classify(&HttpResponse::new(status, "{}"), 1),
                Disposition::Accept
            );
        }
    }

    #[test]
    fn fatal_reason_carries_status_and_phrase() {
        let policy = RetryPolicy::default();
        let Disposition::Fatal { reason } = policy.classify(&HttpResponse::new(401, ""), 1) else {
            panic!("401 must be fatal");
        };
        assert_eq!(reason, "401 Client Error: Unauthorized");
    }

    #[test]
    fn exponential_backoff_is_capped() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(60),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_secs(1));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
        assert_eq!(backoff.delay(10), Duration::from_secs(60));
    }

    #[test]
    fn jittered_backoff_stays_within_half_to_threehalves() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(60),
            jitter: true,
        };

        for _ in 0..20 {
            let delay_ms = backoff.delay(2).as_millis() as f64;
            assert!(delay_ms >= 4_000.0 * 0.49, "delay_ms={delay_ms}");
            assert!(delay_ms <= 4_000.0 * 1.51, "delay_ms={delay_ms}");
        }
    }

    #[test]
    fn retryable_transport_errors_follow_backoff() {
        let policy = policy_without_jitter();
        let error = HttpError::new("request timeout");

        assert_eq!(
            policy.classify_transport(&error, 2),
            Disposition::Retry {
                after: Duration::from_secs(2)
            }
        );
        assert!(matches!(
            policy.classify_transport(&HttpError::non_retryable("bad tls config"), 1),
            Disposition::Fatal { .. }
        ));
    }

    #[test]
    fn attempt_ceiling_defaults_to_fifteen() {
        let policy = RetryPolicy::default();
        assert!(policy.attempts_remaining(14));
        assert!(!policy.attempts_remaining(15));
    }
}
