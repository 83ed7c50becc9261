// src/judge/backoff.rs — Backoff computation for judge retries
//
// Pure functions so the policy is testable without any network calls.
// Delay for attempt n is min(ceiling, 2^n) seconds, scaled by jitter.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub ceiling: Duration,
    pub jitter_fraction: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            ceiling: Duration::from_secs(60),
            jitter_fraction: 0.3,
        }
    }
}

/// Capped exponential backoff with jitter for a given retry attempt
/// (0-indexed).
pub fn backoff_delay(attempt: u32, config: &BackoffConfig) -> Duration {
    let base_secs = 2f64.powi(attempt.min(30) as i32);
    let capped_secs = base_secs.min(config.ceiling.as_secs_f64());

    let jitter = deterministic_jitter(attempt, config.jitter_fraction);
    let final_secs = (capped_secs * jitter).max(0.1);

    Duration::from_secs_f64(final_secs)
}

/// Deterministic jitter for a given attempt to keep retries reproducible in
/// tests. Returns a multiplier in [1 - fraction, 1 + fraction].
fn deterministic_jitter(attempt: u32, fraction: f64) -> f64 {
    let hash = (attempt.wrapping_mul(2654435761)) as f64 / u32::MAX as f64; // 0.0..1.0
    1.0 + fraction * (2.0 * hash - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_exponentially() {
        let cfg = BackoffConfig::default();
        let d0 = backoff_delay(0, &cfg);
        let d1 = backoff_delay(1, &cfg);
        let d2 = backoff_delay(2, &cfg);

        // d0 ≈ 1s, d1 ≈ 2s, d2 ≈ 4s, within jitter bounds
        assert!(d0.as_secs_f64() >= 0.7 && d0.as_secs_f64() <= 1.3);
        assert!(d1.as_secs_f64() >= 1.4 && d1.as_secs_f64() <= 2.6);
        assert!(d2.as_secs_f64() >= 2.8 && d2.as_secs_f64() <= 5.2);
    }

    #[test]
    fn test_backoff_capped_at_ceiling() {
        let cfg = BackoffConfig::default();
        // 2^10 = 1024s but ceiling is 60s (plus jitter margin)
        let d = backoff_delay(10, &cfg);
        assert!(d.as_secs_f64() <= 60.0 * 1.3 + 0.001);
    }

    #[test]
    fn test_backoff_huge_attempt_does_not_overflow() {
        let cfg = BackoffConfig::default();
        let d = backoff_delay(u32::MAX, &cfg);
        assert!(d.as_secs_f64() <= 60.0 * 1.3 + 0.001);
    }

    #[test]
    fn test_jitter_range() {
        for attempt in 0..20 {
            let j = deterministic_jitter(attempt, 0.3);
            assert!(
                (0.7..=1.3).contains(&j),
                "jitter {} out of range for attempt {}",
                j,
                attempt
            );
        }
    }

    #[test]
    fn test_jitter_reproducible() {
        assert_eq!(
            deterministic_jitter(5, 0.3),
            deterministic_jitter(5, 0.3)
        );
    }

    #[test]
    fn test_zero_jitter_exact() {
        let cfg = BackoffConfig {
            ceiling: Duration::from_secs(60),
            jitter_fraction: 0.0,
        };
        assert_eq!(backoff_delay(3, &cfg), Duration::from_secs(8));
    }
}
