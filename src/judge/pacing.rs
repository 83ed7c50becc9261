// src/judge/pacing.rs — Adaptive inter-request delay
//
// Tracks the last N request outcomes and stretches the pause between judge
// calls as the error rate climbs: additive congestion avoidance against the
// remote rate limiter. Zero errors shrinks the delay to the floor; a mostly-
// failing window grows it linearly toward the ceiling.

use std::collections::VecDeque;
use std::time::Duration;

use crate::infra::config::PacingConfig;

pub struct RequestPacer {
    config: PacingConfig,
    outcomes: VecDeque<bool>,
}

impl RequestPacer {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            outcomes: VecDeque::with_capacity(config.error_window),
            config,
        }
    }

    /// Record whether the last request errored.
    pub fn record(&mut self, had_error: bool) {
        self.outcomes.push_back(had_error);
        while self.outcomes.len() > self.config.error_window {
            self.outcomes.pop_front();
        }
    }

    /// Fraction of errored requests in the window, 0.0 when empty.
    pub fn error_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let errors = self.outcomes.iter().filter(|&&e| e).count();
        errors as f64 / self.outcomes.len() as f64
    }

    /// Current delay to insert before the next request.
    pub fn delay(&self) -> Duration {
        let c = &self.config;
        let secs = if self.outcomes.is_empty() {
            c.base_delay_secs
        } else {
            let rate = self.error_rate();
            if rate == 0.0 {
                c.min_delay_secs
            } else if rate < 0.2 {
                c.base_delay_secs * 0.7
            } else if rate < 0.5 {
                c.base_delay_secs
            } else {
                // rate 0.5 → base, rate 1.0 → max
                c.base_delay_secs + (c.max_delay_secs - c.base_delay_secs) * (rate - 0.5) / 0.5
            }
        };

        Duration::from_secs_f64(secs.clamp(c.min_delay_secs, c.max_delay_secs))
    }
}
