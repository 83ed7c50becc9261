// src/judge/client.rs — Retry wrapper around a Judge transport
//
// Owns all failure classification for one judge call:
//   - truncation recovery: MAX_TOKENS finish grows the output budget up to a
//     cap and retries immediately, consuming no retry credit
//   - network errors (connect/timeout) and HTTP-class errors (429/5xx) keep
//     independent retry budgets with capped exponential backoff
//   - content blocks and non-retryable 4xx surface immediately
//
// Exhausted transient budgets return the last transient error; the caller
// reads `is_retriable()` to defer the dialogue to the next retry pass.

use std::sync::Arc;
use std::time::Duration;

use super::backoff::{backoff_delay, BackoffConfig};
use super::{FinishSignal, GenerateRequest, Judge};
use crate::infra::config::Config;
use crate::infra::errors::DermBenchError;

#[derive(Debug, Clone)]
pub struct JudgeClientConfig {
    pub temperature: f32,
    pub initial_output_tokens: u32,
    pub output_tokens_cap: u32,
    pub token_growth_increment: u32,
    pub max_network_retries: u32,
    pub max_http_retries: u32,
    pub backoff: BackoffConfig,
    /// Brief pause before a truncation retry; no backoff applies.
    pub truncation_pause: Duration,
}

impl Default for JudgeClientConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            initial_output_tokens: 1200,
            output_tokens_cap: 4096,
            token_growth_increment: 400,
            max_network_retries: 3,
            max_http_retries: 5,
            backoff: BackoffConfig::default(),
            truncation_pause: Duration::from_secs(1),
        }
    }
}

impl JudgeClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temperature: config.judge.temperature,
            initial_output_tokens: config.judge.max_output_tokens,
            output_tokens_cap: config.judge.max_output_tokens_cap,
            token_growth_increment: config.judge.token_growth_increment,
            max_network_retries: config.retry.max_network_retries,
            max_http_retries: config.retry.max_http_retries,
            backoff: BackoffConfig {
                ceiling: Duration::from_secs(config.retry.backoff_ceiling_secs),
                jitter_fraction: config.retry.backoff_jitter,
            },
            truncation_pause: Duration::from_secs(1),
        }
    }
}

pub struct JudgeClient {
    inner: Arc<dyn Judge>,
    config: JudgeClientConfig,
}

impl JudgeClient {
    pub fn new(inner: Arc<dyn Judge>, config: JudgeClientConfig) -> Self {
        Self { inner, config }
    }

    pub fn judge_id(&self) -> &str {
        self.inner.id()
    }

    /// Run one prompt to completion: returns the judge's raw reply text, or
    /// the final (classified) error once all applicable budgets are spent.
    pub async fn call(&self, prompt: &str) -> Result<String, DermBenchError> {
        let mut output_tokens = self.config.initial_output_tokens;
        let mut network_retries: u32 = 0;
        let mut http_retries: u32 = 0;

        loop {
            let request = GenerateRequest {
                prompt: prompt.to_string(),
                temperature: self.config.temperature,
                max_output_tokens: output_tokens,
            };

            match self.inner.generate(&request).await {
                Ok(reply) => {
                    if reply.finish == FinishSignal::MaxTokens {
                        let grown = (output_tokens + self.config.token_growth_increment)
                            .min(self.config.output_tokens_cap);
                        // A budget that cannot grow (at the cap, or a zero
                        // increment) falls through to the reply handling
                        // below instead of re-sending the same request.
                        if grown > output_tokens {
                            output_tokens = grown;
                            tracing::info!(
                                judge = self.inner.id(),
                                max_output_tokens = output_tokens,
                                "Reply truncated, retrying with larger output budget"
                            );
                            tokio::time::sleep(self.config.truncation_pause).await;
                            continue;
                        }
                    }

                    if reply.text.trim().is_empty() {
                        return Err(DermBenchError::EmptyReply {
                            finish_reason: format!("{:?}", reply.finish),
                        });
                    }

                    return Ok(reply.text);
                }
                Err(e) if e.is_network() => {
                    network_retries += 1;
                    if network_retries >= self.config.max_network_retries {
                        return Err(e);
                    }
                    let delay = backoff_delay(network_retries - 1, &self.config.backoff);
                    tracing::warn!(
                        judge = self.inner.id(),
                        attempt = network_retries,
                        max_retries = self.config.max_network_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after network error: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_retriable() => {
                    http_retries += 1;
                    if http_retries >= self.config.max_http_retries {
                        return Err(e);
                    }
                    let delay = backoff_delay(http_retries, &self.config.backoff);
                    tracing::warn!(
                        judge = self.inner.id(),
                        attempt = http_retries,
                        max_retries = self.config.max_http_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after HTTP error: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
