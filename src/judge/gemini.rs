// src/judge/gemini.rs — Gemini generateContent judge transport

use async_trait::async_trait;
use std::time::Duration;

use super::{FinishSignal, GenerateReply, GenerateRequest, Judge};
use crate::infra::errors::DermBenchError;

/// Content-safety thresholds sent with every request. Dermatology transcripts
/// discuss lesions, cancers, and medication risks, which default thresholds
/// are prone to blocking.
#[derive(Debug, Clone)]
pub struct SafetySettings {
    categories: Vec<(&'static str, &'static str)>,
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            categories: vec![
                ("HARM_CATEGORY_HATE_SPEECH", "BLOCK_NONE"),
                ("HARM_CATEGORY_HARASSMENT", "BLOCK_NONE"),
                ("HARM_CATEGORY_SEXUALLY_EXPLICIT", "BLOCK_NONE"),
                ("HARM_CATEGORY_DANGEROUS_CONTENT", "BLOCK_NONE"),
            ],
        }
    }
}

impl SafetySettings {
    fn to_json(&self) -> serde_json::Value {
        let entries: Vec<serde_json::Value> = self
            .categories
            .iter()
            .map(|(category, threshold)| {
                serde_json::json!({ "category": category, "threshold": threshold })
            })
            .collect();
        serde_json::Value::Array(entries)
    }
}

#[derive(Debug)]
pub struct GeminiJudge {
    api_key: String,
    model: String,
    safety: SafetySettings,
    client: reqwest::Client,
}

impl GeminiJudge {
    pub fn new(
        api_key: String,
        model: String,
        safety: SafetySettings,
        timeout: Duration,
    ) -> Result<Self, DermBenchError> {
        if api_key.is_empty() {
            return Err(DermBenchError::Config(
                "judge API key is empty; set GOOGLE_API_KEY".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DermBenchError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            api_key,
            model,
            safety,
            client,
        })
    }

    fn base_url(&self) -> &str {
        "https://generativelanguage.googleapis.com/v1"
    }

    fn build_request_body(&self, request: &GenerateRequest) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_output_tokens,
            },
            "safetySettings": self.safety.to_json(),
        })
    }
}

fn parse_finish_reason(reason: Option<&str>) -> FinishSignal {
    match reason {
        Some("STOP") => FinishSignal::Stop,
        Some("MAX_TOKENS") => FinishSignal::MaxTokens,
        Some("SAFETY") => FinishSignal::Safety,
        _ => FinishSignal::Unknown,
    }
}

/// Extract the reply from a successful generateContent response body.
fn extract_reply(resp: &serde_json::Value) -> Result<GenerateReply, DermBenchError> {
    let candidates = resp["candidates"].as_array().cloned().unwrap_or_default();

    if candidates.is_empty() {
        // The prompt itself was rejected; promptFeedback carries the reason.
        let block_reason = resp["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned")
            .to_string();
        return Err(DermBenchError::ContentBlocked {
            reason: block_reason,
        });
    }

    let candidate = &candidates[0];
    let finish = parse_finish_reason(candidate["finishReason"].as_str());

    if finish == FinishSignal::Safety {
        return Err(DermBenchError::ContentBlocked {
            reason: "SAFETY finish reason".into(),
        });
    }

    let parts = candidate["content"]["parts"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    let mut text = String::new();
    for part in &parts {
        if let Some(t) = part["text"].as_str() {
            text.push_str(t);
        }
    }

    Ok(GenerateReply { text, finish })
}

#[async_trait]
impl Judge for GeminiJudge {
    // The model name, not a provider tag: it ends up in log lines and in the
    // persisted scorer_model metadata, where a --model override must show.
    fn id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateReply, DermBenchError> {
        let body = self.build_request_body(request);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url(),
            self.model,
            self.api_key,
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DermBenchError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DermBenchError::RateLimited { retry_after_ms: 5000 });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DermBenchError::Http {
                status: status.as_u16(),
                message: truncate(&error_body, 500),
                retriable: status.is_server_error(),
            });
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| DermBenchError::Http {
            status: status.as_u16(),
            message: format!("failed to parse response body: {e}"),
            retriable: false,
        })?;

        extract_reply(&resp)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s[..end].to_string()
    }
}
