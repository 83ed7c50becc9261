// src/judge/mod.rs — Judge endpoint layer

pub mod backoff;
pub mod client;
pub mod gemini;
pub mod pacing;

use async_trait::async_trait;

use crate::infra::errors::DermBenchError;

/// A single generation request to the judge endpoint.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Why the judge stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishSignal {
    Stop,
    /// Output was cut off by the token budget; the caller may grow the
    /// budget and retry.
    MaxTokens,
    Safety,
    Unknown,
}

/// A raw reply from the judge. `text` may be empty when generation was cut
/// off before any part was produced.
#[derive(Debug, Clone)]
pub struct GenerateReply {
    pub text: String,
    pub finish: FinishSignal,
}

/// Transport seam for the judge endpoint. The production implementation is
/// [`gemini::GeminiJudge`]; tests substitute canned replies.
#[async_trait]
pub trait Judge: Send + Sync {
    fn id(&self) -> &str;

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateReply, DermBenchError>;
}
