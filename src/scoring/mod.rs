// src/scoring/mod.rs — Scoring pipeline: prompt → judge call → parse → flags

pub mod flags;
pub mod parser;
pub mod prompt;

use crate::core::types::{DialogueRecord, ScoreResult};
use crate::judge::client::JudgeClient;
use parser::ParseOutcome;

/// Scores one dialogue at a time through the judge. Failures are captured as
/// data on the returned `ScoreResult`; nothing propagates past the
/// per-dialogue boundary, so one bad dialogue never aborts the batch.
pub struct Scorer {
    client: JudgeClient,
}

impl Scorer {
    pub fn new(client: JudgeClient) -> Self {
        Self { client }
    }

    pub fn judge_id(&self) -> &str {
        self.client.judge_id()
    }

    /// Score a complete dialogue on all four dimensions.
    pub async fn score_dialogue(&self, dialogue: &DialogueRecord) -> ScoreResult {
        let prompt = prompt::build_scoring_prompt(dialogue);

        let raw = match self.client.call(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                let is_transient = e.is_retriable();
                let flag = if is_transient {
                    flags::SCORING_ERROR_RETRYABLE
                } else {
                    flags::SCORING_ERROR_PERMANENT
                };
                tracing::warn!(
                    dialogue = %dialogue.dialogue_id,
                    transient = is_transient,
                    "Judge call failed: {}",
                    e
                );
                return ScoreResult {
                    error: Some(e.to_string()),
                    flags: vec![flag.to_string()],
                    is_transient,
                    // Transient errors are retried, not reviewed; review only
                    // kicks in once they escalate to permanent.
                    needs_review: !is_transient,
                    ..Default::default()
                };
            }
        };

        match parser::parse_judge_reply(&raw, dialogue.has_misinformation) {
            ParseOutcome::Structured(parsed) | ParseOutcome::Fallback(parsed) => {
                let derived = flags::derive_flags(
                    &parsed.scores,
                    &parsed.confidence,
                    parsed.critical_failure,
                    dialogue.has_misinformation,
                );
                let needs_review = !derived.is_empty();
                ScoreResult {
                    total: parsed.scores.total(),
                    scores: parsed.scores,
                    confidence: parsed.confidence,
                    flags: derived,
                    reasoning: parsed.overall_reasoning,
                    critical_failure: parsed.critical_failure,
                    error: None,
                    is_transient: false,
                    needs_review,
                }
            }
            ParseOutcome::Unparseable(reason) => ScoreResult {
                error: Some(reason),
                flags: vec![flags::PARSING_ERROR_RETRYABLE.to_string()],
                // May be a one-off formatting slip; retry with a fresh call
                is_transient: true,
                needs_review: false,
                reasoning: raw,
                ..Default::default()
            },
        }
    }
}

/// Reclassify a still-transient error as permanent once all retry passes are
/// spent. Terminal: the record is flagged for manual review.
pub fn escalate_to_permanent(result: &mut ScoreResult) {
    if result.error.is_some() && result.is_transient {
        result.is_transient = false;
        result.needs_review = true;
        result.flags = vec![flags::SCORING_ERROR_PERMANENT.to_string()];
    }
}
