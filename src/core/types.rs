// src/core/types.rs — Dialogue records and scoring results

use serde::{Deserialize, Serialize};

/// The four rubric dimensions, each scored 0-3 by the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Correctness,
    Consistency,
    MisinfoResistance,
    Safety,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Correctness,
        Dimension::Consistency,
        Dimension::MisinfoResistance,
        Dimension::Safety,
    ];

    /// Key used in the judge's JSON reply.
    pub fn json_key(&self) -> &'static str {
        match self {
            Dimension::Correctness => "correctness",
            Dimension::Consistency => "consistency",
            Dimension::MisinfoResistance => "misinformation_resistance",
            Dimension::Safety => "safety",
        }
    }

    /// Uppercase token used in review flags (CRITICAL_<LABEL>_FAILURE etc.).
    pub fn flag_label(&self) -> &'static str {
        match self {
            Dimension::Correctness => "CORRECTNESS",
            Dimension::Consistency => "CONSISTENCY",
            Dimension::MisinfoResistance => "MISINFO_RESISTANCE",
            Dimension::Safety => "SAFETY",
        }
    }
}

/// Judge confidence in a dimension score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

impl Confidence {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Confidence::Low,
            "high" => Confidence::High,
            _ => Confidence::Medium,
        }
    }
}

/// Per-dimension integer scores, each in [0, 3].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub correctness: u8,
    pub consistency: u8,
    pub misinfo_resistance: u8,
    pub safety: u8,
}

impl DimensionScores {
    pub fn get(&self, dim: Dimension) -> u8 {
        match dim {
            Dimension::Correctness => self.correctness,
            Dimension::Consistency => self.consistency,
            Dimension::MisinfoResistance => self.misinfo_resistance,
            Dimension::Safety => self.safety,
        }
    }

    pub fn set(&mut self, dim: Dimension, score: u8) {
        let slot = match dim {
            Dimension::Correctness => &mut self.correctness,
            Dimension::Consistency => &mut self.consistency,
            Dimension::MisinfoResistance => &mut self.misinfo_resistance,
            Dimension::Safety => &mut self.safety,
        };
        *slot = score.min(3);
    }

    /// Sum across all four dimensions, in [0, 12].
    pub fn total(&self) -> u8 {
        self.correctness + self.consistency + self.misinfo_resistance + self.safety
    }
}

/// Per-dimension confidence levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionConfidence {
    pub correctness: Confidence,
    pub consistency: Confidence,
    pub misinfo_resistance: Confidence,
    pub safety: Confidence,
}

impl DimensionConfidence {
    pub fn get(&self, dim: Dimension) -> Confidence {
        match dim {
            Dimension::Correctness => self.correctness,
            Dimension::Consistency => self.consistency,
            Dimension::MisinfoResistance => self.misinfo_resistance,
            Dimension::Safety => self.safety,
        }
    }

    pub fn set(&mut self, dim: Dimension, conf: Confidence) {
        let slot = match dim {
            Dimension::Correctness => &mut self.correctness,
            Dimension::Consistency => &mut self.consistency,
            Dimension::MisinfoResistance => &mut self.misinfo_resistance,
            Dimension::Safety => &mut self.safety,
        };
        *slot = conf;
    }
}

/// A misinformation probe embedded in one exchange.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MisinformationTest {
    #[serde(default)]
    pub claim: String,
    #[serde(default)]
    pub severity: String,
}

/// One user/assistant turn pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exchange {
    #[serde(default)]
    pub turn: u32,
    #[serde(default)]
    pub user_message: String,
    /// Absent when the upstream benchmark run failed at this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    /// Upstream error marker; presence makes the dialogue incomplete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_recall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misinformation: Option<MisinformationTest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_behaviors: Vec<String>,
}

/// One conversation under evaluation, as emitted by the benchmark runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueRecord {
    #[serde(default)]
    pub dialogue_id: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub has_misinformation: bool,
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
    /// Attached by the scorer; absent on unscored or skipped records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scores: Option<ScoreResult>,

    /// Fields from the runner we don't interpret but must round-trip.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DialogueRecord {
    pub fn display_name(&self) -> &str {
        self.patient_name.as_deref().unwrap_or("Unknown Patient")
    }

    /// A dialogue is complete when every exchange has an AI response and no
    /// upstream error marker. Incomplete dialogues are never scored.
    pub fn is_complete(&self) -> bool {
        !self.exchanges.is_empty()
            && self
                .exchanges
                .iter()
                .all(|e| e.ai_response.is_some() && e.error.is_none())
    }

    /// Whether the attached result is a transient scoring error eligible for
    /// another retry pass.
    pub fn has_transient_error(&self) -> bool {
        self.auto_scores
            .as_ref()
            .map(|s| s.error.is_some() && s.is_transient)
            .unwrap_or(false)
    }
}

/// Output of judging one dialogue. Created fresh on every scoring attempt;
/// only the final attempt's result is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    pub scores: DimensionScores,
    #[serde(default)]
    pub confidence: DimensionConfidence,
    pub total: u8,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub critical_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub is_transient: bool,
    #[serde(default)]
    pub needs_review: bool,
}

impl ScoreResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// The results file shape shared with the benchmark runner: a metadata block
/// plus the record array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsDocument {
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub results: Vec<DialogueRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn exchange(turn: u32, response: Option<&str>) -> Exchange {
        Exchange {
            turn,
            user_message: format!("message {turn}"),
            ai_response: response.map(String::from),
            ..Default::default()
        }
    }

    // ─── Dimension tests ────────────────────────────────────────

    #[test]
    fn test_dimension_json_keys() {
        assert_eq!(Dimension::Correctness.json_key(), "correctness");
        assert_eq!(
            Dimension::MisinfoResistance.json_key(),
            "misinformation_resistance"
        );
    }

    #[test]
    fn test_dimension_all_covers_four() {
        assert_eq!(Dimension::ALL.len(), 4);
    }

    // ─── DimensionScores tests ──────────────────────────────────

    #[test]
    fn test_scores_set_clamps() {
        let mut s = DimensionScores::default();
        s.set(Dimension::Safety, 7);
        assert_eq!(s.safety, 3);
    }

    #[test]
    fn test_scores_total() {
        let mut s = DimensionScores::default();
        for dim in Dimension::ALL {
            s.set(dim, 3);
        }
        assert_eq!(s.total(), 12);
    }

    #[test]
    fn test_scores_get_set_roundtrip() {
        let mut s = DimensionScores::default();
        s.set(Dimension::Consistency, 2);
        assert_eq!(s.get(Dimension::Consistency), 2);
        assert_eq!(s.get(Dimension::Correctness), 0);
    }

    // ─── Confidence tests ───────────────────────────────────────

    #[test]
    fn test_confidence_parse() {
        assert_eq!(Confidence::parse("low"), Confidence::Low);
        assert_eq!(Confidence::parse("HIGH"), Confidence::High);
        assert_eq!(Confidence::parse("whatever"), Confidence::Medium);
    }

    #[test]
    fn test_confidence_serde_lowercase() {
        let json = serde_json::to_string(&Confidence::High).unwrap();
        assert_eq!(json, "\"high\"");
    }

    // ─── DialogueRecord tests ───────────────────────────────────

    #[test]
    fn test_complete_dialogue() {
        let d = DialogueRecord {
            exchanges: vec![exchange(1, Some("hi")), exchange(2, Some("more"))],
            ..Default::default()
        };
        assert!(d.is_complete());
    }

    #[test]
    fn test_missing_response_is_incomplete() {
        let d = DialogueRecord {
            exchanges: vec![exchange(1, Some("hi")), exchange(2, None)],
            ..Default::default()
        };
        assert!(!d.is_complete());
    }

    #[test]
    fn test_error_marker_is_incomplete() {
        let mut e = exchange(1, Some("hi"));
        e.error = Some("timeout".into());
        let d = DialogueRecord {
            exchanges: vec![e],
            ..Default::default()
        };
        assert!(!d.is_complete());
    }

    #[test]
    fn test_empty_dialogue_is_incomplete() {
        assert!(!DialogueRecord::default().is_complete());
    }

    #[test]
    fn test_has_transient_error() {
        let mut d = DialogueRecord::default();
        assert!(!d.has_transient_error());

        d.auto_scores = Some(ScoreResult {
            error: Some("overloaded".into()),
            is_transient: true,
            ..Default::default()
        });
        assert!(d.has_transient_error());

        d.auto_scores.as_mut().unwrap().is_transient = false;
        assert!(!d.has_transient_error());
    }

    #[test]
    fn test_record_roundtrips_unknown_fields() {
        let json = r#"{
            "dialogue_id": "d1",
            "patient_id": "p1",
            "has_misinformation": false,
            "exchanges": [],
            "cohort": "ham10000"
        }"#;
        let record: DialogueRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.extra.get("cohort").unwrap(), "ham10000");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["cohort"], "ham10000");
    }
}
