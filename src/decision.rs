//! decision.rs — output shapes of the pipeline: contributions, intent level,
//! urgency, the explained score and the recommended action.
//!
//! Everything here is plain data. Values are created once per scoring call and
//! never mutated afterwards; the caller serializes or persists them.

use serde::{Deserialize, Serialize};

/// Name of the synthetic contribution carrying the recency bonus.
pub const RECENCY_FEATURE: &str = "recency";

/// Coarse readiness-to-buy classification derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntentLevel {
    Low,
    Medium,
    High,
}

impl IntentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLevel::Low => "Low",
            IntentLevel::Medium => "Medium",
            IntentLevel::High => "High",
        }
    }
}

/// How quickly sales should act on a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(alias = "immediate", alias = "IMMEDIATE")]
    Immediate,
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Immediate => "Immediate",
            Urgency::High => "High",
            Urgency::Medium => "Medium",
            Urgency::Low => "Low",
        }
    }
}

/// Attributed portion of the score coming from one signal (or from recency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    /// Raw weight applied; for recency this is the bonus actually granted.
    pub weight: f64,
    /// Share on the same 0–100 scale as the final score.
    pub impact: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Contribution {
    pub fn new(feature: impl Into<String>, weight: f64, impact: f64) -> Self {
        Self {
            feature: feature.into(),
            weight,
            impact: impact.clamp(0.0, 100.0),
            reason: None,
        }
    }

    pub fn is_recency(&self) -> bool {
        self.feature == RECENCY_FEATURE
    }
}

/// Display band (color + label) for UI consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub color: String,
    pub label: String,
}

impl ScoreBand {
    pub fn unknown() -> Self {
        Self {
            color: "#6b7280".to_string(),
            label: "Unknown".to_string(),
        }
    }
}

/// Explained score. Contributions are sorted by impact, highest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    pub contributions: Vec<Contribution>,
    pub intent_level: IntentLevel,
    /// Confidence in the score, 0–100.
    pub confidence: f64,
    pub summary: String,
    pub band: ScoreBand,
}

impl ScoreResult {
    /// First `n` contributions; the full list stays on the result.
    pub fn top(&self, n: usize) -> &[Contribution] {
        &self.contributions[..n.min(self.contributions.len())]
    }
}

/// Recommended next sales action for a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecommendation {
    pub urgency: Urgency,
    pub action: String,
    /// Estimated conversion probability, 0.0–1.0.
    pub conversion_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_label: Option<String>,
    /// Matched bracket as `"min-max"`.
    pub bracket: String,
    pub rationale: String,
}

/// Final product of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub result: ScoreResult,
    pub action: ActionRecommendation,
}
