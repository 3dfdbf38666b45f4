//! Portfolio summary over a batch of scored leads: intent distribution,
//! averages, conversion forecast and how often each signal fired.
//!
//! Computed in memory from pipeline outcomes; nothing is stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decision::{IntentLevel, PipelineOutcome};
use crate::signals::LeadSignals;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_leads: usize,
    /// Mean score, 2 decimals.
    pub average_score: f64,
    pub high_intent_count: usize,
    /// Share of leads, 0–100 with 1 decimal.
    pub high_intent_percentage: f64,
    pub medium_intent_count: usize,
    pub medium_intent_percentage: f64,
    pub low_intent_count: usize,
    pub low_intent_percentage: f64,
    pub average_confidence: f64,
    /// Mean of the matched brackets' conversion probabilities, 2 decimals.
    pub conversion_forecast: f64,
    /// Signal name → number of leads where it was set.
    pub source_breakdown: BTreeMap<String, usize>,
}

impl PortfolioSummary {
    pub fn from_scored(leads: &[(LeadSignals, PipelineOutcome)]) -> Self {
        let total = leads.len();
        if total == 0 {
            return Self::default();
        }

        let mut score_sum = 0.0;
        let mut confidence_sum = 0.0;
        let mut probability_sum = 0.0;
        let (mut high, mut medium, mut low) = (0usize, 0usize, 0usize);
        let mut source_breakdown: BTreeMap<String, usize> = BTreeMap::new();

        for (signals, outcome) in leads {
            score_sum += outcome.result.score;
            confidence_sum += outcome.result.confidence;
            probability_sum += outcome.action.conversion_probability;
            match outcome.result.intent_level {
                IntentLevel::High => high += 1,
                IntentLevel::Medium => medium += 1,
                IntentLevel::Low => low += 1,
            }
            for name in signals.active() {
                *source_breakdown.entry(name.to_string()).or_default() += 1;
            }
        }

        let n = total as f64;
        let pct = |count: usize| round_to(count as f64 / n * 100.0, 1);

        Self {
            total_leads: total,
            average_score: round_to(score_sum / n, 2),
            high_intent_count: high,
            high_intent_percentage: pct(high),
            medium_intent_count: medium,
            medium_intent_percentage: pct(medium),
            low_intent_count: low,
            low_intent_percentage: pct(low),
            average_confidence: round_to(confidence_sum / n, 2),
            conversion_forecast: round_to(probability_sum / n, 2),
            source_breakdown,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (value * f).round() / f
}
