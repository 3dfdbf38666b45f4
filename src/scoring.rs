//! # Scoring Engine
//! Pure, config-driven lead scoring: weighted signals plus a linearly decaying
//! recency bonus, normalized to 0–100.
//!
//! - Denominator is the sum of *all* configured weights, so the same config
//!   always normalizes the same way no matter which flags fired.
//! - Recency is layered on top of the weight pool and reported as its own
//!   `recency` contribution.
//! - Unknown or false flags contribute nothing and never fail.
//! - `now` is a parameter; nothing in here reads the clock.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::ScoringConfig;
use crate::decision::{Contribution, RECENCY_FEATURE};
use crate::error::{ConfigError, Error, Result};
use crate::signals::LeadSignals;

/// Output of the scoring stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutput {
    /// Normalized score in `[0, 100]`.
    pub score: f64,
    /// One entry per fired configured signal (config order), then `recency`.
    pub contributions: Vec<Contribution>,
    pub raw_score: f64,
    pub total_possible: f64,
    pub recency_bonus: f64,
}

/// Anything that can turn signals into a score and contributions.
/// The explanation and next-action stages only rely on this trait.
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn score(
        &self,
        signals: &LeadSignals,
        config: &ScoringConfig,
        now: DateTime<Utc>,
    ) -> Result<ScoreOutput>;
}

/// Default strategy: weighted boolean signals + recency bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedScorer;

impl ScoringStrategy for WeightedScorer {
    fn name(&self) -> &str {
        "weighted"
    }

    fn score(
        &self,
        signals: &LeadSignals,
        config: &ScoringConfig,
        now: DateTime<Utc>,
    ) -> Result<ScoreOutput> {
        let total_possible = config.total_possible();
        if total_possible <= 0.0 || !total_possible.is_finite() {
            return Err(ConfigError::NoWeights.into());
        }

        let mut raw_score = 0.0;
        let mut contributions = Vec::new();
        for (name, w) in &config.weights {
            if signals.is_set(name) {
                raw_score += w.weight;
                contributions.push(Contribution::new(
                    name.as_str(),
                    w.weight,
                    w.weight / total_possible * 100.0,
                ));
            }
        }

        let ratio = match signals.enquiry_at {
            Some(ts) => {
                let days = days_since(ts, now, config.recency.max_clock_skew_secs)?;
                recency_ratio(days as f64, config.recency.decay_days)
            }
            None => 0.0,
        };
        let recency_bonus = ratio * config.recency.max_bonus;
        if recency_bonus > 0.0 {
            raw_score += recency_bonus;
            contributions.push(Contribution::new(
                RECENCY_FEATURE,
                recency_bonus,
                recency_bonus / total_possible * 100.0,
            ));
        }

        let score = normalize(raw_score, total_possible);

        debug!(
            score,
            raw_score,
            total_possible,
            recency_bonus,
            fired = contributions.len(),
            "lead scored"
        );

        Ok(ScoreOutput {
            score,
            contributions,
            raw_score,
            total_possible,
            recency_bonus,
        })
    }
}

/// `min(100, raw / total * 100)`, floored at 0.
pub fn normalize(raw_score: f64, total_possible: f64) -> f64 {
    (raw_score / total_possible * 100.0).clamp(0.0, 100.0)
}

/// Linear decay: 1.0 at day 0, 0.0 from `decay_days` on.
pub fn recency_ratio(days_since: f64, decay_days: f64) -> f64 {
    if decay_days <= 0.0 {
        return 0.0;
    }
    ((decay_days - days_since.max(0.0)) / decay_days).clamp(0.0, 1.0)
}

/// Whole days elapsed since `enquiry_at`.
///
/// Timestamps up to `max_skew_secs` in the future count as day 0; anything
/// further ahead is rejected as invalid input.
pub fn days_since(enquiry_at: DateTime<Utc>, now: DateTime<Utc>, max_skew_secs: i64) -> Result<i64> {
    let elapsed = now.signed_duration_since(enquiry_at);
    if elapsed.num_seconds() < -max_skew_secs.max(0) {
        warn!(%enquiry_at, %now, "enquiry timestamp lies in the future");
        return Err(Error::invalid_input(format!(
            "enquiry timestamp {enquiry_at} is in the future (now {now})"
        )));
    }
    Ok(elapsed.num_days().max(0))
}
