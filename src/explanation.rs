//! # Explanation Engine
//! Turns `(score, contributions)` into something a salesperson can read:
//! intent level, confidence, ranked contributions with reasons, a one-line
//! summary and a display band.
//!
//! Confidence blends three sub-scores in `[0, 1]`:
//!
//! ```text
//! confidence = (completeness * 0.3 + recency * 0.4 + diversity * 0.3) * 100
//! ```
//!
//! - completeness: share of configured signals that fired
//! - recency: the same decay ratio the scoring stage used (0 without a timestamp)
//! - diversity: share of signal categories that fired; when the config declares
//!   no categories at all this falls back to completeness. The fallback is a
//!   known simplification, kept until real category metadata is configured.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::scoring::MAX_SCORE;
use crate::config::{IntentThresholds, ScoringConfig};
use crate::decision::{Contribution, IntentLevel, ScoreBand};
use crate::error::{Error, Result};

const W_COMPLETENESS: f64 = 0.3;
const W_RECENCY: f64 = 0.4;
const W_DIVERSITY: f64 = 0.3;

/// The three confidence inputs, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub completeness: f64,
    pub recency: f64,
    pub diversity: f64,
}

impl ConfidenceFactors {
    /// Weighted blend on a 0–100 scale.
    pub fn confidence(&self) -> f64 {
        ((self.completeness * W_COMPLETENESS
            + self.recency * W_RECENCY
            + self.diversity * W_DIVERSITY)
            * 100.0)
            .clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub intent_level: IntentLevel,
    pub confidence: f64,
    pub factors: ConfidenceFactors,
    /// Full list, annotated and sorted by impact (highest first).
    pub contributions: Vec<Contribution>,
    pub summary: String,
    pub band: ScoreBand,
}

/// Explain a score produced by any scoring strategy.
pub fn explain(score: f64, contributions: &[Contribution], config: &ScoringConfig) -> Result<Explanation> {
    check_score(score)?;

    let intent_level = classify_intent(score, &config.intent_thresholds);
    let factors = confidence_factors(contributions, config);
    let confidence = factors.confidence();
    let contributions = annotate(contributions, config);
    let summary = summarize(score, intent_level, &contributions);
    let band = band_for(score, config);

    debug!(
        score,
        intent = intent_level.as_str(),
        confidence,
        completeness = factors.completeness,
        recency = factors.recency,
        diversity = factors.diversity,
        "score explained"
    );

    Ok(Explanation {
        intent_level,
        confidence,
        factors,
        contributions,
        summary,
        band,
    })
}

/// Thresholds are checked from the top down; a score equal to a cutoff
/// belongs to the higher tier.
pub fn classify_intent(score: f64, thresholds: &IntentThresholds) -> IntentLevel {
    if score >= thresholds.high {
        IntentLevel::High
    } else if score >= thresholds.medium {
        IntentLevel::Medium
    } else {
        IntentLevel::Low
    }
}

pub fn confidence_factors(contributions: &[Contribution], config: &ScoringConfig) -> ConfidenceFactors {
    let fired: BTreeSet<&str> = contributions
        .iter()
        .filter(|c| !c.is_recency() && config.weights.contains_key(&c.feature))
        .map(|c| c.feature.as_str())
        .collect();

    let completeness = if config.weights.is_empty() {
        0.0
    } else {
        fired.len() as f64 / config.weights.len() as f64
    };

    let recency = if config.recency.max_bonus > 0.0 {
        contributions
            .iter()
            .find(|c| c.is_recency())
            .map(|c| (c.weight / config.recency.max_bonus).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let diversity = match config.categories() {
        Some(all) if !all.is_empty() => {
            let hit: BTreeSet<String> = fired
                .iter()
                .filter_map(|name| config.category_of(name))
                .collect();
            hit.len() as f64 / all.len() as f64
        }
        _ => completeness,
    };

    ConfidenceFactors {
        completeness,
        recency,
        diversity,
    }
}

/// Attach configured descriptions as reasons and sort by impact, highest first.
/// Ties keep a stable order by feature name.
pub fn annotate(contributions: &[Contribution], config: &ScoringConfig) -> Vec<Contribution> {
    let mut out: Vec<Contribution> = contributions
        .iter()
        .map(|c| {
            let reason = if c.is_recency() {
                Some(config.recency.description.clone())
            } else {
                config.weights.get(&c.feature).map(|w| w.description.clone())
            };
            let mut c = c.clone();
            if let Some(r) = reason.filter(|r| !r.is_empty()) {
                c.reason = Some(r);
            }
            c
        })
        .collect();

    out.sort_by(|a, b| {
        b.impact
            .partial_cmp(&a.impact)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.feature.cmp(&b.feature))
    });
    out
}

/// One-line summary naming the strongest driver. Expects sorted contributions.
pub fn summarize(score: f64, intent: IntentLevel, contributions: &[Contribution]) -> String {
    let Some(top) = contributions.first() else {
        return format!("Lead scores {score:.0} with {} intent.", intent.as_str());
    };
    match intent {
        IntentLevel::High => format!(
            "Strong lead (score {score:.0}), driven by {}. Act now.",
            top.feature
        ),
        IntentLevel::Medium => format!(
            "Promising lead (score {score:.0}), main interest: {}. Keep nurturing.",
            top.feature
        ),
        IntentLevel::Low => format!(
            "Early-stage lead (score {score:.0}) with few engagement signals. Drip campaigns fit best."
        ),
    }
}

/// Band whose `[min, max)` range holds `score` (a band ending at 100 also
/// holds 100), or the neutral "Unknown" band.
pub fn band_for(score: f64, config: &ScoringConfig) -> ScoreBand {
    config
        .bands
        .iter()
        .find(|b| b.min <= score && (score < b.max || (score == b.max && b.max >= MAX_SCORE)))
        .map(|b| ScoreBand {
            color: b.color.clone(),
            label: b.label.clone(),
        })
        .unwrap_or_else(ScoreBand::unknown)
}

pub(crate) fn check_score(score: f64) -> Result<()> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(Error::invalid_input(format!(
            "score must be a number within [0, 100], got {score}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::RECENCY_FEATURE;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default_seed()
    }

    fn uncategorized() -> ScoringConfig {
        let mut c = cfg();
        for w in c.weights.values_mut() {
            w.category = None;
        }
        c
    }

    #[test]
    fn intent_boundaries_belong_to_higher_tier() {
        let t = cfg().intent_thresholds;
        assert_eq!(classify_intent(80.0, &t), IntentLevel::High);
        assert_eq!(classify_intent(79.999, &t), IntentLevel::Medium);
        assert_eq!(classify_intent(60.0, &t), IntentLevel::Medium);
        assert_eq!(classify_intent(59.9, &t), IntentLevel::Low);
        assert_eq!(classify_intent(0.0, &t), IntentLevel::Low);
    }

    #[test]
    fn no_contributions_means_zero_confidence() {
        let f = confidence_factors(&[], &cfg());
        assert_eq!(f.completeness, 0.0);
        assert_eq!(f.recency, 0.0);
        assert_eq!(f.diversity, 0.0);
        assert_eq!(f.confidence(), 0.0);
    }

    #[test]
    fn diversity_falls_back_to_completeness_without_categories() {
        let c = uncategorized();
        let contribs = vec![
            Contribution::new("demo_requested", 25.0, 20.0),
            Contribution::new("registration", 15.0, 12.0),
        ];
        let f = confidence_factors(&contribs, &c);
        assert!((f.completeness - 2.0 / 7.0).abs() < 1e-12);
        assert_eq!(f.diversity, f.completeness);
    }

    #[test]
    fn diversity_counts_categories_when_configured() {
        let contribs = vec![
            Contribution::new("demo_requested", 25.0, 20.0),
            Contribution::new("pricing_compared", 18.0, 15.0),
        ];
        let f = confidence_factors(&contribs, &cfg());
        // Both signals are in the "intent" category: 1 of 3.
        assert!((f.diversity - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn recency_factor_recovers_ratio_from_bonus() {
        let contribs = vec![Contribution::new(RECENCY_FEATURE, 5.0, 4.0)];
        let f = confidence_factors(&contribs, &cfg());
        assert!((f.recency - 0.5).abs() < 1e-12);
        assert_eq!(f.completeness, 0.0);
        assert!((f.confidence() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn full_signal_set_with_fresh_enquiry_is_fully_confident() {
        let c = cfg();
        let mut contribs: Vec<Contribution> = c
            .weights
            .iter()
            .map(|(k, w)| Contribution::new(k.as_str(), w.weight, 1.0))
            .collect();
        contribs.push(Contribution::new(RECENCY_FEATURE, 10.0, 8.0));
        assert!((confidence_factors(&contribs, &c).confidence() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn annotate_sorts_and_adds_reasons() {
        let contribs = vec![
            Contribution::new("registration", 15.0, 12.0),
            Contribution::new(RECENCY_FEATURE, 10.0, 8.0),
            Contribution::new("demo_requested", 25.0, 20.0),
        ];
        let out = annotate(&contribs, &cfg());
        let names: Vec<_> = out.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(names, ["demo_requested", "registration", "recency"]);
        assert_eq!(out[0].reason.as_deref(), Some("Lead requested a product demo"));
        assert_eq!(out[2].reason.as_deref(), Some("Recent enquiry"));
    }

    #[test]
    fn equal_impacts_sort_by_name() {
        let contribs = vec![
            Contribution::new("lead_through_referral", 20.0, 16.0),
            Contribution::new("enquiry_call_whatsapp", 20.0, 16.0),
        ];
        let out = annotate(&contribs, &cfg());
        assert_eq!(out[0].feature, "enquiry_call_whatsapp");
    }

    #[test]
    fn summary_names_top_driver() {
        let contribs = vec![Contribution::new("demo_requested", 25.0, 20.0)];
        let s = summarize(91.4, IntentLevel::High, &contribs);
        assert!(s.contains("91"));
        assert!(s.contains("demo_requested"));
        assert_eq!(
            summarize(0.0, IntentLevel::Low, &[]),
            "Lead scores 0 with Low intent."
        );
    }

    #[test]
    fn band_lookup_with_fallback() {
        let mut c = cfg();
        assert_eq!(band_for(85.0, &c).label, "Hot");
        assert_eq!(band_for(10.0, &c).label, "Cold");
        assert_eq!(band_for(40.0, &c).label, "Warm");
        assert_eq!(band_for(100.0, &c).label, "Hot");
        c.bands.clear();
        assert_eq!(band_for(85.0, &c), ScoreBand::unknown());
    }

    #[test]
    fn nan_or_out_of_range_score_is_rejected() {
        for bad in [f64::NAN, -1.0, 100.5, f64::INFINITY] {
            assert!(matches!(explain(bad, &[], &cfg()), Err(Error::InvalidInput(_))));
        }
    }
}
