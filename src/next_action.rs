//! # Next Action Engine
//! Maps a final score onto the configured bracket table and returns the
//! bracket's urgency, action text and conversion probability verbatim, plus a
//! short rationale. Probabilities are per-bracket constants, never
//! interpolated.

use std::collections::BTreeMap;
use tracing::{debug, error};

use crate::config::{Bracket, ScoringConfig};
use crate::decision::{ActionRecommendation, Urgency};
use crate::error::{ConfigError, Error, Result};
use crate::explanation::check_score;

/// Recommend the next sales action for `score`.
pub fn recommend(score: f64, config: &ScoringConfig) -> Result<ActionRecommendation> {
    check_score(score)?;

    let bracket = bracket_for(score, config).ok_or_else(|| {
        // Load-time validation makes this unreachable for validated configs.
        error!(score, "no bracket covers score");
        Error::from(ConfigError::NoBracket(score))
    })?;

    let rationale = rationale(score, bracket);
    debug!(
        score,
        urgency = bracket.urgency.as_str(),
        bracket = %bracket.label(),
        "action recommended"
    );

    Ok(ActionRecommendation {
        urgency: bracket.urgency,
        action: bracket.action.clone(),
        conversion_probability: bracket.probability,
        probability_label: bracket.probability_label.clone(),
        bracket: bracket.label(),
        rationale,
    })
}

/// Recommendations for many scored leads at once, keyed by lead id.
/// Fails on the first invalid score and names the offending lead.
pub fn recommend_bulk(
    scores: &BTreeMap<String, f64>,
    config: &ScoringConfig,
) -> Result<BTreeMap<String, ActionRecommendation>> {
    scores
        .iter()
        .map(|(id, &score)| match recommend(score, config) {
            Ok(rec) => Ok((id.clone(), rec)),
            Err(Error::InvalidInput(msg)) => Err(Error::InvalidInput(format!("lead `{id}`: {msg}"))),
            Err(e) => Err(e),
        })
        .collect()
}

/// First bracket, in ascending order of `min`, that holds `score`.
pub fn bracket_for(score: f64, config: &ScoringConfig) -> Option<&Bracket> {
    let sorted = config.brackets_ascending();
    let last = sorted.len().saturating_sub(1);
    sorted
        .into_iter()
        .enumerate()
        .find(|(i, b)| b.contains(score, *i == last))
        .map(|(_, b)| b)
}

fn rationale(score: f64, bracket: &Bracket) -> String {
    let score_txt = format!("{score:.0}");
    if let Some(tpl) = bracket.rationale.as_deref().filter(|t| !t.trim().is_empty()) {
        return tpl
            .replace("{score}", &score_txt)
            .replace("{urgency}", bracket.urgency.as_str());
    }
    match bracket.urgency {
        Urgency::Immediate => format!(
            "Score {score_txt} places the lead in the Immediate tier: strong buying signals, engage right away."
        ),
        Urgency::High => format!(
            "Score {score_txt} places the lead in the High tier: clear interest, schedule a follow-up to move the deal on."
        ),
        Urgency::Medium => format!(
            "Score {score_txt} places the lead in the Medium tier: moderate intent, keep nurturing with targeted content."
        ),
        Urgency::Low => format!(
            "Score {score_txt} places the lead in the Low tier: early awareness, build the relationship with educational content."
        ),
    }
}
