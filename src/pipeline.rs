//! # Lead pipeline
//! Scoring → Explanation → NextAction, run against one config snapshot.
//!
//! The scoring strategy is swappable; explanation and next-action only see
//! its `(score, contributions)` output. Each call is independent, so a single
//! `LeadScorer` can be shared across request handlers.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ScoringConfig;
use crate::decision::{PipelineOutcome, ScoreResult};
use crate::error::{Error, Result};
use crate::explanation::explain;
use crate::next_action::recommend;
use crate::scoring::{ScoringStrategy, WeightedScorer};
use crate::signals::LeadSignals;

#[derive(Clone)]
pub struct LeadScorer {
    strategy: Arc<dyn ScoringStrategy>,
}

impl Default for LeadScorer {
    fn default() -> Self {
        Self::new(Arc::new(WeightedScorer))
    }
}

impl std::fmt::Debug for LeadScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadScorer")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl LeadScorer {
    pub fn new(strategy: Arc<dyn ScoringStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Run the full pipeline for one lead.
    pub fn evaluate(
        &self,
        signals: &LeadSignals,
        config: &ScoringConfig,
        now: DateTime<Utc>,
    ) -> Result<PipelineOutcome> {
        match self.run(signals, config, now) {
            Ok(outcome) => {
                metrics::counter!(
                    "lead_scoring_scored_total",
                    "intent" => outcome.result.intent_level.as_str()
                )
                .increment(1);
                metrics::histogram!("lead_scoring_score").record(outcome.result.score);
                Ok(outcome)
            }
            Err(e) => {
                metrics::counter!("lead_scoring_rejected_total", "kind" => e.kind()).increment(1);
                if let Error::InvalidInput(msg) = &e {
                    warn!(strategy = self.strategy.name(), reason = %msg, "lead rejected");
                }
                Err(e)
            }
        }
    }

    fn run(
        &self,
        signals: &LeadSignals,
        config: &ScoringConfig,
        now: DateTime<Utc>,
    ) -> Result<PipelineOutcome> {
        let scored = self.strategy.score(signals, config, now)?;
        let explained = explain(scored.score, &scored.contributions, config)?;
        let action = recommend(scored.score, config)?;

        debug!(
            strategy = self.strategy.name(),
            score = scored.score,
            intent = explained.intent_level.as_str(),
            urgency = action.urgency.as_str(),
            "pipeline complete"
        );

        Ok(PipelineOutcome {
            result: ScoreResult {
                score: scored.score,
                contributions: explained.contributions,
                intent_level: explained.intent_level,
                confidence: explained.confidence,
                summary: explained.summary,
                band: explained.band,
            },
            action,
        })
    }
}
