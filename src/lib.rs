// src/lib.rs
// Public library surface: the scoring pipeline plus the HTTP layer the binary serves.

pub mod config;
pub mod decision;
pub mod error;
pub mod explanation;
pub mod next_action;
pub mod pipeline;
pub mod scoring;
pub mod signals;
pub mod summary;

// Outer layer: HTTP routes and Prometheus exporter
pub mod api;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::{ConfigHandle, ScoringConfig};
pub use crate::decision::{
    ActionRecommendation, Contribution, IntentLevel, PipelineOutcome, ScoreResult, Urgency,
};
pub use crate::error::{ConfigError, Error, Result};
pub use crate::pipeline::LeadScorer;
pub use crate::scoring::{ScoringStrategy, WeightedScorer};
pub use crate::signals::{LeadRecord, LeadSignals};

use crate::config::LogFormat;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "lead_intent_scorer=info,warn";

/// Install the global tracing subscriber. Call once, early, from a binary.
/// Returns an error if a subscriber is already set.
pub fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init()?,
    }
    Ok(())
}
