use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::{Band, Bracket, ConfigHandle, IntentThresholds, RecencyConfig, SignalWeight};
use crate::decision::{ActionRecommendation, Contribution, IntentLevel, PipelineOutcome, ScoreBand};
use crate::error::Error;
use crate::next_action::recommend_bulk;
use crate::pipeline::LeadScorer;
use crate::signals::{LeadRecord, LeadSignals};
use crate::summary::PortfolioSummary;

/// Contributions shown inline in a score response.
const TOP_CONTRIBUTIONS: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub config: ConfigHandle,
    pub scorer: Arc<LeadScorer>,
    /// File re-read by `/admin/reload-config`.
    pub config_path: PathBuf,
}

impl AppState {
    pub fn new(config: ConfigHandle, config_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            scorer: Arc::new(LeadScorer::default()),
            config_path: config_path.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score_lead))
        .route("/score/batch", post(score_batch))
        .route("/actions/bulk", post(bulk_actions))
        .route("/config", get(active_config))
        .route("/admin/reload-config", post(reload_config))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Maps pipeline errors onto HTTP: bad input → 400, config problems → 500.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::InvalidInput(rejection.body_text()))
    }
}

/// `Json` extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }));
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ScoreView {
    score: f64,
    intent_level: IntentLevel,
    confidence: f64,
    summary: String,
    band: ScoreBand,
    contributions: Vec<Contribution>,
    all_contributions: Vec<Contribution>,
    action: ActionRecommendation,
}

impl From<PipelineOutcome> for ScoreView {
    fn from(o: PipelineOutcome) -> Self {
        let top = o.result.top(TOP_CONTRIBUTIONS).to_vec();
        Self {
            score: o.result.score,
            intent_level: o.result.intent_level,
            confidence: o.result.confidence,
            summary: o.result.summary,
            band: o.result.band,
            contributions: top,
            all_contributions: o.result.contributions,
            action: o.action,
        }
    }
}

async fn score_lead(
    State(state): State<AppState>,
    ApiJson(lead): ApiJson<LeadRecord>,
) -> Result<Json<ScoreView>, ApiError> {
    let cfg = state.config.snapshot();
    let signals = LeadSignals::from(&lead);
    let outcome = state.scorer.evaluate(&signals, &cfg, Utc::now())?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Serialize)]
struct BatchResp {
    outcomes: Vec<ScoreView>,
    summary: PortfolioSummary,
}

async fn score_batch(
    State(state): State<AppState>,
    ApiJson(leads): ApiJson<Vec<LeadRecord>>,
) -> Result<Json<BatchResp>, ApiError> {
    // One snapshot and one clock reading for the whole batch.
    let cfg = state.config.snapshot();
    let now = Utc::now();

    let mut scored = Vec::with_capacity(leads.len());
    for lead in &leads {
        let signals = LeadSignals::from(lead);
        let outcome = state.scorer.evaluate(&signals, &cfg, now)?;
        scored.push((signals, outcome));
    }

    let summary = PortfolioSummary::from_scored(&scored);
    let outcomes = scored.into_iter().map(|(_, o)| o.into()).collect();
    Ok(Json(BatchResp { outcomes, summary }))
}

async fn bulk_actions(
    State(state): State<AppState>,
    ApiJson(scores): ApiJson<BTreeMap<String, f64>>,
) -> Result<Json<BTreeMap<String, ActionRecommendation>>, ApiError> {
    let cfg = state.config.snapshot();
    Ok(Json(recommend_bulk(&scores, &cfg)?))
}

#[derive(Debug, Serialize)]
struct ConfigView {
    version: u64,
    total_possible: f64,
    signals: BTreeMap<String, SignalWeight>,
    recency: RecencyConfig,
    intent_thresholds: IntentThresholds,
    brackets: Vec<Bracket>,
    bands: Vec<Band>,
}

async fn active_config(State(state): State<AppState>) -> Json<ConfigView> {
    let (version, cfg) = state.config.versioned_snapshot();
    Json(ConfigView {
        version,
        total_possible: cfg.total_possible(),
        signals: cfg.weights.clone(),
        recency: cfg.recency.clone(),
        intent_thresholds: cfg.intent_thresholds.clone(),
        brackets: cfg.brackets.clone(),
        bands: cfg.bands.clone(),
    })
}

async fn reload_config(State(state): State<AppState>) -> impl IntoResponse {
    match state.config.reload_from(&state.config_path) {
        Ok(version) => {
            info!(version, "config reloaded via admin endpoint");
            (
                StatusCode::OK,
                Json(json!({ "status": "reloaded", "version": version })),
            )
        }
        Err(e) => {
            error!(error = %e, "config reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": e.to_string(), "kind": "config_error" })),
            )
        }
    }
}
