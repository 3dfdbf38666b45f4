//! # Scoring configuration
//!
//! Declarative description of how leads are scored:
//!
//! - `weights`: signal name → `{ weight, description, category? }`
//! - `recency`: linear decay window and maximum bonus
//! - `intent_thresholds`: score cutoffs for High / Medium / Low
//! - `brackets`: score ranges mapped to urgency, action text and a constant
//!   conversion probability; they must partition `[0, 100]`
//! - `bands`: optional color/label table for UIs
//!
//! Loaded from TOML, YAML or JSON. Every loader validates before returning, so
//! a `ScoringConfig` obtained through them is safe to score with; malformed
//! configuration fails here and never at per-lead scoring time.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::decision::Urgency;
use crate::error::ConfigError;

/// Score scale upper bound.
pub const MAX_SCORE: f64 = 100.0;

fn default_clock_skew_secs() -> i64 {
    300
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalWeight {
    pub weight: f64,
    #[serde(default)]
    pub description: String,
    /// Optional grouping used by the diversity term of confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyConfig {
    pub decay_days: f64,
    pub max_bonus: f64,
    #[serde(default)]
    pub description: String,
    /// Enquiry timestamps up to this far in the future count as "now".
    #[serde(default = "default_clock_skew_secs")]
    pub max_clock_skew_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentThresholds {
    pub high: f64,
    pub medium: f64,
    #[serde(default)]
    pub low: f64,
}

/// Contiguous score range `[min, max)`; the topmost bracket also owns `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub min: f64,
    pub max: f64,
    pub urgency: Urgency,
    pub action: String,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_label: Option<String>,
    /// Template with `{score}` and `{urgency}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Bracket {
    /// `min <= score < max`; the topmost bracket also owns its `max`.
    pub fn contains(&self, score: f64, is_top: bool) -> bool {
        self.min <= score && (score < self.max || (is_top && score <= self.max))
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: BTreeMap<String, SignalWeight>,
    pub recency: RecencyConfig,
    pub intent_thresholds: IntentThresholds,
    pub brackets: Vec<Bracket>,
    #[serde(default)]
    pub bands: Vec<Band>,
}

impl ScoringConfig {
    /// Load and validate a config file; the format follows the extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let cfg = match ext.as_str() {
            "toml" => Self::from_toml_str(&content)?,
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        info!(
            path = %path.display(),
            signals = cfg.weights.len(),
            brackets = cfg.brackets.len(),
            "scoring config loaded"
        );
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validated()
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validated()
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validated()
    }

    /// Sort brackets ascending by `min` and check every invariant.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.brackets
            .sort_by(|a, b| a.min.partial_cmp(&b.min).unwrap_or(std::cmp::Ordering::Equal));
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_weights()?;
        self.validate_recency()?;
        self.validate_thresholds()?;
        self.validate_brackets()?;
        self.validate_bands()
    }

    /// Denominator for normalization: sum over every configured signal.
    pub fn total_possible(&self) -> f64 {
        self.weights.values().map(|w| w.weight).sum()
    }

    /// Distinct categories; `None` when no signal declares one.
    /// An uncategorized signal forms a category of its own.
    pub fn categories(&self) -> Option<BTreeSet<String>> {
        if self.weights.values().all(|w| w.category.is_none()) {
            return None;
        }
        Some(
            self.weights
                .iter()
                .map(|(name, w)| category_key(name, w))
                .collect(),
        )
    }

    pub fn category_of(&self, signal: &str) -> Option<String> {
        self.weights.get(signal).map(|w| category_key(signal, w))
    }

    /// Brackets in ascending order of lower bound.
    pub fn brackets_ascending(&self) -> Vec<&Bracket> {
        let mut v: Vec<&Bracket> = self.brackets.iter().collect();
        v.sort_by(|a, b| a.min.partial_cmp(&b.min).unwrap_or(std::cmp::Ordering::Equal));
        v
    }

    fn validate_weights(&self) -> Result<(), ConfigError> {
        if self.weights.is_empty() {
            return Err(ConfigError::NoWeights);
        }
        for (name, w) in &self.weights {
            if !w.weight.is_finite() || w.weight <= 0.0 {
                return Err(ConfigError::InvalidWeight {
                    signal: name.clone(),
                    message: format!("weight must be a positive number, got {}", w.weight),
                });
            }
        }
        if self.total_possible() <= 0.0 {
            return Err(ConfigError::NoWeights);
        }
        Ok(())
    }

    fn validate_recency(&self) -> Result<(), ConfigError> {
        let r = &self.recency;
        if !r.decay_days.is_finite() || r.decay_days <= 0.0 {
            return Err(ConfigError::InvalidRecency(format!(
                "decay_days must be > 0, got {}",
                r.decay_days
            )));
        }
        // Confidence recovers the decay ratio from the granted bonus.
        if !r.max_bonus.is_finite() || r.max_bonus <= 0.0 {
            return Err(ConfigError::InvalidRecency(format!(
                "max_bonus must be > 0, got {}",
                r.max_bonus
            )));
        }
        if r.max_clock_skew_secs < 0 {
            return Err(ConfigError::InvalidRecency(format!(
                "max_clock_skew_secs must be >= 0, got {}",
                r.max_clock_skew_secs
            )));
        }
        Ok(())
    }

    fn validate_thresholds(&self) -> Result<(), ConfigError> {
        let t = &self.intent_thresholds;
        for (name, v) in [("high", t.high), ("medium", t.medium), ("low", t.low)] {
            if !v.is_finite() || !(0.0..=MAX_SCORE).contains(&v) {
                return Err(ConfigError::InvalidThresholds(format!(
                    "{name} must be within [0, 100], got {v}"
                )));
            }
        }
        if !(t.high >= t.medium && t.medium >= t.low) {
            return Err(ConfigError::InvalidThresholds(format!(
                "expected high >= medium >= low, got {} / {} / {}",
                t.high, t.medium, t.low
            )));
        }
        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), ConfigError> {
        if self.brackets.is_empty() {
            return Err(ConfigError::IncompleteCoverage(
                "no brackets configured".to_string(),
            ));
        }

        for (index, b) in self.brackets.iter().enumerate() {
            if !b.min.is_finite() || !b.max.is_finite() {
                return Err(ConfigError::InvalidBracket {
                    index,
                    message: "bounds must be finite".to_string(),
                });
            }
            if b.min < 0.0 || b.max > MAX_SCORE || b.min >= b.max {
                return Err(ConfigError::InvalidBracket {
                    index,
                    message: format!("expected 0 <= min < max <= 100, got [{}, {}]", b.min, b.max),
                });
            }
            if !b.probability.is_finite() || !(0.0..=1.0).contains(&b.probability) {
                return Err(ConfigError::InvalidBracket {
                    index,
                    message: format!("probability must be within [0, 1], got {}", b.probability),
                });
            }
            if b.action.trim().is_empty() {
                return Err(ConfigError::InvalidBracket {
                    index,
                    message: "action text is empty".to_string(),
                });
            }
        }

        let sorted = self.brackets_ascending();
        if let Some(first) = sorted.first() {
            if first.min > 0.0 {
                return Err(ConfigError::IncompleteCoverage(format!(
                    "lowest bracket starts at {}",
                    first.min
                )));
            }
        }
        if let Some(last) = sorted.last() {
            if last.max < MAX_SCORE {
                return Err(ConfigError::IncompleteCoverage(format!(
                    "highest bracket ends at {}",
                    last.max
                )));
            }
        }
        for pair in sorted.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.min < prev.max {
                return Err(ConfigError::OverlappingBrackets {
                    prev_min: prev.min,
                    prev_max: prev.max,
                    next_min: next.min,
                    next_max: next.max,
                });
            }
            if next.min > prev.max {
                return Err(ConfigError::BracketGap {
                    from: prev.max,
                    to: next.min,
                });
            }
        }
        Ok(())
    }

    fn validate_bands(&self) -> Result<(), ConfigError> {
        for (index, b) in self.bands.iter().enumerate() {
            if !(0.0..=MAX_SCORE).contains(&b.min) || !(0.0..=MAX_SCORE).contains(&b.max) || b.min > b.max {
                return Err(ConfigError::InvalidBracket {
                    index,
                    message: format!("band `{}` has invalid range [{}, {}]", b.label, b.min, b.max),
                });
            }
        }
        Ok(())
    }

    /// Built-in configuration with the seven standard engagement signals.
    /// Mirrors `config/scoring.toml`.
    pub fn default_seed() -> Self {
        let mut weights = BTreeMap::new();
        for (name, weight, description, category) in [
            ("demo_requested", 25.0, "Lead requested a product demo", "intent"),
            ("pricing_compared", 18.0, "Lead compared pricing plans", "intent"),
            ("registration", 15.0, "Lead registered on the platform", "engagement"),
            ("enquiry_call_whatsapp", 20.0, "Lead enquired by call or WhatsApp", "engagement"),
            ("lead_through_referral", 20.0, "Lead came through a referral", "source"),
            ("lead_through_call", 12.0, "Lead came through an inbound call", "source"),
            ("lead_through_events", 10.0, "Lead came through an event", "source"),
        ] {
            weights.insert(
                name.to_string(),
                SignalWeight {
                    weight,
                    description: description.to_string(),
                    category: Some(category.to_string()),
                },
            );
        }

        let bracket = |min: f64,
                       max: f64,
                       urgency: Urgency,
                       action: &str,
                       probability: f64,
                       label: &str| Bracket {
            min,
            max,
            urgency,
            action: action.to_string(),
            probability,
            probability_label: Some(label.to_string()),
            rationale: None,
        };

        let band = |min: f64, max: f64, color: &str, label: &str| Band {
            min,
            max,
            color: color.to_string(),
            label: label.to_string(),
        };

        Self {
            weights,
            recency: RecencyConfig {
                decay_days: 15.0,
                max_bonus: 10.0,
                description: "Recent enquiry".to_string(),
                max_clock_skew_secs: default_clock_skew_secs(),
            },
            intent_thresholds: IntentThresholds {
                high: 80.0,
                medium: 60.0,
                low: 0.0,
            },
            brackets: vec![
                bracket(0.0, 40.0, Urgency::Low, "Automated drip campaign", 0.15, "<20%"),
                bracket(40.0, 60.0, Urgency::Medium, "Nurture campaign with case studies", 0.35, "30-40%"),
                bracket(60.0, 80.0, Urgency::High, "Share pricing and schedule a follow-up", 0.55, "50-60%"),
                bracket(80.0, 100.0, Urgency::Immediate, "Direct sales call within 24 hrs", 0.75, "70-90%"),
            ],
            bands: vec![
                band(0.0, 40.0, "#ef4444", "Cold"),
                band(40.0, 60.0, "#f59e0b", "Warm"),
                band(60.0, 80.0, "#3b82f6", "Interested"),
                band(80.0, 100.0, "#16a34a", "Hot"),
            ],
        }
    }
}

fn category_key(signal: &str, w: &SignalWeight) -> String {
    w.category.clone().unwrap_or_else(|| signal.to_string())
}
