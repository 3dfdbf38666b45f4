//! Error types for the scoring pipeline.
//!
//! Two kinds only: [`ConfigError`] for malformed configuration (raised at load
//! time) and [`Error::InvalidInput`] for caller data the pipeline refuses to
//! coerce (future enquiry timestamps, NaN or out-of-range scores).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read scoring config at {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse scoring config: {0}")]
    Parse(String),

    #[error("Unsupported scoring config format: {0} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("Scoring config defines no signal weights (total possible score is zero)")]
    NoWeights,

    #[error("Invalid weight for signal `{signal}`: {message}")]
    InvalidWeight { signal: String, message: String },

    #[error("Invalid recency settings: {0}")]
    InvalidRecency(String),

    #[error("Invalid intent thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Invalid bracket #{index}: {message}")]
    InvalidBracket { index: usize, message: String },

    #[error("Brackets overlap: [{prev_min}, {prev_max}] and [{next_min}, {next_max}]")]
    OverlappingBrackets {
        prev_min: f64,
        prev_max: f64,
        next_min: f64,
        next_max: f64,
    },

    #[error("Gap between brackets: nothing covers ({from}, {to})")]
    BracketGap { from: f64, to: f64 },

    #[error("Brackets must cover [0, 100]: {0}")]
    IncompleteCoverage(String),

    #[error("No bracket matches score {0}")]
    NoBracket(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Short machine-readable kind, used for metrics labels and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::InvalidInput(_) => "invalid_input",
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
