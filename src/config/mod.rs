// src/config/mod.rs
//! Configuration: the scoring model, the swappable snapshot handle, and process settings.

pub mod handle;
pub mod scoring;
pub mod settings;

pub use handle::{start_hot_reload_thread, ConfigHandle};
pub use scoring::{Band, Bracket, IntentThresholds, RecencyConfig, ScoringConfig, SignalWeight};
pub use settings::{LogFormat, Settings};
