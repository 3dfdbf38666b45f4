//! Shared, swappable scoring config.
//!
//! Readers take an `Arc` snapshot and keep it for the whole computation, so a
//! reload never shows a half-updated configuration. Writers only ever install
//! a config that already passed validation.

use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use crate::config::scoring::ScoringConfig;
use crate::error::ConfigError;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Snapshot and its version, always swapped together.
#[derive(Debug)]
struct Versioned {
    version: u64,
    config: Arc<ScoringConfig>,
}

#[derive(Clone, Debug)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Versioned>>,
}

impl ConfigHandle {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Versioned {
                version: 1,
                config: Arc::new(config),
            })),
        }
    }

    /// Current config; stays valid (and unchanged) for as long as it is held.
    pub fn snapshot(&self) -> Arc<ScoringConfig> {
        self.inner.read().config.clone()
    }

    /// Current config together with the version it was installed as.
    pub fn versioned_snapshot(&self) -> (u64, Arc<ScoringConfig>) {
        let guard = self.inner.read();
        (guard.version, guard.config.clone())
    }

    /// Monotonic counter bumped on every successful swap.
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    /// Validate `config` and install it. The previous snapshot stays active on error.
    pub fn replace(&self, config: ScoringConfig) -> Result<u64, ConfigError> {
        let config = Arc::new(config.validated()?);
        let version = {
            let mut guard = self.inner.write();
            guard.version += 1;
            guard.config = config;
            guard.version
        };
        metrics::counter!("lead_scoring_config_reloads_total").increment(1);
        Ok(version)
    }

    /// Load `path` and swap it in.
    pub fn reload_from(&self, path: &Path) -> Result<u64, ConfigError> {
        match ScoringConfig::load(path) {
            Ok(cfg) => {
                let version = self.replace(cfg)?;
                info!(path = %path.display(), version, "scoring config reloaded");
                Ok(version)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "scoring config reload rejected");
                Err(e)
            }
        }
    }
}

/// Poll `path` every 2s and reload into `handle` whenever its mtime moves.
/// No-op unless `enabled` (see `Settings::hot_reload`).
pub fn start_hot_reload_thread(
    handle: ConfigHandle,
    path: PathBuf,
    enabled: bool,
) -> Option<thread::JoinHandle<()>> {
    if !enabled {
        return None;
    }
    info!(path = %path.display(), "scoring config hot reload enabled");

    Some(thread::spawn(move || {
        let mut last_mtime: Option<SystemTime> = None;
        loop {
            poll_once(&handle, &path, &mut last_mtime);
            thread::sleep(POLL_INTERVAL);
        }
    }))
}

/// One polling step. Returns true when a new config was installed.
pub(crate) fn poll_once(handle: &ConfigHandle, path: &Path, last_mtime: &mut Option<SystemTime>) -> bool {
    let Ok(mtime) = fs::metadata(path).and_then(|m| m.modified()) else {
        // Missing or unreadable; keep the current snapshot and retry later.
        return false;
    };

    let changed = match *last_mtime {
        None => {
            *last_mtime = Some(mtime);
            false
        }
        Some(prev) => mtime != prev,
    };
    if !changed {
        return false;
    }

    *last_mtime = Some(mtime);
    handle.reload_from(path).is_ok()
}
