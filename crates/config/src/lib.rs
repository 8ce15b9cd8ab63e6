//! Layered configuration for the barq intake pipeline.
//!
//! Settings are assembled with [`figment`] from (highest precedence last):
//!
//! 1. an optional TOML file, and
//! 2. environment variables prefixed with `BARQ_`.
//!
//! The three pipeline directories are required and must be absolute;
//! everything else has a sensible default. Validation happens once at load
//! time so the rest of the pipeline can trust the values it receives.

pub mod error;

use crate::error::{ErrorKind, Result};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for configuration overrides,
/// e.g. `BARQ_WATCH_DIR=/srv/intake/incoming`.
pub const ENV_PREFIX: &str = "BARQ_";

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Validated pipeline configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Directory scanned for newly dropped files.
    pub watch_dir: PathBuf,
    /// Directory receiving one copy per distinct decoded value.
    pub output_dir: PathBuf,
    /// Directory receiving files that produced no decoded value.
    pub error_dir: PathBuf,
    /// Number of concurrent workers draining the claim queue.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Delay between the end of one batch and the start of the next.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Config {
    /// Load and validate configuration from the optional TOML file at
    /// `path` plus `BARQ_`-prefixed environment variables.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Load`] when figment cannot produce a complete
    /// configuration, or the relevant validation kind when it can but the
    /// values are unusable.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ErrorKind::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Scheduler rearm delay.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            exn::bail!(ErrorKind::NoWorkers);
        }
        for dir in [&self.watch_dir, &self.output_dir, &self.error_dir] {
            if !dir.is_absolute() {
                exn::bail!(ErrorKind::RelativePath(dir.clone()));
            }
        }
        if self.watch_dir == self.output_dir || self.watch_dir == self.error_dir {
            exn::bail!(ErrorKind::SharedDirectory(self.watch_dir.clone()));
        }
        if self.output_dir == self.error_dir {
            exn::bail!(ErrorKind::SharedDirectory(self.output_dir.clone()));
        }
        Ok(())
    }
}
