// src/config.rs
//! Application config: one TOML file with `[router]`, `[revenue]`, `[engine]`
//! and `[scheduler]` tables. Every table is optional.
//!
//! Resolution order:
//! 1) $PROFIT_CONFIG_PATH (must exist)
//! 2) config/profit.toml
//! 3) built-in defaults
//!
//! A few env vars override single fields afterwards (see `apply_env`).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::engine::{Engine, EngineConfig};
use crate::revenue::{RevenueEstimator, RevenueTables};
use crate::router::{Router, RouterConfig};
use crate::scheduler::SchedulerCfg;

pub const DEFAULT_CONFIG_PATH: &str = "config/profit.toml";

pub const ENV_CONFIG_PATH: &str = "PROFIT_CONFIG_PATH";
pub const ENV_LANGUAGE: &str = "PROFIT_LANGUAGE";
pub const ENV_COUNTRY: &str = "PROFIT_COUNTRY";
pub const ENV_EXPORT_DIR: &str = "PROFIT_EXPORT_DIR";
pub const ENV_SCHEDULE_SECS: &str = "PROFIT_SCHEDULE_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub router: RouterConfig,
    pub revenue: RevenueTables,
    pub engine: EngineConfig,
    pub scheduler: SchedulerCfg,
    pub history_capacity: usize,
    /// Snapshots are written here when set.
    pub export_dir: Option<PathBuf>,
    /// TOML/JSON topic list; built-in titles when absent.
    pub topics_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            revenue: RevenueTables::default(),
            engine: EngineConfig::default(),
            scheduler: SchedulerCfg::default(),
            history_capacity: 1_000,
            export_dir: None,
            topics_path: None,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(target: "config", path = %path.display(), "loaded config");
        Ok(cfg.normalized())
    }

    /// Resolve the config file (env → default path → defaults) and apply env overrides.
    pub fn load_default() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            info!(target: "config", "no config file found, using defaults");
            Self::default()
        };
        Ok(cfg.apply_env())
    }

    fn normalized(mut self) -> Self {
        self.engine.language = self.engine.language.trim().to_ascii_lowercase();
        self.engine.country = self.engine.country.trim().to_ascii_uppercase();
        if self.history_capacity == 0 {
            warn!(target: "config", "history_capacity = 0, using default");
            self.history_capacity = Self::default().history_capacity;
        }
        self
    }

    /// Single-field overrides from the environment.
    pub fn apply_env(mut self) -> Self {
        if let Some(lang) = non_empty_env(ENV_LANGUAGE) {
            self.engine.language = lang;
        }
        if let Some(country) = non_empty_env(ENV_COUNTRY) {
            self.engine.country = country;
        }
        if let Some(dir) = non_empty_env(ENV_EXPORT_DIR) {
            self.export_dir = Some(PathBuf::from(dir));
        }
        match parse_secs_env(non_empty_env(ENV_SCHEDULE_SECS)) {
            Some(secs) => self.scheduler.interval_secs = Some(secs),
            None if std::env::var(ENV_SCHEDULE_SECS).is_ok() => {
                warn!(target: "config", "{ENV_SCHEDULE_SECS} is not a positive integer, ignoring");
            }
            None => {}
        }
        self.normalized()
    }

    pub fn build_engine(&self) -> Engine {
        Engine::new(
            Router::new(self.router.clone()),
            RevenueEstimator::new(self.revenue.clone()),
            self.engine.clone(),
        )
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// positive integer seconds only
fn parse_secs_env(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}
