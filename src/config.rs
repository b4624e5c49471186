//! Run configuration: tier order, category count, slack penalty, solver budget,
//! cost provider and server bind address. Loaded from YAML; every field has a
//! default so an empty file is a valid configuration.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::tier::{normalize_label, TierList, DEFAULT_TIERS};

pub const CONFIG_PATH_ENV: &str = "DISPATCH_CONFIG";
pub const BIND_ENV: &str = "DISPATCH_BIND";

pub const DEFAULT_CATEGORIES: usize = 5;
pub const DEFAULT_SLACK_PENALTY: f64 = 10_000.0;
pub const DEFAULT_TIER_TIME_LIMIT_MS: u64 = 10_000;
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostKind {
    /// Straight-line distance in coordinate units.
    Euclidean,
    /// Great-circle distance in kilometres (or minutes with an average speed).
    Haversine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub kind: CostKind,
    pub average_speed_kmh: Option<f64>,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            kind: CostKind::Euclidean,
            average_speed_kmh: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub tier_time_limit_ms: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tier_time_limit_ms: DEFAULT_TIER_TIME_LIMIT_MS,
        }
    }
}

impl SolverConfig {
    pub fn tier_time_limit(&self) -> Duration {
        Duration::from_millis(self.tier_time_limit_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub tiers: Vec<String>,
    pub categories: usize,
    pub slack_penalty: f64,
    pub solver: SolverConfig,
    pub cost: CostConfig,
    pub server: ServerConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS.iter().map(|t| t.to_string()).collect(),
            categories: DEFAULT_CATEGORIES,
            slack_penalty: DEFAULT_SLACK_PENALTY,
            solver: SolverConfig::default(),
            cost: CostConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read config file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config file: {err}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl DispatchConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).map_err(ConfigError::Parse)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_yaml_str(&raw)
    }

    /// Load from `explicit_path`, else from `$DISPATCH_CONFIG`, else defaults;
    /// then apply `$DISPATCH_BIND`.
    pub fn resolve(explicit_path: Option<&str>) -> Result<Self, ConfigError> {
        let env_path = env::var(CONFIG_PATH_ENV).ok();
        let mut config = match explicit_path.or(env_path.as_deref()) {
            Some(path) => {
                tracing::debug!(path, "loading dispatch config");
                Self::load(path)?
            }
            None => Self::default(),
        };
        if let Ok(bind) = env::var(BIND_ENV) {
            config.server.bind = bind;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::Invalid("tiers must not be empty".to_string()));
        }
        let mut seen: Vec<String> = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            let normalized = normalize_label(tier);
            if normalized.is_empty() {
                return Err(ConfigError::Invalid("tier labels must not be blank".to_string()));
            }
            if seen.contains(&normalized) {
                return Err(ConfigError::Invalid(format!("duplicate tier '{tier}'")));
            }
            seen.push(normalized);
        }
        if self.categories == 0 {
            return Err(ConfigError::Invalid("categories must be at least 1".to_string()));
        }
        if !self.slack_penalty.is_finite() || self.slack_penalty <= 0.0 {
            return Err(ConfigError::Invalid(
                "slack_penalty must be a positive finite number".to_string(),
            ));
        }
        if self.solver.tier_time_limit_ms == 0 {
            return Err(ConfigError::Invalid(
                "solver.tier_time_limit_ms must be positive".to_string(),
            ));
        }
        if let Some(speed) = self.cost.average_speed_kmh {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(ConfigError::Invalid(
                    "cost.average_speed_kmh must be a positive finite number".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn tier_list(&self) -> TierList {
        TierList::new(self.tiers.clone())
    }
}
