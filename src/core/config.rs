//! Scoring and monitor configuration.
//!
//! Scoring policy (targets, thresholds, storage policy) lives in
//! [`ScoringConfig`]; everything the monitor service needs around it
//! (data location, directory file, delta tolerance) lives in
//! [`MonitorConfig`]. Both load from JSON and can be overlaid from
//! `PNODE_HEALTH_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::constants::*;

// ═══════════════════════════════════════════════════════════════════════════════
// STORAGE POLICY
// ═══════════════════════════════════════════════════════════════════════════════

/// Which nodes contribute to the storage distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoragePolicy {
    /// Only online nodes; private/gossip-only storage is ignored
    #[default]
    OnlineOnly,
    /// Every known node, including offline and private ones
    IncludeOffline,
}

impl std::str::FromStr for StoragePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "online_only" | "online-only" | "online" => Ok(StoragePolicy::OnlineOnly),
            "include_offline" | "include-offline" | "all" => Ok(StoragePolicy::IncludeOffline),
            _ => Err(Error::InvalidParameter {
                name: "storage_policy".into(),
                reason: format!("unknown policy: {}", s),
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCORING CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Tunable scoring policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Uptime that earns a full uptime score (seconds)
    pub target_uptime_secs: u64,
    /// Components below this score produce a recommendation
    pub concern_threshold: f64,
    /// Components below this score produce a critical recommendation
    pub critical_threshold: f64,
    /// CPU usage that flags an online node
    pub cpu_outlier_percent: f64,
    /// RAM usage that flags an online node
    pub ram_outlier_percent: f64,
    /// Recommendation list cap
    pub max_recommendations: usize,
    /// Storage distribution eligibility
    pub storage_policy: StoragePolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_uptime_secs: DEFAULT_TARGET_UPTIME_SECS,
            concern_threshold: DEFAULT_CONCERN_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            cpu_outlier_percent: DEFAULT_CPU_OUTLIER_PERCENT,
            ram_outlier_percent: DEFAULT_RAM_OUTLIER_PERCENT,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            storage_policy: StoragePolicy::OnlineOnly,
        }
    }
}

impl ScoringConfig {
    /// Set uptime target
    pub fn with_target_uptime(mut self, secs: u64) -> Self {
        self.target_uptime_secs = secs;
        self
    }

    /// Set storage policy
    pub fn with_storage_policy(mut self, policy: StoragePolicy) -> Self {
        self.storage_policy = policy;
        self
    }

    /// Validate parameters are consistent
    pub fn validate(&self) -> Result<()> {
        if self.target_uptime_secs == 0 {
            return Err(invalid("target_uptime_secs", "must be greater than 0"));
        }

        for (name, value) in [
            ("concern_threshold", self.concern_threshold),
            ("critical_threshold", self.critical_threshold),
            ("cpu_outlier_percent", self.cpu_outlier_percent),
            ("ram_outlier_percent", self.ram_outlier_percent),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(invalid(name, "must be within [0, 100]"));
            }
        }

        if self.critical_threshold > self.concern_threshold {
            return Err(invalid("critical_threshold", "must not exceed concern_threshold"));
        }

        if self.max_recommendations == 0 {
            return Err(invalid("max_recommendations", "must be greater than 0"));
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MONITOR CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Monitor service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Scoring policy
    pub scoring: ScoringConfig,
    /// Directory holding exported telemetry files
    pub data_dir: PathBuf,
    /// Optional pubkey → manager mapping file
    pub directory_file: Option<PathBuf>,
    /// How far a past snapshot may be from the requested delta offset
    pub delta_tolerance_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            data_dir: PathBuf::from("data"),
            directory_file: None,
            delta_tolerance_secs: DEFAULT_DELTA_TOLERANCE_SECS,
        }
    }
}

impl MonitorConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Config(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Overlay values from environment variables
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from a variable lookup (environment or test map)
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("PNODE_HEALTH_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(file) = lookup("PNODE_HEALTH_DIRECTORY_FILE") {
            self.directory_file = Some(PathBuf::from(file));
        }

        if let Some(secs) = lookup("PNODE_HEALTH_TARGET_UPTIME_SECS") {
            self.scoring.target_uptime_secs = parse_var("PNODE_HEALTH_TARGET_UPTIME_SECS", &secs)?;
        }

        if let Some(threshold) = lookup("PNODE_HEALTH_CONCERN_THRESHOLD") {
            self.scoring.concern_threshold = parse_var("PNODE_HEALTH_CONCERN_THRESHOLD", &threshold)?;
        }

        if let Some(max) = lookup("PNODE_HEALTH_MAX_RECOMMENDATIONS") {
            self.scoring.max_recommendations = parse_var("PNODE_HEALTH_MAX_RECOMMENDATIONS", &max)?;
        }

        if let Some(policy) = lookup("PNODE_HEALTH_STORAGE_POLICY") {
            self.scoring.storage_policy = policy.parse()?;
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;

        if self.data_dir.as_os_str().is_empty() {
            return Err(invalid("data_dir", "cannot be empty"));
        }

        Ok(())
    }
}

fn invalid(name: &str, reason: &str) -> Error {
    Error::InvalidParameter {
        name: name.into(),
        reason: reason.into(),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidParameter {
        name: name.into(),
        reason: format!("cannot parse {:?}", value),
    })
}
