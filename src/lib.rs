//! # pNode Health
//!
//! Network health scoring for distributed pNode storage networks.
//!
//! ## Architecture
//!
//! The engine consists of several modules:
//!
//! - **Core**: Node telemetry, the normalization boundary, configuration
//!   and the node directory
//! - **Monitoring**: Component scorers, composite score, recommendations,
//!   trends and the store-backed monitor
//! - **Storage**: The telemetry store seam and its backends
//! - **CLI**: Operator tooling and report rendering
//!
//! Raw, loosely-typed records are sanitized exactly once, in
//! [`core::normalizer`]. Everything downstream works on strict
//! [`NodeTelemetry`](core::telemetry::NodeTelemetry) and never fails on
//! per-node data.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pnode_health::prelude::*;
//!
//! let nodes = normalize_live_collection(&raw_json, now)?;
//! let health = compute_network_health(&nodes, &ScoringConfig::default());
//! println!("{} ({})", health.overall, health.rating);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod cli;
pub mod core;
pub mod error;
pub mod monitoring;
pub mod storage;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        config::{MonitorConfig, ScoringConfig, StoragePolicy},
        directory::NodeDirectory,
        normalizer::{normalize_historical_collection, normalize_live_collection},
        telemetry::NodeTelemetry,
    };
    pub use crate::error::{Error, Result};
    pub use crate::monitoring::{
        analyze_trend, build_history, compute_history_point, compute_network_health,
        compute_node_score, ComponentKey, HealthMonitor, HealthRating, HistoryPoint,
        NetworkHealthScore, Recommendation, Severity, Trend, TrendAnalysis,
    };
    pub use crate::storage::{FileStore, InMemoryStore, TelemetryStore};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
