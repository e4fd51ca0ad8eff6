//! Network health scoring and monitoring.
//!
//! This module turns normalized node telemetry into health reports:
//! - Component scoring
//! - Composite score and rating
//! - Recommendations
//! - Historical trends and growth
//!
//! # Components
//!
//! - **Components**: The five weighted sub-scores
//! - **Health**: Aggregation, ratings and history points
//! - **Recommendations**: Ranked operator actions
//! - **Trend**: Trend classification over history points and rollups
//! - **Node Score**: Single-node score for deltas
//! - **Service**: Store-backed monitor

pub mod components;
pub mod health;
pub mod node_score;
pub mod recommendations;
pub mod service;
pub mod trend;

pub use components::*;
pub use health::*;
pub use node_score::*;
pub use recommendations::*;
pub use service::*;
pub use trend::*;
