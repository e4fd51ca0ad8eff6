//! Core modules for the health engine.
//!
//! - Canonical node telemetry
//! - Raw record normalization (live and historical schemas)
//! - Scoring and monitor configuration
//! - Node directory lookups

pub mod config;
pub mod directory;
pub mod normalizer;
pub mod telemetry;

pub use config::*;
pub use directory::*;
pub use normalizer::*;
pub use telemetry::*;
