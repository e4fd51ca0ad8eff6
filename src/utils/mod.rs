//! Utility modules for the health engine.
//!
//! - Constants and policy tables
//! - Numeric helpers used by the scorers

pub mod constants;
pub mod math;

pub use constants::*;
pub use math::*;
