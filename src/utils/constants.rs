//! Scoring constants and policy tables.
//!
//! Every threshold the engine applies lives here so boundary behaviour can be
//! audited (and asserted in tests) without reading scoring logic.

// ═══════════════════════════════════════════════════════════════════════════════
// TIME CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Seconds per hour
pub const SECS_PER_HOUR: u64 = 3600;

/// Seconds per day
pub const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Uptime at which a node earns the full uptime score - 7 days
pub const DEFAULT_TARGET_UPTIME_SECS: u64 = 7 * SECS_PER_DAY;

// ═══════════════════════════════════════════════════════════════════════════════
// NORMALIZATION DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Version reported when a node does not advertise one
pub const UNKNOWN_VERSION: &str = "unknown";

/// RAM total used when a record omits it (keeps usage ratios finite)
pub const DEFAULT_RAM_TOTAL_BYTES: u64 = 1;

/// Status strings that mark a node as online
pub const ONLINE_STATUSES: &[&str] = &["active", "online"];

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Component weights in percent, in component key order.
/// Version, uptime, storage, resources, connectivity.
pub const COMPONENT_WEIGHTS_PCT: [u8; 5] = [20, 20, 20, 20, 20];

/// Symmetry score given to a node whose packet counters are missing
pub const NEUTRAL_SYMMETRY_SCORE: f64 = 50.0;

/// Share of the storage score driven by distribution evenness
pub const STORAGE_EVENNESS_SHARE: f64 = 80.0;

/// Share of the storage score driven by how many nodes report storage
pub const STORAGE_REPORTING_SHARE: f64 = 20.0;

/// A node holding more than this multiple of the mean commitment is concentrated
pub const STORAGE_CONCENTRATION_FACTOR: f64 = 2.0;

/// Per-node resource headroom below which a node counts as constrained
pub const RESOURCE_HEADROOM_FLOOR: f64 = 50.0;

/// Per-node packet symmetry below which a node counts as poorly connected
pub const SYMMETRY_FLOOR: f64 = 50.0;

// ═══════════════════════════════════════════════════════════════════════════════
// RATING THRESHOLDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum overall score for an "excellent" rating
pub const EXCELLENT_MIN_SCORE: u8 = 85;

/// Minimum overall score for a "good" rating
pub const GOOD_MIN_SCORE: u8 = 70;

/// Minimum overall score for a "fair" rating
pub const FAIR_MIN_SCORE: u8 = 50;

/// Minimum overall score for a "poor" rating; anything lower is critical
pub const POOR_MIN_SCORE: u8 = 30;

// ═══════════════════════════════════════════════════════════════════════════════
// RECOMMENDATION DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Components scoring below this emit a recommendation
pub const DEFAULT_CONCERN_THRESHOLD: f64 = 60.0;

/// Components scoring below this emit a critical recommendation
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 30.0;

/// CPU usage at or above which an online node is flagged
pub const DEFAULT_CPU_OUTLIER_PERCENT: f64 = 90.0;

/// RAM usage at or above which an online node is flagged
pub const DEFAULT_RAM_OUTLIER_PERCENT: f64 = 95.0;

/// Maximum recommendations returned per report
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 10;

// ═══════════════════════════════════════════════════════════════════════════════
// TREND CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Points compared at each end of a series
pub const TREND_WINDOW: usize = 7;

/// Mean difference beyond which a series is improving or declining
pub const TREND_THRESHOLD: f64 = 5.0;

// ═══════════════════════════════════════════════════════════════════════════════
// PER-NODE SCORING
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-node weights in percent: uptime, cpu headroom, packet symmetry
pub const NODE_SCORE_WEIGHTS_PCT: [u8; 3] = [40, 30, 30];

/// How far a past snapshot may sit from the requested offset - 12 hours
pub const DEFAULT_DELTA_TOLERANCE_SECS: u64 = 12 * SECS_PER_HOUR;
