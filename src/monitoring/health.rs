//! Network Health Scoring.
//!
//! Combines the five component scores into the composite 0-100 score,
//! maps it onto a qualitative rating, and attaches ranked recommendations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::components::{score_components, ComponentKey, ComponentScores};
use super::recommendations::{generate_recommendations, Recommendation};
use crate::core::config::ScoringConfig;
use crate::core::telemetry::{online_count, NodeTelemetry};
use crate::utils::constants::*;
use crate::utils::math::round_score;

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH RATING
// ═══════════════════════════════════════════════════════════════════════════════

/// Qualitative rating of an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthRating {
    /// Score ≥ 85
    Excellent,
    /// Score ≥ 70
    Good,
    /// Score ≥ 50
    Fair,
    /// Score ≥ 30
    Poor,
    /// Score < 30
    Critical,
}

/// Rating bands as inclusive lower bounds, best first
pub const RATING_TABLE: [(HealthRating, u8); 5] = [
    (HealthRating::Excellent, EXCELLENT_MIN_SCORE),
    (HealthRating::Good, GOOD_MIN_SCORE),
    (HealthRating::Fair, FAIR_MIN_SCORE),
    (HealthRating::Poor, POOR_MIN_SCORE),
    (HealthRating::Critical, 0),
];

impl HealthRating {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthRating::Excellent => "excellent",
            HealthRating::Good => "good",
            HealthRating::Fair => "fair",
            HealthRating::Poor => "poor",
            HealthRating::Critical => "critical",
        }
    }

    /// Convert from score (0-100)
    pub fn from_score(score: u8) -> Self {
        RATING_TABLE
            .iter()
            .find(|(_, min)| score >= *min)
            .map(|(rating, _)| *rating)
            .unwrap_or(HealthRating::Critical)
    }

    /// Get minimum score for this rating
    pub fn min_score(&self) -> u8 {
        RATING_TABLE
            .iter()
            .find(|(rating, _)| rating == self)
            .map(|(_, min)| *min)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for HealthRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NETWORK HEALTH SCORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Complete health report for one node set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkHealthScore {
    /// Overall score (0-100)
    pub overall: u8,
    /// Rating derived from overall
    pub rating: HealthRating,
    /// The five component scores
    pub components: ComponentScores,
    /// Ranked recommendations
    pub recommendations: Vec<Recommendation>,
    /// Nodes in the input
    pub node_count: usize,
    /// Online nodes in the input
    pub online_count: usize,
    /// Latest snapshot instant among the inputs (0 if empty)
    pub timestamp: i64,
}

impl NetworkHealthScore {
    /// Components that are not healthy (below "good")
    pub fn degraded_components(&self) -> Vec<ComponentKey> {
        self.components
            .iter()
            .filter(|c| c.is_insufficient() || round_score(c.score) < GOOD_MIN_SCORE)
            .map(|c| c.key)
            .collect()
    }

    /// Compress into a history point
    pub fn to_history_point(&self) -> HistoryPoint {
        HistoryPoint {
            timestamp: self.timestamp,
            overall: self.overall,
            rating: self.rating,
            components: ComponentValues::from(&self.components),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HISTORY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Component scores without labels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentValues {
    /// Version consensus score
    pub version_consensus: f64,
    /// Network uptime score
    pub network_uptime: f64,
    /// Storage health score
    pub storage_health: f64,
    /// Resource efficiency score
    pub resource_efficiency: f64,
    /// Connectivity score
    pub connectivity: f64,
}

impl ComponentValues {
    /// Get a score by key
    pub fn get(&self, key: ComponentKey) -> f64 {
        match key {
            ComponentKey::VersionConsensus => self.version_consensus,
            ComponentKey::NetworkUptime => self.network_uptime,
            ComponentKey::StorageHealth => self.storage_health,
            ComponentKey::ResourceEfficiency => self.resource_efficiency,
            ComponentKey::Connectivity => self.connectivity,
        }
    }
}

impl From<&ComponentScores> for ComponentValues {
    fn from(scores: &ComponentScores) -> Self {
        Self {
            version_consensus: scores.version_consensus.score,
            network_uptime: scores.network_uptime.score,
            storage_health: scores.storage_health.score,
            resource_efficiency: scores.resource_efficiency.score,
            connectivity: scores.connectivity.score,
        }
    }
}

/// Compressed historical health record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Snapshot instant (unix seconds)
    pub timestamp: i64,
    /// Overall score
    pub overall: u8,
    /// Rating
    pub rating: HealthRating,
    /// Component scores
    pub components: ComponentValues,
}

// ═══════════════════════════════════════════════════════════════════════════════
// AGGREGATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Weighted composite of the components that had data, rounded and clamped.
///
/// Components with insufficient data are left out and the remaining weights
/// rescaled to sum to 100. With no scorable component the composite is 0.
pub fn aggregate(components: &ComponentScores) -> u8 {
    let (weighted, total_weight) = components
        .iter()
        .filter(|c| !c.is_insufficient())
        .fold((0.0, 0u32), |(sum, weight), c| {
            let pct = c.key.weight_pct();
            (sum + c.score * pct as f64, weight + pct as u32)
        });

    if total_weight == 0 {
        return 0;
    }
    round_score(weighted / total_weight as f64)
}

/// Score a node set: components, composite, rating and recommendations
pub fn compute_network_health(nodes: &[NodeTelemetry], config: &ScoringConfig) -> NetworkHealthScore {
    let components = score_components(nodes, config);
    let overall = aggregate(&components);
    let recommendations = generate_recommendations(nodes, &components, config);

    NetworkHealthScore {
        overall,
        rating: HealthRating::from_score(overall),
        components,
        recommendations,
        node_count: nodes.len(),
        online_count: online_count(nodes),
        timestamp: nodes.iter().map(|n| n.timestamp).max().unwrap_or(0),
    }
}

/// Score a node set as a history point at `timestamp`
pub fn compute_history_point(
    timestamp: i64,
    nodes: &[NodeTelemetry],
    config: &ScoringConfig,
) -> HistoryPoint {
    let components = score_components(nodes, config);
    let overall = aggregate(&components);

    HistoryPoint {
        timestamp,
        overall,
        rating: HealthRating::from_score(overall),
        components: ComponentValues::from(&components),
    }
}

/// Group normalized rows by snapshot instant and score each group.
///
/// Output is ordered by timestamp with one point per distinct instant.
pub fn build_history(rows: &[NodeTelemetry], config: &ScoringConfig) -> Vec<HistoryPoint> {
    let mut snapshots: BTreeMap<i64, Vec<NodeTelemetry>> = BTreeMap::new();
    for row in rows {
        snapshots.entry(row.timestamp).or_default().push(row.clone());
    }

    snapshots
        .iter()
        .map(|(ts, nodes)| compute_history_point(*ts, nodes, config))
        .collect()
}
