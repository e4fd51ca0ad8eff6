//! Component Scorers.
//!
//! Five independent scorers, each mapping a node set to one
//! [`HealthComponent`]. They are pure: no I/O, no shared state, and no
//! iteration over hash maps, so identical input yields bit-identical output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::health::HealthRating;
use crate::core::config::{ScoringConfig, StoragePolicy};
use crate::core::telemetry::NodeTelemetry;
use crate::utils::constants::*;
use crate::utils::math::{clamp_percent, gini, mean, round_score};

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// The five weighted sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKey {
    /// Share of online nodes on the dominant version
    VersionConsensus,
    /// Uptime relative to target
    NetworkUptime,
    /// Evenness of committed storage
    StorageHealth,
    /// CPU and RAM headroom
    ResourceEfficiency,
    /// Online ratio and packet balance
    Connectivity,
}

impl ComponentKey {
    /// Get all components in stable order
    pub fn all() -> &'static [ComponentKey] {
        &[
            ComponentKey::VersionConsensus,
            ComponentKey::NetworkUptime,
            ComponentKey::StorageHealth,
            ComponentKey::ResourceEfficiency,
            ComponentKey::Connectivity,
        ]
    }

    /// Position in the stable component order
    pub fn index(&self) -> usize {
        match self {
            ComponentKey::VersionConsensus => 0,
            ComponentKey::NetworkUptime => 1,
            ComponentKey::StorageHealth => 2,
            ComponentKey::ResourceEfficiency => 3,
            ComponentKey::Connectivity => 4,
        }
    }

    /// Weight in percent (from the constant table)
    pub fn weight_pct(&self) -> u8 {
        COMPONENT_WEIGHTS_PCT[self.index()]
    }

    /// Weight as a fraction in (0, 1]
    pub fn weight(&self) -> f64 {
        self.weight_pct() as f64 / 100.0
    }

    /// Machine key
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKey::VersionConsensus => "version_consensus",
            ComponentKey::NetworkUptime => "network_uptime",
            ComponentKey::StorageHealth => "storage_health",
            ComponentKey::ResourceEfficiency => "resource_efficiency",
            ComponentKey::Connectivity => "connectivity",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKey::VersionConsensus => "Version Consensus",
            ComponentKey::NetworkUptime => "Network Uptime",
            ComponentKey::StorageHealth => "Storage Health",
            ComponentKey::ResourceEfficiency => "Resource Efficiency",
            ComponentKey::Connectivity => "Network Connectivity",
        }
    }

    /// Get description
    pub fn description(&self) -> &'static str {
        match self {
            ComponentKey::VersionConsensus => "Online nodes running the most common version",
            ComponentKey::NetworkUptime => "Average uptime of online nodes against the target",
            ComponentKey::StorageHealth => "How evenly committed storage is spread across nodes",
            ComponentKey::ResourceEfficiency => "CPU and RAM headroom on online nodes",
            ComponentKey::Connectivity => "Online ratio and send/receive packet balance",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT STATUS
// ═══════════════════════════════════════════════════════════════════════════════

/// Status of a single component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
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
    /// No nodes qualified for this component
    InsufficientData,
}

impl ComponentStatus {
    /// Status for a computed score
    pub fn from_score(score: f64) -> Self {
        match HealthRating::from_score(round_score(score)) {
            HealthRating::Excellent => ComponentStatus::Excellent,
            HealthRating::Good => ComponentStatus::Good,
            HealthRating::Fair => ComponentStatus::Fair,
            HealthRating::Poor => ComponentStatus::Poor,
            HealthRating::Critical => ComponentStatus::Critical,
        }
    }

    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Excellent => "excellent",
            ComponentStatus::Good => "good",
            ComponentStatus::Fair => "fair",
            ComponentStatus::Poor => "poor",
            ComponentStatus::Critical => "critical",
            ComponentStatus::InsufficientData => "insufficient data",
        }
    }

    /// Display color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            ComponentStatus::Excellent => "#10b981",
            ComponentStatus::Good => "#22c55e",
            ComponentStatus::Fair => "#eab308",
            ComponentStatus::Poor => "#f97316",
            ComponentStatus::Critical => "#ef4444",
            ComponentStatus::InsufficientData => "#6b7280",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH COMPONENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Score for a single health component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthComponent {
    /// Component key
    pub key: ComponentKey,
    /// Display label
    pub label: String,
    /// Score in [0, 100]
    pub score: f64,
    /// Weight in (0, 1]
    pub weight: f64,
    /// Display color
    pub color: String,
    /// Status derived from score
    pub status: ComponentStatus,
}

impl HealthComponent {
    /// Component with a computed score
    pub fn scored(key: ComponentKey, score: f64) -> Self {
        let score = clamp_percent(score);
        let status = ComponentStatus::from_score(score);
        Self::build(key, score, status)
    }

    /// Component that had nothing to score
    pub fn insufficient(key: ComponentKey) -> Self {
        Self::build(key, 0.0, ComponentStatus::InsufficientData)
    }

    fn build(key: ComponentKey, score: f64, status: ComponentStatus) -> Self {
        Self {
            key,
            label: key.label().to_string(),
            score,
            weight: key.weight(),
            color: status.color().to_string(),
            status,
        }
    }

    /// Whether the component had no qualifying nodes
    pub fn is_insufficient(&self) -> bool {
        self.status == ComponentStatus::InsufficientData
    }
}

/// The five components of one health computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    /// Version consensus
    pub version_consensus: HealthComponent,
    /// Network uptime
    pub network_uptime: HealthComponent,
    /// Storage health
    pub storage_health: HealthComponent,
    /// Resource efficiency
    pub resource_efficiency: HealthComponent,
    /// Network connectivity
    pub connectivity: HealthComponent,
}

impl ComponentScores {
    /// Get a component by key
    pub fn get(&self, key: ComponentKey) -> &HealthComponent {
        match key {
            ComponentKey::VersionConsensus => &self.version_consensus,
            ComponentKey::NetworkUptime => &self.network_uptime,
            ComponentKey::StorageHealth => &self.storage_health,
            ComponentKey::ResourceEfficiency => &self.resource_efficiency,
            ComponentKey::Connectivity => &self.connectivity,
        }
    }

    /// Iterate in stable key order
    pub fn iter(&self) -> impl Iterator<Item = &HealthComponent> {
        ComponentKey::all().iter().map(move |k| self.get(*k))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCORERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Run all five scorers
pub fn score_components(nodes: &[NodeTelemetry], config: &ScoringConfig) -> ComponentScores {
    ComponentScores {
        version_consensus: score_version_consensus(nodes),
        network_uptime: score_network_uptime(nodes, config.target_uptime_secs),
        storage_health: score_storage_health(nodes, config.storage_policy),
        resource_efficiency: score_resource_efficiency(nodes),
        connectivity: score_connectivity(nodes),
    }
}

/// Share of online nodes on the most common version
pub fn score_version_consensus(nodes: &[NodeTelemetry]) -> HealthComponent {
    let key = ComponentKey::VersionConsensus;
    let online = online_nodes(nodes).count();

    match majority_version(nodes) {
        Some((_, count)) if online > 0 => {
            HealthComponent::scored(key, count as f64 / online as f64 * 100.0)
        }
        _ => HealthComponent::insufficient(key),
    }
}

/// Mean uptime ratio of online nodes, offline nodes excluded
pub fn score_network_uptime(nodes: &[NodeTelemetry], target_uptime_secs: u64) -> HealthComponent {
    let ratios: Vec<f64> = online_nodes(nodes)
        .map(|n| uptime_score(n, target_uptime_secs))
        .collect();

    match mean(&ratios) {
        Some(score) => HealthComponent::scored(ComponentKey::NetworkUptime, score),
        None => HealthComponent::insufficient(ComponentKey::NetworkUptime),
    }
}

/// Evenness of committed storage among eligible reporting nodes.
///
/// `80 * (1 - gini) + 20 * reporting / eligible`; nodes with zero committed
/// storage stay out of the distribution but count as eligible.
pub fn score_storage_health(nodes: &[NodeTelemetry], policy: StoragePolicy) -> HealthComponent {
    let key = ComponentKey::StorageHealth;
    let eligible = storage_eligible(nodes, policy);
    let committed: Vec<u64> = eligible
        .iter()
        .filter(|n| n.reports_storage())
        .map(|n| n.storage_committed_bytes)
        .collect();

    if committed.is_empty() {
        return HealthComponent::insufficient(key);
    }

    let evenness = 1.0 - gini(&committed);
    let reporting_share = committed.len() as f64 / eligible.len() as f64;
    HealthComponent::scored(
        key,
        STORAGE_EVENNESS_SHARE * evenness + STORAGE_REPORTING_SHARE * reporting_share,
    )
}

/// Mean CPU/RAM headroom across online nodes
pub fn score_resource_efficiency(nodes: &[NodeTelemetry]) -> HealthComponent {
    let headroom: Vec<f64> = online_nodes(nodes).map(resource_headroom).collect();

    match mean(&headroom) {
        Some(score) => HealthComponent::scored(ComponentKey::ResourceEfficiency, score),
        None => HealthComponent::insufficient(ComponentKey::ResourceEfficiency),
    }
}

/// Half online ratio, half mean packet symmetry of online nodes
pub fn score_connectivity(nodes: &[NodeTelemetry]) -> HealthComponent {
    let symmetry: Vec<f64> = online_nodes(nodes).map(symmetry_or_neutral).collect();

    match mean(&symmetry) {
        Some(mean_symmetry) => {
            let online_ratio = symmetry.len() as f64 / nodes.len() as f64 * 100.0;
            HealthComponent::scored(
                ComponentKey::Connectivity,
                0.5 * online_ratio + 0.5 * mean_symmetry,
            )
        }
        None => HealthComponent::insufficient(ComponentKey::Connectivity),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PER-NODE HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Online nodes in input order
pub fn online_nodes(nodes: &[NodeTelemetry]) -> impl Iterator<Item = &NodeTelemetry> {
    nodes.iter().filter(|n| n.is_online)
}

/// Most common version among online nodes and its count.
/// Ties resolve to the lexicographically smallest version.
pub fn majority_version(nodes: &[NodeTelemetry]) -> Option<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for node in online_nodes(nodes) {
        *counts.entry(node.version.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (version, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((version, count)),
        })
        .map(|(version, count)| (version.to_string(), count))
}

/// `min(uptime / target, 1) * 100`
pub fn uptime_score(node: &NodeTelemetry, target_uptime_secs: u64) -> f64 {
    if target_uptime_secs == 0 {
        return 100.0;
    }
    (node.uptime_seconds as f64 / target_uptime_secs as f64).min(1.0) * 100.0
}

/// Equal blend of CPU headroom and RAM headroom
pub fn resource_headroom(node: &NodeTelemetry) -> f64 {
    let cpu_headroom = 100.0 - clamp_percent(node.cpu_percent);
    let ram_headroom = 100.0 - node.ram_used_percent();
    0.5 * cpu_headroom + 0.5 * ram_headroom
}

/// Packet symmetry, or the neutral score when counters are missing
pub fn symmetry_or_neutral(node: &NodeTelemetry) -> f64 {
    node.packet_symmetry().unwrap_or(NEUTRAL_SYMMETRY_SCORE)
}

/// Nodes whose storage counts under the given policy
pub fn storage_eligible(nodes: &[NodeTelemetry], policy: StoragePolicy) -> Vec<&NodeTelemetry> {
    match policy {
        StoragePolicy::OnlineOnly => online_nodes(nodes).collect(),
        StoragePolicy::IncludeOffline => nodes.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1 << 30;

    fn online(id: &str) -> NodeTelemetry {
        NodeTelemetry::new(id, 1_000).with_online(true)
    }

    #[test]
    fn test_component_weights() {
        let total: u32 = ComponentKey::all().iter().map(|c| c.weight_pct() as u32).sum();
        assert_eq!(total, 100);
        assert!(ComponentKey::all().iter().all(|c| c.weight() > 0.0 && c.weight() <= 1.0));
    }

    #[test]
    fn test_empty_input_is_insufficient() {
        let scores = score_components(&[], &ScoringConfig::default());
        for component in scores.iter() {
            assert!(component.is_insufficient(), "{:?}", component.key);
            assert_eq!(component.score, 0.0);
            assert_eq!(component.status.as_str(), "insufficient data");
        }
    }

    #[test]
    fn test_all_offline_is_insufficient() {
        let nodes = vec![
            NodeTelemetry::new("a", 0).with_storage(GIB),
            NodeTelemetry::new("b", 0).with_uptime(1_000_000),
        ];
        let scores = score_components(&nodes, &ScoringConfig::default());
        assert!(scores.iter().all(|c| c.is_insufficient()));
    }

    #[test]
    fn test_version_consensus() {
        let nodes = vec![
            online("a").with_version("1.2.0"),
            online("b").with_version("1.2.0"),
            online("c").with_version("1.2.0"),
            online("d").with_version("1.1.0"),
            // Offline nodes do not vote
            NodeTelemetry::new("e", 0).with_version("0.9.0"),
        ];

        let component = score_version_consensus(&nodes);
        assert_eq!(component.score, 75.0);
        assert_eq!(component.status, ComponentStatus::Good);
        assert_eq!(majority_version(&nodes), Some(("1.2.0".to_string(), 3)));
    }

    #[test]
    fn test_majority_version_tie_is_deterministic() {
        let nodes = vec![online("a").with_version("2.0"), online("b").with_version("1.0")];
        assert_eq!(majority_version(&nodes), Some(("1.0".to_string(), 1)));
    }

    #[test]
    fn test_network_uptime_excludes_offline() {
        let target = DEFAULT_TARGET_UPTIME_SECS;
        let nodes = vec![
            online("a").with_uptime(target * 2),
            online("b").with_uptime(target / 2),
            NodeTelemetry::new("c", 0),
        ];

        let component = score_network_uptime(&nodes, target);
        assert_eq!(component.score, 75.0);
    }

    #[test]
    fn test_storage_even_distribution() {
        let nodes: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| online(id).with_storage(10 * GIB))
            .collect();

        let component = score_storage_health(&nodes, StoragePolicy::OnlineOnly);
        assert!((component.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_storage_concentration_lowers_score() {
        let even: Vec<_> = (0..4).map(|i| online(&i.to_string()).with_storage(GIB)).collect();
        let skewed = vec![
            online("a").with_storage(GIB),
            online("b").with_storage(GIB),
            online("c").with_storage(GIB),
            online("d").with_storage(100 * GIB),
        ];

        let even_score = score_storage_health(&even, StoragePolicy::OnlineOnly).score;
        let skewed_score = score_storage_health(&skewed, StoragePolicy::OnlineOnly).score;
        assert!(skewed_score < even_score);
    }

    #[test]
    fn test_storage_non_reporting_nodes_count_as_present() {
        let nodes = vec![online("a").with_storage(GIB), online("b")];

        // Single reporting value: evenness 1.0, reporting share 1/2
        let component = score_storage_health(&nodes, StoragePolicy::OnlineOnly);
        assert!((component.score - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_storage_policy_controls_private_nodes() {
        let nodes = vec![online("a").with_storage(GIB), NodeTelemetry::new("private", 0).with_storage(GIB)];

        let online_only = score_storage_health(&nodes, StoragePolicy::OnlineOnly);
        let all = score_storage_health(&nodes, StoragePolicy::IncludeOffline);
        assert_eq!(storage_eligible(&nodes, StoragePolicy::OnlineOnly).len(), 1);
        assert_eq!(storage_eligible(&nodes, StoragePolicy::IncludeOffline).len(), 2);
        assert!((online_only.score - 100.0).abs() < 1e-9);
        assert!((all.score - 100.0).abs() < 1e-9);

        let only_private = vec![online("a"), NodeTelemetry::new("private", 0).with_storage(GIB)];
        assert!(score_storage_health(&only_private, StoragePolicy::OnlineOnly).is_insufficient());
        assert!(!score_storage_health(&only_private, StoragePolicy::IncludeOffline).is_insufficient());
    }

    #[test]
    fn test_resource_efficiency() {
        let nodes = vec![
            online("a").with_cpu(20.0).with_ram(2 * GIB, 8 * GIB),
            online("b").with_cpu(60.0).with_ram(6 * GIB, 8 * GIB),
        ];

        // a: 0.5*80 + 0.5*75 = 77.5, b: 0.5*40 + 0.5*25 = 32.5
        let component = score_resource_efficiency(&nodes);
        assert!((component.score - 55.0).abs() < 1e-9);
        assert_eq!(component.status, ComponentStatus::Fair);
    }

    #[test]
    fn test_connectivity() {
        let nodes = vec![
            online("a").with_packets(1000, 1000),
            online("b"),
            NodeTelemetry::new("c", 0),
            NodeTelemetry::new("d", 0),
        ];

        // online ratio 50; symmetry mean (100 + 50) / 2 = 75
        let component = score_connectivity(&nodes);
        assert!((component.score - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(HealthComponent::scored(ComponentKey::NetworkUptime, 90.0).color, "#10b981");
        assert_eq!(HealthComponent::insufficient(ComponentKey::NetworkUptime).color, "#6b7280");
        assert_eq!(HealthComponent::scored(ComponentKey::NetworkUptime, 10.0).status, ComponentStatus::Critical);
    }
}
