//! Recommendation Engine.
//!
//! Turns weak components and per-node outliers into a ranked, deduplicated
//! list of actionable issues.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::components::{
    majority_version, online_nodes, resource_headroom, storage_eligible, symmetry_or_neutral,
    ComponentKey, ComponentScores, HealthComponent,
};
use crate::core::config::ScoringConfig;
use crate::core::telemetry::NodeTelemetry;
use crate::utils::constants::*;

// ═══════════════════════════════════════════════════════════════════════════════
// SEVERITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity levels for recommendations, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Immediate attention required
    Critical,
    /// Degradation worth acting on
    Warning,
    /// Informational
    Info,
}

impl Severity {
    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECOMMENDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// A single actionable issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Stable identifier, unique within a report
    pub id: String,
    /// Severity level
    pub severity: Severity,
    /// Short title
    pub title: String,
    /// Nodes the issue applies to
    pub affected_node_count: usize,
    /// What an operator should do
    pub suggested_action: String,
    /// Component that raised it; `None` for node-level findings
    pub component: Option<ComponentKey>,
}

impl Recommendation {
    /// Create new recommendation
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        affected_node_count: usize,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            title: title.into(),
            affected_node_count,
            suggested_action: suggested_action.into(),
            component: None,
        }
    }

    /// Attach the originating component
    pub fn for_component(mut self, key: ComponentKey) -> Self {
        self.component = Some(key);
        self
    }

    /// Component rank for ordering; node-level findings sort after components
    fn component_rank(&self) -> usize {
        self.component
            .map(|k| k.index())
            .unwrap_or(ComponentKey::all().len())
    }
}

/// Severity, then affected count descending, then component order, then id
pub fn compare_recommendations(a: &Recommendation, b: &Recommendation) -> Ordering {
    a.severity
        .cmp(&b.severity)
        .then_with(|| b.affected_node_count.cmp(&a.affected_node_count))
        .then_with(|| a.component_rank().cmp(&b.component_rank()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Deduplicate by id (keeping the most severe), sort, and cap
pub fn rank_recommendations(recommendations: Vec<Recommendation>, max: usize) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = Vec::with_capacity(recommendations.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for rec in recommendations {
        match positions.get(&rec.id) {
            Some(&pos) => {
                if rec.severity < ranked[pos].severity {
                    ranked[pos] = rec;
                }
            }
            None => {
                positions.insert(rec.id.clone(), ranked.len());
                ranked.push(rec);
            }
        }
    }

    ranked.sort_by(compare_recommendations);
    ranked.truncate(max);
    ranked
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Build the ranked recommendation list for a scored node set
pub fn generate_recommendations(
    nodes: &[NodeTelemetry],
    components: &ComponentScores,
    config: &ScoringConfig,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = components
        .iter()
        .filter_map(|c| component_recommendation(c, nodes, config))
        .collect();

    recommendations.extend(node_outliers(nodes, config));

    let unknown = online_nodes(nodes).filter(|n| n.has_unknown_version()).count();
    if unknown > 0 {
        recommendations.push(Recommendation::new(
            "unknown-version",
            Severity::Info,
            "Nodes not reporting a version",
            unknown,
            format!("Check the stats endpoint on {} node(s) that do not advertise a version", unknown),
        ));
    }

    rank_recommendations(recommendations, config.max_recommendations)
}

fn component_recommendation(
    component: &HealthComponent,
    nodes: &[NodeTelemetry],
    config: &ScoringConfig,
) -> Option<Recommendation> {
    if component.is_insufficient() {
        return missing_data_recommendation(component.key, nodes, config);
    }
    if component.score >= config.concern_threshold {
        return None;
    }

    let severity = if component.score < config.critical_threshold {
        Severity::Critical
    } else {
        Severity::Warning
    };

    let key = component.key;
    let (title, affected, action) = match key {
        ComponentKey::VersionConsensus => {
            let online = online_nodes(nodes).count();
            let (version, count) = majority_version(nodes).unwrap_or_default();
            let affected = online.saturating_sub(count);
            (
                "Version fragmentation",
                affected,
                format!("Upgrade {} node(s) on minority versions to {}", affected, version),
            )
        }
        ComponentKey::NetworkUptime => {
            let affected = online_nodes(nodes)
                .filter(|n| n.uptime_seconds < config.target_uptime_secs)
                .count();
            let target_days = config.target_uptime_secs as f64 / SECS_PER_DAY as f64;
            (
                "Low network uptime",
                affected,
                format!(
                    "Investigate restarts on {} node(s) below the {:.1}-day uptime target",
                    affected, target_days
                ),
            )
        }
        ComponentKey::StorageHealth => {
            let eligible = storage_eligible(nodes, config.storage_policy);
            let reporting: Vec<u64> = eligible
                .iter()
                .filter(|n| n.reports_storage())
                .map(|n| n.storage_committed_bytes)
                .collect();
            let missing = eligible.len() - reporting.len();
            let mean = reporting.iter().map(|v| *v as f64).sum::<f64>() / reporting.len().max(1) as f64;
            let concentrated = reporting
                .iter()
                .filter(|v| **v as f64 > STORAGE_CONCENTRATION_FACTOR * mean)
                .count();
            (
                "Uneven storage distribution",
                missing + concentrated,
                format!(
                    "Encourage {} node(s) without committed storage to commit capacity; {} node(s) hold over {}x the average",
                    missing, concentrated, STORAGE_CONCENTRATION_FACTOR
                ),
            )
        }
        ComponentKey::ResourceEfficiency => {
            let affected = online_nodes(nodes)
                .filter(|n| resource_headroom(n) < RESOURCE_HEADROOM_FLOOR)
                .count();
            (
                "Resource pressure",
                affected,
                format!("Add CPU/RAM capacity or rebalance load on {} constrained node(s)", affected),
            )
        }
        ComponentKey::Connectivity => {
            let offline = nodes.iter().filter(|n| !n.is_online).count();
            let asymmetric = online_nodes(nodes)
                .filter(|n| symmetry_or_neutral(n) < SYMMETRY_FLOOR)
                .count();
            (
                "Weak network connectivity",
                offline + asymmetric,
                format!(
                    "Bring {} offline node(s) back online and check peering on {} node(s) with unbalanced traffic",
                    offline, asymmetric
                ),
            )
        }
    };

    Some(
        Recommendation::new(format!("{}-low", key.as_str()), severity, title, affected, action)
            .for_component(key),
    )
}

/// A component left without data while nodes are online.
///
/// The composite skips such a component. An empty or fully offline network
/// yields nothing.
fn missing_data_recommendation(
    key: ComponentKey,
    nodes: &[NodeTelemetry],
    config: &ScoringConfig,
) -> Option<Recommendation> {
    let online = online_nodes(nodes).count();
    if online == 0 {
        return None;
    }

    let (title, affected, action) = match key {
        ComponentKey::StorageHealth => {
            let eligible = storage_eligible(nodes, config.storage_policy).len();
            (
                "No committed storage reported".to_string(),
                eligible,
                format!("Check that {} node(s) commit and report storage capacity", eligible),
            )
        }
        _ => (
            format!("No {} data reported", key.label().to_lowercase()),
            online,
            format!("Check the stats endpoint on {} online node(s)", online),
        ),
    };

    Some(
        Recommendation::new(format!("{}-missing", key.as_str()), Severity::Info, title, affected, action)
            .for_component(key),
    )
}

/// Per-node critical findings, independent of component scores
fn node_outliers(nodes: &[NodeTelemetry], config: &ScoringConfig) -> Vec<Recommendation> {
    let mut findings = Vec::new();

    for node in online_nodes(nodes) {
        if node.cpu_percent >= config.cpu_outlier_percent {
            findings.push(Recommendation::new(
                format!("high-cpu:{}", node.id),
                Severity::Critical,
                format!("High CPU on {}", node.id),
                1,
                format!("Reduce load on {} (CPU at {:.0}%)", node.id, node.cpu_percent),
            ));
        }

        // A defaulted RAM total carries no usage information
        if node.ram_total_bytes > DEFAULT_RAM_TOTAL_BYTES
            && node.ram_used_percent() >= config.ram_outlier_percent
        {
            findings.push(Recommendation::new(
                format!("high-memory:{}", node.id),
                Severity::Critical,
                format!("Memory exhaustion on {}", node.id),
                1,
                format!("Free or add memory on {} (RAM at {:.0}%)", node.id, node.ram_used_percent()),
            ));
        }
    }

    findings
}
