//! Health monitor service.
//!
//! Wires a [`TelemetryStore`] to the pure scoring pipeline. Every request
//! fetches, normalizes and scores from scratch; nothing is cached.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::health::{build_history, compute_network_health, HistoryPoint, NetworkHealthScore};
use super::node_score::{compute_node_score_with_target, node_score_delta};
use super::trend::{analyze_growth, analyze_trend, GrowthAnalysis, SnapshotRollup, TrendAnalysis};
use crate::core::config::MonitorConfig;
use crate::core::directory::NodeDirectory;
use crate::core::normalizer::{normalize_historical_collection, normalize_live_collection};
use crate::core::telemetry::NodeTelemetry;
use crate::error::{Error, Result};
use crate::storage::TelemetryStore;
use crate::utils::constants::SECS_PER_DAY;

// ═══════════════════════════════════════════════════════════════════════════════
// NODE SCORE REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Current per-node score with day and week comparisons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeScoreReport {
    /// Node identifier
    pub id: String,
    /// Operator from the node directory
    pub manager: Option<String>,
    /// Score now
    pub current: u8,
    /// Score in the snapshot closest to 24h ago
    pub yesterday: Option<u8>,
    /// Score in the snapshot closest to 7d ago
    pub last_week: Option<u8>,
    /// `current - yesterday`
    pub day_delta: Option<i16>,
    /// `current - last_week`
    pub week_delta: Option<i16>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH MONITOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Health monitor over a telemetry store
pub struct HealthMonitor<S: TelemetryStore> {
    store: S,
    config: MonitorConfig,
    directory: NodeDirectory,
}

impl<S: TelemetryStore> HealthMonitor<S> {
    /// Create a monitor
    pub fn new(store: S, config: MonitorConfig, directory: NodeDirectory) -> Self {
        Self {
            store,
            config,
            directory,
        }
    }

    /// Get configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get node directory
    pub fn directory(&self) -> &NodeDirectory {
        &self.directory
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch and normalize the live node listing, stamped with `now`
    pub fn current_nodes(&self, now: i64) -> Result<Vec<NodeTelemetry>> {
        let raw = self.store.live_nodes().inspect_err(|e| {
            warn!(error = %e, "live node fetch failed");
        })?;
        let nodes = normalize_live_collection(&raw, now)?;
        debug!(count = nodes.len(), "fetched live nodes");
        Ok(nodes)
    }

    /// Score the network as it is now
    pub fn current_health(&self, now: i64) -> Result<NetworkHealthScore> {
        let nodes = self.current_nodes(now)?;
        let score = compute_network_health(&nodes, &self.config.scoring);

        info!(
            overall = score.overall,
            rating = %score.rating,
            nodes = score.node_count,
            online = score.online_count,
            "computed network health"
        );
        Ok(score)
    }

    /// Historical health points with `since <= timestamp <= until`
    pub fn history(&self, since: i64, until: i64) -> Result<Vec<HistoryPoint>> {
        let rows = self.fetch_history(since, until)?;
        let points = build_history(&rows, &self.config.scoring);

        if points.is_empty() {
            return Err(Error::NoHistoricalData(format!("no snapshots between {} and {}", since, until)));
        }

        debug!(points = points.len(), rows = rows.len(), "built health history");
        Ok(points)
    }

    /// Trend over the historical window
    pub fn trend(&self, since: i64, until: i64) -> Result<TrendAnalysis> {
        let points = self.history(since, until)?;
        let analysis = analyze_trend(&points)?;
        info!(trend = analysis.trend.as_str(), points = analysis.summary.point_count, "analyzed trend");
        Ok(analysis)
    }

    /// Per-node scores now, a day ago and a week ago.
    ///
    /// Only online nodes are reported. A past score is present only when a
    /// snapshot lies within the configured tolerance of the offset and the
    /// node was online in it. Deltas compare both sides on the fields the
    /// past row carries (see [`node_score_delta`]).
    pub fn node_deltas(&self, now: i64) -> Result<Vec<NodeScoreReport>> {
        let target = self.config.scoring.target_uptime_secs;
        let tolerance = self.config.delta_tolerance_secs as i64;
        let day_ago = now - SECS_PER_DAY as i64;
        let week_ago = now - 7 * SECS_PER_DAY as i64;

        let current = self.current_nodes(now)?;
        let past_rows = self.fetch_history(week_ago - tolerance, day_ago + tolerance)?;

        let mut snapshots: BTreeMap<i64, Vec<NodeTelemetry>> = BTreeMap::new();
        for row in past_rows {
            snapshots.entry(row.timestamp).or_default().push(row);
        }

        let yesterday = closest_snapshot(&snapshots, day_ago, tolerance);
        let last_week = closest_snapshot(&snapshots, week_ago, tolerance);
        debug!(
            snapshots = snapshots.len(),
            has_day = yesterday.is_some(),
            has_week = last_week.is_some(),
            "resolved comparison snapshots"
        );

        let reports = current
            .iter()
            .filter(|n| n.is_online)
            .map(|node| {
                let day = online_in(yesterday, &node.id);
                let week = online_in(last_week, &node.id);

                NodeScoreReport {
                    id: node.id.clone(),
                    manager: self.directory.manager_for(&node.id).map(str::to_string),
                    current: compute_node_score_with_target(node, target),
                    yesterday: day.map(|past| compute_node_score_with_target(past, target)),
                    last_week: week.map(|past| compute_node_score_with_target(past, target)),
                    day_delta: day.map(|past| node_score_delta(node, past, target)),
                    week_delta: week.map(|past| node_score_delta(node, past, target)),
                }
            })
            .collect();

        Ok(reports)
    }

    /// Growth across the daily snapshot rollups
    pub fn growth(&self) -> Result<GrowthAnalysis> {
        let raw = self.store.snapshot_rollups()?;
        let Value::Array(items) = raw else {
            return Err(Error::DataUnavailable("snapshot rollups are not a list".into()));
        };

        let rollups: Vec<SnapshotRollup> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(rollup) => Some(rollup),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed snapshot rollup");
                    None
                }
            })
            .collect();

        analyze_growth(&rollups)
    }

    fn fetch_history(&self, since: i64, until: i64) -> Result<Vec<NodeTelemetry>> {
        let raw = self.store.historical_rows(since, until).inspect_err(|e| {
            warn!(error = %e, "historical fetch failed");
        })?;
        normalize_historical_collection(&raw)
    }
}

/// Snapshot nearest to `target` within `tolerance` (earlier wins a tie)
fn closest_snapshot(
    snapshots: &BTreeMap<i64, Vec<NodeTelemetry>>,
    target: i64,
    tolerance: i64,
) -> Option<&[NodeTelemetry]> {
    let mut best: Option<(i64, &Vec<NodeTelemetry>)> = None;
    for (ts, nodes) in snapshots {
        let distance = (ts - target).abs();
        if distance > tolerance {
            continue;
        }
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, nodes));
        }
    }
    best.map(|(_, nodes)| nodes.as_slice())
}

/// The node's last row in a snapshot, if it was online there
fn online_in<'a>(snapshot: Option<&'a [NodeTelemetry]>, id: &str) -> Option<&'a NodeTelemetry> {
    snapshot?.iter().rev().find(|n| n.id == id).filter(|n| n.is_online)
}
