//! Historical Trend Analysis.
//!
//! Classifies a series of composite scores as improving, stable, declining
//! or unknown, and exposes the per-timestamp series for charting. A second
//! entry point works directly on daily snapshot rollups.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::components::ComponentKey;
use super::health::HistoryPoint;
use crate::error::{Error, Result};
use crate::utils::constants::{TREND_THRESHOLD, TREND_WINDOW};
use crate::utils::math::{mean, non_negative_finite};

// ═══════════════════════════════════════════════════════════════════════════════
// TREND
// ═══════════════════════════════════════════════════════════════════════════════

/// Direction of a score series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Recent window averages more than the threshold above the early window
    Improving,
    /// Windows within the threshold of each other
    Stable,
    /// Recent window averages more than the threshold below the early window
    Declining,
    /// Too few points to compare windows
    Unknown,
}

impl Trend {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
            Trend::Unknown => "unknown",
        }
    }
}

/// Compare the mean of the first and last windows of a series
fn window_means(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < TREND_WINDOW {
        return None;
    }
    let first = mean(&values[..TREND_WINDOW])?;
    let last = mean(&values[values.len() - TREND_WINDOW..])?;
    Some((first, last))
}

/// Classify an ordered series of scores
pub fn classify_trend(values: &[f64]) -> Trend {
    match window_means(values) {
        Some((first, last)) if last - first > TREND_THRESHOLD => Trend::Improving,
        Some((first, last)) if last - first < -TREND_THRESHOLD => Trend::Declining,
        Some(_) => Trend::Stable,
        None => Trend::Unknown,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREND ANALYSIS
// ═══════════════════════════════════════════════════════════════════════════════

/// Summary statistics and chart series for a history window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Distinct snapshots analyzed
    pub point_count: usize,
    /// Mean of the first window, when there are enough points
    pub first_window_mean: Option<f64>,
    /// Mean of the last window, when there are enough points
    pub last_window_mean: Option<f64>,
    /// `last_window_mean - first_window_mean`
    pub delta: Option<f64>,
    /// Lowest overall score
    pub min: u8,
    /// Highest overall score
    pub max: u8,
    /// Most recent overall score
    pub latest: u8,
    /// Points ordered by timestamp, one per instant
    pub series: Vec<HistoryPoint>,
}

impl TrendSummary {
    /// `(timestamp, overall)` pairs for charting
    pub fn overall_series(&self) -> Vec<(i64, u8)> {
        self.series.iter().map(|p| (p.timestamp, p.overall)).collect()
    }

    /// `(timestamp, score)` pairs for one component
    pub fn component_series(&self, key: ComponentKey) -> Vec<(i64, f64)> {
        self.series
            .iter()
            .map(|p| (p.timestamp, p.components.get(key)))
            .collect()
    }
}

/// Trend plus summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Classified direction
    pub trend: Trend,
    /// Supporting numbers and series
    pub summary: TrendSummary,
}

/// Sort by timestamp and keep one point per instant (the last one given)
pub fn dedupe_by_timestamp(points: &[HistoryPoint]) -> Vec<HistoryPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.timestamp);

    let mut deduped: Vec<HistoryPoint> = Vec::with_capacity(sorted.len());
    for point in sorted {
        match deduped.last_mut() {
            Some(last) if last.timestamp == point.timestamp => *last = point,
            _ => deduped.push(point),
        }
    }
    deduped
}

/// Analyze a set of history points.
///
/// Fails with [`Error::NoHistoricalData`] when `points` is empty; any
/// non-empty input yields a trend (possibly `Unknown`).
pub fn analyze_trend(points: &[HistoryPoint]) -> Result<TrendAnalysis> {
    let series = dedupe_by_timestamp(points);
    let Some(latest) = series.last().map(|p| p.overall) else {
        return Err(Error::NoHistoricalData("trend analysis".into()));
    };

    let scores: Vec<f64> = series.iter().map(|p| p.overall as f64).collect();
    let means = window_means(&scores);

    let summary = TrendSummary {
        point_count: series.len(),
        first_window_mean: means.map(|(first, _)| first),
        last_window_mean: means.map(|(_, last)| last),
        delta: means.map(|(first, last)| last - first),
        min: series.iter().map(|p| p.overall).min().unwrap_or(0),
        max: series.iter().map(|p| p.overall).max().unwrap_or(0),
        latest,
        series,
    };

    Ok(TrendAnalysis {
        trend: classify_trend(&scores),
        summary,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// SNAPSHOT GROWTH
// ═══════════════════════════════════════════════════════════════════════════════

/// Daily network rollup maintained by the snapshot job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRollup {
    /// Calendar day of the rollup
    pub snapshot_date: NaiveDate,
    /// Nodes active that day
    #[serde(default)]
    pub active_nodes: u64,
    /// Storage pages across the network
    #[serde(default)]
    pub total_pages: u64,
    /// Health score recorded for the day, if one was computed
    #[serde(default)]
    pub network_health_score: Option<f64>,
}

/// Growth over a rollup window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthAnalysis {
    /// Distinct days analyzed
    pub days: usize,
    /// First day in the window
    pub first_date: NaiveDate,
    /// Last day in the window
    pub last_date: NaiveDate,
    /// Active node change first → last, percent; `None` if the first count is 0
    pub node_growth_percent: Option<f64>,
    /// Average active node change per calendar day
    pub avg_daily_node_change: f64,
    /// Page change first → last, percent; `None` if the first count is 0
    pub page_growth_percent: Option<f64>,
    /// Trend of the recorded health scores
    pub health_trend: Trend,
}

fn growth_percent(first: u64, last: u64) -> Option<f64> {
    if first == 0 {
        return None;
    }
    Some((last as f64 - first as f64) / first as f64 * 100.0)
}

/// Analyze growth across daily rollups.
///
/// Rollups are ordered by date and deduplicated (last one per day wins).
pub fn analyze_growth(rollups: &[SnapshotRollup]) -> Result<GrowthAnalysis> {
    let mut sorted = rollups.to_vec();
    sorted.sort_by_key(|r| r.snapshot_date);

    let mut days: Vec<SnapshotRollup> = Vec::with_capacity(sorted.len());
    for rollup in sorted {
        match days.last_mut() {
            Some(last) if last.snapshot_date == rollup.snapshot_date => *last = rollup,
            _ => days.push(rollup),
        }
    }

    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return Err(Error::NoHistoricalData("snapshot rollups".into()));
    };

    let span_days = (last.snapshot_date - first.snapshot_date).num_days();
    let avg_daily_node_change = if span_days > 0 {
        (last.active_nodes as f64 - first.active_nodes as f64) / span_days as f64
    } else {
        0.0
    };

    let health_scores: Vec<f64> = days
        .iter()
        .filter_map(|d| d.network_health_score)
        .filter(|s| s.is_finite())
        .map(non_negative_finite)
        .collect();

    Ok(GrowthAnalysis {
        days: days.len(),
        first_date: first.snapshot_date,
        last_date: last.snapshot_date,
        node_growth_percent: growth_percent(first.active_nodes, last.active_nodes),
        avg_daily_node_change,
        page_growth_percent: growth_percent(first.total_pages, last.total_pages),
        health_trend: classify_trend(&health_scores),
    })
}
