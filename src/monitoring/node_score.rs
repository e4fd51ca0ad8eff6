//! Per-Node Scoring.
//!
//! A single-node 0-100 score used for day-over-day and week-over-week
//! deltas. It deliberately needs no network context (no version consensus,
//! no storage distribution) so any one row can be scored on its own.
//!
//! Weights: uptime 40%, CPU headroom 30%, packet symmetry 30%.

use super::components::uptime_score;
use crate::core::telemetry::NodeTelemetry;
use crate::utils::constants::{DEFAULT_TARGET_UPTIME_SECS, NEUTRAL_SYMMETRY_SCORE, NODE_SCORE_WEIGHTS_PCT};
use crate::utils::math::{clamp_percent, round_score};

/// Score a node against the default uptime target
pub fn compute_node_score(node: &NodeTelemetry) -> u8 {
    compute_node_score_with_target(node, DEFAULT_TARGET_UPTIME_SECS)
}

/// Score a node against a custom uptime target.
///
/// Offline nodes score 0; callers exclude them from averages rather than
/// averaging the zero in.
pub fn compute_node_score_with_target(node: &NodeTelemetry, target_uptime_secs: u64) -> u8 {
    if !node.is_online {
        return 0;
    }

    let uptime = uptime_score(node, target_uptime_secs);
    let cpu_headroom = 100.0 - clamp_percent(node.cpu_percent);
    let symmetry = node.packet_symmetry().unwrap_or(NEUTRAL_SYMMETRY_SCORE);

    let [w_uptime, w_cpu, w_symmetry] = NODE_SCORE_WEIGHTS_PCT.map(|w| w as f64);
    round_score((uptime * w_uptime + cpu_headroom * w_cpu + symmetry * w_symmetry) / 100.0)
}

/// `current - past`, scored on the fields both snapshots carry.
///
/// Historical rows often lack packet counters. When `past` has no symmetry
/// the current node is scored with neutral symmetry too, so the delta
/// reflects uptime and CPU movement only.
pub fn node_score_delta(current: &NodeTelemetry, past: &NodeTelemetry, target_uptime_secs: u64) -> i16 {
    let past_score = compute_node_score_with_target(past, target_uptime_secs) as i16;
    let current_score = if past.packet_symmetry().is_none() {
        let comparable = current.clone().with_packets(0, 0);
        compute_node_score_with_target(&comparable, target_uptime_secs)
    } else {
        compute_node_score_with_target(current, target_uptime_secs)
    };
    current_score as i16 - past_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online(id: &str) -> NodeTelemetry {
        NodeTelemetry::new(id, 0).with_online(true)
    }

    #[test]
    fn test_offline_scores_zero() {
        let node = NodeTelemetry::new("a", 0)
            .with_uptime(DEFAULT_TARGET_UPTIME_SECS)
            .with_packets(10, 10);
        assert_eq!(compute_node_score(&node), 0);
    }

    #[test]
    fn test_perfect_node() {
        let node = online("a")
            .with_uptime(DEFAULT_TARGET_UPTIME_SECS * 3)
            .with_packets(10, 10);
        assert_eq!(compute_node_score(&node), 100);
    }

    #[test]
    fn test_weighting() {
        // uptime 50 * 0.4 + cpu headroom 60 * 0.3 + neutral symmetry 50 * 0.3 = 53
        let node = online("a")
            .with_uptime(DEFAULT_TARGET_UPTIME_SECS / 2)
            .with_cpu(40.0);
        assert_eq!(compute_node_score(&node), 53);
    }

    #[test]
    fn test_fresh_online_node() {
        // Only neutral symmetry and full cpu headroom: 0 + 30 + 15
        assert_eq!(compute_node_score(&online("a")), 45);
    }

    #[test]
    fn test_custom_target() {
        let node = online("a").with_uptime(3_600).with_packets(1, 1);
        assert_eq!(compute_node_score_with_target(&node, 3_600), 100);
        assert!(compute_node_score(&node) < 100);
    }

    #[test]
    fn test_delta_with_matching_schemas() {
        let past = online("a").with_uptime(DEFAULT_TARGET_UPTIME_SECS).with_cpu(50.0).with_packets(1, 1);
        let current = online("a").with_uptime(DEFAULT_TARGET_UPTIME_SECS).with_cpu(10.0).with_packets(1, 1);
        // 85 -> 97
        assert_eq!(node_score_delta(&current, &past, DEFAULT_TARGET_UPTIME_SECS), 12);
    }

    #[test]
    fn test_delta_ignores_symmetry_missing_from_past() {
        let past = online("a").with_uptime(DEFAULT_TARGET_UPTIME_SECS).with_cpu(10.0);
        let current = past.clone().with_packets(100, 100);

        assert_eq!(compute_node_score(&past), 82);
        assert_eq!(compute_node_score(&current), 97);
        assert_eq!(node_score_delta(&current, &past, DEFAULT_TARGET_UPTIME_SECS), 0);
    }

    #[test]
    fn test_delta_from_offline_past() {
        let past = NodeTelemetry::new("a", 0).with_packets(1, 1);
        let current = online("a").with_uptime(DEFAULT_TARGET_UPTIME_SECS).with_packets(1, 1);
        assert_eq!(node_score_delta(&current, &past, DEFAULT_TARGET_UPTIME_SECS), 100);
    }
}
