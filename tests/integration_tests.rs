//! Integration tests for the pNode health engine.
//!
//! These tests drive raw JSON through normalization, scoring, history and
//! the store-backed monitor.

use std::fs;

use proptest::prelude::*;
use serde_json::{json, Value};

use pnode_health::cli::{open_monitor, OutputFormat, OutputFormatter};
use pnode_health::core::normalizer::{normalize_historical_collection, normalize_live_collection};
use pnode_health::monitoring::{compare_recommendations, compute_node_score, RATING_TABLE};
use pnode_health::prelude::*;
use pnode_health::storage::{HISTORY_FILE, LIVE_NODES_FILE, SNAPSHOTS_FILE};
use pnode_health::utils::constants::{COMPONENT_WEIGHTS_PCT, SECS_PER_DAY};

// ═══════════════════════════════════════════════════════════════════════════════
// TEST HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

const NOW: i64 = 1_700_000_000;
const DAY: i64 = SECS_PER_DAY as i64;
const GIB: u64 = 1 << 30;

fn live_node(pubkey: &str, version: &str, cpu: f64, uptime: u64) -> Value {
    json!({
        "pubkey": pubkey,
        "status": "active",
        "version": version,
        "stats": {
            "cpu_percent": cpu,
            "ram_used": 4 * GIB,
            "ram_total": 16 * GIB,
            "uptime": uptime,
            "packets_sent": 10_000,
            "packets_received": 9_000,
            "storage_committed": 100 * GIB
        }
    })
}

fn history_row(pubkey: &str, ts: i64, uptime: u64) -> Value {
    json!({
        "ip": pubkey,
        "ts": ts,
        "version": "1.0.0",
        "cpu_percent": 20.0,
        "uptime": uptime,
        "packets_sent": 100,
        "packets_received": 100,
        "storage_committed": 10 * GIB
    })
}

fn daily_history(days: i64, uptime_for_day: impl Fn(i64) -> u64) -> Value {
    Value::Array(
        (0..days)
            .flat_map(|d| {
                let ts = NOW - (days - d) * DAY;
                vec![
                    history_row("10.0.0.1", ts, uptime_for_day(d)),
                    history_row("10.0.0.2", ts, uptime_for_day(d)),
                ]
            })
            .collect(),
    )
}

fn monitor_with(store: InMemoryStore) -> HealthMonitor<InMemoryStore> {
    HealthMonitor::new(store, MonitorConfig::default(), NodeDirectory::new())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCORING PIPELINE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_component_weights_sum_to_one_hundred() {
    let sum: u32 = COMPONENT_WEIGHTS_PCT.iter().map(|w| *w as u32).sum();
    assert_eq!(sum, 100);

    let key_sum: u32 = ComponentKey::all().iter().map(|k| k.weight_pct() as u32).sum();
    assert_eq!(key_sum, 100);
}

#[test]
fn test_rating_table_boundaries() {
    for (rating, min) in RATING_TABLE {
        assert_eq!(HealthRating::from_score(min), rating);
        if min > 0 {
            assert_ne!(HealthRating::from_score(min - 1), rating);
        }
    }
    assert_eq!(HealthRating::from_score(85), HealthRating::Excellent);
    assert_eq!(HealthRating::from_score(84), HealthRating::Good);
    assert_eq!(HealthRating::from_score(29), HealthRating::Critical);
}

#[test]
fn test_empty_collection_scores_zero() {
    let nodes = normalize_live_collection(&json!([]), NOW).unwrap();
    let health = compute_network_health(&nodes, &ScoringConfig::default());

    assert_eq!(health.overall, 0);
    assert_eq!(health.rating, HealthRating::Critical);
    assert!(health.recommendations.is_empty());
    assert!(health.components.iter().all(|c| c.is_insufficient()));
}

#[test]
fn test_single_perfect_node_from_json() {
    let raw = json!([{
        "pubkey": "PK1",
        "status": "online",
        "version": "1.0.0",
        "stats": {
            "cpu_percent": 0,
            "ram_used": 0,
            "ram_total": 16 * GIB,
            "uptime": 30 * SECS_PER_DAY,
            "packets_sent": 5_000,
            "packets_received": 5_000,
            "storage_committed": 100 * GIB
        }
    }]);

    let nodes = normalize_live_collection(&raw, NOW).unwrap();
    let health = compute_network_health(&nodes, &ScoringConfig::default());

    assert_eq!(health.overall, 100);
    assert_eq!(health.rating, HealthRating::Excellent);
    assert!(health.recommendations.is_empty());
}

#[test]
fn test_hostile_records_never_fail() {
    let raw = json!([
        { "pubkey": "PK1", "status": "active", "stats": { "cpu_percent": "NaN", "uptime": -10 } },
        { "pubkey": "PK2", "status": 7, "stats": "garbage" },
        { "status": "active", "stats": { "cpu_percent": 1e308, "ram_used": "12", "ram_total": 0 } },
        "not a record",
        null
    ]);

    let nodes = normalize_live_collection(&raw, NOW).unwrap();
    assert_eq!(nodes.len(), 3);

    let health = compute_network_health(&nodes, &ScoringConfig::default());
    assert!(health.overall <= 100);
    for component in health.components.iter() {
        assert!(component.score.is_finite());
        assert!((0.0..=100.0).contains(&component.score));
    }
}

#[test]
fn test_live_and_historical_rows_score_the_same() {
    let metrics = json!({
        "cpu_percent": 35.5,
        "ram_used": 2 * GIB,
        "ram_total": 8 * GIB,
        "uptime": 3 * SECS_PER_DAY,
        "packets_sent": 800,
        "packets_received": 1_000,
        "storage_committed": 50 * GIB
    });

    let live = json!([{ "pubkey": "PK1", "status": "active", "version": "2.0", "stats": metrics }]);

    let mut row = metrics.as_object().cloned().unwrap();
    row.insert("pubkey".into(), json!("PK1"));
    row.insert("version".into(), json!("2.0"));
    row.insert("ts".into(), json!(NOW));
    let historical = json!([row]);

    let live_nodes = normalize_live_collection(&live, NOW).unwrap();
    let historical_nodes = normalize_historical_collection(&historical).unwrap();
    assert_eq!(live_nodes, historical_nodes);

    let config = ScoringConfig::default();
    let report = compute_network_health(&live_nodes, &config);
    let point = compute_history_point(NOW, &historical_nodes, &config);
    assert_eq!(report.to_history_point(), point);
    assert_eq!(compute_node_score(&live_nodes[0]), compute_node_score(&historical_nodes[0]));
}

#[test]
fn test_storage_policy_for_offline_nodes() {
    let nodes = vec![
        NodeTelemetry::new("a", NOW).with_online(true).with_storage(100 * GIB),
        NodeTelemetry::new("b", NOW),
    ];

    let online_only = compute_network_health(&nodes, &ScoringConfig::default());
    let include_offline = compute_network_health(
        &nodes,
        &ScoringConfig::default().with_storage_policy(StoragePolicy::IncludeOffline),
    );

    assert_eq!(online_only.components.storage_health.score, 100.0);
    assert_eq!(include_offline.components.storage_health.score, 90.0);
}

#[test]
fn test_recommendations_are_ranked() {
    let mut raw = vec![
        live_node("PK1", "1.0.0", 97.0, 60),
        live_node("PK2", "0.9.0", 10.0, 60),
        live_node("PK3", "0.8.0", 10.0, 60),
    ];
    raw.push(json!({ "pubkey": "PK4", "status": "inactive" }));

    let nodes = normalize_live_collection(&Value::Array(raw), NOW).unwrap();
    let health = compute_network_health(&nodes, &ScoringConfig::default());

    assert!(!health.recommendations.is_empty());
    assert!(health.recommendations.len() <= 10);
    assert_eq!(health.recommendations[0].severity, Severity::Critical);
    for pair in health.recommendations.windows(2) {
        assert_ne!(
            compare_recommendations(&pair[0], &pair[1]),
            std::cmp::Ordering::Greater
        );
    }
    assert!(health.recommendations.iter().any(|r| r.id == "high-cpu:PK1"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// MONITOR AND STORE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_unavailable_history_and_zero_nodes_are_distinct() {
    let store = InMemoryStore::new();
    store.set_outage(Some("connection refused".into())).unwrap();
    let err = monitor_with(store).current_health(NOW).unwrap_err();
    assert!(matches!(err, Error::DataUnavailable(_)));
    assert!(!err.is_empty_history());

    let err = monitor_with(InMemoryStore::new()).trend(NOW - 30 * DAY, NOW).unwrap_err();
    assert!(matches!(err, Error::NoHistoricalData(_)));
    assert_ne!(err.code(), Error::DataUnavailable(String::new()).code());

    let health = monitor_with(InMemoryStore::new()).current_health(NOW).unwrap();
    assert_eq!(health.overall, 0);
    assert_eq!(health.node_count, 0);
}

#[test]
fn test_trend_improving_through_monitor() {
    let store = InMemoryStore::new();
    // Uptime ramps up to the 7-day target and stays there
    store
        .set_historical_rows(daily_history(14, |d| d as u64 * SECS_PER_DAY))
        .unwrap();

    let analysis = monitor_with(store).trend(NOW - 30 * DAY, NOW).unwrap();
    assert_eq!(analysis.trend, Trend::Improving);
    assert_eq!(analysis.summary.point_count, 14);
    assert!(analysis.summary.delta.unwrap() > 5.0);
}

#[test]
fn test_trend_declining_through_monitor() {
    let store = InMemoryStore::new();
    store
        .set_historical_rows(daily_history(14, |d| (13 - d) as u64 * SECS_PER_DAY))
        .unwrap();

    let analysis = monitor_with(store).trend(NOW - 30 * DAY, NOW).unwrap();
    assert_eq!(analysis.trend, Trend::Declining);
}

#[test]
fn test_trend_stable_and_unknown() {
    let store = InMemoryStore::new();
    store
        .set_historical_rows(daily_history(10, |_| 7 * SECS_PER_DAY))
        .unwrap();
    let monitor = monitor_with(store);

    assert_eq!(monitor.trend(NOW - 30 * DAY, NOW).unwrap().trend, Trend::Stable);
    // Only the last three days fall in a three-day window
    assert_eq!(monitor.trend(NOW - 3 * DAY, NOW).unwrap().trend, Trend::Unknown);
}

#[test]
fn test_file_backed_pipeline() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();

    fs::write(
        dir.join(LIVE_NODES_FILE),
        json!([
            live_node("PK1", "1.2.0", 20.0, 8 * SECS_PER_DAY),
            live_node("PK2", "1.2.0", 30.0, 2 * SECS_PER_DAY)
        ])
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join(HISTORY_FILE),
        json!([
            history_row("PK1", NOW - DAY, 7 * SECS_PER_DAY),
            history_row("PK2", NOW - DAY, SECS_PER_DAY)
        ])
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join(SNAPSHOTS_FILE),
        json!([
            { "snapshot_date": "2023-11-01", "active_nodes": 40, "total_pages": 1000 },
            { "snapshot_date": "2023-11-05", "active_nodes": 50, "total_pages": 1500 }
        ])
        .to_string(),
    )
    .unwrap();
    let directory_path = dir.join("managers.json");
    fs::write(&directory_path, r#"[{ "pubkey": "PK1", "manager": "alice" }]"#).unwrap();

    let config = MonitorConfig {
        data_dir: dir.to_path_buf(),
        directory_file: Some(directory_path),
        ..MonitorConfig::default()
    };
    let monitor = open_monitor(config).unwrap();

    let health = monitor.current_health(NOW).unwrap();
    assert_eq!(health.online_count, 2);
    assert_eq!(health.components.version_consensus.score, 100.0);

    let history = monitor.history(NOW - 7 * DAY, NOW).unwrap();
    assert_eq!(history.len(), 1);

    let reports = monitor.node_deltas(NOW).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].manager.as_deref(), Some("alice"));
    assert!(reports.iter().all(|r| r.yesterday.is_some() && r.last_week.is_none()));

    let growth = monitor.growth().unwrap();
    assert_eq!(growth.node_growth_percent, Some(25.0));
    assert_eq!(growth.page_growth_percent, Some(50.0));

    let json = OutputFormatter::new(OutputFormat::JsonPretty).nodes(&reports).unwrap();
    let parsed: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["id"], "PK1");
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

fn arb_record() -> impl Strategy<Value = Value> {
    (
        any::<bool>(),
        0usize..4,
        -50.0f64..200.0,
        0u64..(64 * GIB),
        0u64..(64 * GIB),
        0u64..(30 * SECS_PER_DAY),
        0u64..1_000_000,
        0u64..1_000_000,
        0u64..(1 << 44),
    )
        .prop_map(|(online, version, cpu, ram_used, ram_total, uptime, sent, received, storage)| {
            let status = if online { "active" } else { "inactive" };
            json!({
                "status": status,
                "version": (["1.0.0", "1.1.0", "", "unknown"][version]),
                "stats": {
                    "cpu_percent": cpu,
                    "ram_used": ram_used,
                    "ram_total": ram_total,
                    "uptime": uptime,
                    "packets_sent": sent,
                    "packets_received": received,
                    "storage_committed": storage
                }
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, failure_persistence: None, .. ProptestConfig::default() })]

    #[test]
    fn prop_overall_is_bounded_and_rated(records in prop::collection::vec(arb_record(), 0..40)) {
        let nodes = normalize_live_collection(&Value::Array(records), NOW).unwrap();
        let config = ScoringConfig::default();
        let health = compute_network_health(&nodes, &config);

        prop_assert!(health.overall <= 100);
        prop_assert_eq!(health.rating, HealthRating::from_score(health.overall));
        prop_assert!(health.recommendations.len() <= config.max_recommendations);
        for component in health.components.iter() {
            prop_assert!((0.0..=100.0).contains(&component.score));
        }
    }

    #[test]
    fn prop_scoring_is_idempotent(records in prop::collection::vec(arb_record(), 0..20)) {
        let nodes = normalize_live_collection(&Value::Array(records), NOW).unwrap();
        let config = ScoringConfig::default();

        prop_assert_eq!(
            compute_network_health(&nodes, &config),
            compute_network_health(&nodes, &config)
        );
    }

    #[test]
    fn prop_node_score_is_bounded(record in arb_record()) {
        let nodes = normalize_live_collection(&json!([record]), NOW).unwrap();
        let score = compute_node_score(&nodes[0]);
        prop_assert!(score <= 100);
        if !nodes[0].is_online {
            prop_assert_eq!(score, 0);
        }
    }
}
