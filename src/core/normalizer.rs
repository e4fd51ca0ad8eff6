//! Node Snapshot Normalizer.
//!
//! Converts raw rows from the live node table or the narrower historical
//! table into [`NodeTelemetry`]. Both schemas go through the same
//! [`RawMetrics`] stage so identical inputs produce identical telemetry
//! regardless of source.
//!
//! Sanitization happens here and nowhere else: numeric strings are parsed,
//! negatives become 0, non-finite values become 0, and missing fields take
//! their documented defaults.

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::telemetry::NodeTelemetry;
use crate::error::{Error, Result};
use crate::utils::constants::{DEFAULT_RAM_TOTAL_BYTES, ONLINE_STATUSES, UNKNOWN_VERSION};
use crate::utils::math::{clamp_percent, non_negative_finite, to_u64_saturating};

// ═══════════════════════════════════════════════════════════════════════════════
// FIELD NAMES
// ═══════════════════════════════════════════════════════════════════════════════

const ID_KEYS: &[&str] = &["pubkey", "ip", "address"];
const CPU_KEYS: &[&str] = &["cpu_percent"];
const RAM_USED_KEYS: &[&str] = &["ram_used"];
const RAM_TOTAL_KEYS: &[&str] = &["ram_total"];
const UPTIME_KEYS: &[&str] = &["uptime"];
const PACKETS_SENT_KEYS: &[&str] = &["packets_sent"];
const PACKETS_RECEIVED_KEYS: &[&str] = &["packets_received"];
const STORAGE_KEYS: &[&str] = &["storage_committed"];
const TIMESTAMP_KEYS: &[&str] = &["ts", "timestamp"];

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE SCHEMA
// ═══════════════════════════════════════════════════════════════════════════════

/// Which table a raw record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSchema {
    /// Live node listing: status/version at top level, metrics under `stats`
    Live,
    /// Historical stats table: flat metrics keyed by `(ip, ts)`
    Historical,
}

impl RecordSchema {
    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSchema::Live => "live",
            RecordSchema::Historical => "historical",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW METRICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Schema-independent view of a raw record before defaults are applied.
///
/// `None` means the field was absent or unparseable; present values are
/// already non-negative and finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetrics {
    /// Node identifier
    pub id: Option<String>,
    /// Online flag derived from status, if a status was present
    pub online: Option<bool>,
    /// Advertised version
    pub version: Option<String>,
    /// CPU usage
    pub cpu_percent: Option<f64>,
    /// RAM in use
    pub ram_used: Option<u64>,
    /// RAM installed
    pub ram_total: Option<u64>,
    /// Uptime seconds
    pub uptime: Option<u64>,
    /// Packets sent
    pub packets_sent: Option<u64>,
    /// Packets received
    pub packets_received: Option<u64>,
    /// Committed storage bytes
    pub storage_committed: Option<u64>,
    /// Snapshot instant
    pub timestamp: Option<i64>,
}

impl RawMetrics {
    /// Extract raw metrics from a record of the given schema
    pub fn from_record(record: &Map<String, Value>, schema: RecordSchema) -> Self {
        let stats = match schema {
            RecordSchema::Live => match record.get("stats") {
                Some(Value::Object(stats)) => stats,
                _ => record,
            },
            RecordSchema::Historical => record,
        };

        Self {
            id: read_string(record, ID_KEYS),
            online: read_string(record, &["status"]).map(|s| status_is_online(&s)),
            version: read_string(record, &["version"]),
            cpu_percent: read_f64(stats, CPU_KEYS),
            ram_used: read_u64(stats, RAM_USED_KEYS),
            ram_total: read_u64(stats, RAM_TOTAL_KEYS),
            uptime: read_u64(stats, UPTIME_KEYS),
            packets_sent: read_u64(stats, PACKETS_SENT_KEYS),
            packets_received: read_u64(stats, PACKETS_RECEIVED_KEYS),
            storage_committed: read_u64(stats, STORAGE_KEYS),
            timestamp: read_timestamp(record, TIMESTAMP_KEYS),
        }
    }

    /// Apply the shared default rules and produce telemetry.
    ///
    /// `fallback_id` is used when the record carries no identifier,
    /// `default_online` when it carries no status.
    pub fn into_telemetry(
        self,
        fallback_id: String,
        default_online: bool,
        default_timestamp: i64,
    ) -> NodeTelemetry {
        let version = self
            .version
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());

        NodeTelemetry {
            id: self.id.unwrap_or(fallback_id),
            is_online: self.online.unwrap_or(default_online),
            version,
            cpu_percent: clamp_percent(self.cpu_percent.unwrap_or(0.0)),
            ram_used_bytes: self.ram_used.unwrap_or(0),
            ram_total_bytes: self
                .ram_total
                .filter(|t| *t > 0)
                .unwrap_or(DEFAULT_RAM_TOTAL_BYTES),
            uptime_seconds: self.uptime.unwrap_or(0),
            packets_sent: self.packets_sent.unwrap_or(0),
            packets_received: self.packets_received.unwrap_or(0),
            storage_committed_bytes: self.storage_committed.unwrap_or(0),
            timestamp: self.timestamp.unwrap_or(default_timestamp),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORD NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Whether a status string marks a node as online
pub fn status_is_online(status: &str) -> bool {
    let status = status.trim().to_ascii_lowercase();
    ONLINE_STATUSES.contains(&status.as_str())
}

/// Snapshot instant embedded in a raw record (`ts`, else `timestamp`).
///
/// Null fields are skipped; float seconds are truncated.
pub fn record_timestamp(record: &Value) -> Option<i64> {
    match record {
        Value::Object(map) => read_timestamp(map, TIMESTAMP_KEYS),
        _ => None,
    }
}

/// Normalize one live-table record observed at `timestamp`.
///
/// Returns `None` only when the element is not an object at all.
pub fn normalize_live_record(record: &Value, index: usize, timestamp: i64) -> Option<NodeTelemetry> {
    let Value::Object(map) = record else {
        warn!(index, "skipping live record that is not an object");
        return None;
    };

    let mut raw = RawMetrics::from_record(map, RecordSchema::Live);
    // The caller's snapshot instant wins over any embedded time
    raw.timestamp = Some(timestamp);
    // Live rows without a status are not known to be reachable
    Some(raw.into_telemetry(fallback_id(index), false, timestamp))
}

/// Normalize one historical-table row.
///
/// Historical rows are only written for nodes that answered a stats poll,
/// so a row without a status is treated as online.
pub fn normalize_historical_row(row: &Value, index: usize) -> Option<NodeTelemetry> {
    let Value::Object(map) = row else {
        warn!(index, "skipping historical row that is not an object");
        return None;
    };

    let raw = RawMetrics::from_record(map, RecordSchema::Historical);
    if raw.timestamp.is_none() {
        debug!(index, "historical row has no parseable timestamp, using 0");
    }
    Some(raw.into_telemetry(fallback_id(index), true, 0))
}

/// Normalize a live node collection.
///
/// Fails with [`Error::DataUnavailable`] when the collection is not a list.
pub fn normalize_live_collection(collection: &Value, timestamp: i64) -> Result<Vec<NodeTelemetry>> {
    let records = expect_list(collection, RecordSchema::Live)?;
    let nodes: Vec<NodeTelemetry> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| normalize_live_record(r, i, timestamp))
        .collect();

    debug!(records = records.len(), nodes = nodes.len(), "normalized live collection");
    Ok(nodes)
}

/// Normalize a historical row collection.
///
/// Fails with [`Error::DataUnavailable`] when the collection is not a list.
pub fn normalize_historical_collection(collection: &Value) -> Result<Vec<NodeTelemetry>> {
    let rows = expect_list(collection, RecordSchema::Historical)?;
    let nodes: Vec<NodeTelemetry> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| normalize_historical_row(r, i))
        .collect();

    debug!(rows = rows.len(), nodes = nodes.len(), "normalized historical collection");
    Ok(nodes)
}

fn expect_list(collection: &Value, schema: RecordSchema) -> Result<&Vec<Value>> {
    match collection {
        Value::Array(items) => Ok(items),
        other => Err(Error::DataUnavailable(format!(
            "{} collection is not a list (got {})",
            schema.as_str(),
            value_kind(other)
        ))),
    }
}

fn fallback_id(index: usize) -> String {
    format!("node-{}", index)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LENIENT FIELD READERS
// ═══════════════════════════════════════════════════════════════════════════════

fn first<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| map.get(*k)).find(|v| !v.is_null())
}

fn read_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first(map, keys)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_f64(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let raw = match first(map, keys)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(non_negative_finite(raw))
}

fn read_u64(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    match first(map, keys)? {
        Value::Number(n) => match n.as_u64() {
            Some(v) => Some(v),
            None => n.as_f64().map(to_u64_saturating),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(to_u64_saturating))
        }
        _ => None,
    }
}

fn read_timestamp(map: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    match first(map, keys)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => parse_timestamp(s.trim()),
        _ => None,
    }
}

/// Parse a unix-seconds or RFC 3339 / ISO 8601 timestamp string
pub fn parse_timestamp(s: &str) -> Option<i64> {
    if let Ok(secs) = s.parse::<i64>() {
        return Some(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    // Row stores often emit naive UTC timestamps
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc().timestamp())
}
