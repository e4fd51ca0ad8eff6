//! Telemetry store backends.
//!
//! The row store itself is an external collaborator; this module only
//! defines the seam the monitor reads through and two implementations:
//! - InMemoryStore: ephemeral, for tests and embedding
//! - FileStore: JSON exports in a directory, for the CLI
//!
//! Backends hand back raw JSON. Deciding whether a payload is a usable
//! collection is the normalizer's job.

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::core::normalizer::record_timestamp;
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Read access to raw telemetry
pub trait TelemetryStore: Send + Sync {
    /// Current node listing (live schema)
    fn live_nodes(&self) -> Result<Value>;

    /// Historical rows with `since <= ts <= until`
    fn historical_rows(&self, since: i64, until: i64) -> Result<Value>;

    /// Daily snapshot rollups
    fn snapshot_rollups(&self) -> Result<Value>;
}

/// Keep array rows whose `ts`/`timestamp` lies in `[since, until]`, read
/// exactly as the normalizer reads it. Non-array payloads pass through
/// untouched.
pub fn filter_rows_by_time(rows: Value, since: i64, until: i64) -> Value {
    match rows {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|row| {
                    record_timestamp(row).is_some_and(|ts| ts >= since && ts <= until)
                })
                .collect(),
        ),
        other => other,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory store (for testing and ephemeral use)
#[derive(Debug)]
pub struct InMemoryStore {
    live: RwLock<Value>,
    history: RwLock<Value>,
    rollups: RwLock<Value>,
    outage: RwLock<Option<String>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            live: RwLock::new(Value::Array(Vec::new())),
            history: RwLock::new(Value::Array(Vec::new())),
            rollups: RwLock::new(Value::Array(Vec::new())),
            outage: RwLock::new(None),
        }
    }

    /// Replace the live node listing
    pub fn set_live_nodes(&self, nodes: Value) -> Result<()> {
        *self.live.write().map_err(lock_error)? = nodes;
        Ok(())
    }

    /// Replace the historical rows
    pub fn set_historical_rows(&self, rows: Value) -> Result<()> {
        *self.history.write().map_err(lock_error)? = rows;
        Ok(())
    }

    /// Replace the snapshot rollups
    pub fn set_snapshot_rollups(&self, rollups: Value) -> Result<()> {
        *self.rollups.write().map_err(lock_error)? = rollups;
        Ok(())
    }

    /// Make every read fail as unreachable (`Some`) or succeed again (`None`)
    pub fn set_outage(&self, reason: Option<String>) -> Result<()> {
        *self.outage.write().map_err(lock_error)? = reason;
        Ok(())
    }

    fn check_outage(&self) -> Result<()> {
        match self.outage.read().map_err(lock_error)?.as_ref() {
            Some(reason) => Err(Error::DataUnavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl TelemetryStore for InMemoryStore {
    fn live_nodes(&self) -> Result<Value> {
        self.check_outage()?;
        Ok(self.live.read().map_err(lock_error)?.clone())
    }

    fn historical_rows(&self, since: i64, until: i64) -> Result<Value> {
        self.check_outage()?;
        let rows = self.history.read().map_err(lock_error)?.clone();
        Ok(filter_rows_by_time(rows, since, until))
    }

    fn snapshot_rollups(&self) -> Result<Value> {
        self.check_outage()?;
        Ok(self.rollups.read().map_err(lock_error)?.clone())
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> Error {
    Error::Internal(format!("Lock error: {}", e))
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILE STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Live node export file name
pub const LIVE_NODES_FILE: &str = "nodes.json";

/// Historical rows export file name
pub const HISTORY_FILE: &str = "history.json";

/// Snapshot rollups export file name
pub const SNAPSHOTS_FILE: &str = "snapshots.json";

/// JSON exports in a directory.
///
/// A missing live export means the data is unavailable; missing history or
/// snapshot exports mean nothing has been recorded yet.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        if !base_path.is_dir() {
            return Err(Error::DataUnavailable(format!(
                "data directory not found: {}",
                base_path.display()
            )));
        }
        Ok(Self { base_path })
    }

    /// Root directory
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    fn read_json(&self, name: &str, missing_ok: bool) -> Result<Value> {
        let path = self.base_path.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound && missing_ok => {
                return Ok(Value::Array(Vec::new()));
            }
            Err(e) => {
                return Err(Error::DataUnavailable(format!("{}: {}", path.display(), e)));
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| Error::DataUnavailable(format!("{}: {}", path.display(), e)))
    }
}

impl TelemetryStore for FileStore {
    fn live_nodes(&self) -> Result<Value> {
        self.read_json(LIVE_NODES_FILE, false)
    }

    fn historical_rows(&self, since: i64, until: i64) -> Result<Value> {
        let rows = self.read_json(HISTORY_FILE, true)?;
        Ok(filter_rows_by_time(rows, since, until))
    }

    fn snapshot_rollups(&self) -> Result<Value> {
        self.read_json(SNAPSHOTS_FILE, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryStore::new();
        store.set_live_nodes(json!([{ "ip": "a" }])).unwrap();

        assert_eq!(store.live_nodes().unwrap(), json!([{ "ip": "a" }]));
        assert_eq!(store.snapshot_rollups().unwrap(), json!([]));
    }

    #[test]
    fn test_in_memory_outage() {
        let store = InMemoryStore::new();
        store.set_outage(Some("connection refused".into())).unwrap();

        assert!(matches!(store.live_nodes(), Err(Error::DataUnavailable(_))));
        assert!(matches!(store.historical_rows(0, 10), Err(Error::DataUnavailable(_))));

        store.set_outage(None).unwrap();
        assert!(store.live_nodes().is_ok());
    }

    #[test]
    fn test_history_window_filter() {
        let store = InMemoryStore::new();
        store
            .set_historical_rows(json!([
                { "ip": "a", "ts": 100 },
                { "ip": "a", "ts": "1970-01-01T00:03:20Z" },
                { "ip": "a", "ts": 300 },
                { "ip": "a" }
            ]))
            .unwrap();

        let rows = store.historical_rows(100, 200).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_history_window_reads_float_and_fallback_timestamps() {
        let rows = json!([
            { "ip": "a", "ts": 1_700_000_000.5 },
            { "ip": "b", "ts": null, "timestamp": 1_700_000_100 },
            { "ip": "c", "ts": null, "timestamp": "2023-11-14T22:15:00Z" },
            { "ip": "d", "ts": 1_600_000_000.0 }
        ]);

        let kept = filter_rows_by_time(rows, 1_700_000_000, 1_800_000_000);
        let ids: Vec<_> = kept.as_array().unwrap().iter().map(|r| r["ip"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_filter_passes_non_arrays_through() {
        let payload = json!({ "error": "bad gateway" });
        assert_eq!(filter_rows_by_time(payload.clone(), 0, 10), payload);
    }

    #[test]
    fn test_file_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(LIVE_NODES_FILE), r#"[{ "ip": "a", "status": "active" }]"#).unwrap();

        let store = FileStore::new(temp_dir.path()).unwrap();
        assert_eq!(store.live_nodes().unwrap().as_array().unwrap().len(), 1);

        // Missing exports: history is empty, not an error
        assert_eq!(store.historical_rows(0, i64::MAX).unwrap(), json!([]));
        assert_eq!(store.snapshot_rollups().unwrap(), json!([]));
    }

    #[test]
    fn test_file_store_missing_live_export() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path()).unwrap();
        assert!(matches!(store.live_nodes(), Err(Error::DataUnavailable(_))));
    }

    #[test]
    fn test_file_store_corrupt_export() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(HISTORY_FILE), "{ not json").unwrap();

        let store = FileStore::new(temp_dir.path()).unwrap();
        assert!(matches!(store.historical_rows(0, 1), Err(Error::DataUnavailable(_))));
    }

    #[test]
    fn test_file_store_requires_directory() {
        assert!(matches!(
            FileStore::new("/definitely/not/a/dir"),
            Err(Error::DataUnavailable(_))
        ));
    }
}
