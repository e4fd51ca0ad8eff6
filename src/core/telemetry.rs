//! Canonical per-node telemetry.
//!
//! `NodeTelemetry` is the only node representation the scorers accept. It is
//! produced by the normalizer, after which every numeric field is finite and
//! non-negative and every defaulted field has its documented value.

use serde::{Deserialize, Serialize};

use crate::utils::constants::{DEFAULT_RAM_TOTAL_BYTES, UNKNOWN_VERSION};
use crate::utils::math::{clamp_percent, percent_of, symmetry_score};

// ═══════════════════════════════════════════════════════════════════════════════
// NODE TELEMETRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Normalized telemetry for one node at one snapshot instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTelemetry {
    /// IP address or public key, stable across snapshots
    pub id: String,
    /// Whether the node answered as active/online
    pub is_online: bool,
    /// Advertised software version
    pub version: String,
    /// CPU usage in [0, 100]
    pub cpu_percent: f64,
    /// RAM in use (bytes)
    pub ram_used_bytes: u64,
    /// RAM installed (bytes), never zero
    pub ram_total_bytes: u64,
    /// Seconds since the node process started
    pub uptime_seconds: u64,
    /// Packets sent since start
    pub packets_sent: u64,
    /// Packets received since start
    pub packets_received: u64,
    /// Storage committed to the network (bytes); 0 when unknown
    pub storage_committed_bytes: u64,
    /// Snapshot instant (unix seconds)
    pub timestamp: i64,
}

impl NodeTelemetry {
    /// Create an offline node with every metric at its default
    pub fn new(id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            is_online: false,
            version: UNKNOWN_VERSION.to_string(),
            cpu_percent: 0.0,
            ram_used_bytes: 0,
            ram_total_bytes: DEFAULT_RAM_TOTAL_BYTES,
            uptime_seconds: 0,
            packets_sent: 0,
            packets_received: 0,
            storage_committed_bytes: 0,
            timestamp,
        }
    }

    /// Set online flag
    pub fn with_online(mut self, online: bool) -> Self {
        self.is_online = online;
        self
    }

    /// Set version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set CPU usage (clamped)
    pub fn with_cpu(mut self, cpu_percent: f64) -> Self {
        self.cpu_percent = clamp_percent(cpu_percent);
        self
    }

    /// Set RAM usage; a zero total is replaced by the default
    pub fn with_ram(mut self, used_bytes: u64, total_bytes: u64) -> Self {
        self.ram_used_bytes = used_bytes;
        self.ram_total_bytes = total_bytes.max(DEFAULT_RAM_TOTAL_BYTES);
        self
    }

    /// Set uptime
    pub fn with_uptime(mut self, uptime_seconds: u64) -> Self {
        self.uptime_seconds = uptime_seconds;
        self
    }

    /// Set packet counters
    pub fn with_packets(mut self, sent: u64, received: u64) -> Self {
        self.packets_sent = sent;
        self.packets_received = received;
        self
    }

    /// Set committed storage
    pub fn with_storage(mut self, committed_bytes: u64) -> Self {
        self.storage_committed_bytes = committed_bytes;
        self
    }

    /// RAM usage as a percentage of installed RAM, clamped to [0, 100]
    pub fn ram_used_percent(&self) -> f64 {
        percent_of(self.ram_used_bytes, self.ram_total_bytes)
    }

    /// Balance of sent vs received packets (0-100), `None` if either is zero
    pub fn packet_symmetry(&self) -> Option<f64> {
        symmetry_score(self.packets_sent, self.packets_received)
    }

    /// Whether the node reports a non-zero storage commitment
    pub fn reports_storage(&self) -> bool {
        self.storage_committed_bytes > 0
    }

    /// Whether the node did not advertise a version
    pub fn has_unknown_version(&self) -> bool {
        self.version == UNKNOWN_VERSION
    }
}

/// Count online nodes in a collection
pub fn online_count(nodes: &[NodeTelemetry]) -> usize {
    nodes.iter().filter(|n| n.is_online).count()
}
