//! Storage seam for raw telemetry.
//!
//! Persistence proper belongs to an external row store. This module defines
//! the read-only trait the monitor fetches through, so an unreachable store
//! surfaces as [`Error::DataUnavailable`](crate::error::Error::DataUnavailable)
//! instead of an empty score.
//!
//! ## Backends
//!
//! - **InMemoryStore**: Fast, ephemeral storage for testing
//! - **FileStore**: JSON exports in a directory
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pnode_health::storage::{FileStore, TelemetryStore};
//!
//! let store = FileStore::new("/var/lib/pnode-health")?;
//! let nodes = store.live_nodes()?;
//! ```

pub mod backend;

pub use backend::*;
