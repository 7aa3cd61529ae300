//! Granary Consumption Ledger
//!
//! Tracks exactly-once consumption of aggregate dataset artifacts and
//! resolves the pending-work set for a model.
//!
//! # Core Concepts
//!
//! - [`ConsumptionRecord`]: (model, artifact, action, time) ledger entry
//! - [`ConsumptionLedger`]: append-only, idempotent recording over a
//!   pluggable [`LedgerBackend`]
//! - [`WorkResolver`]: not-yet-consumed aggregates grouped by
//!   time-partitioning method
//!
//! # Example
//!
//! ```rust
//! use granary_artifact::{DatasetStore, MemoryBackend};
//! use granary_ledger::{ConsumptionLedger, MemoryLedger, WorkResolver};
//!
//! let store = DatasetStore::new(MemoryBackend::new());
//! let ledger = ConsumptionLedger::new(MemoryLedger::new());
//! let resolver = WorkResolver::new(&store, &ledger);
//!
//! let pending = resolver.pending_artifacts(42, true, &["quarterly"]);
//! assert!(pending.is_empty());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod error;
mod ledger;
mod record;
mod resolver;

// Re-exports
pub use error::LedgerError;
pub use ledger::{ConsumptionLedger, LedgerBackend, MemoryLedger};
pub use record::{ConsumptionAction, ConsumptionRecord};
pub use resolver::WorkResolver;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
