//! Persistence layer.
//!
//! Two files survive restarts: the seen registry (JSON, rewritten after
//! every scan) and the deal ledger (CSV, append-only).

pub mod ledger;
pub mod seen;

pub use ledger::DealLedger;
pub use seen::SeenRegistry;
