//! rai-lens: US dollar prices rewritten in RAI
//!
//! This library finds fiat amounts inside a live document tree and rewrites
//! them in place into RAI at the current conversion rate, including amounts
//! whose digits are split across several styled nodes. It re-scans only the
//! parts of the tree that change afterwards.

pub mod config;
pub mod context;
pub mod document;
pub mod errors;
pub mod pricing;
pub mod tracker;

// Re-export commonly used types
pub use config::EngineConfig;
pub use context::{Preferences, RateSource, ScanContext};
pub use document::{Document, MutationRecord, NodeId, NodeKind};
pub use errors::{Error, Result};
pub use pricing::{convert, ConversionResult, ScanStats, TreeScanner};
pub use tracker::{HostEvent, ObserverState, PriceTracker, EVENT_QUEUE_CAPACITY};
