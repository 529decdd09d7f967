//! Hosted document tree and navigation module
//!
//! This module provides the arena-backed tree the engine scans, the host-side
//! mutation journal, and the pure navigation queries used to find amounts
//! split across markup.

pub mod models;
pub mod query;

// Re-export all models and query functions
pub use models::*;
pub use query::*;
