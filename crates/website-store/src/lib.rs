//! Website Store - embedded key-value persistence
//!
//! This crate persists visitors, HTTP requests and contact form submissions
//! in a single redb file and answers the time-range aggregation queries used
//! by the health report.

pub mod store;
pub mod tables;
pub mod visits;

// Re-exports
pub use store::{SiteStore, StoreError, StoreResult, backup_file_name};
pub use visits::VisitLog;
