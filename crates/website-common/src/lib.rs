//! Website Common - Shared types and utilities
//!
//! This crate provides the configuration, error definitions and persisted
//! record types used by every other website crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
