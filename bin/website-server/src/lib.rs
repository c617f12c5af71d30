//! Website Server - HTTP front of the personal website
//!
//! The router serves prerendered pages and the contact form. Every request
//! goes through the tracking middleware, which feeds the analytics used by
//! the periodic health report.

pub mod contact;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod recovery;
pub mod routes;
pub mod state;
pub mod tracking;

pub use routes::router;
pub use state::AppState;
