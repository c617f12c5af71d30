//! Website Report - visit analytics and outbound mail
//!
//! This crate turns the stored request log into periodic health reports,
//! decides when each report is due, derives visitor fingerprints and sends
//! mail through a pluggable [`Mailer`].

pub mod fingerprint;
pub mod mail;
pub mod report;
pub mod schedule;

// Re-exports
pub use fingerprint::{client_ip, visitor_fingerprint};
pub use mail::{Email, LogMailer, MailError, Mailer, MemoryMailer, SpoolMailer, build_mailer, send_to_admin};
pub use report::{Report, ReportError, generate_report, send_report};
pub use schedule::{ReportCadence, ReportScheduler, due_cadences};
