//! Health report: traffic aggregated over a time range.

use crate::mail::{MailError, Mailer, send_to_admin};
use crate::schedule::ReportCadence;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::info;
use website_common::config::MailConfig;
use website_common::types::timestamp_key_prefix;
use website_store::{SiteStore, StoreError};

/// Error type for report generation and delivery
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to aggregate traffic: {0}")]
    Store(#[from] StoreError),
    #[error("failed to send report: {0}")]
    Mail(#[from] MailError),
}

/// Traffic summary for `[from, to]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,

    // Website traffic
    pub num_visitors: usize,
    pub num_requests: usize,
    /// Requests answered with a 5xx status
    pub num_server_errors: usize,
    pub most_requested_urls: BTreeMap<String, usize>,
    pub average_time_to_handle: Duration,
}

impl Report {
    /// URLs by descending request count, ties broken by URL.
    #[must_use]
    pub fn ranked_urls(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .most_requested_urls
            .iter()
            .map(|(url, count)| (url.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# Health report ({} to {})",
            timestamp_key_prefix(&self.from),
            timestamp_key_prefix(&self.to)
        )?;
        writeln!(f)?;
        writeln!(f, "## Traffic")?;
        writeln!(f)?;
        writeln!(f, "{:<25} {}", "Number of visitors:", self.num_visitors)?;
        writeln!(f, "{:<25} {}", "Number of requests:", self.num_requests)?;
        writeln!(f, "{:<25} {}", "Number of errors:", self.num_server_errors)?;
        writeln!(
            f,
            "{:<25} {:?}",
            "Avg. time to handle:", self.average_time_to_handle
        )?;
        writeln!(f, "Most requested URLs:")?;
        for (url, count) in self.ranked_urls() {
            writeln!(f, "\t* {count:<10} {url:?}")?;
        }
        Ok(())
    }
}

/// Aggregate the stored traffic between `from` and `to`.
///
/// # Errors
/// Returns `StoreError` if any of the range scans fails.
pub fn generate_report(
    store: &SiteStore,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Report, StoreError> {
    Ok(Report {
        from,
        to,
        num_visitors: store.count_visitors(from, to)?,
        num_requests: store.count_http_requests(from, to)?,
        num_server_errors: store.count_server_errors(from, to)?,
        most_requested_urls: store.most_requested_urls(from, to)?,
        average_time_to_handle: store.average_time_to_handle(from, to)?,
    })
}

/// Generate the report for the window of `cadence` ending at `to` and mail
/// it to the administrator.
///
/// # Errors
/// Returns `ReportError` if the aggregation or the delivery fails.
pub async fn send_report(
    store: &SiteStore,
    mailer: &dyn Mailer,
    mail: &MailConfig,
    domain: &str,
    cadence: ReportCadence,
    to: DateTime<Utc>,
) -> Result<Report, ReportError> {
    let from = cadence.window_start(to);
    let report = generate_report(store, from, to)?;
    let subject = format!("New {cadence} report for {domain}");
    send_to_admin(mailer, mail, subject, report.to_string()).await?;
    info!(
        "Sent {} report ({} requests, {} visitors)",
        cadence, report.num_requests, report.num_visitors
    );
    Ok(report)
}
