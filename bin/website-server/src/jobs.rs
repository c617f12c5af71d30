//! Background jobs: periodic health reports and database backups.

use crate::state::AppState;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use website_report::{ReportCadence, ReportScheduler, send_report, send_to_admin};
use website_store::backup_file_name;

/// Send the report of `cadence` for the window ending at `to`, logging failures.
async fn send_logged_report(state: &AppState, cadence: ReportCadence, to: DateTime<Utc>) {
    if let Err(e) = send_report(
        &state.store,
        state.mailer.as_ref(),
        &state.config.mail,
        &state.config.site.domain,
        cadence,
        to,
    )
    .await
    {
        error!("Failed to send {} report: {}", cadence, e);
    }
}

/// Report covering the last 24 hours, sent when the server starts.
pub async fn send_startup_report(state: &AppState, now: DateTime<Utc>) {
    info!("Sending startup report");
    send_logged_report(state, ReportCadence::Daily, now).await;
}

/// Send every report that is due at `now`.
pub async fn send_due_reports(state: &AppState, scheduler: &mut ReportScheduler, now: DateTime<Utc>) {
    for (cadence, to) in scheduler.poll(now) {
        send_logged_report(state, cadence, to).await;
    }
}

/// Long-running task sending the daily, weekly and monthly reports.
pub async fn run_health_reports(state: Arc<AppState>) {
    let config = &state.config.report;
    if config.send_on_startup {
        send_startup_report(&state, Utc::now()).await;
    }

    let mut scheduler = ReportScheduler::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(config.tick_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        send_due_reports(&state, &mut scheduler, Utc::now()).await;
    }
}

/// Write one backup named after `now` into the backup directory.
///
/// A failed backup is reported to the administrator.
pub async fn backup_once(state: &Arc<AppState>, now: DateTime<Utc>) -> Option<PathBuf> {
    let path = state.config.backup.dir.join(backup_file_name(now));
    let store = state.store.clone();
    let target = path.clone();
    let result = tokio::task::spawn_blocking(move || store.backup_to(&target))
        .await
        .map_err(|e| e.to_string())
        .and_then(|r| r.map_err(|e| e.to_string()));

    match result {
        Ok(entries) => {
            info!("Backed up {} entries to {}", entries, path.display());
            Some(path)
        }
        Err(e) => {
            error!("DB backup to {} failed: {}", path.display(), e);
            let body = format!("Backup to {} failed:\n\n{e}\n", path.display());
            if let Err(e) =
                send_to_admin(state.mailer.as_ref(), &state.config.mail, "DB backup failed", body).await
            {
                error!("Failed to report backup failure: {}", e);
            }
            None
        }
    }
}

/// Long-running task backing up the database, first immediately and then
/// on every interval.
pub async fn run_backups(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.backup.interval_secs.max(1));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        backup_once(&state, Utc::now()).await;
    }
}
