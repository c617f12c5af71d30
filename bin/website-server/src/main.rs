//! Website Server - personal website
//!
//! Serves the prerendered pages and the contact form, records every visit
//! and runs the health report and backup jobs in the background.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use website_common::Config;
use website_report::build_mailer;
use website_server::{AppState, jobs, router};
use website_store::SiteStore;

#[derive(Parser, Debug)]
#[command(name = "website-server")]
#[command(about = "Personal website server")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML or JSON)
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Listen address, overrides the configuration
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Development mode: outgoing mail is only logged
    #[arg(long, default_value_t = false)]
    dev: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(args.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!args.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    config.server.dev_mode |= args.dev;

    info!("Starting website server for {}", config.site.domain);
    if config.server.dev_mode {
        info!("Development mode: mail is logged, not delivered");
    }

    let store = SiteStore::open(&config.store.path)
        .with_context(|| format!("opening store {}", config.store.path.display()))?;
    info!("Store: {}", config.store.path.display());

    let mailer = build_mailer(&config.mail, config.server.dev_mode);
    let addr = config.server.listen;
    let state = Arc::new(AppState::new(config, Arc::new(store), mailer));

    if state.config.report.enabled {
        tokio::spawn(jobs::run_health_reports(state.clone()));
    }
    if state.config.backup.enabled {
        info!(
            "Backups every {}s into {}",
            state.config.backup.interval_secs,
            state.config.backup.dir.display()
        );
        tokio::spawn(jobs::run_backups(state.clone()));
    }

    let app = router(state);

    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
    })
    .await?;

    info!("Website server shut down gracefully");

    Ok(())
}
