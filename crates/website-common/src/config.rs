//! Configuration types for the website
//!
//! Configuration is layered: built-in defaults, then an optional file
//! (TOML or JSON, picked by extension), then `WEBSITE__SECTION__KEY`
//! environment variables.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "WEBSITE";

/// Root configuration for the website
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Key-value store configuration
    pub store: StoreConfig,
    /// Outbound mail configuration
    pub mail: MailConfig,
    /// Periodic health report configuration
    pub report: ReportConfig,
    /// Periodic database backup configuration
    pub backup: BackupConfig,
    /// Site identity
    pub site: SiteConfig,
}

impl Config {
    /// Load the configuration, optionally reading `path` on top of the defaults.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the file is missing or malformed, or if
    /// an environment override does not match the expected type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| Error::Configuration(e.to_string()))
    }
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub listen: SocketAddr,
    /// Development mode: mail is logged instead of delivered
    pub dev_mode: bool,
    /// Maximum contact message length in bytes
    pub max_message_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            dev_mode: false,
            max_message_length: 8000,
        }
    }
}

/// Key-value store configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the redb database file
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".tmp/main.redb"),
        }
    }
}

/// How outbound mail leaves the process
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Emit every message as a log event
    #[default]
    Log,
    /// Write every message as an `.eml` file into the spool directory
    Spool,
}

/// Outbound mail configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub transport: MailTransport,
    /// Directory picked up by the local MTA (spool transport only)
    pub spool_dir: PathBuf,
    /// Sender address of every outgoing message
    pub sender: String,
    /// Recipient of reports, alerts and contact notifications
    pub admin_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Log,
            spool_dir: PathBuf::from(".tmp/mail"),
            sender: "bot@localhost".to_string(),
            admin_address: "admin@localhost".to_string(),
        }
    }
}

/// Periodic health report configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub enabled: bool,
    /// Send a report covering the last 24 hours when the server starts
    pub send_on_startup: bool,
    /// Interval between two schedule checks (seconds)
    pub tick_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            send_on_startup: true,
            tick_secs: 20,
        }
    }
}

/// Periodic database backup configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub enabled: bool,
    /// Directory receiving backup files
    pub dir: PathBuf,
    /// Interval between two backups (seconds)
    pub interval_secs: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".tmp/backups"),
            interval_secs: 24 * 60 * 60, // daily
        }
    }
}

/// Site identity shown on pages and in mail subjects
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Owner name, used as page title
    pub name: String,
    /// Domain name used in mail subjects
    pub domain: String,
    /// Public contact address
    pub contact_email: String,
    /// Link to the source code of the site
    pub source_code_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Julien Sellier".to_string(),
            domain: "localhost".to_string(),
            contact_email: "admin@localhost".to_string(),
            source_code_url: String::new(),
        }
    }
}
