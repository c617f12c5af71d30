//! Outbound mail.
//!
//! Messages are handed to a [`Mailer`]. The server picks the implementation
//! from [`MailConfig`]: in development mode, or with the `log` transport,
//! messages only become log events; with the `spool` transport they are
//! written as RFC 5322 files for the local MTA to deliver.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use website_common::config::{MailConfig, MailTransport};
use website_common::types::RecordId;

/// Error type for mail delivery
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email has no recipient")]
    NoRecipient,
    #[error("spool write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

pub type MailResult<T> = Result<T, MailError>;

/// A plain text email
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub plain_text_body: String,
}

impl Email {
    /// Render the full message (headers, blank line, body) with CRLF line endings.
    #[must_use]
    pub fn render_message(&self) -> String {
        let headers = [
            ("From", header_value(&self.from)),
            ("To", header_value(&self.to.join("; "))),
            ("Subject", header_value(&self.subject)),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", "text/plain; charset=utf-8".to_string()),
        ];

        let mut out = String::new();
        for (name, value) in headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(&value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.push_str(&self.plain_text_body);
        out.push_str("\r\n");
        out
    }
}

/// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Something that can deliver an [`Email`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> MailResult<()>;
}

/// Mailer that only logs messages (development mode).
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> MailResult<()> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipient);
        }
        info!(
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            "New email:\n{}",
            email.plain_text_body
        );
        Ok(())
    }
}

/// Mailer writing one `.eml` file per message into a spool directory.
#[derive(Clone, Debug)]
pub struct SpoolMailer {
    dir: PathBuf,
}

impl SpoolMailer {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Mailer for SpoolMailer {
    async fn send(&self, email: &Email) -> MailResult<()> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipient);
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!(
            "{}-{}.eml",
            Utc::now().format("%Y%m%dT%H%M%S"),
            RecordId::new()
        );
        let path = self.dir.join(name);
        tokio::fs::write(&path, email.render_message()).await?;
        info!("Spooled email '{}' to {}", email.subject, path.display());
        Ok(())
    }
}

/// Mailer keeping messages in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Email>>,
    failure: Option<String>,
}

impl MemoryMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer rejecting every message with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    /// Messages accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &Email) -> MailResult<()> {
        if let Some(reason) = &self.failure {
            return Err(MailError::Rejected(reason.clone()));
        }
        if email.to.is_empty() {
            return Err(MailError::NoRecipient);
        }
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

/// Build the mailer selected by the configuration.
#[must_use]
pub fn build_mailer(config: &MailConfig, dev_mode: bool) -> Arc<dyn Mailer> {
    if dev_mode {
        return Arc::new(LogMailer);
    }
    match config.transport {
        MailTransport::Log => Arc::new(LogMailer),
        MailTransport::Spool => Arc::new(SpoolMailer::new(config.spool_dir.clone())),
    }
}

/// Send a message to the site administrator.
///
/// # Errors
/// Returns the mailer's error when delivery fails.
pub async fn send_to_admin(
    mailer: &dyn Mailer,
    config: &MailConfig,
    subject: impl Into<String>,
    body: impl Into<String>,
) -> MailResult<()> {
    mailer
        .send(&Email {
            from: config.sender.clone(),
            to: vec![config.admin_address.clone()],
            subject: subject.into(),
            plain_text_body: body.into(),
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email {
            from: "bot@example.com".into(),
            to: vec!["a@example.com".into(), "b@example.com".into()],
            subject: "Hello".into(),
            plain_text_body: "Body text".into(),
        }
    }

    #[test]
    fn test_render_message() {
        assert_eq!(
            email().render_message(),
            "From: bot@example.com\r\n\
             To: a@example.com; b@example.com\r\n\
             Subject: Hello\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             Body text\r\n"
        );
    }

    #[test]
    fn test_render_message_keeps_headers_on_one_line() {
        let mut e = email();
        e.subject = "Hi\r\nBcc: victim@example.com".into();
        let rendered = e.render_message();
        assert!(rendered.contains("Subject: Hi  Bcc: victim@example.com\r\n"));
        assert!(!rendered.contains("\r\nBcc:"));
    }

    #[tokio::test]
    async fn test_memory_mailer_records_and_fails() {
        let mailer = MemoryMailer::new();
        mailer.send(&email()).await.unwrap();
        assert_eq!(mailer.sent(), vec![email()]);

        let failing = MemoryMailer::failing("down");
        assert!(matches!(
            failing.send(&email()).await,
            Err(MailError::Rejected(_))
        ));
        assert!(failing.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_admin_uses_config_addresses() {
        let mailer = MemoryMailer::new();
        let config = MailConfig {
            sender: "bot@example.com".into(),
            admin_address: "owner@example.com".into(),
            ..MailConfig::default()
        };
        send_to_admin(&mailer, &config, "Alert", "Something happened")
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "bot@example.com");
        assert_eq!(sent[0].to, vec!["owner@example.com".to_string()]);
        assert_eq!(sent[0].subject, "Alert");
    }

    #[tokio::test]
    async fn test_spool_mailer_writes_eml_file() {
        let dir = tempfile::tempdir().unwrap();
        let spool = dir.path().join("spool");
        let mailer = SpoolMailer::new(&spool);
        mailer.send(&email()).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(&spool).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().unwrap().path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("eml"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), email().render_message());
    }

    #[tokio::test]
    async fn test_empty_recipient_list_is_rejected() {
        let mut e = email();
        e.to.clear();
        assert!(matches!(LogMailer.send(&e).await, Err(MailError::NoRecipient)));
    }
}
