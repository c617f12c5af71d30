//! Core type definitions for the website
//!
//! Every persisted record is a flat struct serialized as JSON under a string
//! key. Time-ordered records use a key made of their creation timestamp
//! (RFC 3339, second precision, UTC) followed by their random identifier so
//! that a lexicographic range scan is also a chronological one.

use chrono::{DateTime, SecondsFormat, Utc};
use derive_more::Display;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of random bytes in a record identifier
pub const RECORD_ID_BYTES: usize = 32;

/// Length of the timestamp prefix of a time-ordered key (`2006-01-02T15:04:05Z`)
pub const TIMESTAMP_KEY_LEN: usize = 20;

/// Format a timestamp the way it appears at the start of time-ordered keys.
#[must_use]
pub fn timestamp_key_prefix(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Random identifier of a stored record (hex encoded)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new random record ID
    #[must_use]
    pub fn new() -> Self {
        let mut buf = [0u8; RECORD_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut buf);
        Self(hex::encode(buf))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single HTTP request observed by the tracking middleware
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequestRecord {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    /// Identifier of the visitor that sent the request
    pub visitor_id: String,
    pub method: String,
    /// Path and query of the request
    pub url: String,
    pub user_agent: String,
    pub ip_address: String,
    pub content_length: u64,
    /// Response status code
    pub status: u16,
    /// Time spent in the handler, in microseconds
    pub time_to_handle_us: u64,
}

impl HttpRequestRecord {
    /// Storage key: creation timestamp followed by the record ID
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{}", timestamp_key_prefix(&self.created_at), self.id)
    }
}

/// A visitor, created the first time a browser is seen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    pub id: String,
    pub first_visited_at: DateTime<Utc>,
    pub first_visited_page: String,
}

/// A message sent through the contact form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormSubmission {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub email_address: String,
    pub message: String,
}

impl ContactFormSubmission {
    /// Create a submission stamped with the current time
    #[must_use]
    pub fn new(email_address: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            created_at: Utc::now(),
            email_address: email_address.into(),
            message: message.into(),
        }
    }

    /// Storage key: creation timestamp followed by the record ID
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{}", timestamp_key_prefix(&self.created_at), self.id)
    }
}

impl fmt::Display for ContactFormSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Created at: {}", timestamp_key_prefix(&self.created_at))?;
        writeln!(f, "Email address: {}", self.email_address)?;
        writeln!(f, "Message: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_id_is_random_hex() {
        let a = RecordId::new();
        let b = RecordId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), RECORD_ID_BYTES * 2);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_timestamp_key_prefix_is_fixed_width() {
        let t = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let prefix = timestamp_key_prefix(&t);
        assert_eq!(prefix, "2024-03-09T07:05:01Z");
        assert_eq!(prefix.len(), TIMESTAMP_KEY_LEN);
    }

    #[test]
    fn test_request_key_orders_chronologically() {
        let early = HttpRequestRecord {
            id: RecordId("ffff".into()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            visitor_id: "v".into(),
            method: "GET".into(),
            url: "/".into(),
            user_agent: String::new(),
            ip_address: "127.0.0.1".into(),
            content_length: 0,
            status: 200,
            time_to_handle_us: 1500,
        };
        let late = HttpRequestRecord {
            id: RecordId("0000".into()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            ..early.clone()
        };
        assert!(early.key() < late.key());
    }

    #[test]
    fn test_contact_submission_display() {
        let submission = ContactFormSubmission {
            id: RecordId("abc".into()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            email_address: "jane@example.com".into(),
            message: "Hello".into(),
        };
        assert_eq!(
            submission.to_string(),
            "ID: abc\nCreated at: 2024-01-02T03:04:05Z\nEmail address: jane@example.com\nMessage: Hello\n"
        );
    }
}
