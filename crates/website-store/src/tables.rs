//! Redb table definitions for persistent site data.

use redb::TableDefinition;

// Key: RFC 3339 timestamp + record id, Value: JSON-encoded ContactFormSubmission
pub const CONTACT_FORM_SUBMISSIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("contact_form_submissions");

// Key: RFC 3339 timestamp + record id, Value: JSON-encoded HttpRequestRecord
pub const HTTP_REQUESTS: TableDefinition<&str, &[u8]> = TableDefinition::new("http_requests");

// Key: visitor id, Value: JSON-encoded Visitor
pub const VISITORS: TableDefinition<&str, &[u8]> = TableDefinition::new("visitors");

/// Every table, in creation order.
pub const ALL: [TableDefinition<&str, &[u8]>; 3] =
    [CONTACT_FORM_SUBMISSIONS, HTTP_REQUESTS, VISITORS];
