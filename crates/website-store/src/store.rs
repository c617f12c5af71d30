//! Persistent site store backed by redb.
//!
//! Every record is JSON-encoded under a string key. Requests and contact
//! submissions are keyed by their RFC 3339 creation timestamp followed by
//! their random id, so the aggregation queries are plain range scans.

use crate::tables;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error};
use website_common::types::{
    ContactFormSubmission, HttpRequestRecord, TIMESTAMP_KEY_LEN, Visitor, timestamp_key_prefix,
};

/// Error type for site store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::DatabaseError),
    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("redb transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::TransactionError> for StoreError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Transaction(Box::new(e))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Name of the backup file written at `t`.
#[must_use]
pub fn backup_file_name(t: DateTime<Utc>) -> String {
    format!("{}.backup.redb", t.format("%Y_%m_%d_%H_%M_%S"))
}

/// Persistent site store backed by redb.
pub struct SiteStore {
    db: Database,
}

impl SiteStore {
    /// Open (or create) the redb database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Create all tables eagerly so later read txns don't fail
        let write_txn = db.begin_write()?;
        {
            for table_def in tables::ALL {
                let _t = write_txn.open_table(table_def)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // ---- Contact form submissions ----

    pub fn store_contact_form_submission(
        &self,
        submission: &ContactFormSubmission,
    ) -> StoreResult<()> {
        self.put_json(
            tables::CONTACT_FORM_SUBMISSIONS,
            &submission.key(),
            submission,
        )
    }

    /// Submissions received between `from` and `to`, oldest first.
    pub fn list_contact_form_submissions(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<ContactFormSubmission>> {
        let mut result = Vec::new();
        self.for_each_decoded_in_range(tables::CONTACT_FORM_SUBMISSIONS, from, to, |s| {
            result.push(s);
        })?;
        Ok(result)
    }

    // ---- HTTP requests ----

    pub fn store_http_request(&self, request: &HttpRequestRecord) -> StoreResult<()> {
        self.put_json(tables::HTTP_REQUESTS, &request.key(), request)
    }

    pub fn count_http_requests(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<usize> {
        let mut count = 0;
        self.for_each_in_range(tables::HTTP_REQUESTS, from, to, |_, _| {
            count += 1;
            Ok(())
        })?;
        Ok(count)
    }

    /// Mean handler time of the requests in range, zero when there are none.
    pub fn average_time_to_handle(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Duration> {
        let mut total_us: u128 = 0;
        let mut count: u128 = 0;
        self.for_each_decoded_in_range(tables::HTTP_REQUESTS, from, to, |r: HttpRequestRecord| {
            total_us += u128::from(r.time_to_handle_us);
            count += 1;
        })?;
        if count == 0 {
            return Ok(Duration::ZERO);
        }
        let avg = u64::try_from(total_us / count).unwrap_or(u64::MAX);
        Ok(Duration::from_micros(avg))
    }

    /// Number of requests per URL in range.
    pub fn most_requested_urls(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<BTreeMap<String, usize>> {
        let mut result = BTreeMap::new();
        self.for_each_decoded_in_range(tables::HTTP_REQUESTS, from, to, |r: HttpRequestRecord| {
            *result.entry(r.url).or_insert(0) += 1;
        })?;
        Ok(result)
    }

    /// Number of requests in range answered with a 5xx status.
    pub fn count_server_errors(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<usize> {
        let mut count = 0;
        self.for_each_decoded_in_range(tables::HTTP_REQUESTS, from, to, |r: HttpRequestRecord| {
            if r.status >= 500 {
                count += 1;
            }
        })?;
        Ok(count)
    }

    /// Number of distinct visitors that sent at least one request in range.
    pub fn count_visitors(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<usize> {
        let mut visitor_ids = HashSet::new();
        self.for_each_decoded_in_range(tables::HTTP_REQUESTS, from, to, |r: HttpRequestRecord| {
            visitor_ids.insert(r.visitor_id);
        })?;
        Ok(visitor_ids.len())
    }

    // ---- Visitors ----

    pub fn store_visitor(&self, visitor: &Visitor) -> StoreResult<()> {
        self.put_json(tables::VISITORS, &visitor.id, visitor)
    }

    pub fn get_visitor(&self, id: &str) -> StoreResult<Option<Visitor>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(tables::VISITORS)?;
        match table.get(id)? {
            Some(val) => Ok(Some(serde_json::from_slice(val.value())?)),
            None => Ok(None),
        }
    }

    // ---- Backup ----

    /// Copy every table into a fresh database file at `path`.
    ///
    /// All tables are read from a single read transaction, so the backup is
    /// a consistent snapshot even while requests keep being recorded.
    /// Returns the number of copied entries.
    pub fn backup_to(&self, path: impl AsRef<Path>) -> StoreResult<usize> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let backup = Database::create(path)?;

        let read_txn = self.db.begin_read()?;
        let write_txn = backup.begin_write()?;
        let mut copied = 0;
        {
            for table_def in tables::ALL {
                let source = read_txn.open_table(table_def)?;
                let mut target = write_txn.open_table(table_def)?;
                for entry in source.iter()? {
                    let (key, value) = entry?;
                    target.insert(key.value(), value.value())?;
                    copied += 1;
                }
            }
        }
        write_txn.commit()?;

        debug!("Backed up {} entries to {}", copied, path.display());
        Ok(copied)
    }

    // ---- Generic helpers ----

    fn put_json<T: Serialize>(
        &self,
        table_def: redb::TableDefinition<&str, &[u8]>,
        key: &str,
        value: &T,
    ) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table_def)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Visit every entry whose timestamp prefix lies in `[from, to]`
    /// (second granularity, both ends inclusive).
    fn for_each_in_range<F>(
        &self,
        table_def: redb::TableDefinition<&str, &[u8]>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        mut f: F,
    ) -> StoreResult<()>
    where
        F: FnMut(&str, &[u8]) -> StoreResult<()>,
    {
        let lower = timestamp_key_prefix(&from);
        let upper = timestamp_key_prefix(&to);

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def)?;
        for entry in table.range(lower.as_str()..)? {
            let (key, value) = entry?;
            let key = key.value();
            let stamp = key.get(..TIMESTAMP_KEY_LEN).unwrap_or(key);
            if stamp > upper.as_str() {
                break;
            }
            f(key, value.value())?;
        }
        Ok(())
    }

    /// Like `for_each_in_range`, decoding each value. Undecodable entries are
    /// logged and skipped.
    fn for_each_decoded_in_range<T, F>(
        &self,
        table_def: redb::TableDefinition<&str, &[u8]>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        mut f: F,
    ) -> StoreResult<()>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        self.for_each_in_range(table_def, from, to, |key, bytes| {
            match serde_json::from_slice::<T>(bytes) {
                Ok(val) => f(val),
                Err(e) => error!("Failed to decode entry '{}': {}", key, e),
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;
    use website_common::types::RecordId;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, h, m, s).unwrap()
    }

    fn request(created_at: DateTime<Utc>, visitor: &str, url: &str, us: u64) -> HttpRequestRecord {
        HttpRequestRecord {
            id: RecordId::new(),
            created_at,
            visitor_id: visitor.to_string(),
            method: "GET".to_string(),
            url: url.to_string(),
            user_agent: "test-agent".to_string(),
            ip_address: "127.0.0.1".to_string(),
            content_length: 0,
            status: 200,
            time_to_handle_us: us,
        }
    }

    fn seeded_store(dir: &Path) -> SiteStore {
        let store = SiteStore::open(dir.join("site.redb")).unwrap();
        store.store_http_request(&request(at(9, 0, 0), "alice", "/", 100)).unwrap();
        store.store_http_request(&request(at(10, 0, 0), "alice", "/resume", 300)).unwrap();
        store.store_http_request(&request(at(11, 0, 0), "bob", "/", 500)).unwrap();
        store.store_http_request(&request(at(23, 0, 0), "carol", "/legal", 700)).unwrap();
        store
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("site.redb");
        let _store = SiteStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_range_queries() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path());

        let (from, to) = (at(9, 30, 0), at(12, 0, 0));
        assert_eq!(store.count_http_requests(from, to).unwrap(), 2);
        assert_eq!(store.count_visitors(from, to).unwrap(), 2);
        assert_eq!(
            store.average_time_to_handle(from, to).unwrap(),
            Duration::from_micros(400)
        );

        let urls = store.most_requested_urls(at(0, 0, 0), at(23, 59, 59)).unwrap();
        assert_eq!(urls.get("/"), Some(&2));
        assert_eq!(urls.get("/resume"), Some(&1));
        assert_eq!(urls.get("/legal"), Some(&1));
        assert_eq!(store.count_visitors(at(0, 0, 0), at(23, 59, 59)).unwrap(), 3);
    }

    #[test]
    fn test_count_server_errors() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path());
        let mut failed = request(at(10, 30, 0), "bob", "/contact", 900);
        failed.status = 500;
        store.store_http_request(&failed).unwrap();
        let mut missing = request(at(10, 31, 0), "bob", "/nope", 50);
        missing.status = 404;
        store.store_http_request(&missing).unwrap();

        assert_eq!(store.count_server_errors(at(0, 0, 0), at(23, 59, 59)).unwrap(), 1);
        assert_eq!(store.count_server_errors(at(11, 0, 0), at(23, 59, 59)).unwrap(), 0);
    }

    #[test]
    fn test_range_bounds_are_inclusive_at_second_granularity() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path());

        assert_eq!(store.count_http_requests(at(10, 0, 0), at(11, 0, 0)).unwrap(), 2);
        assert_eq!(store.count_http_requests(at(10, 0, 1), at(10, 59, 59)).unwrap(), 0);
    }

    #[test]
    fn test_empty_and_inverted_ranges() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path());

        let (from, to) = (at(12, 0, 0), at(13, 0, 0));
        assert_eq!(store.count_http_requests(from, to).unwrap(), 0);
        assert_eq!(store.average_time_to_handle(from, to).unwrap(), Duration::ZERO);
        assert!(store.most_requested_urls(from, to).unwrap().is_empty());

        assert_eq!(store.count_http_requests(at(23, 0, 0), at(9, 0, 0)).unwrap(), 0);
    }

    #[test]
    fn test_visitor_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SiteStore::open(dir.path().join("site.redb")).unwrap();
        assert!(store.get_visitor("missing").unwrap().is_none());

        let visitor = Visitor {
            id: "abc123".to_string(),
            first_visited_at: at(8, 0, 0),
            first_visited_page: "/".to_string(),
        };
        store.store_visitor(&visitor).unwrap();
        assert_eq!(store.get_visitor("abc123").unwrap(), Some(visitor));
    }

    #[test]
    fn test_contact_submissions_listed_oldest_first() {
        let dir = tempdir().unwrap();
        let store = SiteStore::open(dir.path().join("site.redb")).unwrap();

        let mut late = ContactFormSubmission::new("late@example.com", "second");
        late.created_at = at(15, 0, 0);
        let mut early = ContactFormSubmission::new("early@example.com", "first");
        early.created_at = at(14, 0, 0);
        store.store_contact_form_submission(&late).unwrap();
        store.store_contact_form_submission(&early).unwrap();

        let listed = store
            .list_contact_form_submissions(at(0, 0, 0), at(23, 59, 59))
            .unwrap();
        assert_eq!(listed, vec![early, late]);
    }

    #[test]
    fn test_undecodable_entries_are_skipped() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path());
        store
            .put_json(tables::HTTP_REQUESTS, "2024-05-06T10:30:00Zbroken", &"not a request")
            .unwrap();

        let (from, to) = (at(0, 0, 0), at(23, 59, 59));
        // raw count sees the entry, decoding aggregations skip it
        assert_eq!(store.count_http_requests(from, to).unwrap(), 5);
        assert_eq!(store.count_visitors(from, to).unwrap(), 3);
    }

    #[test]
    fn test_backup_is_a_full_copy() {
        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path());
        store
            .store_visitor(&Visitor {
                id: "alice".to_string(),
                first_visited_at: at(9, 0, 0),
                first_visited_page: "/".to_string(),
            })
            .unwrap();

        let backup_path = dir.path().join("backups").join(backup_file_name(at(12, 0, 0)));
        let copied = store.backup_to(&backup_path).unwrap();
        assert_eq!(copied, 5);

        drop(store);
        let restored = SiteStore::open(&backup_path).unwrap();
        assert_eq!(
            restored.count_http_requests(at(0, 0, 0), at(23, 59, 59)).unwrap(),
            4
        );
        assert!(restored.get_visitor("alice").unwrap().is_some());
    }

    #[test]
    fn test_backup_file_name() {
        assert_eq!(
            backup_file_name(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            "2024_01_02_03_04_05.backup.redb"
        );
    }
}
