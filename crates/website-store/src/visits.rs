//! Persistence used by request tracking.

use crate::store::{SiteStore, StoreResult};
use website_common::types::{HttpRequestRecord, Visitor};

/// Visitor lookups and request logging, as needed by the tracking middleware.
pub trait VisitLog: Send + Sync {
    fn get_visitor(&self, id: &str) -> StoreResult<Option<Visitor>>;

    fn store_visitor(&self, visitor: &Visitor) -> StoreResult<()>;

    fn store_http_request(&self, request: &HttpRequestRecord) -> StoreResult<()>;
}

impl VisitLog for SiteStore {
    fn get_visitor(&self, id: &str) -> StoreResult<Option<Visitor>> {
        Self::get_visitor(self, id)
    }

    fn store_visitor(&self, visitor: &Visitor) -> StoreResult<()> {
        Self::store_visitor(self, visitor)
    }

    fn store_http_request(&self, request: &HttpRequestRecord) -> StoreResult<()> {
        Self::store_http_request(self, request)
    }
}
