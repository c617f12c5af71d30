//! Shared server state.

use std::sync::Arc;
use website_common::Config;
use website_content::{Pages, Resume};
use website_report::Mailer;
use website_store::{SiteStore, VisitLog};

/// State shared by every handler and background job.
pub struct AppState {
    pub config: Config,
    pub store: Arc<SiteStore>,
    pub mailer: Arc<dyn Mailer>,
    /// Where request tracking reads visitors and records requests
    pub visits: Arc<dyn VisitLog>,
    /// Pages rendered at startup
    pub pages: Pages,
}

impl AppState {
    /// Build the state and prerender every page.
    #[must_use]
    pub fn new(config: Config, store: Arc<SiteStore>, mailer: Arc<dyn Mailer>) -> Self {
        let pages = Pages::prerender(
            &config.site,
            &Resume::published(),
            config.server.max_message_length,
        );
        Self {
            config,
            visits: store.clone(),
            store,
            mailer,
            pages,
        }
    }

    /// Send request tracking to `visits` instead of the site store.
    #[must_use]
    pub fn with_visit_log(mut self, visits: Arc<dyn VisitLog>) -> Self {
        self.visits = visits;
        self
    }
}
