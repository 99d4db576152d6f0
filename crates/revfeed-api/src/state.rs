//! Shared application state

use revfeed_core::upstream::UpstreamProvider;
use revfeed_engine::{Clock, FeedSettings, SystemClock};
use std::sync::Arc;

/// Handles every request clones; nothing in here is mutable
#[derive(Clone)]
pub struct AppState {
    /// Opens one upstream handle per request
    pub provider: Arc<dyn UpstreamProvider>,
    pub clock: Arc<dyn Clock>,
    pub settings: FeedSettings,
}

impl AppState {
    pub fn new(provider: Arc<dyn UpstreamProvider>, settings: FeedSettings) -> Self {
        Self {
            provider,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
