use std::time::Duration;

/// Default time budget before a batch turns PARTIAL
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(25_000);

/// Engine settings fixed for the lifetime of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    /// Elapsed time after which no further item is processed
    pub time_budget: Duration,
}

impl FeedSettings {
    pub fn with_time_budget(time_budget: Duration) -> Self {
        Self { time_budget }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            time_budget: DEFAULT_TIME_BUDGET,
        }
    }
}
