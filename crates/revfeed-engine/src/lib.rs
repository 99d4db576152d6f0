//! revfeed engine - request orchestration
//!
//! Turns one feed request into a [`ResponseEnvelope`](revfeed_core::ResponseEnvelope):
//! validates the revision window, resolves the container, runs the batch
//! under its time budget and assembles the response.
//!
//! The engine is synchronous and owns no state across requests. Callers
//! hand it an upstream handle and a [`Clock`].

pub mod clock;
pub mod commands;
pub mod request;
pub mod response;
pub mod session;
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::updates::run_updates_query;
pub use request::FeedRequest;
pub use session::{BatchOutcome, FeedSession};
pub use settings::FeedSettings;
