//! Liveness probe

/// Body answered by `GET /is-alive`
pub const ALIVE_MESSAGE: &str = "Alive! I'm ready to crunch some work items!";

pub async fn is_alive() -> &'static str {
    ALIVE_MESSAGE
}
