//! In-memory event capture for logging assertions
//!
//! The first call to [`init_test_capture`] installs a capture layer as the
//! global subscriber. Every later call returns a handle to the same buffer,
//! so tests filter by operation name (and usually by request id) instead of
//! expecting an empty buffer.

use revfeed_core_types::schema::{FIELD_EVENT, FIELD_OP};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

/// One recorded event, fields rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    /// `start`, `end` or `end_error` for lifecycle events
    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

struct FieldText<'a>(&'a mut BTreeMap<String, String>);

// integers and bools fall back to record_debug, which prints them plainly
impl Visit for FieldText<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

struct CaptureLayer(Buffer);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldText(&mut fields));
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields,
        };
        if let Ok(mut events) = self.0.lock() {
            events.push(captured);
        }
    }
}

/// Handle on the shared capture buffer
#[derive(Clone)]
pub struct TestCapture(Buffer);

impl TestCapture {
    /// Events emitted for one operation, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.op() == Some(op))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of `event` lifecycle events recorded for `op`
    pub fn count(&self, op: &str, event: &str) -> usize {
        self.events_for_op(op)
            .iter()
            .filter(|e| e.is(op, event))
            .count()
    }

    /// # Panics
    ///
    /// Panics when no `event` was recorded for `op`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let seen = self.events_for_op(op);
        assert!(
            seen.iter().any(|e| e.is(op, event)),
            "Expected event op={} event={}, saw {:?}",
            op,
            event,
            seen.iter().filter_map(CapturedEvent::event).collect::<Vec<_>>()
        );
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer once and hand out the shared buffer
///
/// ```
/// use revfeed_core::logging_facility::test_capture::init_test_capture;
/// use revfeed_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("seed_import");
/// capture.assert_event_exists("seed_import", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let buffer = Buffer::default();
            let _ = tracing_subscriber::registry()
                .with(CaptureLayer(buffer.clone()))
                .try_init();
            TestCapture(buffer)
        })
        .clone()
}
