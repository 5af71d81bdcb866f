//! Test helpers for asserting on logged events.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Records the message of every event at one level seen on the current thread.
#[derive(Clone)]
pub(crate) struct EventCapture {
    level: Level,
    messages: Arc<Mutex<Vec<String>>>,
}

impl EventCapture {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl<S: Subscriber> Layer<S> for EventCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != self.level {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.messages.lock().push(visitor.0);
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

/// Install a thread-local subscriber capturing warnings until the guard drops.
///
/// Works with `#[tokio::test]`'s current-thread runtime, where spawned tasks
/// are polled on the test thread.
pub(crate) fn capture_warnings() -> (EventCapture, DefaultGuard) {
    capture_level(Level::WARN)
}

/// Like [`capture_warnings`], for any level.
pub(crate) fn capture_level(level: Level) -> (EventCapture, DefaultGuard) {
    let capture = EventCapture {
        level,
        messages: Arc::default(),
    };
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
