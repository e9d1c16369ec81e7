//! Typed publish/subscribe bus between the search controller and the
//! display collaborators.
//!
//! Topics form a closed set ([`Topic`]) and every payload shape is a variant
//! of [`Event`], so a consumer matching on events gets exhaustiveness
//! checking.
//!
//! # Delivery
//!
//! - [`EventBus::publish`] runs every handler subscribed to the event's topic
//!   at publish time, once, synchronously, in subscription order.
//! - A handler that returns `Err` or panics is isolated: the fault is logged,
//!   recorded in the [`PublishReport`], and the remaining handlers still run.
//!   Nothing propagates to the publisher.
//! - There is no replay. Late subscribers do not see earlier events.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::{Record, RecordId, RecordRevision, SearchQuery, SearchTrigger, YearRange};
use crate::observe::SharedSink;

/// Named channels on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    GuidanceUpdated,
    MinCharsPlaceholder,
    SearchInvalid,
    SearchStarted,
    ResultsReady,
    ResultsCleared,
    AppReady,
    AppError,
    YearRangeLoaded,
    RecordUpdated,
    RevisionsReady,
}

impl Topic {
    pub const ALL: [Topic; 11] = [
        Topic::GuidanceUpdated,
        Topic::MinCharsPlaceholder,
        Topic::SearchInvalid,
        Topic::SearchStarted,
        Topic::ResultsReady,
        Topic::ResultsCleared,
        Topic::AppReady,
        Topic::AppError,
        Topic::YearRangeLoaded,
        Topic::RecordUpdated,
        Topic::RevisionsReady,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Topic::GuidanceUpdated => "guidance-updated",
            Topic::MinCharsPlaceholder => "min-chars-placeholder",
            Topic::SearchInvalid => "search-invalid",
            Topic::SearchStarted => "search-started",
            Topic::ResultsReady => "results-ready",
            Topic::ResultsCleared => "results-cleared",
            Topic::AppReady => "app-ready",
            Topic::AppError => "app-error",
            Topic::YearRangeLoaded => "year-range-loaded",
            Topic::RecordUpdated => "record-updated",
            Topic::RevisionsReady => "revisions-ready",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every message that can travel on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Published on every evaluation, valid or not.
    GuidanceUpdated {
        current_length: usize,
        trigger: SearchTrigger,
        message: String,
    },
    /// Whether the "enter search criteria" placeholder should be visible.
    MinCharsPlaceholder { show: bool },
    /// Input present but below the threshold for `trigger`.
    SearchInvalid { raw_text: String, trigger: SearchTrigger },
    /// A valid query is about to run.
    SearchStarted { query: SearchQuery },
    /// A valid query ran; an empty list means nothing matched.
    ResultsReady { records: Vec<Arc<Record>> },
    /// The input was cleared; results should go away without a
    /// "no matches" message.
    ResultsCleared,
    AppReady,
    /// The record source failed to load.
    AppError { message: String },
    YearRangeLoaded { range: YearRange },
    RecordUpdated { record: Arc<Record> },
    RevisionsReady {
        record_id: RecordId,
        revisions: Vec<RecordRevision>,
    },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::GuidanceUpdated { .. } => Topic::GuidanceUpdated,
            Event::MinCharsPlaceholder { .. } => Topic::MinCharsPlaceholder,
            Event::SearchInvalid { .. } => Topic::SearchInvalid,
            Event::SearchStarted { .. } => Topic::SearchStarted,
            Event::ResultsReady { .. } => Topic::ResultsReady,
            Event::ResultsCleared => Topic::ResultsCleared,
            Event::AppReady => Topic::AppReady,
            Event::AppError { .. } => Topic::AppError,
            Event::YearRangeLoaded { .. } => Topic::YearRangeLoaded,
            Event::RecordUpdated { .. } => Topic::RecordUpdated,
            Event::RevisionsReady { .. } => Topic::RevisionsReady,
        }
    }
}

/// What a handler returns. `Err` is reported, never propagated.
pub type HandlerResult = anyhow::Result<()>;

type Handler = Arc<dyn Fn(&Event) -> HandlerResult + Send + Sync>;

struct Entry {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    topics: Mutex<HashMap<Topic, Vec<Entry>>>,
    sink: Mutex<Option<SharedSink>>,
}

/// One handler failure during a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFault {
    pub topic: Topic,
    pub handler_id: u64,
    pub message: String,
}

/// Summary of a single [`EventBus::publish`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub topic: Topic,
    /// Handlers that ran to completion without error.
    pub delivered: usize,
    pub faults: Vec<HandlerFault>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Cloneable handle to a shared bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.inner.topics.lock();
        let counts: HashMap<&str, usize> = topics.iter().map(|(t, v)| (t.name(), v.len())).collect();
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report handler faults to `sink` in addition to `tracing`.
    pub fn with_sink(sink: SharedSink) -> Self {
        let bus = Self::new();
        *bus.inner.sink.lock() = Some(sink);
        bus
    }

    /// Register `handler` for `topic`. Handlers on a topic run in the order
    /// they were subscribed.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .topics
            .lock()
            .entry(topic)
            .or_default()
            .push(Entry {
                id,
                handler: Arc::new(handler),
            });
        Subscription {
            bus: Arc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Deliver `event` to every current subscriber of its topic.
    pub fn publish(&self, event: &Event) -> PublishReport {
        let topic = event.topic();

        // Snapshot so handlers can subscribe, unsubscribe, or publish
        // without deadlocking on the topic table.
        let handlers: Vec<(u64, Handler)> = match self.inner.topics.lock().get(&topic) {
            Some(entries) => entries.iter().map(|e| (e.id, e.handler.clone())).collect(),
            None => Vec::new(),
        };

        let mut report = PublishReport {
            topic,
            delivered: 0,
            faults: Vec::new(),
        };

        for (handler_id, handler) in handlers {
            let outcome = catch_unwind(AssertUnwindSafe(|| handler(event)));
            let message = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(e)) => format!("{:#}", e),
                Err(panic) => panic_message(panic.as_ref()),
            };
            self.report_fault(topic, handler_id, &message);
            report.faults.push(HandlerFault {
                topic,
                handler_id,
                message,
            });
        }

        report
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner.topics.lock().get(&topic).map_or(0, Vec::len)
    }

    fn report_fault(&self, topic: Topic, handler_id: u64, message: &str) {
        tracing::warn!(%topic, handler_id, "event handler failed: {}", message);
        let sink = self.inner.sink.lock().clone();
        if let Some(sink) = sink {
            sink.log(&format!("Error in event handler for {}: {}", topic, message));
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", s)
    } else {
        "handler panicked".to_string()
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Dropping it keeps the handler registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<Inner>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Remove the handler. Returns `false` if it was already gone or the bus
    /// no longer exists.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.bus.upgrade() else {
            return false;
        };
        let mut topics = inner.topics.lock();
        match topics.get_mut(&self.topic) {
            Some(entries) => {
                let before = entries.len();
                entries.retain(|e| e.id != self.id);
                entries.len() != before
            }
            None => false,
        }
    }
}
