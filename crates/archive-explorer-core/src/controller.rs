//! The search controller state machine.
//!
//! Every input event or explicit submit calls
//! [`SearchController::evaluate`], which reads the form, consults the
//! [`SearchPolicy`], runs the [`RecordFilter`] when the input is valid, and
//! publishes the outcome on the [`EventBus`]. Each evaluation fully
//! supersedes the previous one.
//!
//! # States
//!
//! ```text
//!            input cleared                 below threshold
//!   Idle ◀───────────────── any ─────────────────▶ Suppressed
//!                            │
//!                            │ valid
//!                            ▼
//!                        Searching ──▶ ResultsReady (possibly empty)
//! ```
//!
//! # Events per evaluation
//!
//! 1. `guidance-updated` with the current length, trigger, and message.
//! 2. `min-chars-placeholder`, shown only for empty input.
//! 3. One of:
//!    - `results-cleared` for empty input (state `Idle`),
//!    - `search-started` then `results-ready` for a valid query,
//!    - `search-invalid` otherwise (state `Suppressed`; earlier results stay
//!      on screen).
//!
//! Until the record provider has data, evaluation publishes nothing and
//! returns [`SearchOutcome::Idle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::events::{Event, EventBus};
use crate::filter::RecordFilter;
use crate::models::{SearchOutcome, SearchQuery, SearchState, SearchTrigger};
use crate::observe::SharedSink;
use crate::policy::{input_length, SearchPolicy};
use crate::store::RecordSet;

/// The form collaborator: current input text and the author checkbox.
pub trait SearchForm: Send + Sync {
    fn input(&self) -> String;
    fn include_author(&self) -> bool;
}

/// The data-access collaborator, read before every filter call.
pub trait RecordProvider: Send + Sync {
    /// Current collection, or `None` while data is not loaded.
    fn snapshot(&self) -> Option<RecordSet>;
}

/// A thread-safe in-memory [`SearchForm`].
#[derive(Debug, Default)]
pub struct FormState {
    input: RwLock<String>,
    include_author: AtomicBool,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        *self.input.write() = text.into();
    }

    pub fn set_include_author(&self, include: bool) {
        self.include_author.store(include, Ordering::Relaxed);
    }
}

impl SearchForm for FormState {
    fn input(&self) -> String {
        self.input.read().clone()
    }

    fn include_author(&self) -> bool {
        self.include_author.load(Ordering::Relaxed)
    }
}

pub struct SearchController {
    policy: SearchPolicy,
    bus: EventBus,
    form: Arc<dyn SearchForm>,
    records: Arc<dyn RecordProvider>,
    sink: Option<SharedSink>,
    state: Mutex<SearchState>,
}

impl SearchController {
    pub fn new(
        policy: SearchPolicy,
        bus: EventBus,
        form: Arc<dyn SearchForm>,
        records: Arc<dyn RecordProvider>,
    ) -> Self {
        Self {
            policy,
            bus,
            form,
            records,
            sink: None,
            state: Mutex::new(SearchState::Idle),
        }
    }

    pub fn with_sink(mut self, sink: Option<SharedSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    pub fn state(&self) -> SearchState {
        *self.state.lock()
    }

    /// Evaluate the form's current input under `trigger`.
    pub fn evaluate(&self, trigger: SearchTrigger) -> SearchOutcome {
        let query = SearchQuery::new(self.form.input(), self.form.include_author(), trigger);
        self.evaluate_query(&query)
    }

    /// Evaluate an explicit query, bypassing the form.
    pub fn evaluate_query(&self, query: &SearchQuery) -> SearchOutcome {
        let Some(records) = self.records.snapshot() else {
            self.debug("evaluate skipped: archive data not loaded");
            self.set_state(SearchState::Idle);
            return SearchOutcome::Idle;
        };

        let trigger = query.trigger;
        let term = query.raw_text.trim();
        let current_length = input_length(term);
        let message = self.policy.guidance(current_length, trigger);

        if let Some(sink) = &self.sink {
            sink.group(&format!("evaluate ({})", trigger), &mut || {
                sink.table(
                    &["term", "length", "include_author", "guidance"],
                    &[vec![
                        format!("{:?}", term),
                        current_length.to_string(),
                        query.include_author.to_string(),
                        message.clone(),
                    ]],
                );
            });
        }

        self.bus.publish(&Event::GuidanceUpdated {
            current_length,
            trigger,
            message: message.clone(),
        });
        self.bus.publish(&Event::MinCharsPlaceholder {
            show: current_length == 0,
        });

        if current_length == 0 {
            self.set_state(SearchState::Idle);
            self.bus.publish(&Event::ResultsCleared);
            return SearchOutcome::Idle;
        }

        if !self.policy.is_valid(term, trigger) {
            self.debug(&format!("invalid: {}", message));
            self.set_state(SearchState::Suppressed);
            self.bus.publish(&Event::SearchInvalid {
                raw_text: query.raw_text.clone(),
                trigger,
            });
            return SearchOutcome::Suppressed { guidance: message };
        }

        self.set_state(SearchState::Searching);
        self.bus.publish(&Event::SearchStarted {
            query: query.clone(),
        });

        let matches = RecordFilter::apply(&records, Some(term), query.include_author);
        self.debug(&format!("search completed: {} of {} records", matches.len(), records.len()));
        tracing::debug!(matches = matches.len(), total = records.len(), %trigger, "search completed");

        self.set_state(SearchState::ResultsReady);
        self.bus.publish(&Event::ResultsReady {
            records: matches.clone(),
        });

        SearchOutcome::ResultsReady {
            records: matches,
            total_count: records.len(),
        }
    }

    fn set_state(&self, next: SearchState) {
        *self.state.lock() = next;
    }

    fn debug(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink.log(message);
        }
    }
}
