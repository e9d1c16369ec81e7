//! Application wiring and lifecycle.
//!
//! [`Wiring`] collects every collaborator and refuses to build while any
//! required binding is missing, naming all of them at once. The resulting
//! [`AppController`] owns the components for the life of the session:
//!
//! ```text
//! bootstrap ──▶ init components ──▶ placeholder ──▶ load records
//!                                                      │
//!                               ok ◀───────────────────┴──────────▶ err
//!                                │                                  │
//!                      year-range-loaded, app-ready          app-error (Idle)
//! ```

use std::sync::Arc;

use anyhow::{bail, Result};

use archive_explorer_core::controller::{FormState, SearchController};
use archive_explorer_core::error::ExplorerError;
use archive_explorer_core::events::{Event, EventBus};
use archive_explorer_core::lifecycle::{Component, Destroyable, Initializable};
use archive_explorer_core::models::{
    Editor, Record, RecordId, RecordPatch, RecordRevision, SearchOutcome, SearchTrigger,
};
use archive_explorer_core::observe::SharedSink;
use archive_explorer_core::policy::SearchPolicy;
use archive_explorer_core::store::{RecordSource, RecordStore};

use crate::calendar_view::CalendarView;
use crate::render::{GuidanceView, ResultsView, StatusView};

/// Builder for [`AppController`].
#[derive(Default)]
pub struct Wiring {
    bus: Option<EventBus>,
    store: Option<Arc<RecordStore>>,
    form: Option<Arc<FormState>>,
    results: Option<ResultsView>,
    guidance: Option<GuidanceView>,
    status: Option<StatusView>,
    calendar: Option<CalendarView>,
    policy: SearchPolicy,
    sink: Option<SharedSink>,
}

impl Wiring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn store(mut self, store: Arc<RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn form(mut self, form: Arc<FormState>) -> Self {
        self.form = Some(form);
        self
    }

    pub fn results(mut self, view: ResultsView) -> Self {
        self.results = Some(view);
        self
    }

    pub fn guidance(mut self, view: GuidanceView) -> Self {
        self.guidance = Some(view);
        self
    }

    pub fn status(mut self, view: StatusView) -> Self {
        self.status = Some(view);
        self
    }

    /// Optional.
    pub fn calendar(mut self, view: CalendarView) -> Self {
        self.calendar = Some(view);
        self
    }

    pub fn policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sink(mut self, sink: Option<SharedSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Result<AppController, ExplorerError> {
        let mut missing = Vec::new();
        if self.bus.is_none() {
            missing.push("bus");
        }
        if self.store.is_none() {
            missing.push("store");
        }
        if self.form.is_none() {
            missing.push("form");
        }
        if self.results.is_none() {
            missing.push("results view");
        }
        if self.guidance.is_none() {
            missing.push("guidance view");
        }
        if self.status.is_none() {
            missing.push("status view");
        }

        let (Some(bus), Some(store), Some(form), Some(results), Some(guidance), Some(status)) = (
            self.bus,
            self.store,
            self.form,
            self.results,
            self.guidance,
            self.status,
        ) else {
            return Err(ExplorerError::missing_bindings(&missing));
        };

        let controller = SearchController::new(self.policy, bus.clone(), form.clone(), store.clone())
            .with_sink(self.sink.clone());

        let components: Vec<Box<dyn Component>> =
            vec![Box::new(guidance), Box::new(results), Box::new(status)];

        Ok(AppController {
            bus,
            store,
            form,
            controller,
            components,
            calendar: self.calendar,
            sink: self.sink,
        })
    }
}

pub struct AppController {
    bus: EventBus,
    store: Arc<RecordStore>,
    form: Arc<FormState>,
    controller: SearchController,
    components: Vec<Box<dyn Component>>,
    calendar: Option<CalendarView>,
    sink: Option<SharedSink>,
}

impl AppController {
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn form(&self) -> &Arc<FormState> {
        &self.form
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn calendar(&self) -> Option<&CalendarView> {
        self.calendar.as_ref()
    }

    /// Initialize the components and load the archive.
    ///
    /// On failure the store is marked failed, `app-error` is published, the
    /// controller stays idle, and the error is returned.
    pub async fn bootstrap(&mut self, source: &dyn RecordSource) -> Result<usize> {
        for component in self.components.iter_mut() {
            component.init(&self.bus)?;
            tracing::debug!(component = component.name(), "component initialized");
        }
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.init(&self.bus)?;
        }
        self.debug(&format!("{} components initialized", self.components.len()));
        if let Some(sink) = &self.sink {
            let policy = self.controller.policy();
            policy.dump_guidance(policy.auto_min_chars(), sink.as_ref());
        }

        self.bus.publish(&Event::MinCharsPlaceholder { show: true });

        match self.store.load_from(source).await {
            Ok(count) => {
                let range = self.store.year_range();
                self.debug(&format!(
                    "loaded {} records from {} ({} - {})",
                    count,
                    source.describe(),
                    range.min,
                    range.max
                ));
                self.bus.publish(&Event::YearRangeLoaded { range });
                self.bus.publish(&Event::AppReady);
                Ok(count)
            }
            Err(e) => {
                let message = match &e {
                    ExplorerError::DataUnavailable(detail) => detail.clone(),
                    other => other.to_string(),
                };
                self.bus.publish(&Event::AppError { message });
                Err(e.into())
            }
        }
    }

    /// Replace the form input and evaluate it.
    pub fn search(&self, text: &str, include_author: bool, trigger: SearchTrigger) -> SearchOutcome {
        self.form.set_input(text);
        self.form.set_include_author(include_author);
        self.evaluate(trigger)
    }

    pub fn evaluate(&self, trigger: SearchTrigger) -> SearchOutcome {
        self.controller.evaluate(trigger)
    }

    /// Apply a session-only edit and announce it with `record-updated`.
    pub fn edit_record(&self, id: &RecordId, patch: &RecordPatch, editor: &Editor) -> Result<Arc<Record>> {
        if patch.is_empty() {
            bail!("Nothing to change for record {}", id);
        }
        if editor.name.trim().is_empty() {
            bail!("An editor name is required to change a record");
        }
        let updated = self.store.update(id, patch, editor)?;
        self.bus.publish(&Event::RecordUpdated {
            record: updated.clone(),
        });
        Ok(updated)
    }

    /// Publish the edit history of a record with `revisions-ready`.
    pub fn request_revisions(&self, id: &RecordId) -> Result<Vec<RecordRevision>> {
        let Some(record) = self.store.get(id) else {
            return Err(ExplorerError::RecordNotFound(id.to_string()).into());
        };
        let revisions = self.store.revisions(&record.id);
        self.bus.publish(&Event::RevisionsReady {
            record_id: record.id.clone(),
            revisions: revisions.clone(),
        });
        Ok(revisions)
    }

    /// Release every component subscription.
    pub fn shutdown(&mut self) {
        for component in self.components.iter_mut() {
            component.destroy();
        }
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.destroy();
        }
        tracing::debug!("application shut down");
    }

    fn debug(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink.log(message);
        }
    }
}
