//! Record storage: the single designated writer of the record collection.
//!
//! Readers receive a [`RecordSet`] snapshot. Edits are copy-on-write: the
//! store swaps in a new snapshot and never alters one it already handed out,
//! so a search running over an older snapshot sees a consistent collection.
//!
//! Acquisition happens behind [`RecordSource`], keeping this crate free of
//! filesystem and network code. The application crate provides file and
//! HTTP sources; [`StaticSource`] serves records already in memory.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use serde_json::Value;

use crate::calendar;
use crate::controller::RecordProvider;
use crate::error::ExplorerError;
use crate::models::{assign_ids, Editor, Record, RecordId, RecordPatch, RecordRevision, YearRange};

/// Immutable, ordered view of the collection at one point in time.
pub type RecordSet = Arc<Vec<Arc<Record>>>;

/// Where records come from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable location, used in logs and error messages.
    fn describe(&self) -> String;

    /// Fetch and parse the whole collection.
    async fn fetch(&self) -> Result<Vec<Record>>;
}

/// Parse the JSON resource: either a bare array of records or an object
/// with a `records` array.
pub fn parse_records(json: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(json).context("Archive data is not valid JSON")?;
    let array = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove("records") {
            Some(records @ Value::Array(_)) => records,
            _ => bail!("Archive data object has no 'records' array"),
        },
        _ => bail!("Archive data must be an array of records"),
    };
    let Value::Array(items) = array else {
        bail!("Archive data must be an array of records");
    };
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index, "skipping archive entry that is not an object");
            continue;
        }
        match serde_json::from_value::<Record>(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(index, error = %e, "skipping unreadable archive entry"),
        }
    }
    Ok(records)
}

/// Records supplied directly, e.g. embedded at build time or in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(parse_records(json)?))
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    fn describe(&self) -> String {
        format!("static ({} records)", self.records.len())
    }

    async fn fetch(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Pending,
    Loaded,
    Failed(String),
}

struct StoreState {
    records: RecordSet,
    load: LoadState,
    revisions: HashMap<RecordId, Vec<RecordRevision>>,
}

/// In-memory record store with revision history for edits.
pub struct RecordStore {
    state: RwLock<StoreState>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                records: Arc::new(Vec::new()),
                load: LoadState::Pending,
                revisions: HashMap::new(),
            }),
        }
    }

    /// Replace the collection. Records without an id get one here.
    ///
    /// Returns the number of records loaded.
    pub fn load(&self, records: Vec<Record>) -> usize {
        let records: Vec<Arc<Record>> = assign_ids(records).into_iter().map(Arc::new).collect();
        let count = records.len();
        let mut state = self.state.write();
        state.records = Arc::new(records);
        state.load = LoadState::Loaded;
        state.revisions.clear();
        count
    }

    /// Fetch from `source` and load the result. On failure the store is
    /// marked failed and stays empty.
    pub async fn load_from(&self, source: &dyn RecordSource) -> Result<usize, ExplorerError> {
        match source.fetch().await {
            Ok(records) => {
                let count = self.load(records);
                tracing::info!(source = %source.describe(), count, "archive records loaded");
                Ok(count)
            }
            Err(e) => {
                let message = format!("{}: {:#}", source.describe(), e);
                self.mark_failed(&message);
                Err(ExplorerError::DataUnavailable(message))
            }
        }
    }

    pub fn mark_failed(&self, message: &str) {
        tracing::warn!("archive data unavailable: {}", message);
        self.state.write().load = LoadState::Failed(message.to_string());
    }

    pub fn load_error(&self) -> Option<String> {
        match &self.state.read().load {
            LoadState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().load == LoadState::Loaded
    }

    /// Current snapshot, or `None` until a load has succeeded.
    pub fn records(&self) -> Option<RecordSet> {
        let state = self.state.read();
        match state.load {
            LoadState::Loaded => Some(state.records.clone()),
            _ => None,
        }
    }

    pub fn get(&self, id: &RecordId) -> Option<Arc<Record>> {
        self.state
            .read()
            .records
            .iter()
            .find(|r| r.id.matches(id))
            .cloned()
    }

    pub fn total(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn year_range(&self) -> YearRange {
        calendar::year_range(&self.state.read().records)
    }

    /// Apply `patch` to the record with `id`, stamping `last_updated` and
    /// appending a revision that holds the previous version.
    pub fn update(&self, id: &RecordId, patch: &RecordPatch, editor: &Editor) -> Result<Arc<Record>, ExplorerError> {
        let mut state = self.state.write();
        let index = state
            .records
            .iter()
            .position(|r| r.id.matches(id))
            .ok_or_else(|| ExplorerError::RecordNotFound(id.to_string()))?;

        let previous = state.records[index].as_ref().clone();
        let id = previous.id.clone();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut updated = previous.clone();
        patch.apply_to(&mut updated);
        updated.last_updated = Some(now.clone());
        let updated = Arc::new(updated);

        let mut next: Vec<Arc<Record>> = state.records.as_ref().clone();
        next[index] = updated.clone();
        state.records = Arc::new(next);

        state.revisions.entry(id.clone()).or_default().push(RecordRevision {
            timestamp: now,
            editor_name: editor.name.clone(),
            editor_email: editor.email.clone(),
            reason: editor.reason.clone(),
            previous,
        });

        tracing::debug!(record = %id, "record updated");
        Ok(updated)
    }

    /// Edit history for a record, oldest first.
    pub fn revisions(&self, id: &RecordId) -> Vec<RecordRevision> {
        self.state
            .read()
            .revisions
            .iter()
            .find(|(key, _)| key.matches(id))
            .map(|(_, history)| history.clone())
            .unwrap_or_default()
    }
}

impl RecordProvider for RecordStore {
    fn snapshot(&self) -> Option<RecordSet> {
        self.records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordDate;

    fn sample() -> Vec<Record> {
        parse_records(
            r#"[
                {"id": 1, "title": "Budget 2020", "date": "2020-03-01", "author": "Ana"},
                {"id": 2, "title": "Budget 2021", "date": "2021-03-01", "author": "Ben"},
                {"title": "No id"}
            ]"#,
        )
        .unwrap()
    }

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        fn describe(&self) -> String {
            "failing".to_string()
        }
        async fn fetch(&self) -> Result<Vec<Record>> {
            bail!("HTTP error! Status: 404")
        }
    }

    #[test]
    fn test_parse_records_shapes() {
        assert_eq!(parse_records(r#"[{"id":1}]"#).unwrap().len(), 1);
        assert_eq!(parse_records(r#"{"records":[{"id":1},{"id":2}]}"#).unwrap().len(), 2);
        assert!(parse_records(r#"{"items":[]}"#).is_err());
        assert!(parse_records("42").is_err());
        assert!(parse_records("not json").is_err());
    }

    #[test]
    fn test_malformed_entries_do_not_sink_the_load() {
        let records = parse_records(
            r#"[
                {"id": null, "title": "A"},
                {"id": 2, "title": "B"},
                {"id": 3, "content": 42, "group": 7},
                "stray",
                null
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 3);

        let store = RecordStore::new();
        store.load(records);
        assert!(store.is_loaded());
        assert_eq!(store.get(&RecordId::parse("rec-0")).unwrap().title_or_empty(), "A");
        assert_eq!(store.get(&RecordId::Int(3)).unwrap().content.as_deref(), Some("42"));
    }

    #[test]
    fn test_string_numeric_id_found_by_typed_id() {
        let store = RecordStore::new();
        store.load(parse_records(r#"[{"id": "42", "title": "A"}]"#).unwrap());

        let typed = RecordId::parse("42");
        assert_eq!(typed, RecordId::Int(42));
        assert_eq!(store.get(&typed).unwrap().title_or_empty(), "A");

        let patch = RecordPatch {
            title: Some("A2".into()),
            ..Default::default()
        };
        let editor = Editor {
            name: "Ieva".into(),
            ..Default::default()
        };
        let updated = store.update(&typed, &patch, &editor).unwrap();
        assert_eq!(updated.id, RecordId::Text("42".into()));
        assert_eq!(store.revisions(&typed).len(), 1);
        assert_eq!(store.revisions(&RecordId::Text("42".into())).len(), 1);
    }

    #[test]
    fn test_not_loaded_until_load() {
        let store = RecordStore::new();
        assert!(!store.is_loaded());
        assert!(store.records().is_none());
        store.load(sample());
        assert!(store.is_loaded());
        assert_eq!(store.total(), 3);
        assert_eq!(store.get(&RecordId::Text("rec-2".into())).unwrap().title_or_empty(), "No id");
    }

    #[test]
    fn test_year_range() {
        let store = RecordStore::new();
        store.load(sample());
        assert_eq!(store.year_range(), YearRange { min: 2020, max: 2021 });
    }

    #[test]
    fn test_update_is_copy_on_write_and_keeps_history() {
        let store = RecordStore::new();
        store.load(sample());
        let before = store.records().unwrap();

        let editor = Editor {
            name: "Ieva".into(),
            email: "ieva@example.com".into(),
            reason: "typo".into(),
        };
        let patch = RecordPatch {
            title: Some("Budget 2020 (final)".into()),
            date: Some(RecordDate::Text("2020-03-02".into())),
            ..Default::default()
        };
        let updated = store.update(&RecordId::Int(1), &patch, &editor).unwrap();
        assert_eq!(updated.title_or_empty(), "Budget 2020 (final)");
        assert!(updated.last_updated.is_some());
        assert_eq!(updated.author.as_deref(), Some("Ana"));

        // The earlier snapshot is untouched.
        assert_eq!(before[0].title_or_empty(), "Budget 2020");
        assert_eq!(store.records().unwrap()[0].title_or_empty(), "Budget 2020 (final)");

        let history = store.revisions(&RecordId::Int(1));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].editor_name, "Ieva");
        assert_eq!(history[0].previous.title_or_empty(), "Budget 2020");
        assert!(store.revisions(&RecordId::Int(2)).is_empty());
    }

    #[test]
    fn test_update_unknown_record() {
        let store = RecordStore::new();
        store.load(sample());
        let err = store
            .update(&RecordId::Int(99), &RecordPatch::default(), &Editor::default())
            .unwrap_err();
        assert_eq!(err, ExplorerError::RecordNotFound("99".into()));
    }

    #[tokio::test]
    async fn test_load_from_static_source() {
        let store = RecordStore::new();
        let source = StaticSource::new(sample());
        assert_eq!(store.load_from(&source).await.unwrap(), 3);
        assert!(store.load_error().is_none());
    }

    #[tokio::test]
    async fn test_load_from_failing_source_marks_failed() {
        let store = RecordStore::new();
        let err = store.load_from(&FailingSource).await.unwrap_err();
        assert!(matches!(err, ExplorerError::DataUnavailable(ref m) if m.contains("404")));
        assert!(!store.is_loaded());
        assert!(store.load_error().unwrap().contains("failing"));
        assert!(store.records().is_none());
    }
}
