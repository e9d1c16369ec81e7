//! Core data models used throughout Archive Explorer.
//!
//! These types represent the archived records loaded from the static JSON
//! resource and the ephemeral values that flow through a search evaluation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Stable record identifier, either numeric or textual as found in the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Parse an identifier typed by a user: all-digit strings become `Int`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(s.to_string()),
        }
    }

    /// True for the placeholder id a record carries before [`assign_ids`] runs.
    pub fn is_unassigned(&self) -> bool {
        matches!(self, RecordId::Text(s) if s.is_empty())
    }

    /// Equality on the written form, so `Int(42)` matches `Text("42")`.
    pub fn matches(&self, other: &RecordId) -> bool {
        match (self, other) {
            (RecordId::Int(a), RecordId::Int(b)) => a == b,
            (RecordId::Text(a), RecordId::Text(b)) => a == b,
            (RecordId::Int(n), RecordId::Text(s)) | (RecordId::Text(s), RecordId::Int(n)) => {
                *s == n.to_string()
            }
        }
    }
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::Text(String::new())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// A record's date as stored in the source document.
///
/// Textual dates are ISO-8601-like strings; numeric dates are milliseconds
/// since the Unix epoch. Anything else is kept verbatim so a malformed value
/// never prevents the collection from loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordDate {
    Text(String),
    Timestamp(i64),
    Other(Value),
}

impl RecordDate {
    /// String form used for substring matching.
    pub fn as_search_text(&self) -> String {
        match self {
            RecordDate::Text(s) => s.clone(),
            RecordDate::Timestamp(ms) => ms.to_string(),
            RecordDate::Other(Value::Null) => String::new(),
            RecordDate::Other(Value::String(s)) => s.clone(),
            RecordDate::Other(v) => v.to_string(),
        }
    }
}

/// One archived item.
///
/// Only `title`, `date`, and `author` take part in search. Every other field,
/// including keys this struct does not know about, passes through filtering
/// and serialization untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: RecordId,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<RecordDate>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<String>,
    /// Length of the recording in seconds.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Number>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub path: Option<String>,
    /// RFC 3339 timestamp of the most recent edit, if any.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn author_or_empty(&self) -> &str {
        self.author.as_deref().unwrap_or("")
    }

    /// Author for display: `"Unknown"` when absent or blank.
    pub fn display_author(&self) -> &str {
        match self.author.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => a,
            _ => "Unknown",
        }
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => "(untitled)",
        }
    }

    /// Duration in whole seconds, when present and non-negative.
    pub fn duration_secs(&self) -> Option<u64> {
        let n = self.duration.as_ref()?;
        n.as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
    }
}

/// Accepts strings, numbers, and booleans as text; anything else becomes `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Integers and non-empty strings are ids. Anything else is left unassigned
/// for [`assign_ids`] to fill in.
fn lenient_id<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().map(RecordId::Int).unwrap_or_default(),
        Some(Value::String(s)) => RecordId::Text(s),
        _ => RecordId::default(),
    })
}

/// Numbers, and strings that parse as one; anything else becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => Some(n),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .map(Number::from)
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    })
}

/// Give every record without an id a stable `rec-<index>` identifier.
///
/// Runs once at load time; ids already present in the source are kept.
pub fn assign_ids(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, mut r)| {
            if r.id.is_unassigned() {
                r.id = RecordId::Text(format!("rec-{}", i));
            }
            r
        })
        .collect()
}

/// What caused a search evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTrigger {
    /// Fired on every keystroke.
    Auto,
    /// Fired by an explicit submit (button or Enter).
    Manual,
}

impl fmt::Display for SearchTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchTrigger::Auto => f.write_str("auto"),
            SearchTrigger::Manual => f.write_str("manual"),
        }
    }
}

/// A single search request, created per input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw_text: String,
    pub include_author: bool,
    pub trigger: SearchTrigger,
}

impl SearchQuery {
    pub fn new(raw_text: impl Into<String>, include_author: bool, trigger: SearchTrigger) -> Self {
        Self {
            raw_text: raw_text.into(),
            include_author,
            trigger,
        }
    }
}

/// Result of one evaluation, handed to display collaborators and then dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// No input at all; the initial placeholder applies.
    Idle,
    /// Input present but below the threshold for its trigger.
    Suppressed { guidance: String },
    /// A valid query ran. `records` may be empty; `total_count` is the size
    /// of the collection it ran against.
    ResultsReady {
        records: Vec<Arc<Record>>,
        total_count: usize,
    },
}

/// States of the search controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Suppressed,
    Searching,
    ResultsReady,
}

/// Earliest and latest year found in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

/// Who made an edit and why.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Editor {
    pub name: String,
    pub email: String,
    pub reason: String,
}

/// Field changes for a record edit. `None` leaves the field as it was.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub date: Option<RecordDate>,
    pub author: Option<String>,
    pub content: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.author.is_none() && self.content.is_none()
    }

    pub(crate) fn apply_to(&self, record: &mut Record) {
        if let Some(title) = &self.title {
            record.title = Some(title.clone());
        }
        if let Some(date) = &self.date {
            record.date = Some(date.clone());
        }
        if let Some(author) = &self.author {
            record.author = Some(author.clone());
        }
        if let Some(content) = &self.content {
            record.content = Some(content.clone());
        }
    }
}

/// History entry kept for every edit of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRevision {
    pub timestamp: String,
    pub editor_name: String,
    pub editor_email: String,
    pub reason: String,
    pub previous: Record,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let r: Record = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(r.id, RecordId::Int(7));
        assert_eq!(r.title_or_empty(), "");
        assert_eq!(r.display_author(), "Unknown");
        assert!(r.date.is_none());
    }

    #[test]
    fn test_unknown_fields_survive() {
        let json = r#"{"id":"a","title":"T","fileType":"mp3","custom":{"k":1}}"#;
        let r: Record = serde_json::from_str(json).unwrap();
        assert_eq!(r.file_type.as_deref(), Some("mp3"));
        assert_eq!(r.extra.get("custom"), Some(&serde_json::json!({"k": 1})));

        let back = serde_json::to_value(&r).unwrap();
        assert_eq!(back["custom"]["k"], 1);
        assert_eq!(back["fileType"], "mp3");
    }

    #[test]
    fn test_malformed_date_and_author_do_not_fail_loading() {
        let json = r#"[{"id":1,"date":{"bogus":true},"author":42},{"id":2,"date":null,"author":null}]"#;
        let rs: Vec<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(rs.len(), 2);
        assert!(matches!(rs[0].date, Some(RecordDate::Other(_))));
        assert_eq!(rs[0].author.as_deref(), Some("42"));
        assert!(rs[1].date.is_none());
        assert!(rs[1].author.is_none());
    }

    #[test]
    fn test_numeric_date_is_timestamp() {
        let r: Record = serde_json::from_str(r#"{"date": 1583020800000}"#).unwrap();
        assert_eq!(r.date, Some(RecordDate::Timestamp(1583020800000)));
        assert_eq!(r.date.unwrap().as_search_text(), "1583020800000");
    }

    #[test]
    fn test_assign_ids_fills_only_missing() {
        let rs: Vec<Record> = serde_json::from_str(r#"[{"id":5},{"title":"x"},{"id":"k"}]"#).unwrap();
        let rs = assign_ids(rs);
        assert_eq!(rs[0].id, RecordId::Int(5));
        assert_eq!(rs[1].id, RecordId::Text("rec-1".into()));
        assert_eq!(rs[2].id, RecordId::Text("k".into()));
    }

    #[test]
    fn test_mixed_type_fields_do_not_fail_loading() {
        let json = r#"[
            {"id": null, "title": "A"},
            {"id": 2, "content": 42, "group": 7, "path": ["x"], "fileType": true},
            {"id": 1.5, "duration": "90", "lastUpdated": 3},
            {"id": "b", "title": "B", "duration": "n/a"}
        ]"#;
        let rs = assign_ids(serde_json::from_str::<Vec<Record>>(json).unwrap());
        assert_eq!(rs.len(), 4);
        assert_eq!(rs[0].id, RecordId::Text("rec-0".into()));
        assert_eq!(rs[0].title_or_empty(), "A");
        assert_eq!(rs[1].id, RecordId::Int(2));
        assert_eq!(rs[1].content.as_deref(), Some("42"));
        assert_eq!(rs[1].group.as_deref(), Some("7"));
        assert!(rs[1].path.is_none());
        assert_eq!(rs[1].file_type.as_deref(), Some("true"));
        assert_eq!(rs[2].id, RecordId::Text("rec-2".into()));
        assert_eq!(rs[2].duration_secs(), Some(90));
        assert_eq!(rs[2].last_updated.as_deref(), Some("3"));
        assert_eq!(rs[3].id, RecordId::Text("b".into()));
        assert!(rs[3].duration.is_none());
    }

    #[test]
    fn test_record_id_matches_across_forms() {
        assert!(RecordId::Int(42).matches(&RecordId::Text("42".into())));
        assert!(RecordId::Text("42".into()).matches(&RecordId::Int(42)));
        assert!(!RecordId::Int(42).matches(&RecordId::Text("042".into())));
        assert!(!RecordId::Int(4).matches(&RecordId::Int(42)));
        assert!(RecordId::Text("k".into()).matches(&RecordId::parse("k")));
    }

    #[test]
    fn test_record_id_parse() {
        assert_eq!(RecordId::parse("12"), RecordId::Int(12));
        assert_eq!(RecordId::parse(" abc "), RecordId::Text("abc".into()));
    }

    #[test]
    fn test_duration_secs() {
        let r: Record = serde_json::from_str(r#"{"duration": 125}"#).unwrap();
        assert_eq!(r.duration_secs(), Some(125));
        let r: Record = serde_json::from_str(r#"{"duration": 12.7}"#).unwrap();
        assert_eq!(r.duration_secs(), Some(12));
    }
}
