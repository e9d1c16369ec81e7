//! Display components.
//!
//! Each view subscribes to the topics it cares about in `init` and writes
//! to a [`Console`]. Views never call the controller; everything they show
//! arrives as an [`Event`].
//!
//! | View | Topics |
//! |------|--------|
//! | [`ResultsView`] | `results-ready`, `results-cleared` |
//! | [`GuidanceView`] | `min-chars-placeholder`, `guidance-updated`, `search-started`, `results-ready` |
//! | [`StatusView`] | `app-ready`, `app-error`, `year-range-loaded`, `record-updated`, `revisions-ready` |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

use archive_explorer_core::dates::{format_archive_date, format_duration, format_time};
use archive_explorer_core::events::{Event, EventBus, Topic};
use archive_explorer_core::lifecycle::{Component, Destroyable, Initializable, SubscriptionSet};
use archive_explorer_core::locale::Locale;
use archive_explorer_core::models::{Record, RecordRevision, YearRange};
use archive_explorer_core::store::RecordStore;

use crate::console::Console;

/// Fixed interface wording per locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTexts {
    pub placeholder: String,
    pub no_results: String,
    pub unknown_author: String,
    locale: Locale,
}

impl ViewTexts {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self {
                placeholder: "Enter search criteria to find records".to_string(),
                no_results: "No records matched your query.".to_string(),
                unknown_author: "Unknown".to_string(),
                locale,
            },
            Locale::Lv => Self {
                placeholder: "Ievadiet meklēšanas kritērijus, lai atrastu ierakstus".to_string(),
                no_results: "Diemžēl nekas netika atrasts atbilstoši jūsu meklējumam.".to_string(),
                unknown_author: "Nezināms".to_string(),
                locale,
            },
        }
    }

    pub fn results_count(&self, count: usize, total: usize) -> String {
        match self.locale {
            Locale::En => format!(
                "Found {} of {} record{}",
                count,
                total,
                if total == 1 { "" } else { "s" }
            ),
            Locale::Lv => format!(
                "Atrast{} {} no {} ierakst{}",
                if count == 1 { "s" } else { "i" },
                count,
                total,
                if total == 1 { "a" } else { "iem" }
            ),
        }
    }
}

/// Text card for one record.
pub fn record_card(index: usize, record: &Record, locale: Locale) -> String {
    let texts = ViewTexts::for_locale(locale);
    let date = format_archive_date(record.date.as_ref(), locale);
    let author = match record.author.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => a,
        _ => texts.unknown_author.as_str(),
    };

    let mut card = format!("{:>3}. {}\n", index, record.display_title());
    let time = record.date.as_ref().and_then(format_time);
    match time {
        Some(t) if t != "00:00" => card.push_str(&format!(
            "     date:     {} {} ({})\n",
            date.formatted, t, date.day_name
        )),
        _ => card.push_str(&format!(
            "     date:     {} ({})\n",
            date.formatted, date.day_name
        )),
    }
    card.push_str(&format!("     author:   {}\n", author));
    if let Some(secs) = record.duration_secs() {
        card.push_str(&format!("     duration: {}\n", format_duration(secs)));
    }
    if let Some(kind) = record.file_type.as_deref() {
        card.push_str(&format!("     type:     {}\n", kind));
    }
    card.push_str(&format!("     id:       {}", record.id));
    card
}

/// Numbered result cards.
pub struct ResultsView {
    console: Console,
    locale: Locale,
    shown: Arc<Mutex<Vec<Arc<Record>>>>,
    subs: SubscriptionSet,
}

impl ResultsView {
    pub fn new(console: Console, locale: Locale) -> Self {
        Self {
            console,
            locale,
            shown: Arc::new(Mutex::new(Vec::new())),
            subs: SubscriptionSet::new(),
        }
    }

    /// Records currently on display.
    pub fn shown(&self) -> Vec<Arc<Record>> {
        self.shown.lock().clone()
    }
}

impl Initializable for ResultsView {
    fn init(&mut self, bus: &EventBus) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let console = self.console.clone();
        let shown = self.shown.clone();
        let locale = self.locale;
        self.subs.push(bus.subscribe(Topic::ResultsReady, move |event| {
            if let Event::ResultsReady { records } = event {
                for (i, record) in records.iter().enumerate() {
                    console.line(record_card(i + 1, record, locale));
                }
                *shown.lock() = records.clone();
            }
            Ok(())
        }));

        let shown = self.shown.clone();
        self.subs.push(bus.subscribe(Topic::ResultsCleared, move |_| {
            shown.lock().clear();
            Ok(())
        }));
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        !self.subs.is_empty()
    }
}

impl Destroyable for ResultsView {
    fn destroy(&mut self) {
        self.subs.release_all();
        self.shown.lock().clear();
    }
}

impl Component for ResultsView {
    fn name(&self) -> &'static str {
        "results"
    }
}

/// Placeholder, guidance and result-count messages.
///
/// "No matches" only follows a search that actually ran; clearing the input
/// shows the placeholder instead.
pub struct GuidanceView {
    console: Console,
    texts: ViewTexts,
    store: Arc<RecordStore>,
    searching: Arc<AtomicBool>,
    subs: SubscriptionSet,
}

impl GuidanceView {
    pub fn new(console: Console, locale: Locale, store: Arc<RecordStore>) -> Self {
        Self {
            console,
            texts: ViewTexts::for_locale(locale),
            store,
            searching: Arc::new(AtomicBool::new(false)),
            subs: SubscriptionSet::new(),
        }
    }
}

impl Initializable for GuidanceView {
    fn init(&mut self, bus: &EventBus) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let console = self.console.clone();
        let placeholder = self.texts.placeholder.clone();
        let searching = self.searching.clone();
        self.subs.push(bus.subscribe(Topic::MinCharsPlaceholder, move |event| {
            if let Event::MinCharsPlaceholder { show: true } = event {
                searching.store(false, Ordering::SeqCst);
                console.line(&placeholder);
            }
            Ok(())
        }));

        let console = self.console.clone();
        self.subs.push(bus.subscribe(Topic::GuidanceUpdated, move |event| {
            if let Event::GuidanceUpdated { message, .. } = event {
                if !message.is_empty() {
                    console.line(message);
                }
            }
            Ok(())
        }));

        let searching = self.searching.clone();
        self.subs.push(bus.subscribe(Topic::SearchStarted, move |_| {
            searching.store(true, Ordering::SeqCst);
            Ok(())
        }));

        let console = self.console.clone();
        let texts = self.texts.clone();
        let store = self.store.clone();
        let searching = self.searching.clone();
        self.subs.push(bus.subscribe(Topic::ResultsReady, move |event| {
            let Event::ResultsReady { records } = event else {
                return Ok(());
            };
            let was_searching = searching.swap(false, Ordering::SeqCst);
            if records.is_empty() {
                if was_searching {
                    console.line(&texts.no_results);
                }
            } else {
                console.line(texts.results_count(records.len(), store.total()));
            }
            Ok(())
        }));
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        !self.subs.is_empty()
    }
}

impl Destroyable for GuidanceView {
    fn destroy(&mut self) {
        self.subs.release_all();
    }
}

impl Component for GuidanceView {
    fn name(&self) -> &'static str {
        "guidance"
    }
}

fn revision_lines(revisions: &[RecordRevision]) -> Vec<String> {
    revisions
        .iter()
        .enumerate()
        .map(|(i, rev)| {
            let mut line = format!("  #{} {} by {}", i + 1, rev.timestamp, rev.editor_name);
            if !rev.editor_email.is_empty() {
                line.push_str(&format!(" <{}>", rev.editor_email));
            }
            if !rev.reason.is_empty() {
                line.push_str(&format!(": {}", rev.reason));
            }
            line.push_str(&format!(" (was \"{}\")", rev.previous.title_or_empty()));
            line
        })
        .collect()
}

/// Application status: load results, edits, revision history.
pub struct StatusView {
    console: Console,
    range: Arc<Mutex<Option<YearRange>>>,
    subs: SubscriptionSet,
}

impl StatusView {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            range: Arc::new(Mutex::new(None)),
            subs: SubscriptionSet::new(),
        }
    }

    pub fn year_range(&self) -> Option<YearRange> {
        *self.range.lock()
    }
}

impl Initializable for StatusView {
    fn init(&mut self, bus: &EventBus) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let range = self.range.clone();
        self.subs.push(bus.subscribe(Topic::YearRangeLoaded, move |event| {
            if let Event::YearRangeLoaded { range: loaded } = event {
                *range.lock() = Some(*loaded);
            }
            Ok(())
        }));

        let console = self.console.clone();
        let range = self.range.clone();
        self.subs.push(bus.subscribe(Topic::AppReady, move |_| {
            match *range.lock() {
                Some(r) if r.min != 0 => {
                    console.line(format!("Archive ready ({} - {})", r.min, r.max))
                }
                _ => console.line("Archive ready"),
            }
            Ok(())
        }));

        let console = self.console.clone();
        self.subs.push(bus.subscribe(Topic::AppError, move |event| {
            if let Event::AppError { message } = event {
                console.line(format!("Archive data unavailable: {}", message));
            }
            Ok(())
        }));

        let console = self.console.clone();
        self.subs.push(bus.subscribe(Topic::RecordUpdated, move |event| {
            if let Event::RecordUpdated { record } = event {
                console.line(format!(
                    "Record {} updated at {}",
                    record.id,
                    record.last_updated.as_deref().unwrap_or("-")
                ));
            }
            Ok(())
        }));

        let console = self.console.clone();
        self.subs.push(bus.subscribe(Topic::RevisionsReady, move |event| {
            if let Event::RevisionsReady { record_id, revisions } = event {
                if revisions.is_empty() {
                    console.line(format!("No revisions for record {}", record_id));
                } else {
                    console.line(format!("Revisions for record {}:", record_id));
                    for line in revision_lines(revisions) {
                        console.line(line);
                    }
                }
            }
            Ok(())
        }));
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        !self.subs.is_empty()
    }
}

impl Destroyable for StatusView {
    fn destroy(&mut self) {
        self.subs.release_all();
    }
}

impl Component for StatusView {
    fn name(&self) -> &'static str {
        "status"
    }
}
