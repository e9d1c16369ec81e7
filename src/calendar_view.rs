//! Text calendars for `archive calendar`.
//!
//! A month renders as a Monday-first grid where days holding records are
//! marked with `*`, followed by the titles filed under each marked day.

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Datelike;
use parking_lot::Mutex;

use archive_explorer_core::calendar::{MonthView, YearView};
use archive_explorer_core::events::{Event, EventBus, Topic};
use archive_explorer_core::lifecycle::{Component, Destroyable, Initializable, SubscriptionSet};
use archive_explorer_core::locale::Locale;
use archive_explorer_core::models::{Record, YearRange};

use crate::console::Console;

pub fn render_month(view: &MonthView, locale: Locale) -> Vec<String> {
    let mut lines = vec![format!("{} {}", locale.month_long(view.month), view.year)];
    lines.push(
        (0..7)
            .map(|d| format!("{:>3}", locale.weekday_abbrev(d)))
            .collect::<String>(),
    );

    for week in &view.weeks {
        let row: String = week
            .iter()
            .map(|cell| match cell {
                Some(day) if !day.records.is_empty() => format!("{:>2}*", day.day()),
                Some(day) => format!("{:>2} ", day.day()),
                None => "   ".to_string(),
            })
            .collect();
        lines.push(row.trim_end().to_string());
    }

    for day in view.days().filter(|d| !d.records.is_empty()) {
        let weekday = locale.weekday(day.date.weekday().num_days_from_monday());
        lines.push(format!("  {:02} {}:", day.day(), weekday));
        for record in &day.records {
            lines.push(format!("     - {} [{}]", record.display_title(), record.id));
        }
    }
    lines
}

pub fn render_year(view: &YearView, locale: Locale) -> Vec<String> {
    let mut lines = vec![format!("{} ({} records)", view.year, view.record_count())];
    for month in &view.months {
        lines.push(String::new());
        lines.extend(render_month(month, locale));
    }
    lines
}

/// Prints month and year calendars; remembers the loaded year range so a
/// missing `--year` means the latest year.
pub struct CalendarView {
    console: Console,
    locale: Locale,
    range: Arc<Mutex<Option<YearRange>>>,
    subs: SubscriptionSet,
}

impl CalendarView {
    pub fn new(console: Console, locale: Locale) -> Self {
        Self {
            console,
            locale,
            range: Arc::new(Mutex::new(None)),
            subs: SubscriptionSet::new(),
        }
    }

    /// Year to show when none was requested.
    pub fn default_year(&self) -> Option<i32> {
        match *self.range.lock() {
            Some(r) if r.max != 0 => Some(r.max),
            _ => None,
        }
    }

    pub fn show(&self, records: &[Arc<Record>], year: Option<i32>, month: Option<u32>) -> Result<()> {
        let Some(year) = year.or_else(|| self.default_year()) else {
            bail!("No dated records; pass --year to pick a year");
        };

        let lines = match month {
            Some(m) => match MonthView::build(year, m, records) {
                Some(view) => render_month(&view, self.locale),
                None => bail!("month must be between 1 and 12, got {}", m),
            },
            None => render_year(&YearView::build(year, records), self.locale),
        };
        for line in lines {
            self.console.line(line);
        }
        Ok(())
    }
}

impl Initializable for CalendarView {
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
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        !self.subs.is_empty()
    }
}

impl Destroyable for CalendarView {
    fn destroy(&mut self) {
        self.subs.release_all();
    }
}

impl Component for CalendarView {
    fn name(&self) -> &'static str {
        "calendar"
    }
}
