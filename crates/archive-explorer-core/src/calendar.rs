//! Calendar geometry and per-day grouping for the month and year views.
//!
//! Months are 1-based and weeks start on Monday. Records without a readable
//! date never appear in a calendar and never affect the year range.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::dates::{date_key, year_of};
use crate::models::{Record, YearRange};

/// Number of days in `month` of `year`; 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        match year.checked_add(1) {
            Some(y) => (y, 1),
            None => return 0,
        }
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Weekday of the 1st of the month, Monday = 0 .. Sunday = 6.
pub fn first_weekday_of_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.weekday().num_days_from_monday())
}

/// Records keyed by calendar day, in collection order within each day.
pub fn group_by_date(records: &[Arc<Record>]) -> BTreeMap<NaiveDate, Vec<Arc<Record>>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Arc<Record>>> = BTreeMap::new();
    for record in records {
        if let Some(day) = date_key(record) {
            grouped.entry(day).or_default().push(record.clone());
        }
    }
    grouped
}

pub fn filter_by_month(records: &[Arc<Record>], year: i32, month: u32) -> Vec<Arc<Record>> {
    records
        .iter()
        .filter(|r| {
            date_key(r)
                .map(|d| d.year() == year && d.month() == month)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Earliest and latest year among dated records; `0..0` when there are none.
pub fn year_range(records: &[Arc<Record>]) -> YearRange {
    let mut years = records.iter().filter_map(|r| year_of(r));
    let Some(first) = years.next() else {
        return YearRange::default();
    };
    years.fold(YearRange { min: first, max: first }, |acc, y| YearRange {
        min: acc.min.min(y),
        max: acc.max.max(y),
    })
}

/// One day in a month grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub records: Vec<Arc<Record>>,
}

impl DayCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// A Monday-first month grid. Cells outside the month are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<Option<DayCell>>>,
}

impl MonthView {
    /// Lay out `month` of `year` with the records that fall on each day.
    /// Returns `None` for an invalid month.
    pub fn build(year: i32, month: u32, records: &[Arc<Record>]) -> Option<Self> {
        let lead = first_weekday_of_month(year, month)? as usize;
        let days = days_in_month(year, month);
        let mut by_day = group_by_date(&filter_by_month(records, year, month));

        let mut cells: Vec<Option<DayCell>> = vec![None; lead];
        for day in 1..=days {
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            cells.push(Some(DayCell {
                date,
                records: by_day.remove(&date).unwrap_or_default(),
            }));
        }
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        let weeks = cells.chunks(7).map(|w| w.to_vec()).collect();
        Some(Self { year, month, weeks })
    }

    pub fn record_count(&self) -> usize {
        self.days().map(|c| c.records.len()).sum()
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten().flatten()
    }
}

/// Twelve month grids for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearView {
    pub year: i32,
    pub months: Vec<MonthView>,
}

impl YearView {
    pub fn build(year: i32, records: &[Arc<Record>]) -> Self {
        let months = (1..=12)
            .filter_map(|m| MonthView::build(year, m, records))
            .collect();
        Self { year, months }
    }

    pub fn record_count(&self) -> usize {
        self.months.iter().map(MonthView::record_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordDate, RecordId};

    fn dated(id: i64, date: &str) -> Arc<Record> {
        Arc::new(Record {
            id: RecordId::Int(id),
            date: Some(RecordDate::Text(date.to_string())),
            ..Default::default()
        })
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(2021, 2), 28);
        assert_eq!(days_in_month(2021, 12), 31);
        assert_eq!(days_in_month(2021, 4), 30);
        assert_eq!(days_in_month(2021, 13), 0);
        assert_eq!(days_in_month(i32::MAX, 12), 0);
    }

    #[test]
    fn test_first_weekday_is_monday_based() {
        // 2020-06-01 was a Monday, 2020-03-01 a Sunday.
        assert_eq!(first_weekday_of_month(2020, 6), Some(0));
        assert_eq!(first_weekday_of_month(2020, 3), Some(6));
        assert_eq!(first_weekday_of_month(2020, 0), None);
    }

    #[test]
    fn test_group_by_date_skips_undated() {
        let records = vec![
            dated(1, "2020-03-01T08:00:00Z"),
            dated(2, "2020-03-01T17:00:00Z"),
            dated(3, "garbage"),
            Arc::new(Record::default()),
            dated(4, "2020-03-02"),
        ];
        let grouped = group_by_date(&records);
        assert_eq!(grouped.len(), 2);
        let first = &grouped[&NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()];
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, RecordId::Int(1));
    }

    #[test]
    fn test_year_range() {
        assert_eq!(year_range(&[]), YearRange { min: 0, max: 0 });
        let records = vec![dated(1, "1996-05-01"), dated(2, "bad"), dated(3, "2004-01-01"), dated(4, "1999-01-01")];
        assert_eq!(year_range(&records), YearRange { min: 1996, max: 2004 });
    }

    #[test]
    fn test_month_view_layout() {
        let records = vec![dated(1, "2020-03-01"), dated(2, "2020-03-31"), dated(3, "2020-04-01")];
        let view = MonthView::build(2020, 3, &records).unwrap();
        // March 2020 starts on Sunday: six leading blanks, 31 days, 6 weeks.
        assert_eq!(view.weeks.len(), 6);
        assert!(view.weeks[0][5].is_none());
        assert_eq!(view.weeks[0][6].as_ref().unwrap().day(), 1);
        assert_eq!(view.days().count(), 31);
        assert_eq!(view.record_count(), 2);
        assert!(view.weeks.iter().all(|w| w.len() == 7));
    }

    #[test]
    fn test_year_view() {
        let records = vec![dated(1, "2020-03-01"), dated(2, "2020-11-30"), dated(3, "2021-01-01")];
        let view = YearView::build(2020, &records);
        assert_eq!(view.months.len(), 12);
        assert_eq!(view.record_count(), 2);
    }
}
