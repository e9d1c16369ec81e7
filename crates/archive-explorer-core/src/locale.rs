//! Display language for dates and guidance messages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Lv,
}

const EN_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const LV_MONTHS_SHORT: [&str; 12] = [
    "janv.", "febr.", "marts", "apr.", "maijs", "jūn.", "jūl.", "aug.", "sept.", "okt.", "nov.",
    "dec.",
];
const LV_MONTHS_LONG: [&str; 12] = [
    "janvāris",
    "februāris",
    "marts",
    "aprīlis",
    "maijs",
    "jūnijs",
    "jūlijs",
    "augusts",
    "septembris",
    "oktobris",
    "novembris",
    "decembris",
];
const LV_WEEKDAYS: [&str; 7] = [
    "pirmdiena",
    "otrdiena",
    "trešdiena",
    "ceturtdiena",
    "piektdiena",
    "sestdiena",
    "svētdiena",
];

impl Locale {
    /// Abbreviated month name; `month` is 1-based.
    pub fn month_short(self, month: u32) -> &'static str {
        let idx = month_index(month);
        match self {
            Locale::En => EN_MONTHS_SHORT[idx],
            Locale::Lv => LV_MONTHS_SHORT[idx],
        }
    }

    /// Full month name; `month` is 1-based.
    pub fn month_long(self, month: u32) -> &'static str {
        let idx = month_index(month);
        match self {
            Locale::En => EN_MONTHS_LONG[idx],
            Locale::Lv => LV_MONTHS_LONG[idx],
        }
    }

    /// Weekday name; `weekday` counts from Monday = 0.
    pub fn weekday(self, weekday: u32) -> &'static str {
        let idx = (weekday % 7) as usize;
        match self {
            Locale::En => EN_WEEKDAYS[idx],
            Locale::Lv => LV_WEEKDAYS[idx],
        }
    }

    /// Two-letter weekday header for calendar grids.
    pub fn weekday_abbrev(self, weekday: u32) -> String {
        self.weekday(weekday).chars().take(2).collect()
    }

    /// Text shown in place of an unreadable date.
    pub fn unknown(self) -> &'static str {
        match self {
            Locale::En => "Unknown",
            Locale::Lv => "Nezināms",
        }
    }
}

fn month_index(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}

impl FromStr for Locale {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "lv" | "lv-lv" => Ok(Locale::Lv),
            other => Err(ExplorerError::InvalidConfig(format!(
                "unknown locale '{}'. Must be en or lv.",
                other
            ))),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => f.write_str("en"),
            Locale::Lv => f.write_str("lv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("lv-LV".parse::<Locale>().unwrap(), Locale::Lv);
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn test_names_are_one_based_and_clamped() {
        assert_eq!(Locale::En.month_short(1), "Jan");
        assert_eq!(Locale::En.month_long(12), "December");
        assert_eq!(Locale::En.month_short(99), "Dec");
        assert_eq!(Locale::Lv.weekday(0), "pirmdiena");
        assert_eq!(Locale::En.weekday_abbrev(6), "Su");
    }
}
