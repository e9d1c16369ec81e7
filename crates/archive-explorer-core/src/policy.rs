//! Search validity rules and user guidance.
//!
//! [`SearchPolicy`] is a pure decision function over `(input length,
//! trigger)`. It owns two thresholds:
//!
//! - `auto_min_chars` (default 5): minimum trimmed length for an
//!   as-you-type search.
//! - `manual_min_chars` (default 2): minimum trimmed length for an explicit
//!   submit.
//!
//! # Guidance Branches
//!
//! | Length | Trigger | Branch |
//! |--------|---------|--------|
//! | 0 | any | [`Guidance::Empty`] (no message) |
//! | < manual | Manual | [`Guidance::NeedMoreManual`] |
//! | >= manual | Manual | [`Guidance::ManualResults`] |
//! | < auto | Auto | [`Guidance::NeedMoreAuto`], with a manual hint once length >= manual |
//! | >= auto | Auto | [`Guidance::AutoResults`] |
//!
//! Message wording lives in [`GuidanceMessages`] and is localizable; the
//! branch structure is fixed.

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;
use crate::locale::Locale;
use crate::models::SearchTrigger;
use crate::observe::DebugSink;

pub const DEFAULT_AUTO_MIN_CHARS: usize = 5;
pub const DEFAULT_MANUAL_MIN_CHARS: usize = 2;

/// Which guidance branch applies to an input state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guidance {
    Empty,
    NeedMoreManual { remaining: usize },
    ManualResults,
    NeedMoreAuto { remaining: usize, suggest_manual: bool },
    AutoResults,
}

/// Message templates. `{n}` is replaced with the remaining character count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceMessages {
    pub need_manual: String,
    pub manual_results: String,
    pub need_auto: String,
    /// Appended to `need_auto` when a manual search would already be valid.
    pub manual_hint: String,
    pub auto_results: String,
}

impl GuidanceMessages {
    pub fn english() -> Self {
        Self {
            need_manual: "Please enter {n} more characters to search".to_string(),
            manual_results: "Showing manual search results".to_string(),
            need_auto: "Please enter {n} more characters for automatic search".to_string(),
            manual_hint: " or press Search!".to_string(),
            auto_results: "Showing automatic search results".to_string(),
        }
    }

    pub fn latvian() -> Self {
        Self {
            need_manual: "Lūdzu, ievadiet vēl {n} rakstzīmes, lai sāktu meklēšanu".to_string(),
            manual_results: "Rāda manuālās meklēšanas rezultātus".to_string(),
            need_auto: "Lūdzu, ievadiet vēl {n} rakstzīmes, lai sāktu automātisko meklēšanu"
                .to_string(),
            manual_hint: " vai noklikšķiniet uz Meklēt!".to_string(),
            auto_results: "Rāda automātiskās meklēšanas rezultātus".to_string(),
        }
    }

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::english(),
            Locale::Lv => Self::latvian(),
        }
    }

    /// Render a guidance branch to user-facing text.
    pub fn render(&self, guidance: Guidance) -> String {
        match guidance {
            Guidance::Empty => String::new(),
            Guidance::NeedMoreManual { remaining } => fill(&self.need_manual, remaining),
            Guidance::ManualResults => self.manual_results.clone(),
            Guidance::NeedMoreAuto {
                remaining,
                suggest_manual,
            } => {
                let mut message = fill(&self.need_auto, remaining);
                if suggest_manual {
                    message.push_str(&self.manual_hint);
                }
                message
            }
            Guidance::AutoResults => self.auto_results.clone(),
        }
    }
}

impl Default for GuidanceMessages {
    fn default() -> Self {
        Self::english()
    }
}

fn fill(template: &str, n: usize) -> String {
    template.replace("{n}", &n.to_string())
}

/// Trimmed input length in characters.
pub fn input_length(raw: &str) -> usize {
    raw.trim().chars().count()
}

/// One line of [`SearchPolicy::guidance_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuidanceRow {
    pub length: usize,
    pub trigger: SearchTrigger,
    pub valid: bool,
    pub message: String,
}

impl GuidanceRow {
    pub const HEADERS: [&'static str; 4] = ["length", "trigger", "valid", "message"];

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.length.to_string(),
            self.trigger.to_string(),
            if self.valid { "yes" } else { "no" }.to_string(),
            self.message.clone(),
        ]
    }
}

/// Validity thresholds plus the messages used to explain them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPolicy {
    auto_min_chars: usize,
    manual_min_chars: usize,
    messages: GuidanceMessages,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            auto_min_chars: DEFAULT_AUTO_MIN_CHARS,
            manual_min_chars: DEFAULT_MANUAL_MIN_CHARS,
            messages: GuidanceMessages::default(),
        }
    }
}

impl SearchPolicy {
    /// Build a policy with custom thresholds.
    ///
    /// Requires `1 <= manual_min_chars <= auto_min_chars`.
    pub fn new(auto_min_chars: usize, manual_min_chars: usize) -> Result<Self, ExplorerError> {
        if manual_min_chars == 0 {
            return Err(ExplorerError::InvalidConfig(
                "manual_min_chars must be >= 1".to_string(),
            ));
        }
        if manual_min_chars > auto_min_chars {
            return Err(ExplorerError::InvalidConfig(format!(
                "manual_min_chars ({}) must be <= auto_min_chars ({})",
                manual_min_chars, auto_min_chars
            )));
        }
        Ok(Self {
            auto_min_chars,
            manual_min_chars,
            messages: GuidanceMessages::default(),
        })
    }

    pub fn with_messages(mut self, messages: GuidanceMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn auto_min_chars(&self) -> usize {
        self.auto_min_chars
    }

    pub fn manual_min_chars(&self) -> usize {
        self.manual_min_chars
    }

    pub fn messages(&self) -> &GuidanceMessages {
        &self.messages
    }

    pub fn threshold(&self, trigger: SearchTrigger) -> usize {
        match trigger {
            SearchTrigger::Auto => self.auto_min_chars,
            SearchTrigger::Manual => self.manual_min_chars,
        }
    }

    /// Whether `raw_text` may be searched under `trigger`.
    pub fn is_valid(&self, raw_text: &str, trigger: SearchTrigger) -> bool {
        let length = input_length(raw_text);
        if length == 0 {
            return false;
        }
        length >= self.threshold(trigger)
    }

    /// Structured guidance branch for an input state.
    pub fn classify(&self, current_length: usize, trigger: SearchTrigger) -> Guidance {
        if current_length == 0 {
            return Guidance::Empty;
        }

        let remaining_auto = self.auto_min_chars.saturating_sub(current_length);
        let remaining_manual = self.manual_min_chars.saturating_sub(current_length);

        match trigger {
            SearchTrigger::Manual if remaining_manual > 0 => Guidance::NeedMoreManual {
                remaining: remaining_manual,
            },
            SearchTrigger::Manual => Guidance::ManualResults,
            SearchTrigger::Auto if remaining_auto > 0 => Guidance::NeedMoreAuto {
                remaining: remaining_auto,
                suggest_manual: current_length >= self.manual_min_chars,
            },
            SearchTrigger::Auto => Guidance::AutoResults,
        }
    }

    /// Guidance text for an input state; empty when there is no input.
    pub fn guidance(&self, current_length: usize, trigger: SearchTrigger) -> String {
        self.messages.render(self.classify(current_length, trigger))
    }

    /// Every `(length, trigger)` state from `0..=max_len`, Auto rows first.
    pub fn guidance_table(&self, max_len: usize) -> Vec<GuidanceRow> {
        [SearchTrigger::Auto, SearchTrigger::Manual]
            .into_iter()
            .flat_map(|trigger| {
                (0..=max_len).map(move |length| GuidanceRow {
                    length,
                    trigger,
                    valid: length > 0 && length >= self.threshold(trigger),
                    message: self.guidance(length, trigger),
                })
            })
            .collect()
    }

    /// Write [`guidance_table`](Self::guidance_table) to `sink` as one group.
    pub fn dump_guidance(&self, max_len: usize, sink: &dyn DebugSink) {
        let rows: Vec<Vec<String>> = self.guidance_table(max_len).iter().map(GuidanceRow::cells).collect();
        sink.group("All possible guidance states", &mut || {
            sink.table(&GuidanceRow::HEADERS, &rows);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::RecordingSink;
    use SearchTrigger::{Auto, Manual};

    #[test]
    fn test_defaults() {
        let p = SearchPolicy::default();
        assert_eq!(p.auto_min_chars(), 5);
        assert_eq!(p.manual_min_chars(), 2);
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        assert!(SearchPolicy::new(5, 0).is_err());
        assert!(SearchPolicy::new(2, 3).is_err());
        assert!(SearchPolicy::new(5, 3).is_ok());
        assert!(SearchPolicy::new(3, 3).is_ok());
    }

    #[test]
    fn test_is_valid_matches_threshold_for_every_length() {
        let p = SearchPolicy::default();
        for len in 0..10 {
            let text = "x".repeat(len);
            assert_eq!(p.is_valid(&text, Auto), len >= 5, "auto len={}", len);
            assert_eq!(p.is_valid(&text, Manual), len >= 2, "manual len={}", len);
        }
    }

    #[test]
    fn test_is_valid_trims_whitespace() {
        let p = SearchPolicy::default();
        assert!(!p.is_valid("   ", Manual));
        assert!(!p.is_valid("  a  ", Manual));
        assert!(p.is_valid("  ab  ", Manual));
        assert!(!p.is_valid("  abcd    ", Auto));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let p = SearchPolicy::default();
        // 4 characters, 8 bytes
        assert!(!p.is_valid("ēēēē", Auto));
        assert!(p.is_valid("ēēēēē", Auto));
    }

    #[test]
    fn test_empty_guidance_for_any_trigger() {
        let p = SearchPolicy::default();
        assert_eq!(p.guidance(0, Auto), "");
        assert_eq!(p.guidance(0, Manual), "");
    }

    #[test]
    fn test_guidance_table_of_branches() {
        let p = SearchPolicy::default();
        let cases = [
            (1, Auto, Guidance::NeedMoreAuto { remaining: 4, suggest_manual: false }),
            (2, Auto, Guidance::NeedMoreAuto { remaining: 3, suggest_manual: true }),
            (4, Auto, Guidance::NeedMoreAuto { remaining: 1, suggest_manual: true }),
            (5, Auto, Guidance::AutoResults),
            (9, Auto, Guidance::AutoResults),
            (1, Manual, Guidance::NeedMoreManual { remaining: 1 }),
            (2, Manual, Guidance::ManualResults),
            (7, Manual, Guidance::ManualResults),
        ];
        for (len, trigger, expected) in cases {
            assert_eq!(p.classify(len, trigger), expected, "len={} {:?}", len, trigger);
        }
    }

    #[test]
    fn test_auto_message_suggests_manual_once_valid_for_manual() {
        let p = SearchPolicy::default();
        let msg = p.guidance(2, Auto);
        assert!(msg.contains('3'), "{}", msg);
        assert!(msg.contains("automatic"));
        assert!(msg.ends_with(" or press Search!"));

        let msg = p.guidance(1, Auto);
        assert!(msg.contains('4'));
        assert!(!msg.contains("press Search"));
    }

    #[test]
    fn test_manual_messages() {
        let p = SearchPolicy::default();
        assert_eq!(p.guidance(1, Manual), "Please enter 1 more characters to search");
        assert_eq!(p.guidance(2, Manual), "Showing manual search results");
        assert_eq!(p.guidance(5, Auto), "Showing automatic search results");
    }

    #[test]
    fn test_latvian_messages() {
        let p = SearchPolicy::new(5, 3)
            .unwrap()
            .with_messages(GuidanceMessages::latvian());
        assert_eq!(
            p.guidance(3, Auto),
            "Lūdzu, ievadiet vēl 2 rakstzīmes, lai sāktu automātisko meklēšanu vai noklikšķiniet uz Meklēt!"
        );
    }

    #[test]
    fn test_guidance_table_covers_all_states() {
        let p = SearchPolicy::default();
        let rows = p.guidance_table(6);
        assert_eq!(rows.len(), 14);
        assert_eq!(rows[0].trigger, Auto);
        assert!(!rows[0].valid);
        assert_eq!(rows[0].message, "");
        assert!(rows[5].valid);
        let manual_two = rows.iter().find(|r| r.trigger == Manual && r.length == 2).unwrap();
        assert!(manual_two.valid);
        assert_eq!(
            manual_two.cells(),
            vec!["2", "manual", "yes", "Showing manual search results"]
        );
    }

    #[test]
    fn test_dump_guidance_groups_a_table() {
        let sink = RecordingSink::new();
        SearchPolicy::default().dump_guidance(1, &sink);
        assert_eq!(
            sink.lines(),
            vec![
                "[All possible guidance states]",
                "  length | trigger | valid | message",
                "  0 | auto | no | ",
                "  1 | auto | no | Please enter 4 more characters for automatic search",
                "  0 | manual | no | ",
                "  1 | manual | no | Please enter 1 more characters to search",
            ]
        );
    }
}
