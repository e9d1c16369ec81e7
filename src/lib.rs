//! # Archive Explorer
//!
//! Search and browse a collection of archive records from the terminal.
//!
//! The search rules, event bus, and record store live in
//! [`archive_explorer_core`]; this crate adds configuration, record
//! sources, text rendering, and the `archive` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │ FileSource  │──▶│ RecordStore  │◀──│ SearchController │◀── input / submit
//! │ HttpSource  │   └──────────────┘   └────────┬────────┘
//! └─────────────┘                               │ publish
//!                                               ▼
//!                                         ┌──────────┐
//!                                         │ EventBus │
//!                                         └────┬─────┘
//!                     ┌────────────────┬───────┴──────┬──────────────┐
//!                     ▼                ▼              ▼              ▼
//!               GuidanceView      ResultsView     StatusView    CalendarView
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`data`] | File and HTTP record sources |
//! | [`app`] | Wiring and application lifecycle |
//! | [`render`] | Result, guidance, and status views |
//! | [`calendar_view`] | Month and year calendars |
//! | [`console`] | Output target for the views |
//! | [`debug`] | Debug sink on stderr |

pub mod app;
pub mod calendar_view;
pub mod config;
pub mod console;
pub mod data;
pub mod debug;
pub mod render;
