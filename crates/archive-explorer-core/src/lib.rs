//! # Archive Explorer Core
//!
//! Shared, WASM-safe logic for Archive Explorer: the record model, the
//! search policy and filter, the event bus, the search controller state
//! machine, the in-memory record store, and the date/calendar helpers.
//!
//! This crate contains no tokio, filesystem I/O, or network code. Record
//! acquisition happens behind the [`store::RecordSource`] trait, which the
//! application crate implements for files and HTTP.
//!
//! ## Control Flow
//!
//! ```text
//! input event ─▶ SearchController::evaluate(trigger)
//!                     │
//!                     ├─▶ SearchPolicy::guidance / is_valid
//!                     ├─▶ RecordFilter::apply        (valid only)
//!                     ▼
//!                 EventBus::publish ─▶ display collaborators
//! ```

pub mod calendar;
pub mod controller;
pub mod dates;
pub mod error;
pub mod events;
pub mod filter;
pub mod lifecycle;
pub mod locale;
pub mod models;
pub mod observe;
pub mod policy;
pub mod store;

pub use controller::{FormState, RecordProvider, SearchController, SearchForm};
pub use error::ExplorerError;
pub use events::{Event, EventBus, Topic};
pub use filter::RecordFilter;
pub use models::{Record, RecordId, SearchOutcome, SearchQuery, SearchState, SearchTrigger};
pub use policy::SearchPolicy;
pub use store::{RecordSet, RecordStore};
