//! # Archive Explorer CLI (`archive`)
//!
//! ## Usage
//!
//! ```bash
//! archive --config ./config/archive.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `archive search "<query>"` | Run one search and print the result cards |
//! | `archive explore` | Interactive session, one line per keystroke batch |
//! | `archive guidance` | Show the guidance message for every input length |
//! | `archive years` | Print the year range covered by the archive |
//! | `archive calendar` | Print a year or month calendar of records |
//! | `archive get <id>` | Print one record as JSON |
//! | `archive edit <id>` | Change a record for this session and show its history |
//!
//! ## Examples
//!
//! ```bash
//! # As-you-type search (needs 5 characters by default)
//! archive search "budget"
//!
//! # Explicit submit, searching authors as well
//! archive search "ben" --manual --author
//!
//! # Load from a URL instead of the configured file
//! archive --data https://example.org/archive.json years
//!
//! # March 2020
//! archive calendar --year 2020 --month 3
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use archive_explorer::app::{AppController, Wiring};
use archive_explorer::calendar_view::CalendarView;
use archive_explorer::config::{self, Config};
use archive_explorer::console::Console;
use archive_explorer::data;
use archive_explorer::debug::{format_table, StderrSink};
use archive_explorer::render::{record_card, GuidanceView, ResultsView, StatusView};
use archive_explorer_core::controller::FormState;
use archive_explorer_core::events::EventBus;
use archive_explorer_core::models::{Editor, RecordDate, RecordId, RecordPatch, SearchTrigger};
use archive_explorer_core::observe::{SharedSink, TracingSink};
use archive_explorer_core::policy::GuidanceRow;
use archive_explorer_core::store::RecordStore;

/// Archive Explorer: search and browse archive records.
///
/// Settings are read from a TOML file; see `config/archive.example.toml`.
/// A missing file means defaults for everything.
#[derive(Parser)]
#[command(
    name = "archive",
    about = "Archive Explorer: search and browse a collection of archive records",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/archive.toml")]
    config: PathBuf,

    /// Archive JSON to load, a file path or http(s) URL. Overrides `[data].source`.
    #[arg(long, global = true)]
    data: Option<String>,

    /// Write debug output to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one query and print the outcome.
    ///
    /// Without `--manual` the query is treated as typed input and needs the
    /// automatic threshold; with it, the lower manual threshold applies.
    Search {
        query: String,

        /// Match the author field as well.
        #[arg(long)]
        author: bool,

        /// Evaluate as an explicit submit.
        #[arg(long)]
        manual: bool,
    },

    /// Read queries from stdin, one evaluation per line.
    ///
    /// `:go` re-evaluates the current input as a submit, `:author on|off`
    /// toggles author matching, `:quit` ends the session.
    Explore {
        /// Start with author matching on.
        #[arg(long)]
        author: bool,
    },

    /// Print the guidance table for input lengths 0..=N.
    Guidance {
        #[arg(long, default_value_t = 8)]
        max_len: usize,
    },

    /// Print the earliest and latest year in the archive.
    Years,

    /// Print a calendar of records.
    ///
    /// Defaults to the latest year in the archive.
    Calendar {
        #[arg(long)]
        year: Option<i32>,

        /// 1-12. Omit for the whole year.
        #[arg(long)]
        month: Option<u32>,
    },

    /// Print one record as JSON.
    Get { id: String },

    /// Edit a record for this session and print its revision history.
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        content: Option<String>,

        /// Name of the person making the change.
        #[arg(long)]
        editor: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        reason: String,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn build_app(cfg: &Config, console: &Console, sink: Option<SharedSink>) -> Result<AppController> {
    let locale = cfg.locale()?;
    let bus = match &sink {
        Some(s) => EventBus::with_sink(s.clone()),
        None => EventBus::new(),
    };
    let store = Arc::new(RecordStore::new());

    let app = Wiring::new()
        .bus(bus)
        .store(store.clone())
        .form(Arc::new(FormState::new()))
        .results(ResultsView::new(console.clone(), locale))
        .guidance(GuidanceView::new(console.clone(), locale, store))
        .status(StatusView::new(console.clone()))
        .calendar(CalendarView::new(console.clone(), locale))
        .policy(cfg.search_policy()?)
        .sink(sink)
        .build()?;
    Ok(app)
}

async fn explore(app: &AppController, include_author: bool) -> Result<()> {
    let form = app.form();
    form.set_include_author(include_author);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":go" => {
                app.evaluate(SearchTrigger::Manual);
            }
            ":author on" => form.set_include_author(true),
            ":author off" => form.set_include_author(false),
            _ => {
                form.set_input(line.as_str());
                app.evaluate(SearchTrigger::Auto);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut cfg = config::load_or_minimal(&cli.config)?;
    if let Some(source) = cli.data {
        cfg.data.source = source;
        config::validate(&cfg)?;
    }

    let console = Console::stdout();

    let sink: Option<SharedSink> = if cli.debug || cfg.display.debug {
        Some(Arc::new(StderrSink::new()))
    } else if tracing::enabled!(tracing::Level::DEBUG) {
        Some(Arc::new(TracingSink))
    } else {
        None
    };

    // Commands that don't need the archive loaded
    if let Commands::Guidance { max_len } = &cli.command {
        let policy = cfg.search_policy()?;
        let rows: Vec<Vec<String>> = policy
            .guidance_table(*max_len)
            .iter()
            .map(GuidanceRow::cells)
            .collect();
        for line in format_table(&GuidanceRow::HEADERS, &rows) {
            console.line(line);
        }
        if let Some(sink) = &sink {
            policy.dump_guidance(*max_len, sink.as_ref());
        }
        return Ok(());
    }

    let mut app = build_app(&cfg, &console, sink)?;
    let source = data::source_for(&cfg.data);
    app.bootstrap(source.as_ref()).await?;

    match cli.command {
        Commands::Search {
            query,
            author,
            manual,
        } => {
            let trigger = if manual {
                SearchTrigger::Manual
            } else {
                SearchTrigger::Auto
            };
            app.search(&query, author, trigger);
        }
        Commands::Explore { author } => {
            explore(&app, author).await?;
        }
        Commands::Years => {
            let range = app.store().year_range();
            console.line(format!("{} - {}", range.min, range.max));
        }
        Commands::Calendar { year, month } => {
            let records = app.store().records().unwrap_or_default();
            if let Some(calendar) = app.calendar() {
                calendar.show(&records, year, month)?;
            }
        }
        Commands::Get { id } => {
            let id = RecordId::parse(&id);
            let Some(record) = app.store().get(&id) else {
                bail!("record not found: {}", id);
            };
            console.line(serde_json::to_string_pretty(record.as_ref())?);
        }
        Commands::Edit {
            id,
            title,
            author,
            date,
            content,
            editor,
            email,
            reason,
        } => {
            let id = RecordId::parse(&id);
            let patch = RecordPatch {
                title,
                date: date.map(RecordDate::Text),
                author,
                content,
            };
            let editor = Editor {
                name: editor,
                email,
                reason,
            };
            let updated = app.edit_record(&id, &patch, &editor)?;
            console.line(record_card(1, &updated, cfg.locale()?));
            app.request_revisions(&id)?;
        }
        Commands::Guidance { .. } => {
            // Handled above (before loading data)
            unreachable!()
        }
    }

    app.shutdown();
    Ok(())
}
