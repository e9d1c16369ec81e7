//! TOML configuration.
//!
//! ```toml
//! [data]
//! source = "archive.json"   # file path or http(s) URL
//! timeout_secs = 30
//!
//! [search]
//! auto_min_chars = 5
//! manual_min_chars = 2
//!
//! [display]
//! locale = "en"
//! debug = false
//!
//! [messages]
//! need_auto = "Type {n} more characters"
//! ```
//!
//! Every section is optional. [`Config::minimal`] is what an absent file
//! means.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use archive_explorer_core::locale::Locale;
use archive_explorer_core::policy::{
    GuidanceMessages, SearchPolicy, DEFAULT_AUTO_MIN_CHARS, DEFAULT_MANUAL_MIN_CHARS,
};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_source() -> String {
    "archive.json".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_auto_min_chars")]
    pub auto_min_chars: usize,
    #[serde(default = "default_manual_min_chars")]
    pub manual_min_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            auto_min_chars: DEFAULT_AUTO_MIN_CHARS,
            manual_min_chars: DEFAULT_MANUAL_MIN_CHARS,
        }
    }
}

fn default_auto_min_chars() -> usize {
    DEFAULT_AUTO_MIN_CHARS
}
fn default_manual_min_chars() -> usize {
    DEFAULT_MANUAL_MIN_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub debug: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            debug: false,
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

/// Replacement guidance templates. `{n}` stands for the number of
/// characters still missing.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessagesConfig {
    pub need_manual: Option<String>,
    pub manual_results: Option<String>,
    pub need_auto: Option<String>,
    pub manual_hint: Option<String>,
    pub auto_results: Option<String>,
}

impl Config {
    /// Defaults for every section, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn locale(&self) -> Result<Locale> {
        Ok(self.display.locale.parse::<Locale>()?)
    }

    /// Locale templates with any `[messages]` overrides applied.
    pub fn guidance_messages(&self) -> Result<GuidanceMessages> {
        let mut messages = GuidanceMessages::for_locale(self.locale()?);
        let overrides = &self.messages;
        if let Some(t) = &overrides.need_manual {
            messages.need_manual = t.clone();
        }
        if let Some(t) = &overrides.manual_results {
            messages.manual_results = t.clone();
        }
        if let Some(t) = &overrides.need_auto {
            messages.need_auto = t.clone();
        }
        if let Some(t) = &overrides.manual_hint {
            messages.manual_hint = t.clone();
        }
        if let Some(t) = &overrides.auto_results {
            messages.auto_results = t.clone();
        }
        Ok(messages)
    }

    pub fn search_policy(&self) -> Result<SearchPolicy> {
        let policy = SearchPolicy::new(self.search.auto_min_chars, self.search.manual_min_chars)?;
        Ok(policy.with_messages(self.guidance_messages()?))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::minimal())
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.data.source.trim().is_empty() {
        bail!("data.source must not be empty");
    }

    if config.data.timeout_secs == 0 {
        bail!("data.timeout_secs must be > 0");
    }

    if config.search.manual_min_chars < 1 {
        bail!("search.manual_min_chars must be >= 1");
    }

    if config.search.manual_min_chars > config.search.auto_min_chars {
        bail!(
            "search.manual_min_chars ({}) must not exceed search.auto_min_chars ({})",
            config.search.manual_min_chars,
            config.search.auto_min_chars
        );
    }

    if let Err(e) = config.display.locale.parse::<Locale>() {
        bail!("display.locale: {}", e);
    }

    Ok(())
}
