//! Record sources backed by the filesystem and by HTTP.
//!
//! Both read the whole JSON resource and hand it to
//! [`parse_records`], so a file and a URL serving the same bytes load the
//! same collection.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use archive_explorer_core::models::Record;
use archive_explorer_core::store::{parse_records, RecordSource};

use crate::config::DataConfig;

/// Archive JSON on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<Record>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read archive file: {}", self.path.display()))?;
        parse_records(&content)
    }
}

/// Archive JSON served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<Record>> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let response = client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP error! Status: {}", status.as_u16());
        }

        let body = response.text().await?;
        parse_records(&body)
    }
}

pub fn is_url(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Pick a source for `config.source`: HTTP for `http(s)://` URLs, a file
/// otherwise.
pub fn source_for(config: &DataConfig) -> Box<dyn RecordSource> {
    let source = config.source.trim();
    if is_url(source) {
        Box::new(HttpSource::new(
            source,
            Duration::from_secs(config.timeout_secs),
        ))
    } else {
        Box::new(FileSource::new(source))
    }
}
