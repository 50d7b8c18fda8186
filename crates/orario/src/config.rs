//! Configuration loading from environment variables.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::calendar::Locale;
use crate::source::{ConfiguredSource, FileSessionSource, HttpSessionSource};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Backend settings loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Full URL of the guest sessions endpoint
    pub sessions_url: Option<String>,
    pub timeout: Duration,
    pub locale: Locale,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Reads `ORARIO_SESSIONS_URL`, `ORARIO_HTTP_TIMEOUT_SECS` and
    /// `ORARIO_LOCALE`, either from the environment or from a `.env` file.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let sessions_url = lookup("ORARIO_SESSIONS_URL").filter(|url| !url.trim().is_empty());

        let timeout = match lookup("ORARIO_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("ORARIO_HTTP_TIMEOUT_SECS is not a number: {raw:?}"))?,
            ),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let locale = match lookup("ORARIO_LOCALE") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => Locale::default(),
        };

        Ok(Self {
            sessions_url,
            timeout,
            locale,
        })
    }

    /// Source for the backend endpoint
    pub fn http_source(&self) -> Result<HttpSessionSource> {
        let url = self
            .sessions_url
            .as_deref()
            .context("ORARIO_SESSIONS_URL environment variable not set")?;
        HttpSessionSource::new(url, self.timeout).context("Failed to build HTTP client")
    }

    /// A snapshot file wins over the backend when given
    pub fn session_source(&self, snapshot: Option<&Path>) -> Result<ConfiguredSource> {
        match snapshot {
            Some(path) => Ok(ConfiguredSource::File(FileSessionSource::new(path))),
            None => Ok(ConfiguredSource::Http(self.http_source()?)),
        }
    }
}
