//! Where the session snapshot comes from: the gym backend over HTTP, or a
//! JSON file saved earlier by `orario fetch`.

use reqwest::header::ACCEPT;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::types::Session;

/// Why the session collection could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not reach the schedule service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("schedule service answered with HTTP {0}")]
    Status(u16),

    #[error("could not read the session snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected session data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read access to the full session collection visible to guests
pub trait SessionSource {
    fn fetch_sessions(&self) -> impl Future<Output = Result<Vec<Session>, LoadError>> + Send;
}

/// Fetches sessions from the backend's guest endpoint
#[derive(Debug, Clone)]
pub struct HttpSessionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSessionSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SessionSource for HttpSessionSource {
    async fn fetch_sessions(&self) -> Result<Vec<Session>, LoadError> {
        debug!(url = %self.url, "Fetching sessions");
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let sessions: Vec<Session> = serde_json::from_slice(&body)?;
        debug!(count = sessions.len(), "Sessions received");
        Ok(sessions)
    }
}

/// Reads a snapshot written by `orario fetch`
#[derive(Debug, Clone)]
pub struct FileSessionSource {
    path: PathBuf,
}

impl FileSessionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionSource for FileSessionSource {
    async fn fetch_sessions(&self) -> Result<Vec<Session>, LoadError> {
        debug!(path = %self.path.display(), "Reading session snapshot");
        let content = tokio::fs::read(&self.path).await?;
        let sessions: Vec<Session> = serde_json::from_slice(&content)?;
        Ok(sessions)
    }
}

/// The source picked at startup from the CLI flags and environment
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Http(HttpSessionSource),
    File(FileSessionSource),
}

impl ConfiguredSource {
    pub fn describe(&self) -> String {
        match self {
            ConfiguredSource::Http(source) => source.url().to_string(),
            ConfiguredSource::File(source) => source.path().display().to_string(),
        }
    }
}

impl SessionSource for ConfiguredSource {
    async fn fetch_sessions(&self) -> Result<Vec<Session>, LoadError> {
        match self {
            ConfiguredSource::Http(source) => source.fetch_sessions().await,
            ConfiguredSource::File(source) => source.fetch_sessions().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::net::SocketAddr;
    use tempfile::TempDir;

    const SESSIONS_JSON: &str = r#"[
        {"id": 1, "date": "2024-03-13", "startTime": "09:00", "endTime": "10:00",
         "type": "individual", "trainerName": "Marco", "isCancelled": false},
        {"id": 2, "date": "2024-03-13", "startTime": "08:00", "endTime": "09:00",
         "type": "group", "trainerName": "Anna", "participants": {"current": 3, "max": 10},
         "isCancelled": false}
    ]"#;

    /// Serve `app` on an ephemeral local port and return its address
    async fn spawn_backend(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn http_source(addr: SocketAddr) -> HttpSessionSource {
        HttpSessionSource::new(
            format!("http://{addr}/api/guest/sessions"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    // ========== HttpSessionSource tests ==========

    #[tokio::test]
    async fn test_http_source_success() {
        let app = Router::new().route(
            "/api/guest/sessions",
            get(|| async { ([("content-type", "application/json")], SESSIONS_JSON) }),
        );
        let addr = spawn_backend(app).await;

        let sessions = http_source(addr).fetch_sessions().await.unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].trainer_name, "Marco");
    }

    #[tokio::test]
    async fn test_http_source_non_success_status() {
        let app = Router::new().route(
            "/api/guest/sessions",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let addr = spawn_backend(app).await;

        let err = http_source(addr).fetch_sessions().await.unwrap_err();

        assert!(matches!(err, LoadError::Status(503)));
    }

    #[tokio::test]
    async fn test_http_source_invalid_body() {
        let app = Router::new().route("/api/guest/sessions", get(|| async { "not json" }));
        let addr = spawn_backend(app).await;

        let err = http_source(addr).fetch_sessions().await.unwrap_err();

        assert!(matches!(err, LoadError::Decode(_)));
    }

    #[tokio::test]
    async fn test_http_source_unreachable() {
        // Bind and drop a listener so the port is very likely closed
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let err = http_source(addr).fetch_sessions().await.unwrap_err();

        assert!(matches!(err, LoadError::Transport(_)));
    }

    // ========== FileSessionSource tests ==========

    #[tokio::test]
    async fn test_file_source_reads_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sessions.json");
        std::fs::write(&path, SESSIONS_JSON).unwrap();

        let sessions = FileSessionSource::new(&path).fetch_sessions().await.unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].participants.map(|p| p.max), Some(10));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileSessionSource::new(temp_dir.path().join("missing.json"));

        let err = source.fetch_sessions().await.unwrap_err();

        assert!(matches!(err, LoadError::Io(_)));
    }

    #[tokio::test]
    async fn test_configured_source_dispatches_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sessions.json");
        std::fs::write(&path, "[]").unwrap();

        let source = ConfiguredSource::File(FileSessionSource::new(&path));

        assert!(source.fetch_sessions().await.unwrap().is_empty());
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[test]
    fn test_load_error_messages() {
        assert_eq!(
            LoadError::Status(500).to_string(),
            "schedule service answered with HTTP 500"
        );
    }
}
