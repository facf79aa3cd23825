//! Document retrieval and artifact existence probes.

use crate::error::{CoreError, Result};
use crate::node::{Node, parse_xml};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;
use reqwest::header::LAST_MODIFIED;
use std::time::Duration;

const USER_AGENT: &str = concat!("demaven/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A retrieved document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Final location, after redirects.
    pub location: Url,
    pub body: Bytes,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Document {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as XML, tagging nodes with this document's location.
    pub fn parse_xml(&self) -> Result<Node> {
        parse_xml(&self.text(), self.location.as_str(), self.last_modified)
    }
}

/// Transport used to read repository documents.
///
/// Implementations must be shareable across tasks; the repository holds one
/// behind an `Arc`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    async fn fetch(&self, url: &Url) -> Result<Document>;

    /// Checks whether `url` exists.
    ///
    /// Returns the final location after redirects when it does, `None` when
    /// the server answers with a non-success status.
    async fn probe(&self, url: &Url) -> Result<Option<Url>>;
}

/// [`Fetcher`] over HTTP(S), with `file://` URLs read from disk.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(CoreError::HttpClient)?;
        Ok(Self { client })
    }

    async fn fetch_file(url: &Url) -> Result<Document> {
        let path = file_path(url)?;
        let body = tokio::fs::read(&path).await?;
        let last_modified = tokio::fs::metadata(&path)
            .await?
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(Document {
            location: url.clone(),
            body: Bytes::from(body),
            last_modified,
        })
    }
}

fn file_path(url: &Url) -> Result<std::path::PathBuf> {
    url.to_file_path().map_err(|()| CoreError::InvalidUrl {
        url: url.to_string(),
        message: "not a local file path".into(),
    })
}

fn fetch_error(url: &Url, source: reqwest::Error) -> CoreError {
    CoreError::Fetch {
        url: url.to_string(),
        source,
    }
}

/// Parses an HTTP date (`Wed, 21 Oct 2015 07:28:00 GMT`).
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Document> {
        if url.scheme() == "file" {
            return Self::fetch_file(url).await;
        }

        tracing::debug!("Fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let location = response.url().clone();
        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date);
        let body = response.bytes().await.map_err(|e| fetch_error(url, e))?;

        Ok(Document {
            location,
            body,
            last_modified,
        })
    }

    async fn probe(&self, url: &Url) -> Result<Option<Url>> {
        if url.scheme() == "file" {
            let exists = tokio::fs::try_exists(file_path(url)?).await?;
            return Ok(exists.then(|| url.clone()));
        }

        tracing::debug!("Probing {}", url);
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?;

        if response.status().is_success() {
            Ok(Some(response.url().clone()))
        } else {
            tracing::debug!("Probe of {} returned HTTP {}", url, response.status());
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn url(server: &mockito::Server, path: &str) -> Url {
        Url::parse(&format!("{}{path}", server.url())).unwrap()
    }

    #[test]
    fn test_parse_http_date() {
        let date = parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(date.timestamp(), 1_445_412_480);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_fetch_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/g/a/maven-metadata.xml")
            .with_status(200)
            .with_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT")
            .with_body("<metadata/>")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let document = fetcher
            .fetch(&url(&server, "/g/a/maven-metadata.xml"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(document.text(), "<metadata/>");
        assert_eq!(document.last_modified.unwrap().timestamp(), 1_445_412_480);
        assert_eq!(document.parse_xml().unwrap().name(), "metadata");
    }

    #[tokio::test]
    async fn test_fetch_http_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.pom")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&url(&server, "/missing.pom"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_probe_http() {
        let mut server = mockito::Server::new_async().await;
        let _found = server
            .mock("HEAD", "/a-1.0.jar")
            .with_status(200)
            .create_async()
            .await;
        let _missing = server
            .mock("HEAD", "/a-1.0-sources.jar")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let found = url(&server, "/a-1.0.jar");
        assert_eq!(fetcher.probe(&found).await.unwrap(), Some(found));
        assert_eq!(
            fetcher
                .probe(&url(&server, "/a-1.0-sources.jar"))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_fetch_and_probe_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<project/>").unwrap();
        let location = Url::from_file_path(file.path()).unwrap();

        let fetcher = HttpFetcher::new().unwrap();
        let document = fetcher.fetch(&location).await.unwrap();
        assert_eq!(document.text(), "<project/>");
        assert!(document.last_modified.is_some());
        assert_eq!(fetcher.probe(&location).await.unwrap(), Some(location.clone()));

        let missing = location.join("does-not-exist.jar").unwrap();
        assert_eq!(fetcher.probe(&missing).await.unwrap(), None);
        assert!(matches!(
            fetcher.fetch(&missing).await,
            Err(CoreError::Io(_))
        ));
    }
}
