//! HTTP and local-file playlist fetching
//!
//! `http://` and `https://` addresses are downloaded with a client that
//! carries the configured total timeout. Anything else is treated as a local
//! path (with or without a `file://` prefix), which is handy for testing a
//! channel list against a saved playlist.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::traits::PlaylistFetcher;
use crate::config::FetchConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::utils::url::UrlUtils;

pub struct HttpPlaylistFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpPlaylistFetcher {
    pub fn new(config: &FetchConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    async fn fetch_http(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        debug!("GET {} (timeout {:?})", safe_url, self.timeout);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &safe_url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: safe_url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, &safe_url))?;
        debug!("Downloaded {} bytes from {}", body.len(), safe_url);
        Ok(body)
    }

    async fn fetch_file(&self, address: &str) -> SourceResult<String> {
        let path = address.strip_prefix("file://").unwrap_or(address);
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::unavailable(address, e.to_string()))
    }
}

fn map_reqwest_error(error: reqwest::Error, safe_url: &str) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout {
            url: safe_url.to_string(),
        }
    } else {
        // reqwest includes the raw URL in its message, strip it
        SourceError::unavailable(safe_url, error.without_url().to_string())
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch(&self, address: &str) -> SourceResult<String> {
        if UrlUtils::is_http(address) {
            self.fetch_http(address).await
        } else {
            self.fetch_file(address).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.m3u");
        std::fs::write(&path, "#EXTM3U\n").unwrap();

        let fetcher = HttpPlaylistFetcher::new(&FetchConfig::default()).unwrap();
        let plain = fetcher.fetch(path.to_str().unwrap()).await.unwrap();
        let prefixed = fetcher
            .fetch(&format!("file://{}", path.display()))
            .await
            .unwrap();

        assert_eq!(plain, "#EXTM3U\n");
        assert_eq!(prefixed, plain);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let fetcher = HttpPlaylistFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.fetch("/definitely/not/here.m3u").await.unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_not_fatal() {
        let config = FetchConfig {
            timeout: Duration::from_secs(2),
            ..FetchConfig::default()
        };
        let fetcher = HttpPlaylistFetcher::new(&config).unwrap();
        // Port 9 on localhost is the discard service and is almost never open
        let err = fetcher.fetch("http://127.0.0.1:9/list.m3u").await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Unavailable { .. } | SourceError::Timeout { .. }
        ));
    }
}
