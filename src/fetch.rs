use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::channels::{self, Channel, IdScheme};
use crate::error::FetchError;

/// Retrieves the full text of a document.
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("livetv-catalog/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
        }
    }
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| FetchError::transport(url, e))
    }
}

/// Fetches `source_url` and parses it. Only retrieval can fail.
pub async fn parse_playlist(
    fetcher: &dyn TextFetcher,
    source_url: &str,
    ids: IdScheme,
) -> Result<Vec<Channel>, FetchError> {
    debug!("Fetching playlist {}", source_url);
    let text = fetcher.fetch_text(source_url).await?;
    let channels = channels::parse_m3u(&text, source_url, ids);
    info!("Parsed {} channels from {}", channels.len(), source_url);
    Ok(channels)
}

/// Like [`parse_playlist`], abandoning the retrieval once `cancel` fires.
pub async fn parse_playlist_with_cancel(
    fetcher: &dyn TextFetcher,
    source_url: &str,
    ids: IdScheme,
    cancel: &CancellationToken,
) -> Result<Vec<Channel>, FetchError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(FetchError::Cancelled { url: source_url.to_string() }),
        res = parse_playlist(fetcher, source_url, ids) => res,
    }
}
