use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::channels::{Channel, IdScheme};
use crate::error::AdminError;
use crate::fetch::{parse_playlist, TextFetcher};
use crate::playlists::{load_all_playlists, Playlist, PlaylistRef};
use crate::store::{NewPlaylist, PlaylistStore, PlaylistUpdate, StoredPlaylist};
use crate::validate::is_acceptable_playlist_url;

const PROBE_SAMPLE_SIZE: usize = 3;

/// Outcome of trying a playlist URL before saving it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistProbe {
    pub success: bool,
    pub channel_count: usize,
    pub sample_channels: Vec<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Keeps stored playlists and their cached channel counts in step with
/// their source documents.
#[derive(Clone)]
pub struct PlaylistService {
    fetcher: Arc<dyn TextFetcher>,
    store: Arc<dyn PlaylistStore>,
    ids: IdScheme,
}

impl PlaylistService {
    pub fn new(fetcher: Arc<dyn TextFetcher>, store: Arc<dyn PlaylistStore>, ids: IdScheme) -> Self {
        Self { fetcher, store, ids }
    }

    fn check_url(url: &str) -> Result<(), AdminError> {
        if is_acceptable_playlist_url(url) {
            Ok(())
        } else {
            Err(AdminError::UnacceptableUrl {
                url: url.to_string(),
            })
        }
    }

    async fn count_channels(&self, url: &str) -> Result<usize, AdminError> {
        let channels = parse_playlist(self.fetcher.as_ref(), url, self.ids).await?;
        Ok(channels.len())
    }

    pub async fn list_playlists(&self) -> Vec<StoredPlaylist> {
        self.store.list().await
    }

    pub async fn add_playlist(&self, playlist: NewPlaylist) -> Result<StoredPlaylist, AdminError> {
        Self::check_url(&playlist.source_url)?;
        let channel_count = self.count_channels(&playlist.source_url).await?;
        let stored = self.store.insert(playlist, channel_count).await;
        info!(
            "Added playlist {} ({}) with {} channels",
            stored.name, stored.id, channel_count
        );
        Ok(stored)
    }

    /// Applies `update`; a new source URL is validated and reparsed first.
    pub async fn update_playlist(
        &self,
        id: &str,
        update: PlaylistUpdate,
    ) -> Result<StoredPlaylist, AdminError> {
        self.store.get(id).await?;
        let channel_count = match update.source_url.as_deref() {
            Some(url) => {
                Self::check_url(url)?;
                Some(self.count_channels(url).await?)
            }
            None => None,
        };
        let stored = self.store.update(id, update, channel_count).await?;
        info!("Updated playlist {} ({})", stored.name, stored.id);
        Ok(stored)
    }

    pub async fn delete_playlist(&self, id: &str) -> Result<(), AdminError> {
        self.store.delete(id).await?;
        info!("Deleted playlist {}", id);
        Ok(())
    }

    /// Stores configured playlists without URL checks. A source that cannot
    /// be fetched is kept with a zero channel count.
    pub async fn import_playlists(&self, seeds: Vec<NewPlaylist>) -> usize {
        let mut imported = 0;
        for seed in seeds {
            let channel_count = match self.count_channels(&seed.source_url).await {
                Ok(count) => count,
                Err(e) => {
                    warn!("Could not count channels of {}: {}", seed.name, e);
                    0
                }
            };
            self.store.insert(seed, channel_count).await;
            imported += 1;
        }
        imported
    }

    /// Never fails; retrieval problems are reported in the probe.
    pub async fn test_playlist_url(&self, url: &str) -> PlaylistProbe {
        match parse_playlist(self.fetcher.as_ref(), url, self.ids).await {
            Ok(channels) => PlaylistProbe {
                success: true,
                channel_count: channels.len(),
                sample_channels: channels.into_iter().take(PROBE_SAMPLE_SIZE).collect(),
                error: None,
            },
            Err(e) => {
                warn!("Playlist probe failed for {}: {}", url, e);
                PlaylistProbe {
                    success: false,
                    channel_count: 0,
                    sample_channels: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Parses every active playlist fresh.
    pub async fn active_playlists(&self) -> Vec<Playlist> {
        let refs: Vec<PlaylistRef> = self
            .store
            .list_active()
            .await
            .iter()
            .map(StoredPlaylist::to_ref)
            .collect();
        load_all_playlists(self.fetcher.as_ref(), &refs, self.ids).await
    }
}
