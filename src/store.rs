//! Admin-managed playlist records.
//!
//! The catalog only needs the [`PlaylistStore`] interface; the in-memory
//! implementation backs the service binary and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::playlists::PlaylistRef;

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlaylist {
    pub id: String,
    pub name: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    /// Channel count from the last parse of `source_url`.
    pub channel_count: usize,
    pub created_at: u64,
    pub updated_at: u64,
}

impl StoredPlaylist {
    pub fn to_ref(&self) -> PlaylistRef {
        PlaylistRef {
            name: self.name.clone(),
            source_url: self.source_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylist {
    pub name: String,
    pub source_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial edit; `None` fields stay untouched. An empty `description`
/// clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistUpdate {
    pub name: Option<String>,
    pub source_url: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// All playlists, newest first.
    async fn list(&self) -> Vec<StoredPlaylist>;

    async fn get(&self, id: &str) -> Result<StoredPlaylist, StoreError> {
        self.list()
            .await
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn list_active(&self) -> Vec<StoredPlaylist> {
        self.list()
            .await
            .into_iter()
            .filter(|p| p.is_active)
            .collect()
    }

    async fn insert(&self, playlist: NewPlaylist, channel_count: usize) -> StoredPlaylist;

    async fn update(
        &self,
        id: &str,
        update: PlaylistUpdate,
        channel_count: Option<usize>,
    ) -> Result<StoredPlaylist, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct InMemoryPlaylistStore {
    playlists: RwLock<Vec<StoredPlaylist>>,
}

impl InMemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaylistStore for InMemoryPlaylistStore {
    async fn list(&self) -> Vec<StoredPlaylist> {
        let mut playlists = self.playlists.read().await.clone();
        // Stable sort keeps later inserts first within the same second.
        playlists.reverse();
        playlists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        playlists
    }

    async fn insert(&self, playlist: NewPlaylist, channel_count: usize) -> StoredPlaylist {
        let now = now_epoch_secs();
        let stored = StoredPlaylist {
            id: Uuid::new_v4().to_string(),
            name: playlist.name,
            source_url: playlist.source_url,
            description: playlist.description,
            is_active: playlist.is_active,
            channel_count,
            created_at: now,
            updated_at: now,
        };
        self.playlists.write().await.push(stored.clone());
        stored
    }

    async fn update(
        &self,
        id: &str,
        update: PlaylistUpdate,
        channel_count: Option<usize>,
    ) -> Result<StoredPlaylist, StoreError> {
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if let Some(name) = update.name {
            playlist.name = name;
        }
        if let Some(source_url) = update.source_url {
            playlist.source_url = source_url;
        }
        if let Some(description) = update.description {
            playlist.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(is_active) = update.is_active {
            playlist.is_active = is_active;
        }
        if let Some(count) = channel_count {
            playlist.channel_count = count;
        }
        playlist.updated_at = now_epoch_secs();
        Ok(playlist.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut playlists = self.playlists.write().await;
        let before = playlists.len();
        playlists.retain(|p| p.id != id);
        if playlists.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
