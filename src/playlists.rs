use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::channels::{Channel, IdScheme};
use crate::fetch::{parse_playlist, TextFetcher};
use crate::metrics::{CHANNELS_PARSED, LAST_LOAD_CHANNELS, PLAYLIST_FETCH_FAILURES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRef {
    pub name: String,
    pub source_url: String,
}

/// Channels materialized from one source, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub name: String,
    pub source_url: String,
    pub channels: Vec<Channel>,
}

/// Loads every reference one after another.
///
/// A reference that fails to load is logged and left out; the batch itself
/// never fails. An empty result is a normal outcome.
pub async fn load_all_playlists(
    fetcher: &dyn TextFetcher,
    refs: &[PlaylistRef],
    ids: IdScheme,
) -> Vec<Playlist> {
    let mut playlists = Vec::with_capacity(refs.len());
    for playlist_ref in refs {
        match parse_playlist(fetcher, &playlist_ref.source_url, ids).await {
            Ok(channels) => {
                CHANNELS_PARSED.inc_by(channels.len() as u64);
                playlists.push(Playlist {
                    name: playlist_ref.name.clone(),
                    source_url: playlist_ref.source_url.clone(),
                    channels,
                });
            }
            Err(e) => {
                PLAYLIST_FETCH_FAILURES.inc();
                error!("Failed to load playlist {}: {}", playlist_ref.name, e);
            }
        }
    }

    let total: usize = playlists.iter().map(|p| p.channels.len()).sum();
    LAST_LOAD_CHANNELS.set(total as i64);
    info!(
        "Loaded {}/{} playlists ({} channels)",
        playlists.len(),
        refs.len(),
        total
    );
    playlists
}
