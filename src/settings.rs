use config::{Config, File, FileFormat};
use serde::de::Deserializer;
use serde::Deserialize;

use crate::channels::IdScheme;
use crate::fetch::FetchSettings;
use crate::store::NewPlaylist;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub playlists: Vec<PlaylistEntry>,
    /// Shorthand for unnamed playlists.
    #[serde(
        default,
        alias = "playlist_url",
        deserialize_with = "deserialize_one_or_many"
    )]
    pub playlist_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub ids: IdScheme,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

fn deserialize_one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => Ok(vec![s]),
        OneOrMany::Many(v) => Ok(v),
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Initial store contents: named entries first, then bare URLs.
    pub fn playlist_seeds(&self) -> Vec<NewPlaylist> {
        let named = self.playlists.iter().map(|p| NewPlaylist {
            name: p.name.clone(),
            source_url: p.url.clone(),
            description: p.description.clone(),
            is_active: p.active,
        });
        let bare = self.playlist_urls.iter().map(|url| NewPlaylist {
            name: url.clone(),
            source_url: url.clone(),
            description: None,
            is_active: true,
        });
        named.chain(bare).collect()
    }
}
