use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub const EXTINF_PREFIX: &str = "#EXTINF:";
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";
pub const DEFAULT_GROUP: &str = "General";

lazy_static! {
    static ref RE_TVG_LOGO: Regex = Regex::new(r#"tvg-logo="([^"]+)""#).unwrap();
    static ref RE_GROUP_TITLE: Regex = Regex::new(r#"group-title="([^"]+)""#).unwrap();
    static ref RE_TVG_ID: Regex = Regex::new(r#"tvg-id="([^"]+)""#).unwrap();
}

/// One playable stream found in a playlist document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub group: String,
    pub category: String,
    pub stream_url: String,
    pub is_live: bool,
    /// Display-only placeholder. Not backed by any audience data.
    pub viewer_count: String,
}

/// How identifiers are assigned to channels that carry no `tvg-id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// `channel_{position}_{unix_millis}`; changes on every parse.
    #[default]
    Timestamped,
    /// Hash of source URL, position and name; identical across re-parses.
    Stable,
}

fn now_epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// First 8 bytes of SHA-256 over NUL-separated fields; fixed across builds.
fn stable_hash_u64(source_url: &str, position: usize, name: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(source_url.as_bytes());
    hasher.update([0u8]);
    hasher.update(position.to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

fn attribute(re: &Regex, info: &str) -> Option<String> {
    re.captures(info).map(|caps| caps[1].to_string())
}

fn synthetic_viewer_count() -> String {
    format!("{}K", fastrand::u32(100..1100))
}

fn synthesize_id(ids: IdScheme, source_url: &str, position: usize, name: &str) -> String {
    match ids {
        IdScheme::Timestamped => format!("channel_{}_{}", position, now_epoch_millis()),
        IdScheme::Stable => format!(
            "channel_{:016x}",
            stable_hash_u64(source_url, position, name)
        ),
    }
}

/// Display name: text after the first comma, quotes stripped.
fn channel_name(info: &str) -> String {
    match info.split_once(',') {
        Some((_, rest)) => rest.trim().replace('"', "").trim().to_string(),
        None => UNKNOWN_CHANNEL.to_string(),
    }
}

/// Parses playlist text into channels, in source order.
///
/// A `#EXTINF:` line only yields a channel when the next non-empty line is
/// not itself a `#` directive. Anything malformed is skipped, never reported.
/// `source_url` only feeds [`IdScheme::Stable`] identifiers.
pub fn parse_m3u(content: &str, source_url: &str, ids: IdScheme) -> Vec<Channel> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let mut channels = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let Some(info) = lines[i].strip_prefix(EXTINF_PREFIX) else {
            i += 1;
            continue;
        };

        let url = match lines.get(i + 1) {
            Some(next) if !next.starts_with('#') => *next,
            _ => {
                i += 1;
                continue;
            }
        };

        let name = channel_name(info);
        let group = attribute(&RE_GROUP_TITLE, info).unwrap_or_else(|| DEFAULT_GROUP.to_string());
        let position = channels.len() + 1;
        let id = attribute(&RE_TVG_ID, info)
            .unwrap_or_else(|| synthesize_id(ids, source_url, position, &name));

        channels.push(Channel {
            id,
            name,
            logo_url: attribute(&RE_TVG_LOGO, info),
            category: group.clone(),
            group,
            stream_url: url.to_string(),
            is_live: true,
            viewer_count: synthetic_viewer_count(),
        });
        i += 2;
    }

    channels
}
