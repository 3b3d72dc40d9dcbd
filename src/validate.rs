use url::Url;

/// Host whose raw files are accepted regardless of extension.
pub const TRUSTED_RAW_HOST: &str = "raw.githubusercontent.com";

/// Checks whether a user- or admin-supplied address looks like a playlist.
///
/// Requires `http`/`https` and either a `.m3u`/`.m3u8` path or the trusted
/// raw-content host. Says nothing about whether the target actually parses.
pub fn is_acceptable_playlist_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let path = parsed.path().to_ascii_lowercase();
    path.ends_with(".m3u")
        || path.ends_with(".m3u8")
        || parsed.host_str() == Some(TRUSTED_RAW_HOST)
}
