//! Channel grouping and lookup over loaded playlists.

use serde::Serialize;

use crate::channels::{Channel, DEFAULT_GROUP};
use crate::playlists::Playlist;

pub const SEARCH_LIMIT: usize = 10;
pub const RELATED_LIMIT: usize = 8;

/// Substrings that place a channel in a themed view, matched case-insensitively
/// against its category or its name.
#[derive(Debug, Clone, Copy)]
pub struct KeywordView {
    pub categories: &'static [&'static str],
    pub names: &'static [&'static str],
}

pub const SPORTS: KeywordView = KeywordView {
    categories: &["sport", "football", "cricket", "basketball", "tennis"],
    names: &["sport", "espn", "fox sport"],
};

pub const MOVIES: KeywordView = KeywordView {
    categories: &["movie", "cinema", "film"],
    names: &["movie", "cinema"],
};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub name: String,
    pub channels: Vec<Channel>,
}

fn all_channels(playlists: &[Playlist]) -> impl Iterator<Item = &Channel> {
    playlists.iter().flat_map(|p| p.channels.iter())
}

fn category_of(channel: &Channel) -> &str {
    if channel.category.is_empty() {
        DEFAULT_GROUP
    } else {
        &channel.category
    }
}

/// Merges channels of all playlists by category, in first-seen order.
pub fn group_by_category(playlists: &[Playlist]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for channel in all_channels(playlists) {
        let name = category_of(channel);
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.channels.push(channel.clone()),
            None => groups.push(CategoryGroup {
                name: name.to_string(),
                channels: vec![channel.clone()],
            }),
        }
    }
    groups
}

/// Case-insensitive match on name or category.
pub fn search(playlists: &[Playlist], query: &str, limit: usize) -> Vec<Channel> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    all_channels(playlists)
        .filter(|c| {
            c.name.to_lowercase().contains(&query) || c.category.to_lowercase().contains(&query)
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Other channels sharing `current`'s category.
pub fn related(groups: &[CategoryGroup], current: &Channel, limit: usize) -> Vec<Channel> {
    let Some(group) = groups.iter().find(|g| g.name == category_of(current)) else {
        return Vec::new();
    };
    group
        .channels
        .iter()
        .filter(|c| c.id != current.id)
        .take(limit)
        .cloned()
        .collect()
}

/// Channels selected by `view`, in source order.
pub fn filter_by_keywords(playlists: &[Playlist], view: KeywordView) -> Vec<Channel> {
    let contains_any = |text: &str, keywords: &[&str]| {
        let text = text.to_lowercase();
        keywords.iter().any(|k| text.contains(k))
    };
    all_channels(playlists)
        .filter(|c| contains_any(&c.category, view.categories) || contains_any(&c.name, view.names))
        .cloned()
        .collect()
}
