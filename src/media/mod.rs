/// Media records and social state
///
/// A media item is a photo or a video; the two share a table and differ only
/// in kind-specific fields. Likes and comments hang off the item and are
/// mutated exclusively through [`store::MediaStore`].
mod store;

pub use store::MediaStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Media kind: photo or video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }

    /// Storage subfolder for this kind
    pub fn folder(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photos",
            MediaKind::Video => "videos",
        }
    }
}

/// Which storage backend holds the item's bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    Remote,
    Local,
}

impl StorageTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::Remote => "remote",
            StorageTier::Local => "local",
        }
    }
}

/// Caller-supplied metadata for an upload
///
/// Missing fields take the declared defaults; the video-specific fields are
/// ignored for photos.
#[derive(Debug, Clone)]
pub struct MediaMetadata {
    pub title: String,
    pub caption: String,
    pub location: String,
    pub tags: Vec<String>,
    pub duration: i64,
    pub resolution: String,
    pub format: String,
}

impl Default for MediaMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            caption: String::new(),
            location: String::new(),
            tags: Vec::new(),
            duration: 0,
            resolution: "1080p".to_string(),
            format: "mp4".to_string(),
        }
    }
}

/// Media row as stored, with the creator's email joined in
#[derive(Debug, Clone, FromRow)]
pub struct MediaRow {
    pub id: String,
    pub kind: String,
    pub creator_id: String,
    pub url: String,
    pub storage_tier: String,
    pub title: String,
    pub caption: String,
    pub location: String,
    /// JSON array of strings
    pub tags: String,
    pub duration: i64,
    pub resolution: String,
    pub format: String,
    pub created_at: DateTime<Utc>,
    pub creator_email: Option<String>,
}

/// Minimal display projection of a user reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorView {
    pub id: String,
    pub email: String,
}

impl CreatorView {
    /// Dangling references render as "unknown" instead of failing
    pub fn resolve(id: String, email: Option<String>) -> Self {
        Self {
            id,
            email: email.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// A comment with its author resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub author: CreatorView,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Fully resolved media item as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    pub creator: CreatorView,
    pub url: String,
    pub storage_tier: StorageTier,
    pub title: String,
    pub caption: String,
    pub location: String,
    pub tags: Vec<String>,
    pub duration: i64,
    pub resolution: String,
    pub format: String,
    pub likes: Vec<String>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
}

/// Listing query parameters, normalized
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// Which media kind the listing covers; the photos endpoint always
    /// queries photos
    pub kind: MediaKind,
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub sort_by: SortKey,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            kind: MediaKind::Photo,
            page: 1,
            limit: 10,
            search: String::new(),
            sort_by: SortKey::Latest,
        }
    }
}

/// Listing sort order over creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Creation time descending (the default)
    Latest,
    /// Creation time ascending
    Oldest,
}

impl SortKey {
    /// Anything other than "latest" sorts ascending
    pub fn parse(s: &str) -> Self {
        if s == "latest" || s.is_empty() {
            SortKey::Latest
        } else {
            SortKey::Oldest
        }
    }
}

/// Pagination metadata echoed back with every listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_photos: i64,
    pub total_pages: i64,
    pub current_page: u32,
    pub page_size: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}
