/// Media store: persistence and atomic social mutations
///
/// Like-toggle and comment-append are single-statement updates against the
/// database, never fetch-then-save, so concurrent mutations of the same item
/// cannot lose updates.
use crate::{
    error::{ShareError, ShareResult},
    media::{
        CommentView, CreatorView, ListQuery, MediaItem, MediaKind, MediaMetadata, MediaRow,
        Pagination, SortKey, StorageTier,
    },
};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Hard cap on listing page size
pub const MAX_PAGE_SIZE: u32 = 100;

const SELECT_MEDIA: &str = "SELECT m.id, m.kind, m.creator_id, m.url, m.storage_tier, m.title,
            m.caption, m.location, m.tags, m.duration, m.resolution, m.format,
            m.created_at, u.email AS creator_email
     FROM media m LEFT JOIN users u ON u.id = m.creator_id";

/// Media store service
pub struct MediaStore {
    db: SqlitePool,
}

impl MediaStore {
    /// Create a new media store
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Persist a new media item
    ///
    /// Only the upload orchestrator calls this, after the bytes have landed
    /// in exactly one storage tier.
    pub async fn insert(
        &self,
        kind: MediaKind,
        creator_id: &str,
        url: &str,
        tier: StorageTier,
        meta: &MediaMetadata,
    ) -> ShareResult<MediaItem> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let tags_json = serde_json::to_string(&meta.tags)
            .map_err(|e| ShareError::Internal(format!("Tag encoding failed: {}", e)))?;

        sqlx::query(
            "INSERT INTO media (id, kind, creator_id, url, storage_tier, title, caption,
                                location, tags, duration, resolution, format, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&id)
        .bind(kind.as_str())
        .bind(creator_id)
        .bind(url)
        .bind(tier.as_str())
        .bind(&meta.title)
        .bind(&meta.caption)
        .bind(&meta.location)
        .bind(&tags_json)
        .bind(meta.duration)
        .bind(&meta.resolution)
        .bind(&meta.format)
        .bind(now)
        .execute(&self.db)
        .await?;

        self.get(&id).await
    }

    /// Fetch a single media item with creator, likes and comments resolved
    pub async fn get(&self, media_id: &str) -> ShareResult<MediaItem> {
        let row = sqlx::query_as::<_, MediaRow>(&format!("{} WHERE m.id = ?1", SELECT_MEDIA))
            .bind(media_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ShareError::NotFound(format!("Media not found: {}", media_id)))?;

        self.resolve(row).await
    }

    /// Idempotent like flip: add the user to the like set if absent,
    /// remove them otherwise
    ///
    /// Returns the resulting like count and members. Both the insert and the
    /// delete are single atomic statements keyed on (media_id, user_id), so
    /// toggles by distinct users never interfere.
    pub async fn toggle_like(
        &self,
        media_id: &str,
        user_id: &str,
    ) -> ShareResult<(i64, Vec<String>)> {
        self.require_exists(media_id).await?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO media_like (media_id, user_id, created_at)
             VALUES (?1, ?2, ?3)",
        )
        .bind(media_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.db)
        .await?
        .rows_affected();

        if inserted == 0 {
            // Already a member: this toggle removes the like
            sqlx::query("DELETE FROM media_like WHERE media_id = ?1 AND user_id = ?2")
                .bind(media_id)
                .bind(user_id)
                .execute(&self.db)
                .await?;
        }

        let members = self.fetch_likes(media_id).await?;

        Ok((members.len() as i64, members))
    }

    /// Append a comment to a media item
    ///
    /// Comments are never edited or removed; insertion order is
    /// chronological order.
    pub async fn add_comment(
        &self,
        media_id: &str,
        user_id: &str,
        text: &str,
    ) -> ShareResult<Vec<CommentView>> {
        if text.trim().is_empty() {
            return Err(ShareError::Validation(
                "Comment text cannot be empty".to_string(),
            ));
        }

        self.require_exists(media_id).await?;

        sqlx::query(
            "INSERT INTO media_comment (media_id, user_id, text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(media_id)
        .bind(user_id)
        .bind(text)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        self.fetch_comments(media_id).await
    }

    /// Paginated, optionally keyword-filtered listing of one media kind
    ///
    /// The search term matches title or caption, case-insensitively.
    pub async fn list(&self, query: &ListQuery) -> ShareResult<(Vec<MediaItem>, Pagination)> {
        let page = query.page.max(1);
        let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
        let search = query.search.trim().to_lowercase();
        let offset = (page as i64 - 1) * limit as i64;

        let filter = "WHERE m.kind = ?1
              AND (?2 = ''
                OR LOWER(m.title) LIKE '%' || ?2 || '%'
                OR LOWER(m.caption) LIKE '%' || ?2 || '%')";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM media m {}", filter))
                .bind(query.kind.as_str())
                .bind(&search)
                .fetch_one(&self.db)
                .await?;

        let order = match query.sort_by {
            SortKey::Latest => "DESC",
            SortKey::Oldest => "ASC",
        };

        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "{} {} ORDER BY m.created_at {} LIMIT ?3 OFFSET ?4",
            SELECT_MEDIA, filter, order
        ))
        .bind(query.kind.as_str())
        .bind(&search)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(self.resolve(row).await?);
        }

        let total_pages = (total + limit as i64 - 1) / limit as i64;
        let pagination = Pagination {
            total_photos: total,
            total_pages,
            current_page: page,
            page_size: limit,
            has_next_page: (page as i64) < total_pages,
            has_prev_page: page > 1,
        };

        Ok((items, pagination))
    }

    async fn require_exists(&self, media_id: &str) -> ShareResult<()> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM media WHERE id = ?1")
            .bind(media_id)
            .fetch_optional(&self.db)
            .await?;

        row.map(|_| ())
            .ok_or_else(|| ShareError::NotFound(format!("Media not found: {}", media_id)))
    }

    async fn fetch_likes(&self, media_id: &str) -> ShareResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT user_id FROM media_like WHERE media_id = ?1 ORDER BY created_at, user_id",
        )
        .bind(media_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(|r| r.get("user_id")).collect())
    }

    async fn fetch_comments(&self, media_id: &str) -> ShareResult<Vec<CommentView>> {
        let rows = sqlx::query(
            "SELECT c.user_id, u.email, c.text, c.created_at
             FROM media_comment c LEFT JOIN users u ON u.id = c.user_id
             WHERE c.media_id = ?1 ORDER BY c.id",
        )
        .bind(media_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .iter()
            .map(|r| CommentView {
                author: CreatorView::resolve(r.get("user_id"), r.get("email")),
                text: r.get("text"),
                created_at: r.get::<DateTime<Utc>, _>("created_at"),
            })
            .collect())
    }

    async fn resolve(&self, row: MediaRow) -> ShareResult<MediaItem> {
        let likes = self.fetch_likes(&row.id).await?;
        let comments = self.fetch_comments(&row.id).await?;

        let kind = match row.kind.as_str() {
            "video" => MediaKind::Video,
            _ => MediaKind::Photo,
        };
        let tier = match row.storage_tier.as_str() {
            "local" => StorageTier::Local,
            _ => StorageTier::Remote,
        };
        let tags: Vec<String> = serde_json::from_str(&row.tags).unwrap_or_default();

        Ok(MediaItem {
            id: row.id,
            kind,
            creator: CreatorView::resolve(row.creator_id, row.creator_email),
            url: row.url,
            storage_tier: tier,
            title: row.title,
            caption: row.caption,
            location: row.location,
            tags,
            duration: row.duration,
            resolution: row.resolution,
            format: row.format,
            likes,
            comments,
            created_at: row.created_at,
        })
    }
}
