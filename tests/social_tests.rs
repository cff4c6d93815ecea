/// Social interactions and listing: like toggles, comments, pagination,
/// search and sort
use shareit::{
    db,
    error::ShareError,
    media::{ListQuery, MediaKind, MediaMetadata, MediaStore, SortKey, StorageTier},
};
use sqlx::SqlitePool;
use std::sync::Arc;

async fn pool_with_users(n: usize) -> (SqlitePool, Vec<String>) {
    let pool = db::create_memory_pool().await.unwrap();

    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let id = format!("user-{}", i);
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, 'x', 'user', ?4)",
        )
        .bind(&id)
        .bind(format!("User {}", i))
        .bind(format!("user{}@example.com", i))
        .bind(chrono::Utc::now())
        .execute(&pool)
        .await
        .unwrap();
        ids.push(id);
    }

    (pool, ids)
}

async fn insert_photo(store: &MediaStore, creator: &str, title: &str, caption: &str) -> String {
    let meta = MediaMetadata {
        title: title.to_string(),
        caption: caption.to_string(),
        ..Default::default()
    };
    store
        .insert(MediaKind::Photo, creator, "/media/photos/x.png", StorageTier::Local, &meta)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn double_toggle_restores_original_membership() {
    let (pool, users) = pool_with_users(2).await;
    let store = MediaStore::new(pool);
    let id = insert_photo(&store, &users[0], "a", "").await;

    let (count, members) = store.toggle_like(&id, &users[1]).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(members, vec![users[1].clone()]);

    let (count, members) = store.toggle_like(&id, &users[1]).await.unwrap();
    assert_eq!(count, 0);
    assert!(members.is_empty());
}

#[tokio::test]
async fn concurrent_toggles_by_distinct_users_all_land() {
    let n = 8;
    let (pool, users) = pool_with_users(n + 1).await;
    let store = Arc::new(MediaStore::new(pool));
    let id = insert_photo(&store, &users[0], "popular", "").await;

    let mut handles = Vec::new();
    for user in users.iter().skip(1).cloned() {
        let store = Arc::clone(&store);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            store.toggle_like(&id, &user).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let item = store.get(&id).await.unwrap();
    assert_eq!(item.likes.len(), n, "no toggle may be lost");
}

#[tokio::test]
async fn like_on_missing_media_is_not_found() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);

    let err = store.toggle_like("missing", &users[0]).await.unwrap_err();
    assert!(matches!(err, ShareError::NotFound(_)));
}

#[tokio::test]
async fn empty_comment_rejected_without_mutation() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);
    let id = insert_photo(&store, &users[0], "a", "").await;

    for text in ["", "   ", "\n\t"] {
        let err = store.add_comment(&id, &users[0], text).await.unwrap_err();
        assert!(matches!(err, ShareError::Validation(_)));
    }

    let item = store.get(&id).await.unwrap();
    assert!(item.comments.is_empty());
}

#[tokio::test]
async fn comment_appends_with_author_and_timestamp() {
    let (pool, users) = pool_with_users(2).await;
    let store = MediaStore::new(pool);
    let id = insert_photo(&store, &users[0], "a", "").await;

    let start = chrono::Utc::now();
    let comments = store.add_comment(&id, &users[1], "nice shot").await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "nice shot");
    assert_eq!(comments[0].author.id, users[1]);
    assert_eq!(comments[0].author.email, "user1@example.com");
    assert!(comments[0].created_at >= start);

    // Order-preserving append
    let comments = store.add_comment(&id, &users[0], "thanks").await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "nice shot");
    assert_eq!(comments[1].text, "thanks");
}

#[tokio::test]
async fn comment_on_missing_media_is_not_found() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);

    let err = store.add_comment("missing", &users[0], "hi").await.unwrap_err();
    assert!(matches!(err, ShareError::NotFound(_)));
}

#[tokio::test]
async fn listing_pagination_metadata() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);

    for i in 0..25 {
        insert_photo(&store, &users[0], &format!("photo {}", i), "").await;
    }

    let (items, meta) = store
        .list(&ListQuery {
            page: 3,
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(items.len(), 5);
    assert_eq!(meta.total_photos, 25);
    assert_eq!(meta.total_pages, 3);
    assert_eq!(meta.current_page, 3);
    assert_eq!(meta.page_size, 10);
    assert!(!meta.has_next_page, "last page has no next");
    assert!(meta.has_prev_page);
}

#[tokio::test]
async fn listing_sorts_latest_first_by_default() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);

    for i in 0..5 {
        insert_photo(&store, &users[0], &format!("photo {}", i), "").await;
    }

    let (items, _) = store.list(&ListQuery::default()).await.unwrap();
    for pair in items.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "latest sort must be non-increasing by creation time"
        );
    }

    let (items, _) = store
        .list(&ListQuery {
            sort_by: SortKey::Oldest,
            ..Default::default()
        })
        .await
        .unwrap();
    for pair in items.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn listing_is_scoped_to_one_media_kind() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);

    insert_photo(&store, &users[0], "still", "").await;
    store
        .insert(
            MediaKind::Video,
            &users[0],
            "/media/videos/v.mp4",
            StorageTier::Local,
            &MediaMetadata {
                title: "clip".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The photos listing must not leak videos into its items or its count
    let (items, meta) = store.list(&ListQuery::default()).await.unwrap();
    assert_eq!(meta.total_photos, 1);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, MediaKind::Photo);

    let (items, meta) = store
        .list(&ListQuery {
            kind: MediaKind::Video,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(meta.total_photos, 1);
    assert_eq!(items[0].kind, MediaKind::Video);
}

#[tokio::test]
async fn search_matches_title_or_caption_case_insensitively() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);

    insert_photo(&store, &users[0], "Sunset Beach", "").await;
    insert_photo(&store, &users[0], "City", "walking on the BEACH at noon").await;
    insert_photo(&store, &users[0], "Mountains", "alpine hike").await;

    let (items, meta) = store
        .list(&ListQuery {
            search: "beach".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(meta.total_photos, 2);
    assert_eq!(items.len(), 2);

    // Empty search returns everything
    let (_, meta) = store.list(&ListQuery::default()).await.unwrap();
    assert_eq!(meta.total_photos, 3);
}

#[tokio::test]
async fn page_size_is_clamped() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);
    insert_photo(&store, &users[0], "a", "").await;

    let (_, meta) = store
        .list(&ListQuery {
            limit: 100_000,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(meta.page_size, 100);
}

#[tokio::test]
async fn creator_is_resolved_to_id_and_email() {
    let (pool, users) = pool_with_users(1).await;
    let store = MediaStore::new(pool);
    let id = insert_photo(&store, &users[0], "a", "").await;

    let item = store.get(&id).await.unwrap();
    assert_eq!(item.creator.id, users[0]);
    assert_eq!(item.creator.email, "user0@example.com");
}
