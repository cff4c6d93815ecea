/// Upload, listing and social endpoints
use crate::{
    auth::AuthContext,
    context::AppContext,
    error::{ShareError, ShareResult},
    media::{ListQuery, MediaItem, MediaKind, MediaMetadata, Pagination, SortKey},
    storage::StagedFile,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Build media routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/upload/photo", post(upload_photo))
        // Route alias kept for older clients
        .route("/api/photo/share", post(upload_photo))
        .route("/api/upload/video", post(upload_video))
        .route("/api/photos", get(list_photos))
        .route("/api/:id/like", post(toggle_like))
        .route("/api/:id/comment", post(add_comment))
}

/// One parsed multipart submission: the staged file plus metadata fields
struct UploadForm {
    staged: StagedFile,
    meta: MediaMetadata,
}

/// Pull the file field and metadata out of a multipart body and stage the
/// file on ephemeral storage
///
/// `file_field` is "photo" or "video" depending on the endpoint.
async fn parse_upload(
    ctx: &AppContext,
    mut multipart: Multipart,
    file_field: &str,
) -> ShareResult<UploadForm> {
    let mut staged = None;
    let mut meta = MediaMetadata::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ShareError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == file_field {
            let original_name = field
                .file_name()
                .unwrap_or("upload.bin")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ShareError::Validation(format!("Failed to read file field: {}", e)))?;

            staged = Some(
                StagedFile::stage(&ctx.config.storage.temp_directory, &original_name, &data)
                    .await?,
            );
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ShareError::Validation(format!("Failed to read field {}: {}", name, e)))?;

        match name.as_str() {
            "title" => meta.title = value,
            "caption" => meta.caption = value,
            "location" => meta.location = value,
            "tags" => {
                meta.tags = value
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
            }
            "duration" => meta.duration = value.parse().unwrap_or(0),
            "resolution" => meta.resolution = value,
            "format" => meta.format = value,
            _ => {}
        }
    }

    let staged = staged.ok_or_else(|| ShareError::Validation("No file uploaded".to_string()))?;

    Ok(UploadForm { staged, meta })
}

/// Upload a photo (multipart field "photo")
async fn upload_photo(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    multipart: Multipart,
) -> ShareResult<impl IntoResponse> {
    let form = parse_upload(&ctx, multipart, "photo").await?;

    let (photo, tier) = ctx
        .uploader
        .submit(form.staged, MediaKind::Photo, form.meta, &auth.identity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Photo uploaded successfully",
            "photo": photo,
            "storageMethod": tier.as_str(),
        })),
    ))
}

/// Upload a video (multipart field "video")
async fn upload_video(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    multipart: Multipart,
) -> ShareResult<impl IntoResponse> {
    let form = parse_upload(&ctx, multipart, "video").await?;

    let (video, tier) = ctx
        .uploader
        .submit(form.staged, MediaKind::Video, form.meta, &auth.identity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Video uploaded successfully",
            "video": video,
            "storageMethod": tier.as_str(),
        })),
    ))
}

/// Raw listing query parameters
#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
    #[serde(rename = "sortBy")]
    sort_by: Option<String>,
}

/// Listing response
#[derive(Debug, Serialize)]
struct ListResponse {
    photos: Vec<MediaItem>,
    pagination: Pagination,
}

/// Paginated, optionally filtered listing (public)
async fn list_photos(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> ShareResult<Json<ListResponse>> {
    let query = ListQuery {
        kind: MediaKind::Photo,
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(10),
        search: params.search.unwrap_or_default(),
        sort_by: SortKey::parse(params.sort_by.as_deref().unwrap_or("latest")),
    };

    let (photos, pagination) = ctx.media_store.list(&query).await?;

    Ok(Json(ListResponse { photos, pagination }))
}

/// Toggle the authenticated user's like on a media item
async fn toggle_like(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    auth: AuthContext,
) -> ShareResult<Json<serde_json::Value>> {
    let (total, members) = ctx
        .media_store
        .toggle_like(&id, &auth.identity.user_id)
        .await?;

    Ok(Json(json!({
        "message": "Like updated",
        "totalLikes": total,
        "likedBy": members,
    })))
}

/// Comment request body
#[derive(Debug, Deserialize)]
struct CommentRequest {
    text: String,
}

/// Append a comment to a media item
async fn add_comment(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    auth: AuthContext,
    Json(req): Json<CommentRequest>,
) -> ShareResult<impl IntoResponse> {
    let comments = ctx
        .media_store
        .add_comment(&id, &auth.identity.user_id, &req.text)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment added",
            "comments": comments,
        })),
    ))
}
