/// Storage tiers and upload orchestration
///
/// Media bytes land in the remote object store when it is reachable, and in
/// the local media directory otherwise. The orchestrator in [`upload`] owns
/// the fallback ordering and the temp-file lifecycle.
mod local;
mod s3;
mod upload;

pub use local::LocalMediaStore;
pub use s3::S3RemoteStore;
pub use upload::UploadOrchestrator;

use crate::error::{ShareError, ShareResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Remote object store seam
///
/// A single attempt per submission; any error triggers the local fallback.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload a local file under the given key and return its durable
    /// reference URL
    async fn upload(&self, local_path: &Path, key: &str, content_type: &str)
        -> ShareResult<String>;
}

/// A file staged on ephemeral storage, awaiting a storage tier
#[derive(Debug)]
pub struct StagedFile {
    pub path: PathBuf,
    /// Collision-resistant name: `{unix_millis}-{original_name}`
    pub file_name: String,
}

impl StagedFile {
    /// Write uploaded bytes into the temp directory under a
    /// collision-resistant name
    pub async fn stage(temp_dir: &Path, original_name: &str, data: &[u8]) -> ShareResult<Self> {
        fs::create_dir_all(temp_dir).await?;

        let file_name = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        let path = temp_dir.join(&file_name);

        fs::write(&path, data).await?;

        Ok(Self { path, file_name })
    }

    /// Remove the staged file from ephemeral storage
    ///
    /// Removal errors are logged but never escalated; they must not change
    /// the outcome of the upload.
    pub async fn cleanup(&self) {
        if let Err(e) = fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to delete temp file {:?}: {}", self.path, e);
            }
        }
    }
}

/// Strip path separators and other hostile characters from a client-supplied
/// file name
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Determine content type from file extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// Errors from either tier, carried into StorageUnavailable when both fail
pub(crate) fn storage_error(context: &str, e: impl std::fmt::Display) -> ShareError {
    ShareError::BlobStorage(format!("{}: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stage_writes_unique_name() {
        let dir = tempdir().unwrap();

        let staged = StagedFile::stage(dir.path(), "cat.png", b"bytes")
            .await
            .unwrap();
        assert!(staged.path.exists());
        assert!(staged.file_name.ends_with("-cat.png"));

        staged.cleanup().await;
        assert!(!staged.path.exists());
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let dir = tempdir().unwrap();
        let staged = StagedFile::stage(dir.path(), "a.jpg", b"x").await.unwrap();

        staged.cleanup().await;
        // Second cleanup of a missing file must not panic or log spuriously
        staged.cleanup().await;
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("my photo.png"), "my_photo.png");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("movie.mp4"), "video/mp4");
        assert_eq!(content_type_for("clip.mov"), "video/quicktime");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
