/// Upload orchestration: remote tier with local fallback
use crate::{
    account::Identity,
    error::{ShareError, ShareResult},
    media::{MediaItem, MediaKind, MediaMetadata, MediaStore, StorageTier},
    storage::{content_type_for, LocalMediaStore, RemoteStore, StagedFile},
};
use std::sync::Arc;

/// Upload orchestrator
///
/// Takes a staged temporary file through the tiers: one remote attempt, one
/// local fallback, then a database record for whichever URL was produced.
/// The staged file is removed on every exit path.
pub struct UploadOrchestrator {
    remote: Arc<dyn RemoteStore>,
    local: LocalMediaStore,
    media: Arc<MediaStore>,
}

impl UploadOrchestrator {
    /// Create a new orchestrator
    pub fn new(remote: Arc<dyn RemoteStore>, local: LocalMediaStore, media: Arc<MediaStore>) -> Self {
        Self {
            remote,
            local,
            media,
        }
    }

    /// Submit a staged file for storage
    ///
    /// Returns the persisted media item and the tier that served the
    /// request; the tier is reported to the client so a fallback is visible.
    pub async fn submit(
        &self,
        staged: StagedFile,
        kind: MediaKind,
        meta: MediaMetadata,
        identity: &Identity,
    ) -> ShareResult<(MediaItem, StorageTier)> {
        let result = self.store_and_record(&staged, kind, &meta, identity).await;

        // Unconditional: the success path, the fallback path, and both
        // failure paths all leave the staging area clean
        staged.cleanup().await;

        result
    }

    async fn store_and_record(
        &self,
        staged: &StagedFile,
        kind: MediaKind,
        meta: &MediaMetadata,
        identity: &Identity,
    ) -> ShareResult<(MediaItem, StorageTier)> {
        let key = format!("{}/{}", kind.folder(), staged.file_name);
        let content_type = content_type_for(&staged.file_name);

        let (url, tier) = match self.remote.upload(&staged.path, &key, content_type).await {
            Ok(url) => (url, StorageTier::Remote),
            Err(remote_err) => {
                tracing::warn!(
                    "Remote upload failed, falling back to local storage: {}",
                    remote_err
                );

                match self
                    .local
                    .store(&staged.path, kind, &staged.file_name)
                    .await
                {
                    Ok(url) => (url, StorageTier::Local),
                    Err(local_err) => {
                        // Both tiers failed: abort, no database record
                        return Err(ShareError::StorageUnavailable(format!(
                            "remote: {}; local fallback: {}",
                            remote_err, local_err
                        )));
                    }
                }
            }
        };

        let item = self
            .media
            .insert(kind, &identity.user_id, &url, tier, meta)
            .await?;

        tracing::info!(
            media_id = %item.id,
            tier = %tier.as_str(),
            "Stored {} for user {}",
            kind.as_str(),
            identity.user_id
        );

        Ok((item, tier))
    }
}
