/// Local fallback storage tier
use crate::{
    error::ShareResult,
    media::MediaKind,
    storage::storage_error,
};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local media store
///
/// Copies staged files into the server-local media directory, from which
/// they are served under `/media`. Used only when the remote tier fails.
#[derive(Clone)]
pub struct LocalMediaStore {
    base_path: PathBuf,
}

impl LocalMediaStore {
    /// Create a new local media store
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Copy a staged file into permanent local storage
    ///
    /// Returns the server-relative reference URL for the stored file.
    pub async fn store(
        &self,
        src: &Path,
        kind: MediaKind,
        file_name: &str,
    ) -> ShareResult<String> {
        let dir = self.base_path.join(kind.folder());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("Failed to create local media directory", e))?;

        let dest = dir.join(file_name);
        fs::copy(src, &dest)
            .await
            .map_err(|e| storage_error("Failed to copy file to local storage", e))?;

        Ok(format!("/media/{}/{}", kind.folder(), file_name))
    }
}
