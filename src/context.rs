/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ServerConfig,
    db,
    error::ShareResult,
    media::MediaStore,
    storage::{LocalMediaStore, RemoteStore, S3RemoteStore, UploadOrchestrator},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
///
/// Constructed once at startup and passed by handle into every handler; no
/// global singletons.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub media_store: Arc<MediaStore>,
    pub uploader: Arc<UploadOrchestrator>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ShareResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let remote: Arc<dyn RemoteStore> =
            Arc::new(S3RemoteStore::new(&config.storage.remote).await?);

        Self::assemble(config, pool, remote)
    }

    /// Wire up services around an already-opened pool and remote store
    pub fn assemble(
        config: ServerConfig,
        pool: SqlitePool,
        remote: Arc<dyn RemoteStore>,
    ) -> ShareResult<Self> {
        let config = Arc::new(config);

        let account_manager = Arc::new(AccountManager::new(pool.clone(), Arc::clone(&config)));
        let media_store = Arc::new(MediaStore::new(pool.clone()));

        let local = LocalMediaStore::new(config.storage.media_directory.clone());
        let uploader = Arc::new(UploadOrchestrator::new(
            remote,
            local,
            Arc::clone(&media_store),
        ));

        Ok(Self {
            config,
            db: pool,
            account_manager,
            media_store,
            uploader,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ShareResult<()> {
        let dirs = [
            &config.storage.data_directory,
            &config.storage.temp_directory,
            &config.storage.media_directory,
        ];

        for dir in dirs {
            if !dir.exists() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
