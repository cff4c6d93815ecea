/// Configuration management for the Shareit backend
use crate::error::{ShareError, ShareResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
    /// Maximum accepted multipart upload size in bytes
    pub upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    /// Staging area for multipart uploads before they reach a storage tier
    pub temp_directory: PathBuf,
    /// Local fallback tier, served under /media
    pub media_directory: PathBuf,
    pub remote: RemoteStoreConfig,
}

/// Remote object store (S3-compatible) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStoreConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    pub url_mode: RemoteUrlMode,
}

/// How reference URLs for remote-tier media are produced.
///
/// `Presigned` generates a fresh time-limited URL per upload; `Static`
/// appends a long-lived access token from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RemoteUrlMode {
    Presigned { ttl_secs: u64 },
    Static { public_base: String, token: String },
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Session token lifetime in seconds (default: 1 day)
    pub token_ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Default presigned URL lifetime: 30 days
const DEFAULT_PRESIGN_TTL: u64 = 30 * 24 * 3600;

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ShareResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("SHAREIT_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("SHAREIT_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ShareError::Validation("Invalid port number".to_string()))?;
        let version = env::var("SHAREIT_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let upload_limit = env::var("SHAREIT_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "52428800".to_string())
            .parse()
            .unwrap_or(52428800);

        let data_directory: PathBuf = env::var("SHAREIT_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("SHAREIT_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("shareit.sqlite"));
        let temp_directory = env::var("SHAREIT_TEMP_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("temp-uploads"));
        let media_directory = env::var("SHAREIT_MEDIA_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("media"));

        let bucket = env::var("SHAREIT_S3_BUCKET")
            .map_err(|_| ShareError::Validation("S3 bucket required".to_string()))?;
        let region = env::var("SHAREIT_S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let endpoint = env::var("SHAREIT_S3_ENDPOINT").ok();
        let force_path_style = env::var("SHAREIT_S3_FORCE_PATH_STYLE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let url_mode = if let Ok(token) = env::var("SHAREIT_S3_STATIC_TOKEN") {
            RemoteUrlMode::Static {
                public_base: env::var("SHAREIT_S3_PUBLIC_BASE").map_err(|_| {
                    ShareError::Validation(
                        "S3 public base URL required with static token".to_string(),
                    )
                })?,
                token,
            }
        } else {
            RemoteUrlMode::Presigned {
                ttl_secs: env::var("SHAREIT_S3_PRESIGN_TTL")
                    .unwrap_or_else(|_| DEFAULT_PRESIGN_TTL.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_PRESIGN_TTL),
            }
        };

        let jwt_secret = env::var("SHAREIT_JWT_SECRET")
            .map_err(|_| ShareError::Validation("JWT secret required".to_string()))?;
        let token_ttl_secs = env::var("SHAREIT_TOKEN_TTL")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
                upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                database,
                temp_directory,
                media_directory,
                remote: RemoteStoreConfig {
                    bucket,
                    region,
                    endpoint,
                    force_path_style,
                    url_mode,
                },
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_secs,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ShareResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ShareError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(ShareError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.storage.remote.bucket.is_empty() {
            return Err(ShareError::Validation("S3 bucket cannot be empty".to_string()));
        }

        if let RemoteUrlMode::Presigned { ttl_secs } = self.storage.remote.url_mode {
            if ttl_secs == 0 {
                return Err(ShareError::Validation(
                    "Presigned URL TTL must be positive".to_string(),
                ));
            }
        }

        Ok(())
    }
}
