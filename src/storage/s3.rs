/// S3-compatible remote storage tier
use crate::{
    config::{RemoteStoreConfig, RemoteUrlMode},
    error::{ShareError, ShareResult},
    storage::{storage_error, RemoteStore},
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::path::Path;
use std::time::Duration;

/// Remote store backed by S3 (or an S3-compatible endpoint such as MinIO)
pub struct S3RemoteStore {
    client: S3Client,
    bucket: String,
    url_mode: RemoteUrlMode,
}

impl S3RemoteStore {
    /// Create a new remote store from configuration
    pub async fn new(config: &RemoteStoreConfig) -> ShareResult<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = S3ConfigBuilder::from(&aws_config);

        // Custom endpoint for MinIO/LocalStack deployments
        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        let client = S3Client::from_conf(builder.build());

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            "Remote media store initialized"
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            url_mode: config.url_mode.clone(),
        })
    }

    /// Build the reference URL for an uploaded key
    ///
    /// Either a fresh presigned GetObject URL or the configured public base
    /// with a static access token appended.
    async fn reference_url(&self, key: &str) -> ShareResult<String> {
        match &self.url_mode {
            RemoteUrlMode::Presigned { ttl_secs } => {
                let presign = PresigningConfig::expires_in(Duration::from_secs(*ttl_secs))
                    .map_err(|e| {
                        ShareError::Internal(format!("Invalid presign configuration: {}", e))
                    })?;

                let request = self
                    .client
                    .get_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .presigned(presign)
                    .await
                    .map_err(|e| storage_error("Failed to presign URL", e))?;

                Ok(request.uri().to_string())
            }
            RemoteUrlMode::Static { public_base, token } => Ok(format!(
                "{}/{}?{}",
                public_base.trim_end_matches('/'),
                key,
                token
            )),
        }
    }
}

#[async_trait]
impl RemoteStore for S3RemoteStore {
    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> ShareResult<String> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| storage_error("Failed to read staged file", e))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| storage_error("Failed to upload to remote store", e))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "Uploaded to remote store");

        self.reference_url(key).await
    }
}
