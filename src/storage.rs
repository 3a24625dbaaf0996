use crate::config::StorageConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file under the given object key.
    async fn upload(&self, local_path: &Path, key: &str) -> Result<()>;
}

pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::from_keys(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
        );
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<()> {
        let body = ByteStream::from_path(local_path)
            .await
            .with_context(|| format!("Failed to read {} for upload", local_path.display()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("audio/mpeg")
            .body(body)
            .send()
            .await
            .with_context(|| format!("S3 upload failed for key {}", key))?;

        Ok(())
    }
}

/// Objects are publicly reachable via plain concatenation; no signing.
pub fn cdn_url(cdn_base: &str, key: &str) -> String {
    format!("{}{}", cdn_base, key)
}
