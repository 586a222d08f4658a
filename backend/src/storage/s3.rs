//! AWS S3 and S3-compatible storage implementation.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;

use super::ObjectStore;
use crate::error::{StorageError, StorageResult};

/// Service error codes that mean the bucket or object is absent.
const NOT_FOUND_CODES: [&str; 4] = ["NoSuchKey", "NoSuchBucket", "NotFound", "404"];

/// S3-backed [`ObjectStore`]. The client is supplied by the caller.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS environment (credentials chain,
    /// region). `endpoint` targets an S3-compatible service instead of AWS.
    pub async fn from_env(endpoint: Option<&str>) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint_url) = endpoint {
            builder = builder.endpoint_url(endpoint_url).force_path_style(true);
        }

        Self::new(Client::from_conf(builder.build()))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map a service error code to a [`StorageError`].
fn classify(code: Option<&str>, message: String, bucket: &str, key: &str) -> StorageError {
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code) => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => StorageError::Transport(message),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> StorageResult<()> {
        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(response) => response,
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    return Err(StorageError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                return Err(classify(
                    service_error.code(),
                    service_error.to_string(),
                    bucket,
                    key,
                ));
            }
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?
            .into_bytes();

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &data).await?;

        Ok(())
    }

    async fn upload(&self, src: &Path, bucket: &str, key: &str) -> StorageResult<()> {
        let body = ByteStream::from_path(src)
            .await
            .map_err(|e| StorageError::Transport(format!("failed to read {}: {}", src.display(), e)))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                classify(service_error.code(), service_error.to_string(), bucket, key)
            })?;

        Ok(())
    }
}
