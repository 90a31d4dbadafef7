//! S3 / MinIO backed [`ObjectStore`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info, instrument};

use crate::config::S3Config;
use crate::error::StoreError;
use crate::store::ObjectStore;

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from `config`. No request is made until first use.
    pub async fn connect(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "reelsmith-env",
            ));
        }

        let shared = loader.load().await;
        let mut builder = S3ConfigBuilder::from(&shared);
        if let Some(endpoint_url) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("aws"),
            "S3 store initialized"
        );

        Self::from_client(Client::from_conf(builder.build()), config.bucket.clone())
    }

    pub fn from_client(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Create the bucket unless it already exists.
    ///
    /// Only a not-found answer leads to creation; any other failure of the
    /// existence check is returned as is.
    pub async fn ensure_bucket(&self) -> Result<(), StoreError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => return Ok(()),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {}
            Err(e) => return Err(self.backend_error("head_bucket", &e)),
        }

        info!(bucket = %self.bucket, "Creating missing bucket");
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| self.backend_error("create_bucket", &e))?;
        Ok(())
    }

    fn backend_error(&self, operation: &str, error: &dyn std::error::Error) -> StoreError {
        StoreError::Backend {
            key: self.bucket.clone(),
            message: format!("{operation}: {}", DisplayErrorContext(error)),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, size_bytes = data.len()))]
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Backend {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        debug!("Object stored");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StoreError::NotFound {
                        key: key.to_string(),
                    }
                } else {
                    StoreError::Backend {
                        key: key.to_string(),
                        message: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        let body = output.body.collect().await.map_err(|e| StoreError::Backend {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let data = body.into_bytes().to_vec();
        debug!(size_bytes = data.len(), "Object fetched");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use aws_sdk_s3::config::retry::RetryConfig;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    use super::*;

    /// A store whose endpoint refuses every connection.
    fn unreachable_store() -> S3Store {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url("http://127.0.0.1:9")
            .credentials_provider(Credentials::new("key", "secret", None, None, "test"))
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();
        S3Store::from_client(Client::from_conf(config), "reelsmith".into())
    }

    #[tokio::test]
    async fn failed_existence_check_is_not_treated_as_missing_bucket() {
        let store = unreachable_store();
        assert_matches!(
            store.ensure_bucket().await,
            Err(StoreError::Backend { ref key, ref message })
                if key == "reelsmith" && message.starts_with("head_bucket:")
        );
    }

    #[tokio::test]
    async fn transport_failure_on_get_is_a_backend_error() {
        let store = unreachable_store();
        assert_matches!(
            store.get("Pr0/Pr0.json").await,
            Err(StoreError::Backend { ref key, .. }) if key == "Pr0/Pr0.json"
        );
    }
}
