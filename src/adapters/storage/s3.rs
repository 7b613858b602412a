//! S3 Snapshot Store
//!
//! Writes snapshots with a single `PutObject`. S3 replaces objects
//! atomically, so readers see either the old snapshot or the new one.

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::domain::SnapshotKey;
use crate::ports::{SnapshotStore, StoreError, WriteReceipt};

const CONTENT_TYPE: &str = "application/json";

/// S3 error codes that mean the credentials cannot write to the bucket
const PERMISSION_ERROR_CODES: [&str; 5] = [
    "AccessDenied",
    "AllAccessDisabled",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "AccountProblem",
];

#[derive(Debug, Clone)]
pub struct S3SnapshotStore {
    client: Client,
    bucket: String,
}

impl S3SnapshotStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the default AWS credential and region chain
    pub async fn from_env(bucket: impl Into<String>, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn classify_error(code: Option<&str>, detail: String) -> StoreError {
    match code {
        Some(code) if PERMISSION_ERROR_CODES.contains(&code) => StoreError::PermissionDenied(detail),
        _ => StoreError::TransportError(detail),
    }
}

#[async_trait]
impl SnapshotStore for S3SnapshotStore {
    async fn write(&self, key: &SnapshotKey, bytes: Vec<u8>) -> Result<WriteReceipt, StoreError> {
        let len = bytes.len();

        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type(CONTENT_TYPE)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| {
                let code = match &err {
                    SdkError::ServiceError(service) => service.err().code().map(str::to_string),
                    _ => None,
                };
                classify_error(code.as_deref(), DisplayErrorContext(&err).to_string())
            })?;

        let mut receipt = WriteReceipt::new(key.clone(), len);
        receipt.etag = output.e_tag().map(str::to_string);
        receipt.version_id = output.version_id().map(str::to_string);
        Ok(receipt)
    }

    fn location(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}
