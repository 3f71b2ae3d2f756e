//! S3 store implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from vault-core
//! against a single bucket.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};

use vault_core::{
    BatchDeleteResult, Error, FailedKey, ListPage, ObjectStore, Profile, Result, StoreEntry,
};

/// Keys requested per list call
const LIST_PAGE_SIZE: i32 = 1000;

/// S3 client bound to one bucket
pub struct S3Store {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Create a new S3 store from a profile
    pub async fn new(profile: &Profile) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            profile.access_key.clone(),
            profile.secret_key.clone(),
            None, // session token
            None, // expiry
            "vault-static-credentials",
        );

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(profile.region.clone()))
            .endpoint_url(&profile.endpoint)
            .load()
            .await;

        // Path-style addressing for S3-compatible backends
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(profile.path_style())
            .build();

        tracing::debug!(
            endpoint = %profile.endpoint,
            bucket = %profile.bucket,
            "created S3 client"
        );

        Ok(Self::from_client(
            aws_sdk_s3::Client::from_conf(s3_config),
            profile.bucket.clone(),
        ))
    }

    /// Wrap an existing SDK client
    pub fn from_client(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            inner: client,
            bucket: bucket.into(),
        }
    }
}

/// Entry for an object just written
///
/// PutObject does not report a modification time, so `last_modified` stays
/// unset until the next listing supplies it.
fn uploaded_entry(key: &str, size: i64, etag: Option<String>) -> StoreEntry {
    let mut entry = StoreEntry::marker(key);
    if !(key.ends_with('/') && size == 0) {
        entry.size = Some(size);
    }
    entry.etag = etag;
    entry
}

/// Map an SDK error onto the core error taxonomy
fn map_sdk_error<E, R>(err: SdkError<E, R>, key: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some("NoSuchKey") | Some("NotFound") => Error::NotFound(key.to_string()),
        Some("NoSuchBucket") => Error::NotFound(format!("bucket for {key}")),
        Some("AccessDenied") | Some("InvalidAccessKeyId") | Some("SignatureDoesNotMatch") => {
            Error::Unauthorized(format!("store denied access to {key}"))
        }
        _ => Error::StoreUnavailable(format!("{key}: {}", display_sdk_error(&err))),
    }
}

fn display_sdk_error<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match err.message() {
        Some(msg) => msg.to_string(),
        None => err.to_string(),
    }
}

fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::from_second(dt.secs()).ok()
}

fn presigning_config(expires_in: Duration) -> Result<PresigningConfig> {
    PresigningConfig::expires_in(expires_in)
        .map_err(|e| Error::General(format!("invalid presign expiry: {e}")))
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(LIST_PAGE_SIZE)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, prefix))?;

        let entries = response
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?.to_string();
                let is_marker = key.ends_with('/') && object.size().unwrap_or(0) == 0;
                Some(StoreEntry {
                    size: if is_marker { None } else { object.size() },
                    last_modified: if is_marker {
                        None
                    } else {
                        object.last_modified().and_then(to_timestamp)
                    },
                    etag: object.e_tag().map(|t| t.trim_matches('"').to_string()),
                    key,
                })
            })
            .collect();

        let continuation_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(|s| s.to_string())
        } else {
            None
        };

        Ok(ListPage {
            entries,
            continuation_token,
        })
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<StoreEntry> {
        let size = data.len() as i64;

        let response = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .set_content_type(content_type)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        let etag = response.e_tag().map(|t| t.trim_matches('"').to_string());
        Ok(uploaded_entry(key, size, etag))
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        content_disposition: Option<String>,
    ) -> Result<String> {
        let presigned = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .set_response_content_disposition(content_disposition)
            .presigned(presigning_config(expires_in)?)
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        Ok(presigned.uri().to_string())
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String> {
        let presigned = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning_config(expires_in)?)
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        Ok(presigned.uri().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        Ok(())
    }

    async fn delete_objects(&self, keys: Vec<String>) -> Result<BatchDeleteResult> {
        if keys.is_empty() {
            return Ok(BatchDeleteResult::default());
        }

        let objects = keys
            .iter()
            .map(|k| {
                ObjectIdentifier::builder()
                    .key(k)
                    .build()
                    .map_err(|e| Error::General(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(false)
            .build()
            .map_err(|e| Error::General(e.to_string()))?;

        let first = keys.first().map(String::as_str).unwrap_or_default();
        let response = self
            .inner
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, first))?;

        let deleted = response
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(|k| k.to_string()))
            .collect();

        let errors: Vec<FailedKey> = response
            .errors()
            .iter()
            .map(|e| FailedKey {
                key: e.key().unwrap_or_default().to_string(),
                code: e.code().map(|c| c.to_string()),
                message: e.message().unwrap_or("delete failed").to_string(),
            })
            .collect();

        if !errors.is_empty() {
            tracing::warn!(
                bucket = %self.bucket,
                failed = errors.len(),
                "bulk delete reported per-key errors"
            );
        }

        Ok(BatchDeleteResult { deleted, errors })
    }
}
