//! ObjectStore trait definition
//!
//! This trait defines the key-level operations the file service needs from
//! an S3-compatible store. It keeps the core logic decoupled from the SDK
//! and lets tests substitute an in-memory store or a mock.

use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{FailedKey, Result};

/// One entry of a flat store listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    /// Absolute object key
    pub key: String,

    /// Size in bytes (absent for folder markers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,

    /// Last modified timestamp (absent for folder markers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl StoreEntry {
    /// Entry for a regular object
    pub fn object(key: impl Into<String>, size: i64, last_modified: Timestamp) -> Self {
        Self {
            key: key.into(),
            size: Some(size),
            last_modified: Some(last_modified),
            etag: None,
        }
    }

    /// Entry for a zero-byte folder marker
    pub fn marker(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
            last_modified: None,
            etag: None,
        }
    }
}

/// One page of a list operation
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Entries in this page
    pub entries: Vec<StoreEntry>,

    /// Continuation token; `None` when this is the last page
    pub continuation_token: Option<String>,
}

/// Per-key outcome of a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteResult {
    /// Keys the store reported as deleted
    pub deleted: Vec<String>,

    /// Keys the store refused to delete
    pub errors: Vec<FailedKey>,
}

/// Trait for S3-compatible storage operations
///
/// All keys are absolute; namespace resolution happens before a call
/// reaches the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of entries whose key starts with `prefix`
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage>;

    /// Store an object, overwriting any object with the same key
    ///
    /// The returned entry carries what the write response reports. Stores
    /// that do not return a modification time leave `last_modified` unset.
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<StoreEntry>;

    /// Presigned URL for downloading an object
    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        content_disposition: Option<String>,
    ) -> Result<String>;

    /// Presigned URL for uploading an object with the given content type
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String>;

    /// Delete a single object
    async fn delete_object(&self, key: &str) -> Result<()>;

    /// Delete a set of objects in one call, reporting per-key failures
    async fn delete_objects(&self, keys: Vec<String>) -> Result<BatchDeleteResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_entry_object() {
        let ts = Timestamp::from_second(1_700_000_000).unwrap();
        let entry = StoreEntry::object("users/u/a.txt", 12, ts);
        assert_eq!(entry.size, Some(12));
        assert_eq!(entry.last_modified, Some(ts));
    }

    #[test]
    fn test_store_entry_marker() {
        let entry = StoreEntry::marker("users/u/docs/");
        assert!(entry.size.is_none());
        assert!(entry.last_modified.is_none());
    }

    #[test]
    fn test_store_entry_serialization_skips_absent_fields() {
        let json = serde_json::to_string(&StoreEntry::marker("users/u/docs/")).unwrap();
        assert_eq!(json, r#"{"key":"users/u/docs/"}"#);
    }
}
