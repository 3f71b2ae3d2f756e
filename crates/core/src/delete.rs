//! Folder deletion
//!
//! A folder is only a naming convention over flat keys, so deleting one
//! means listing every key under its prefix and bulk-deleting them. An
//! empty folder exists only as its zero-byte marker, which is deleted
//! directly.
//!
//! Deletion is not transactional. A failure part-way leaves some keys in
//! place; running the same deletion again converges to the empty state.
//! Objects written under the prefix after the listing step may survive.

use serde::Serialize;

use crate::error::{Error, FailedKey, Result};
use crate::listing::list_all;
use crate::traits::ObjectStore;

/// Maximum number of keys per bulk delete request (S3 limit)
pub const MAX_DELETE_BATCH: usize = 1000;

/// Outcome of a successful folder deletion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderDeleteReport {
    /// Absolute prefix that was deleted
    pub prefix: String,

    /// Keys removed by bulk deletes
    pub deleted: Vec<String>,

    /// Number of bulk delete requests issued
    pub batches: usize,

    /// Nothing was listed and only the marker key was deleted
    pub marker_only: bool,
}

/// Deletes every object under a folder prefix
pub struct FolderDeleter<'a, S: ?Sized> {
    store: &'a S,
    batch_size: usize,
}

impl<'a, S> FolderDeleter<'a, S>
where
    S: ObjectStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            batch_size: MAX_DELETE_BATCH,
        }
    }

    /// Set the bulk delete batch size, clamped to `1..=MAX_DELETE_BATCH`
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.clamp(1, MAX_DELETE_BATCH);
        self
    }

    /// Delete every object whose key starts with `prefix`
    ///
    /// Returns `PartialDeleteFailure` when the store reports per-key errors
    /// for any batch. All batches are attempted before that error is
    /// returned, so it lists every surviving key.
    pub async fn delete_folder(&self, prefix: &str) -> Result<FolderDeleteReport> {
        if prefix.is_empty() {
            return Err(Error::InvalidPath("Refusing to delete an empty prefix".into()));
        }

        let entries = list_all(self.store, prefix)
            .await
            .map_err(|e| e.during("list"))?;

        if entries.is_empty() {
            return self.delete_marker(prefix).await;
        }

        let keys: Vec<String> = entries.into_iter().map(|e| e.key).collect();
        let mut deleted = Vec::with_capacity(keys.len());
        let mut failed: Vec<FailedKey> = Vec::new();
        let mut batches = 0;

        for chunk in keys.chunks(self.batch_size) {
            batches += 1;
            let result = self
                .store
                .delete_objects(chunk.to_vec())
                .await
                .map_err(|e| e.during(&format!("delete batch {batches}")))?;

            if !result.errors.is_empty() {
                tracing::warn!(
                    prefix,
                    batch = batches,
                    failed = result.errors.len(),
                    "bulk delete reported per-key errors"
                );
            }
            deleted.extend(result.deleted);
            failed.extend(result.errors);
        }

        if !failed.is_empty() {
            return Err(Error::PartialDeleteFailure {
                deleted: deleted.len(),
                failed,
            });
        }

        tracing::info!(prefix, deleted = deleted.len(), batches, "deleted folder");
        Ok(FolderDeleteReport {
            prefix: prefix.to_string(),
            deleted,
            batches,
            marker_only: false,
        })
    }

    async fn delete_marker(&self, prefix: &str) -> Result<FolderDeleteReport> {
        match self.store.delete_object(prefix).await {
            Ok(()) | Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e.during("delete marker")),
        }

        tracing::info!(prefix, "deleted empty folder marker");
        Ok(FolderDeleteReport {
            prefix: prefix.to_string(),
            deleted: Vec::new(),
            batches: 0,
            marker_only: true,
        })
    }
}
