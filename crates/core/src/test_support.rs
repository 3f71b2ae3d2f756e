//! In-memory ObjectStore for unit tests

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;

use crate::error::{Error, FailedKey, Result};
use crate::traits::{BatchDeleteResult, ListPage, ObjectStore, StoreEntry};

/// Sorted key/value store with S3-like listing and delete semantics
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoreEntry>>,
    page_size: Option<usize>,
    protected: Mutex<BTreeSet<String>>,
    unavailable: Mutex<bool>,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn insert(&self, entry: StoreEntry) {
        self.objects
            .lock()
            .unwrap()
            .insert(entry.key.clone(), entry);
    }

    /// Make bulk deletes report an error for this key
    pub fn protect(&self, key: &str) {
        self.protected.lock().unwrap().insert(key.to_string());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<StoreEntry> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if *self.unavailable.lock().unwrap() {
            Err(Error::StoreUnavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let objects = self.objects.lock().unwrap();
        let limit = self.page_size.unwrap_or(1000);
        let mut entries: Vec<StoreEntry> = objects
            .range(continuation_token.unwrap_or_default()..)
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .take(limit + 1)
            .collect();

        // Token is the first key of the next page
        let continuation_token = if entries.len() > limit {
            entries.pop().map(|e| e.key)
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
        _content_type: Option<String>,
    ) -> Result<StoreEntry> {
        self.check_available()?;
        let entry = if key.ends_with('/') && data.is_empty() {
            StoreEntry::marker(key)
        } else {
            StoreEntry::object(key, data.len() as i64, Timestamp::now())
        };
        self.insert(entry.clone());
        Ok(entry)
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        content_disposition: Option<String>,
    ) -> Result<String> {
        self.check_available()?;
        let disposition = content_disposition.unwrap_or_default();
        Ok(format!(
            "memory://{key}?method=GET&expires={}&disposition={disposition}",
            expires_in.as_secs()
        ))
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String> {
        self.check_available()?;
        Ok(format!(
            "memory://{key}?method=PUT&expires={}&content-type={content_type}",
            expires_in.as_secs()
        ))
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        // S3 semantics: deleting a missing key succeeds
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn delete_objects(&self, keys: Vec<String>) -> Result<BatchDeleteResult> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let protected = self.protected.lock().unwrap();
        let mut objects = self.objects.lock().unwrap();
        let mut result = BatchDeleteResult::default();
        for key in keys {
            if protected.contains(&key) {
                result.errors.push(FailedKey {
                    key,
                    code: Some("AccessDenied".into()),
                    message: "Access Denied".into(),
                });
            } else {
                objects.remove(&key);
                result.deleted.push(key);
            }
        }
        Ok(result)
    }
}
