//! File service
//!
//! The operations a transport exposes to an authenticated user. Every
//! operation takes the caller's [`UserId`], resolves the caller-supplied
//! path inside that user's namespace and only then talks to the store.
//! Keys in responses are relative to the namespace.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ServiceConfig;
use crate::delete::{FolderDeleteReport, FolderDeleter};
use crate::error::{Error, FailedKey, Result};
use crate::listing::{Listing, VirtualFile, VirtualFolder, list_all, project};
use crate::namespace::{Namespace, SEPARATOR, UserId, validate_segment};
use crate::traits::ObjectStore;

/// One directory level of a user's files
#[derive(Debug, Clone, Serialize)]
pub struct UserListing {
    /// Listed prefix, relative to the namespace ("" for the root)
    pub prefix: String,

    #[serde(flatten)]
    pub listing: Listing,
}

/// A time-limited URL for a direct transfer
#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrl {
    /// Key relative to the namespace
    pub key: String,

    /// HTTP method the URL is signed for
    pub method: &'static str,

    pub url: String,

    pub expires_in_secs: u64,
}

/// User-scoped file operations over an object store
pub struct FileService<S: ?Sized> {
    store: Arc<S>,
    config: ServiceConfig,
}

impl<S> FileService<S>
where
    S: ObjectStore + ?Sized,
{
    pub fn new(store: Arc<S>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// List one directory level under `prefix`
    pub async fn list_user_files(
        &self,
        user: &UserId,
        prefix: Option<&str>,
    ) -> Result<UserListing> {
        let ns = Namespace::new(user);
        let absolute = ns.resolve_prefix(prefix)?;
        tracing::debug!(user = %user, prefix = %absolute, "listing files");

        let entries = list_all(self.store.as_ref(), absolute.as_str()).await?;
        let listing = project(entries, absolute.as_str());

        Ok(UserListing {
            prefix: relative_to(&ns, absolute.as_str()),
            listing: Listing {
                folders: listing
                    .folders
                    .into_iter()
                    .map(|f| VirtualFolder {
                        key: relative_to(&ns, &f.key),
                    })
                    .collect(),
                files: listing
                    .files
                    .into_iter()
                    .map(|f| VirtualFile {
                        key: relative_to(&ns, &f.key),
                        ..f
                    })
                    .collect(),
            },
        })
    }

    /// Presigned URL for uploading `key` with the given content type
    pub async fn request_upload_url(
        &self,
        user: &UserId,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<PresignedUrl> {
        let absolute = Namespace::new(user).resolve_key(key)?;
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(&self.config.default_content_type);
        let expires_in = self.config.upload_url_expiry();

        let url = self
            .store
            .presign_put(absolute.as_str(), content_type, expires_in)
            .await?;
        tracing::debug!(user = %user, key = %absolute, content_type, "issued upload url");

        Ok(PresignedUrl {
            key: key.to_string(),
            method: "PUT",
            url,
            expires_in_secs: expires_in.as_secs(),
        })
    }

    /// Presigned URL for downloading `key` as an attachment
    pub async fn request_download_url(&self, user: &UserId, key: &str) -> Result<PresignedUrl> {
        let absolute = Namespace::new(user).resolve_key(key)?;
        let expires_in = self.config.download_url_expiry();

        let url = self
            .store
            .presign_get(absolute.as_str(), expires_in, Some("attachment".to_string()))
            .await?;
        tracing::debug!(user = %user, key = %absolute, "issued download url");

        Ok(PresignedUrl {
            key: key.to_string(),
            method: "GET",
            url,
            expires_in_secs: expires_in.as_secs(),
        })
    }

    /// Create the zero-byte marker for folder `name` under `base_prefix`
    ///
    /// Returns the folder key relative to the namespace.
    pub async fn create_folder(
        &self,
        user: &UserId,
        base_prefix: Option<&str>,
        name: &str,
    ) -> Result<String> {
        let name = name.strip_suffix(SEPARATOR).unwrap_or(name);
        validate_segment(name)?;

        let ns = Namespace::new(user);
        let base = ns.resolve_prefix(base_prefix)?;
        let relative = format!("{}{name}{SEPARATOR}", relative_to(&ns, base.as_str()));
        let key = ns.resolve_prefix(Some(&relative))?;

        self.store.put_object(key.as_str(), Vec::new(), None).await?;
        tracing::info!(user = %user, key = %key, "created folder");

        Ok(relative)
    }

    /// Upload an object directly through the service
    pub async fn upload_object(
        &self,
        user: &UserId,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<VirtualFile> {
        let ns = Namespace::new(user);
        let absolute = ns.resolve_key(key)?;
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(&self.config.default_content_type)
            .to_string();
        let size = data.len();

        let entry = self
            .store
            .put_object(absolute.as_str(), data, Some(content_type))
            .await?;
        tracing::info!(user = %user, key = %absolute, size, "uploaded object");

        let mut file = VirtualFile::from_entry(entry);
        file.key = relative_to(&ns, &file.key);
        Ok(file)
    }

    /// Delete a single object
    pub async fn delete_file(&self, user: &UserId, key: &str) -> Result<()> {
        let absolute = Namespace::new(user).resolve_key(key)?;
        self.store.delete_object(absolute.as_str()).await?;
        tracing::info!(user = %user, key = %absolute, "deleted object");
        Ok(())
    }

    /// Delete a folder and everything below it
    ///
    /// The namespace root itself cannot be deleted this way.
    pub async fn delete_folder(&self, user: &UserId, prefix: &str) -> Result<FolderDeleteReport> {
        if prefix.is_empty() {
            return Err(Error::InvalidPath(
                "A folder is required; the home folder cannot be deleted".into(),
            ));
        }

        let ns = Namespace::new(user);
        let absolute = ns.resolve_prefix(Some(prefix))?;

        let report = FolderDeleter::new(self.store.as_ref())
            .batch_size(self.config.delete_batch_size)
            .delete_folder(absolute.as_str())
            .await
            .map_err(|err| match err {
                Error::PartialDeleteFailure { deleted, failed } => Error::PartialDeleteFailure {
                    deleted,
                    failed: failed
                        .into_iter()
                        .map(|f| FailedKey {
                            key: relative_to(&ns, &f.key),
                            ..f
                        })
                        .collect(),
                },
                other => other,
            })?;

        Ok(FolderDeleteReport {
            prefix: relative_to(&ns, &report.prefix),
            deleted: report
                .deleted
                .iter()
                .map(|k| relative_to(&ns, k))
                .collect(),
            ..report
        })
    }
}

fn relative_to(ns: &Namespace, key: &str) -> String {
    ns.relative(key).unwrap_or(key).to_string()
}
