//! vault-core: Core library for the vault file store
//!
//! This crate provides the logic behind a user-scoped file store on top of
//! an S3-compatible bucket:
//! - Namespace resolution and path validation
//! - Projection of flat key listings into one directory level
//! - Folder deletion over a listed prefix
//! - The `FileService` operations exposed to a transport
//! - Configuration and store profiles
//!
//! This crate is designed to be independent of any specific S3 SDK; the
//! store is reached through the `ObjectStore` trait.

pub mod cache;
pub mod config;
pub mod delete;
pub mod error;
pub mod listing;
pub mod namespace;
pub mod profile;
pub mod service;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use cache::ListingCache;
pub use config::{Config, ConfigManager, ServiceConfig};
pub use delete::{FolderDeleteReport, FolderDeleter, MAX_DELETE_BATCH};
pub use error::{Error, FailedKey, Result};
pub use listing::{FileStatus, Listing, VirtualFile, VirtualFolder, list_all, project};
pub use namespace::{Namespace, ObjectKey, UserId, resolve_key, resolve_prefix};
pub use profile::{DEFAULT_PROFILE, Profile, ProfileManager};
pub use service::{FileService, PresignedUrl, UserListing};
pub use traits::{BatchDeleteResult, ListPage, ObjectStore, StoreEntry};
