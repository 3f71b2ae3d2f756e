//! Connection setup shared by the file commands

use std::sync::Arc;

use vault_core::{FileService, ListingCache, ProfileManager, Result, UserId};
use vault_s3::S3Store;

/// A file service bound to the identity of one profile
pub struct Session {
    pub service: FileService<S3Store>,
    pub user: UserId,
}

impl Session {
    /// Load `profile_name`, check its identity and connect to its bucket
    ///
    /// The identity is validated before any client is built, so a profile
    /// without `user_id` never reaches the network.
    pub async fn open(profile_name: &str) -> Result<Self> {
        let profiles = ProfileManager::new()?;
        let profile = profiles.get(profile_name)?;
        let config = profiles.config_manager().load()?;

        let user = UserId::from_claim(profile.user_id.as_deref())?;
        let store = S3Store::new(&profile).await?;
        tracing::debug!(profile = %profile.name, user = %user, "opened session");

        Ok(Self {
            service: FileService::new(Arc::new(store), config.service),
            user,
        })
    }

    /// List `folder` into a fresh listing cache
    pub async fn cache_folder(&self, folder: Option<&str>) -> Result<ListingCache> {
        let listing = self.service.list_user_files(&self.user, folder).await?;
        let mut cache = ListingCache::new();
        cache.refresh(listing.prefix, listing.listing);
        Ok(cache)
    }
}
