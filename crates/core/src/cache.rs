//! Listing cache
//!
//! Keeps the projection of one directory so a client can show an upload
//! before the store's listing reflects it. The cache is replaced wholesale
//! on every full refresh; between refreshes, uploaded files are merged by
//! key.

use crate::listing::{Classification, Listing, VirtualFile, VirtualFolder, classify};

/// Cached projection of a single prefix
#[derive(Debug, Clone, Default)]
pub struct ListingCache {
    prefix: String,
    listing: Option<Listing>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix of the cached listing
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Cached listing, if any
    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    /// Replace the cache with a freshly fetched listing
    pub fn refresh(&mut self, prefix: impl Into<String>, listing: Listing) {
        self.prefix = prefix.into();
        self.listing = Some(listing);
    }

    /// Merge an uploaded file into the cached listing
    ///
    /// Applies only to immediate children of the cached prefix. A file with
    /// the same key is replaced, otherwise the file is appended. Returns
    /// whether the cache changed.
    pub fn merge_uploaded(&mut self, file: VirtualFile) -> bool {
        let Some(listing) = self.listing.as_mut() else {
            return false;
        };
        let Some(relative) = file.key.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        if classify(relative) != Classification::File {
            return false;
        }

        listing.files.retain(|f| f.key != file.key);
        listing.files.push(file);
        true
    }

    /// Record a folder created under the cached prefix
    pub fn merge_folder(&mut self, key: &str) -> bool {
        let Some(listing) = self.listing.as_mut() else {
            return false;
        };
        let Some(relative) = key.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        let Classification::Folder(segment) = classify(relative) else {
            return false;
        };

        let folder = VirtualFolder {
            key: format!("{}{segment}", self.prefix),
        };
        if let Err(pos) = listing.folders.binary_search(&folder) {
            listing.folders.insert(pos, folder);
        }
        true
    }

    /// Remove a deleted file or folder from the cached listing
    pub fn forget(&mut self, key: &str) {
        if let Some(listing) = self.listing.as_mut() {
            listing.files.retain(|f| f.key != key);
            listing.folders.retain(|f| f.key != key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::project;
    use crate::traits::StoreEntry;
    use jiff::Timestamp;

    fn file(key: &str, size: i64) -> VirtualFile {
        VirtualFile::from_entry(StoreEntry::object(
            key,
            size,
            Timestamp::from_second(1_700_000_000).unwrap(),
        ))
    }

    fn cached(prefix: &str, entries: Vec<StoreEntry>) -> ListingCache {
        let mut cache = ListingCache::new();
        cache.refresh(prefix, project(entries, prefix));
        cache
    }

    #[test]
    fn test_merge_requires_a_listing() {
        let mut cache = ListingCache::new();
        assert!(!cache.merge_uploaded(file("a.txt", 1)));
        assert!(cache.listing().is_none());
    }

    #[test]
    fn test_merge_appends_new_file() {
        let mut cache = cached(
            "docs/",
            vec![StoreEntry::object("docs/a.txt", 1, Timestamp::UNIX_EPOCH)],
        );

        assert!(cache.merge_uploaded(file("docs/b.txt", 2)));
        let keys: Vec<_> = cache
            .listing()
            .unwrap()
            .files
            .iter()
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(keys, vec!["docs/a.txt", "docs/b.txt"]);
    }

    #[test]
    fn test_merge_replaces_by_key() {
        let mut cache = cached(
            "docs/",
            vec![StoreEntry::object("docs/a.txt", 1, Timestamp::UNIX_EPOCH)],
        );

        assert!(cache.merge_uploaded(file("docs/a.txt", 99)));
        let files = &cache.listing().unwrap().files;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, Some(99));
    }

    #[test]
    fn test_merge_ignores_other_levels() {
        let mut cache = cached("docs/", vec![]);
        assert!(!cache.merge_uploaded(file("other/a.txt", 1)));
        assert!(!cache.merge_uploaded(file("docs/sub/a.txt", 1)));
        assert!(cache.listing().unwrap().is_empty());
    }

    #[test]
    fn test_refresh_discards_merged_entries() {
        let mut cache = cached("docs/", vec![]);
        cache.merge_uploaded(file("docs/a.txt", 1));

        cache.refresh("docs/", project(vec![], "docs/"));
        assert!(cache.listing().unwrap().files.is_empty());
    }

    #[test]
    fn test_merge_folder_keeps_order_and_dedups() {
        let mut cache = cached("", vec![StoreEntry::marker("b/")]);
        assert!(cache.merge_folder("a/"));
        assert!(cache.merge_folder("b/"));
        let folders: Vec<_> = cache
            .listing()
            .unwrap()
            .folders
            .iter()
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(folders, vec!["a/", "b/"]);
    }

    #[test]
    fn test_forget() {
        let mut cache = cached(
            "",
            vec![
                StoreEntry::marker("a/"),
                StoreEntry::object("x.txt", 1, Timestamp::UNIX_EPOCH),
            ],
        );
        cache.forget("x.txt");
        cache.forget("a/");
        assert!(cache.listing().unwrap().is_empty());
    }
}
