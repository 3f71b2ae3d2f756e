//! Listing projection
//!
//! The store only knows flat keys. A directory view is derived from a flat
//! listing one level at a time: keys ending in the separator become
//! folders, immediate children become files, everything deeper is left for
//! the listing of the corresponding subfolder.

use std::collections::BTreeSet;

use jiff::Timestamp;
use serde::Serialize;

use crate::error::Result;
use crate::namespace::SEPARATOR;
use crate::traits::{ObjectStore, StoreEntry};

/// Presentation status of a listed file
///
/// Carries no backing state; every listed file is `Active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FileStatus {
    #[default]
    Active,
}

/// A folder derived from the keys below it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VirtualFolder {
    /// Folder key, always ending with the separator
    pub key: String,
}

/// An immediate child object of the listed prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualFile {
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    pub status: FileStatus,
}

impl VirtualFile {
    /// Build a file from a store entry, keeping its size and timestamp
    pub fn from_entry(entry: StoreEntry) -> Self {
        Self {
            size_human: entry
                .size
                .map(|s| humansize::format_size(s.max(0) as u64, humansize::BINARY)),
            key: entry.key,
            size: entry.size,
            last_modified: entry.last_modified,
            status: FileStatus::Active,
        }
    }
}

/// One directory level of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// Immediate subfolders, deduplicated and sorted by key
    pub folders: Vec<VirtualFolder>,

    /// Immediate files, in store order
    pub files: Vec<VirtualFile>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    /// Total size of the files at this level
    pub fn total_size(&self) -> i64 {
        self.files.iter().filter_map(|f| f.size).sum()
    }
}

/// How a single entry is treated at one directory level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'a> {
    /// The listed folder's own zero-byte marker
    Marker,
    /// An immediate subfolder; holds its segment including the separator
    Folder(&'a str),
    /// An immediate child file
    File,
    /// Nested two or more levels below the listed prefix, or under an
    /// empty segment
    Nested,
}

/// Classify a key relative to the listed prefix
pub fn classify(relative: &str) -> Classification<'_> {
    if relative.is_empty() {
        return Classification::Marker;
    }

    // An empty first segment names no folder ("docs//" under "docs/")
    if relative.starts_with(SEPARATOR) {
        return Classification::Nested;
    }

    if relative.ends_with(SEPARATOR) {
        // ends_with guarantees a separator is present
        let end = relative.find(SEPARATOR).unwrap_or(relative.len() - 1);
        return Classification::Folder(&relative[..=end]);
    }

    if relative.contains(SEPARATOR) {
        Classification::Nested
    } else {
        Classification::File
    }
}

/// Partition a flat listing under `prefix` into one directory level
///
/// Every entry's key must start with `prefix`.
pub fn project(entries: Vec<StoreEntry>, prefix: &str) -> Listing {
    let mut folders = BTreeSet::new();
    let mut files = Vec::new();

    for entry in entries {
        debug_assert!(
            entry.key.starts_with(prefix),
            "entry {} is outside prefix {prefix}",
            entry.key
        );
        let relative = entry.key.get(prefix.len()..).unwrap_or_default();

        match classify(relative) {
            Classification::Folder(segment) => {
                folders.insert(VirtualFolder {
                    key: format!("{prefix}{segment}"),
                });
            }
            Classification::File => files.push(VirtualFile::from_entry(entry)),
            Classification::Marker | Classification::Nested => {}
        }
    }

    Listing {
        folders: folders.into_iter().collect(),
        files,
    }
}

/// List every entry under `prefix`, following continuation tokens
pub async fn list_all<S>(store: &S, prefix: &str) -> Result<Vec<StoreEntry>>
where
    S: ObjectStore + ?Sized,
{
    let mut entries = Vec::new();
    let mut continuation_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.list_page(prefix, continuation_token.take()).await?;
        pages += 1;
        entries.extend(page.entries);

        match page.continuation_token {
            Some(token) => continuation_token = Some(token),
            None => break,
        }
    }

    tracing::debug!(prefix, pages, entries = entries.len(), "listed prefix");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_second(secs).unwrap()
    }

    fn keys(listing: &Listing) -> (Vec<&str>, Vec<&str>) {
        (
            listing.folders.iter().map(|f| f.key.as_str()).collect(),
            listing.files.iter().map(|f| f.key.as_str()).collect(),
        )
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(""), Classification::Marker);
        assert_eq!(classify("a.txt"), Classification::File);
        assert_eq!(classify("a/"), Classification::Folder("a/"));
        assert_eq!(classify("a/b/"), Classification::Folder("a/"));
        assert_eq!(classify("a/x.txt"), Classification::Nested);
        assert_eq!(classify("a/b/y.txt"), Classification::Nested);
        assert_eq!(classify("/"), Classification::Nested);
        assert_eq!(classify("/x/"), Classification::Nested);
        assert_eq!(classify("/x.txt"), Classification::Nested);
    }

    #[test]
    fn test_empty_segment_folders_are_dropped() {
        let entries = vec![
            StoreEntry::marker("users/u/docs//"),
            StoreEntry::marker("users/u/docs/x//"),
        ];

        let listing = project(entries, "users/u/docs/");
        let (folders, files) = keys(&listing);
        assert_eq!(folders, vec!["users/u/docs/x/"]);
        assert!(files.is_empty());
    }

    #[test]
    fn test_scenario_flat_root() {
        let entries = vec![
            StoreEntry::marker("a/"),
            StoreEntry::object("a/x.txt", 1, ts(1)),
            StoreEntry::object("a/b/y.txt", 2, ts(2)),
            StoreEntry::object("z.txt", 3, ts(3)),
        ];

        let listing = project(entries, "");
        let (folders, files) = keys(&listing);
        assert_eq!(folders, vec!["a/"]);
        assert_eq!(files, vec!["z.txt"]);
    }

    #[test]
    fn test_own_marker_is_excluded() {
        let entries = vec![
            StoreEntry::marker("users/u/docs/"),
            StoreEntry::object("users/u/docs/a.txt", 10, ts(5)),
        ];

        let listing = project(entries, "users/u/docs/");
        let (folders, files) = keys(&listing);
        assert!(folders.is_empty());
        assert_eq!(files, vec!["users/u/docs/a.txt"]);
    }

    #[test]
    fn test_file_keeps_size_and_timestamp() {
        let entries = vec![StoreEntry::object("users/u/a.txt", 2048, ts(1_700_000_000))];

        let listing = project(entries, "users/u/");
        let file = &listing.files[0];
        assert_eq!(file.size, Some(2048));
        assert_eq!(file.size_human.as_deref(), Some("2 KiB"));
        assert_eq!(file.last_modified, Some(ts(1_700_000_000)));
        assert_eq!(file.status, FileStatus::Active);
        assert_eq!(listing.total_size(), 2048);
    }

    #[test]
    fn test_folders_deduplicate() {
        let mut entries: Vec<StoreEntry> = (0..100)
            .map(|i| StoreEntry::marker(format!("p/shared/sub{i}/")))
            .collect();
        entries.push(StoreEntry::marker("p/shared/"));

        let listing = project(entries, "p/");
        let (folders, files) = keys(&listing);
        assert_eq!(folders, vec!["p/shared/"]);
        assert!(files.is_empty());
    }

    #[test]
    fn test_files_preserve_input_order() {
        let entries = vec![
            StoreEntry::object("p/c.txt", 1, ts(1)),
            StoreEntry::object("p/a.txt", 1, ts(1)),
            StoreEntry::object("p/b.txt", 1, ts(1)),
        ];

        let listing = project(entries, "p/");
        let (_, files) = keys(&listing);
        assert_eq!(files, vec!["p/c.txt", "p/a.txt", "p/b.txt"]);
    }

    #[test]
    fn test_every_entry_is_accounted_for_once() {
        let entries = vec![
            StoreEntry::marker("p/"),
            StoreEntry::marker("p/a/"),
            StoreEntry::marker("p/a/b/"),
            StoreEntry::object("p/a/b/c.txt", 1, ts(1)),
            StoreEntry::object("p/a/x.txt", 1, ts(1)),
            StoreEntry::object("p/y.txt", 1, ts(1)),
            StoreEntry::marker("p/z/"),
        ];

        let mut markers = 0;
        let mut folder_hits = 0;
        let mut file_hits = 0;
        let mut nested = 0;
        for entry in &entries {
            match classify(&entry.key["p/".len()..]) {
                Classification::Marker => markers += 1,
                Classification::Folder(_) => folder_hits += 1,
                Classification::File => file_hits += 1,
                Classification::Nested => nested += 1,
            }
        }
        assert_eq!(markers + folder_hits + file_hits + nested, entries.len());

        let listing = project(entries, "p/");
        let (folders, files) = keys(&listing);
        assert_eq!(folders, vec!["p/a/", "p/z/"]);
        assert_eq!(files, vec!["p/y.txt"]);
        assert_eq!(file_hits, files.len());
        assert!(folders.iter().all(|f| !files.contains(f)));
    }

    #[tokio::test]
    async fn test_list_all_follows_continuation() {
        let store = MemoryStore::with_page_size(2);
        for i in 0..5 {
            store.insert(StoreEntry::object(format!("users/u/f{i}.txt"), i, ts(i)));
        }
        store.insert(StoreEntry::object("users/v/other.txt", 1, ts(1)));

        let entries = list_all(&store, "users/u/").await.unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(store.list_calls(), 3);
    }
}
