//! Saved-set ("star") persistence, scoped per festival on one device.
//!
//! Storage mimics a browser key/value store: one entry per festival under
//! `<namespace>_<festival-id>`, holding a JSON array of slot keys. The stored
//! array is the only source of truth, so views are rebuilt from it after
//! every toggle.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::Slot;
use crate::{Error, Result};

/// `festival|day|stage|artist|time`. Two slots with identical artist and
/// time on the same stage and day share a key and collapse into one bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(festival_id: &str, day_key: &str, stage_name: &str, slot: &Slot) -> Self {
        Self(
            [festival_id, day_key, stage_name, &slot.artist, &slot.time].join("|"),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SlotKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-ordered set of saved slot keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SlotKey>", into = "Vec<SlotKey>")]
pub struct BookmarkSet {
    keys: Vec<SlotKey>,
}

impl From<Vec<SlotKey>> for BookmarkSet {
    fn from(keys: Vec<SlotKey>) -> Self {
        keys.into_iter().collect()
    }
}

impl From<BookmarkSet> for Vec<SlotKey> {
    fn from(set: BookmarkSet) -> Self {
        set.keys
    }
}

impl FromIterator<SlotKey> for BookmarkSet {
    fn from_iter<I: IntoIterator<Item = SlotKey>>(iter: I) -> Self {
        let mut set = BookmarkSet::default();
        for key in iter {
            if !set.contains(&key) {
                set.keys.push(key);
            }
        }
        set
    }
}

impl BookmarkSet {
    pub fn contains(&self, key: &SlotKey) -> bool {
        self.keys.contains(key)
    }

    /// Flip membership. Returns whether the key is saved afterwards.
    pub fn toggle(&mut self, key: SlotKey) -> bool {
        if let Some(pos) = self.keys.iter().position(|k| *k == key) {
            self.keys.remove(pos);
            false
        } else {
            self.keys.push(key);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotKey> {
        self.keys.iter()
    }

    /// Keys as plain strings, in insertion order.
    pub fn to_strings(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.0.clone()).collect()
    }
}

/// Device-local string key/value store.
pub trait BookmarkStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// Storage that lives for the process only.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl BookmarkStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Storage backed by a single JSON object file, re-read on every access.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

impl BookmarkStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(Error::Storage(e)) => {
                warn!("Replacing unreadable bookmark file: {}", e);
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// Per-festival bookmark sets on top of a storage backend.
pub struct Bookmarks<S> {
    storage: S,
    namespace: String,
}

impl<S: BookmarkStorage> Bookmarks<S> {
    pub fn new(storage: S, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn storage_key(&self, festival_id: &str) -> String {
        format!("{}_{}", self.namespace, festival_id)
    }

    /// Saved set for a festival. Missing or malformed entries read as empty.
    pub fn load(&self, festival_id: &str) -> BookmarkSet {
        let key = self.storage_key(festival_id);
        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BookmarkSet::default(),
            Err(e) => {
                warn!("Could not read bookmarks for {}: {}", festival_id, e);
                return BookmarkSet::default();
            }
        };
        match serde_json::from_str::<BookmarkSet>(&raw) {
            Ok(set) => set,
            Err(e) => {
                warn!("Ignoring malformed bookmarks for {}: {}", festival_id, e);
                BookmarkSet::default()
            }
        }
    }

    /// Overwrite the whole saved set for a festival.
    pub fn save(&mut self, festival_id: &str, set: &BookmarkSet) -> Result<()> {
        let key = self.storage_key(festival_id);
        let value = serde_json::to_string(set)?;
        self.storage.set(&key, value)
    }

    /// Flip one slot and persist. Returns whether the slot is now saved.
    pub fn toggle(&mut self, festival_id: &str, key: SlotKey) -> Result<bool> {
        let mut set = self.load(festival_id);
        let saved = set.toggle(key);
        self.save(festival_id, &set)?;
        info!(festival_id, saved, count = set.len(), "Toggled bookmark");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_key(artist: &str) -> SlotKey {
        SlotKey::new("fest", "day1", "Main", &Slot::new(artist, "20:00"))
    }

    #[test]
    fn test_slot_key_format() {
        assert_eq!(slot_key("DJ").as_str(), "fest|day1|Main|DJ|20:00");
    }

    #[test]
    fn test_duplicate_slots_collapse() {
        let a = SlotKey::new("f", "day1", "Main", &Slot::new("Twin", "9 PM"));
        let b = SlotKey::new("f", "day1", "Main", &Slot::new("Twin", "9 PM"));
        let set: BookmarkSet = vec![a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_toggle_twice_restores_set() {
        let mut bookmarks = Bookmarks::new(MemoryStorage::default(), "ns");
        bookmarks.toggle("fest", slot_key("Keep")).unwrap();
        let before = bookmarks.load("fest");

        assert!(bookmarks.toggle("fest", slot_key("Flip")).unwrap());
        assert!(!bookmarks.toggle("fest", slot_key("Flip")).unwrap());
        assert_eq!(bookmarks.load("fest"), before);
    }

    #[test]
    fn test_malformed_storage_reads_empty() {
        let mut storage = MemoryStorage::default();
        storage.set("ns_fest", "{not json".to_string()).unwrap();
        let bookmarks = Bookmarks::new(storage, "ns");
        assert!(bookmarks.load("fest").is_empty());
    }

    #[test]
    fn test_stored_as_json_array() {
        let mut bookmarks = Bookmarks::new(MemoryStorage::default(), "concerto_fest_saved");
        bookmarks.toggle("fest", slot_key("A")).unwrap();
        let raw = bookmarks.storage.get("concerto_fest_saved_fest").unwrap().unwrap();
        assert_eq!(raw, r#"["fest|day1|Main|A|20:00"]"#);
    }

    #[test]
    fn test_sets_are_scoped_per_festival() {
        let mut bookmarks = Bookmarks::new(MemoryStorage::default(), "ns");
        bookmarks.toggle("one", slot_key("A")).unwrap();
        assert!(bookmarks.load("two").is_empty());
        assert_eq!(bookmarks.load("one").len(), 1);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bookmarks.json");

        let mut bookmarks = Bookmarks::new(FileStorage::new(&path), "ns");
        bookmarks.toggle("fest", slot_key("A")).unwrap();
        bookmarks.toggle("fest", slot_key("B")).unwrap();

        let reopened = Bookmarks::new(FileStorage::new(&path), "ns");
        assert_eq!(
            reopened.load("fest").to_strings(),
            ["fest|day1|Main|A|20:00", "fest|day1|Main|B|20:00"]
        );
    }

    #[test]
    fn test_file_storage_recovers_from_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.json");
        fs::write(&path, "garbage").unwrap();

        let mut bookmarks = Bookmarks::new(FileStorage::new(&path), "ns");
        assert!(bookmarks.load("fest").is_empty());
        assert!(bookmarks.toggle("fest", slot_key("A")).unwrap());
        assert_eq!(bookmarks.load("fest").len(), 1);
    }
}
