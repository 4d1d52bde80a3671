//! Key-value backends for the result store.
//!
//! A backend maps string keys to string values, the same model as browser
//! local storage. `write_batch` must apply every entry or none of them.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use super::StoreError;

/// One entry of a batch write. `None` removes the key.
pub type BatchEntry<'a> = (&'a str, Option<String>);

pub trait KeyValueBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Applies all entries atomically: a reader sees either the old or the
    /// new values for every key, never a mix.
    fn write_batch(&mut self, entries: Vec<BatchEntry<'_>>) -> Result<(), StoreError>;
}

/// Bytes a map would occupy, counted as key + value lengths.
fn usage(map: &BTreeMap<String, String>) -> usize {
    map.iter().map(|(k, v)| k.len() + v.len()).sum()
}

fn apply(map: &mut BTreeMap<String, String>, entries: Vec<BatchEntry<'_>>) {
    for (key, value) in entries {
        match value {
            Some(value) => {
                map.insert(key.to_string(), value);
            }
            None => {
                map.remove(key);
            }
        }
    }
}

fn check_quota(quota: Option<usize>, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
    if let Some(limit) = quota {
        let needed = usage(map);
        if needed > limit {
            return Err(StoreError::QuotaExceeded { limit, needed });
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryBackend
// ────────────────────────────────────────────────────────────────────────────

/// In-process backend. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(quota),
        }
    }
}

#[cfg(test)]
impl MemoryBackend {
    /// Writes a single raw value, bypassing the store's encoding.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write_batch(&mut self, entries: Vec<BatchEntry<'_>>) -> Result<(), StoreError> {
        let mut next = self.entries.clone();
        apply(&mut next, entries);
        check_quota(self.quota, &next)?;
        self.entries = next;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FileBackend
// ────────────────────────────────────────────────────────────────────────────

/// Stores every key in a single JSON object on disk.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so a crash mid-write leaves the previous document in place.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    quota: Option<usize>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>, quota: Option<usize>) -> Self {
        Self {
            path: path.into(),
            quota,
        }
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        // A document that is not a string map cannot hold a valid record.
        // Surface it as empty; the next write replaces it.
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                debug!("Ignoring unreadable store document {}: {e}", self.path.display());
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_document(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let body = serde_json::to_vec_pretty(map)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_document()?.remove(key))
    }

    fn write_batch(&mut self, entries: Vec<BatchEntry<'_>>) -> Result<(), StoreError> {
        let mut map = self.read_document()?;
        apply(&mut map, entries);
        check_quota(self.quota, &map)?;

        if map.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::Io(e)),
            };
        }

        self.write_document(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_batch_sets_and_removes() {
        let mut backend = MemoryBackend::default();
        backend
            .write_batch(vec![("a", Some("1".into())), ("b", Some("2".into()))])
            .unwrap();
        backend.write_batch(vec![("a", None)]).unwrap();

        assert_eq!(backend.get("a").unwrap(), None);
        assert_eq!(backend.get("b").unwrap(), Some("2".to_string()));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_memory_quota_rejects_whole_batch() {
        let mut backend = MemoryBackend::with_quota(8);
        backend.write_batch(vec![("k", Some("v".into()))]).unwrap();

        let err = backend
            .write_batch(vec![("a", Some("1".into())), ("big", Some("x".repeat(20)))])
            .unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { limit: 8, .. }));

        // Nothing from the rejected batch is visible.
        assert_eq!(backend.get("a").unwrap(), None);
        assert_eq!(backend.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/store.json");
        let mut backend = FileBackend::new(&path, None);

        assert_eq!(backend.get("a").unwrap(), None);

        backend.write_batch(vec![("a", Some("1".into()))]).unwrap();
        assert_eq!(backend.get("a").unwrap(), Some("1".to_string()));

        let reopened = FileBackend::new(path, None);
        assert_eq!(reopened.get("a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_file_removes_document_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut backend = FileBackend::new(&path, None);

        backend.write_batch(vec![("a", Some("1".into()))]).unwrap();
        assert!(path.exists());

        backend.write_batch(vec![("a", None)]).unwrap();
        assert!(!path.exists());

        // Removing again is fine.
        backend.write_batch(vec![("a", None)]).unwrap();
    }

    #[test]
    fn test_file_unreadable_document_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json at all").unwrap();

        let mut backend = FileBackend::new(&path, None);
        assert_eq!(backend.get("a").unwrap(), None);

        backend.write_batch(vec![("a", Some("1".into()))]).unwrap();
        assert_eq!(backend.get("a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_file_quota_leaves_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut backend = FileBackend::new(&path, Some(16));

        backend.write_batch(vec![("a", Some("1".into()))]).unwrap();
        let err = backend
            .write_batch(vec![("a", Some("x".repeat(64)))])
            .unwrap_err();

        assert!(matches!(err, StoreError::QuotaExceeded { limit: 16, .. }));
        assert_eq!(backend.get("a").unwrap(), Some("1".to_string()));
    }
}
