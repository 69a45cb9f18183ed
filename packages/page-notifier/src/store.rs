//! Seen-set persistence.
//!
//! The set of already-notified post ids lives in a small JSON document:
//!
//! ```json
//! { "seen_ids": ["1234", "5678"] }
//! ```
//!
//! It is read once at the start of a run and written back once at the end.
//! Writes go to a temporary file in the same directory which is then renamed
//! over the target, so a crash mid-write leaves the previous document intact.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::post::Post;

/// Ids of every post observed so far. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenSet {
    #[serde(default)]
    seen_ids: BTreeSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen_ids.contains(id)
    }

    /// Returns true if the id was not already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.seen_ids.insert(id.into())
    }

    /// Mark every post as seen. Returns how many ids were new.
    pub fn record<'a, I>(&mut self, posts: I) -> usize
    where
        I: IntoIterator<Item = &'a Post>,
    {
        posts
            .into_iter()
            .filter(|p| self.seen_ids.insert(p.id.clone()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.seen_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.seen_ids.iter().map(String::as_str)
    }

    pub fn is_superset(&self, other: &SeenSet) -> bool {
        self.seen_ids.is_superset(&other.seen_ids)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            seen_ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// File-backed home of the [`SeenSet`].
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the seen-set. A missing file is an empty set, not an error.
    pub fn load(&self) -> Result<SeenSet, StoreError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No seen-set yet, starting empty");
                return Ok(SeenSet::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let seen: SeenSet = serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = seen.len(), "Loaded seen-set");
        Ok(seen)
    }

    /// Replace the stored seen-set with `seen`.
    pub fn save(&self, seen: &SeenSet) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let data = serde_json::to_string_pretty(seen).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(data.as_bytes()).map_err(io_err)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!(path = %self.path.display(), count = seen.len(), "Saved seen-set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("seen_posts.json"));

        let seen = store.load().unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn save_then_load_keeps_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("nested/seen_posts.json"));
        let seen: SeenSet = ["b", "a"].into_iter().collect();

        store.save(&seen).unwrap();

        assert_eq!(store.load().unwrap(), seen);
    }

    #[test]
    fn document_lists_ids_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::new(dir.path().join("seen.json"));
        let seen: SeenSet = ["zeta", "alpha"].into_iter().collect();

        store.save(&seen).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["seen_ids"], serde_json::json!(["alpha", "zeta"]));
    }

    #[test]
    fn accepts_document_written_by_older_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, r#"{"seen_ids": ["x", "y", "x"], "extra": 1}"#).unwrap();

        let seen = SeenStore::new(&path).load().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("x"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, "not json").unwrap();

        let err = SeenStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn record_counts_only_new_ids() {
        let mut seen: SeenSet = ["a"].into_iter().collect();
        let posts = vec![Post::new("a", ""), Post::new("b", ""), Post::new("b", "")];

        assert_eq!(seen.record(&posts), 1);
        assert_eq!(seen.len(), 2);
    }
}
