use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_file;
use super::model::RestaurantTable;
use crate::error::{ExplorerError, Result};

// ---------------------------------------------------------------------------
// DatasetCache – load-once memoisation keyed by path + modification time
// ---------------------------------------------------------------------------

struct CacheEntry {
    modified: Option<SystemTime>,
    table: Arc<RestaurantTable>,
}

/// Memoises parsed tables so repeated filter changes never re-read the file.
///
/// An entry is reused while the file's modification time is unchanged; a
/// newer file on disk is reloaded. [`DatasetCache::invalidate`] and
/// [`DatasetCache::clear`] drop entries explicitly. Entries are keyed by the
/// canonical path, so `./data/x.csv` and `data/x.csv` share one entry.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for `path`, loading it on a miss or when the file
    /// changed since it was cached.
    pub fn load(&mut self, path: &Path) -> Result<Arc<RestaurantTable>> {
        let key = std::fs::canonicalize(path).map_err(|e| ExplorerError::io(path, e))?;
        let modified = std::fs::metadata(&key)
            .map_err(|e| ExplorerError::io(path, e))?
            .modified()
            .ok();

        if let Some(entry) = self.entries.get(&key) {
            if entry.modified == modified {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.table));
            }
            log::info!("{} changed on disk, reloading", path.display());
        }

        let table = Arc::new(load_file(path)?);
        self.entries.insert(
            key,
            CacheEntry {
                modified,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    /// Drop the entry for `path`. Returns whether one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(&cache_key(path)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&cache_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical form of `path`, or `path` itself when it no longer resolves.
fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::time::Duration;

    use super::*;

    const CSV: &str = "Name,City,Cuisine Style,Price Range,Rating,Number of Reviews,Reviews,URL_TA\n\
                       A,Rome,['Italian'],$,4.0,10,,/a\n";

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restaurants.csv");
        fs::write(&path, CSV).unwrap();
        (dir, path)
    }

    #[test]
    fn second_load_is_memoised() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new();

        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn aliased_paths_share_one_entry() {
        let (dir, path) = fixture();
        let alias = dir.path().join(".").join("restaurants.csv");
        let mut cache = DatasetCache::new();

        let first = cache.load(&path).unwrap();
        let second = cache.load(&alias).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&alias));

        assert!(cache.invalidate(&alias));
        assert!(!cache.contains(&path));
    }

    #[test]
    fn invalidate_forces_reload() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new();

        let first = cache.load(&path).unwrap();
        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        let second = cache.load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.restaurants(), second.restaurants());
    }

    #[test]
    fn modified_file_is_reloaded() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new();
        let first = cache.load(&path).unwrap();
        assert_eq!(first.len(), 1);

        fs::write(&path, format!("{CSV}B,Rome,[],$$$$,3.0,2,,/b\n")).unwrap();
        let later = SystemTime::now() + Duration::from_secs(60);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        let second = cache.load(&path).unwrap();
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn clear_empties_cache() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new();
        cache.load(&path).unwrap();
        assert!(cache.contains(&path));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        fs::write(&path, "Name,City\nA,Rome\n").unwrap();

        let mut cache = DatasetCache::new();
        assert!(cache.load(&path).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut cache = DatasetCache::new();
        assert!(matches!(
            cache.load(Path::new("/nonexistent/restaurants.csv")),
            Err(ExplorerError::Io { .. })
        ));
    }
}
