//! Session-scoped memoization of load and fit results
//!
//! Explicit cache entries keyed by source path with manual invalidation.
//! No process-wide state: tests and callers construct fresh instances, so
//! nothing leaks across sessions.

use crate::data::{self, Dataset};
use crate::error::Result;
use crate::regression::{self, FittedModel};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Memoizes datasets per source path and fitted models per source path.
///
/// Values are handed out as `Arc`s; invalidation drops the cache entry but
/// previously returned handles stay valid, so a re-fit replaces the model
/// without disturbing in-flight consumers.
pub struct SessionCache {
    datasets: RwLock<HashMap<String, Arc<Dataset>>>,
    models: RwLock<HashMap<String, Arc<FittedModel>>>,
    hits: RwLock<u64>,
    misses: RwLock<u64>,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            datasets: RwLock::new(HashMap::new()),
            models: RwLock::new(HashMap::new()),
            hits: RwLock::new(0),
            misses: RwLock::new(0),
        }
    }

    /// Textual key normalization; no canonicalize syscall so a missing file
    /// still maps to a stable key
    fn key(path: &Path) -> String {
        path.display().to_string().trim().to_string()
    }

    fn record_hit(&self) {
        if let Ok(mut hits) = self.hits.write() {
            *hits += 1;
        }
    }

    fn record_miss(&self) {
        if let Ok(mut misses) = self.misses.write() {
            *misses += 1;
        }
    }

    /// Dataset for `path`, loading on first use
    pub fn dataset<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Dataset>> {
        let key = Self::key(path.as_ref());

        if let Ok(map) = self.datasets.read() {
            if let Some(dataset) = map.get(&key) {
                self.record_hit();
                return Ok(Arc::clone(dataset));
            }
        }
        self.record_miss();

        debug!(key = %key, "dataset cache miss, loading");
        let dataset = Arc::new(data::load(path.as_ref())?);
        if let Ok(mut map) = self.datasets.write() {
            map.insert(key, Arc::clone(&dataset));
        }
        Ok(dataset)
    }

    /// Fitted model for `path`, loading and fitting on first use
    pub fn model<P: AsRef<Path>>(&self, path: P) -> Result<Arc<FittedModel>> {
        let key = Self::key(path.as_ref());

        if let Ok(map) = self.models.read() {
            if let Some(model) = map.get(&key) {
                self.record_hit();
                return Ok(Arc::clone(model));
            }
        }
        self.record_miss();

        debug!(key = %key, "model cache miss, fitting");
        let dataset = self.dataset(path.as_ref())?;
        let model = Arc::new(regression::fit(&dataset)?);
        if let Ok(mut map) = self.models.write() {
            map.insert(key, Arc::clone(&model));
        }
        Ok(model)
    }

    /// Drop the entries for one source path. The next access re-reads and
    /// re-fits; handles already given out are unaffected.
    pub fn invalidate<P: AsRef<Path>>(&self, path: P) {
        let key = Self::key(path.as_ref());
        if let Ok(mut map) = self.datasets.write() {
            map.remove(&key);
        }
        if let Ok(mut map) = self.models.write() {
            map.remove(&key);
        }
    }

    /// Drop all entries
    pub fn clear(&self) {
        if let Ok(mut map) = self.datasets.write() {
            map.clear();
        }
        if let Ok(mut map) = self.models.write() {
            map.clear();
        }
    }

    /// (hits, misses, hit rate)
    pub fn stats(&self) -> (u64, u64, f64) {
        let hits = self.hits.read().map(|h| *h).unwrap_or(0);
        let misses = self.misses.read().map(|m| *m).unwrap_or(0);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn wine_file() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "alcohol;volatile acidity;sulphates;citric acid;density;quality").unwrap();
        for i in 0..10 {
            let t = i as f64;
            writeln!(
                file,
                "{};{};{};{};{};{}",
                9.0 + 0.3 * t,
                0.5 + 0.01 * (t * 1.7).sin(),
                0.6 + 0.01 * (t * 0.9).cos(),
                0.3 + 0.005 * (t * 2.3).sin(),
                0.996 + 0.0005 * (t * 1.1).cos(),
                5.0 + 0.2 * t
            )
            .unwrap();
        }
        file
    }

    #[test]
    fn test_repeated_load_returns_same_dataset() {
        let file = wine_file();
        let cache = SessionCache::new();
        let a = cache.dataset(file.path()).unwrap();
        let b = cache.dataset(file.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let (hits, misses, _) = cache.stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 1);
    }

    #[test]
    fn test_model_memoized_per_path() {
        let file = wine_file();
        let cache = SessionCache::new();
        let a = cache.model(file.path()).unwrap();
        let b = cache.model(file.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_invalidate_refits() {
        let file = wine_file();
        let cache = SessionCache::new();
        let before = cache.model(file.path()).unwrap();
        cache.invalidate(file.path());
        let after = cache.model(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        // The old handle remains a valid historical model
        assert_eq!(before.n_obs(), after.n_obs());
    }

    #[test]
    fn test_load_error_is_not_cached() {
        let cache = SessionCache::new();
        assert!(cache.dataset("/nonexistent/wine.csv").is_err());
        assert!(cache.dataset("/nonexistent/wine.csv").is_err());
        let (hits, misses, _) = cache.stats();
        assert_eq!(hits, 0);
        assert_eq!(misses, 2);
    }

    #[test]
    fn test_clear() {
        let file = wine_file();
        let cache = SessionCache::new();
        let a = cache.dataset(file.path()).unwrap();
        cache.clear();
        let b = cache.dataset(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
