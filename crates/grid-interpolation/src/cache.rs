//! In-memory FIFO cache for computed grids.
//!
//! Grids are keyed by a cheap fingerprint of the request inputs (see
//! [`fingerprint`]). Eviction is by insertion order, not access recency: once
//! the cache is full, inserting a new key drops the oldest-inserted entry.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use overlay_common::{BoundaryGeometry, Sample};
use tracing::debug;

use crate::grid::Grid;

/// Default number of grids kept per cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 20;

/// Cheap, collision-tolerant key for a grid computation.
///
/// Built from the sample count, the sum of values, the first and last values,
/// the resolution and the IDW power. Two different sample sets that agree on
/// all of these map to the same key and are served the same grid. The key does
/// not include the bounds, which are fixed per cache owner, nor the boundary;
/// callers that mask with anything other than their default boundary append
/// [`boundary_fingerprint`].
pub fn fingerprint(samples: &[Sample], resolution: f64, power: f64) -> String {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return "empty".to_string();
    };

    let sum: f64 = samples.iter().map(|s| s.value).sum();
    format!(
        "{}-{:.2}-{:.4}-{:.4}-{}-{}",
        samples.len(),
        sum,
        first.value,
        last.value,
        resolution,
        power
    )
}

/// Key suffix identifying a boundary by its exact coordinates.
pub fn boundary_fingerprint(boundary: &[BoundaryGeometry]) -> String {
    let mut hasher = DefaultHasher::new();
    boundary.len().hash(&mut hasher);
    for geometry in boundary {
        let polygons = geometry.polygons();
        polygons.len().hash(&mut hasher);
        for ring in polygons.iter().flatten() {
            ring.len().hash(&mut hasher);
            for [lon, lat] in ring {
                lon.to_bits().hash(&mut hasher);
                lat.to_bits().hash(&mut hasher);
            }
        }
    }
    format!("b{}-{:016x}", boundary.len(), hasher.finish())
}

/// Statistics for the grid cache
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Fixed-capacity FIFO cache: fingerprint → grid.
///
/// Owned by a single worker and passed by `&mut` into every computation; it is
/// never shared between workers.
#[derive(Debug)]
pub struct GridCache {
    /// Keys in insertion order, oldest first
    order: VecDeque<String>,
    entries: HashMap<String, Arc<Grid>>,
    capacity: usize,
    stats: CacheStats,
}

impl GridCache {
    /// Create a new cache holding at most `capacity` grids (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity + 1),
            entries: HashMap::with_capacity(capacity + 1),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// Look up a grid, recording a hit or a miss.
    pub fn get(&mut self, key: &str) -> Option<Arc<Grid>> {
        match self.entries.get(key) {
            Some(grid) => {
                self.stats.hits += 1;
                Some(Arc::clone(grid))
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Check for a key without touching the statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a grid, returning the evicted key if the cache overflowed.
    ///
    /// Replacing an existing key keeps its original insertion position.
    pub fn insert(&mut self, key: String, grid: Arc<Grid>) -> Option<String> {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = grid;
            return None;
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, grid);

        if self.order.len() <= self.capacity {
            return None;
        }

        let oldest = self.order.pop_front()?;
        self.entries.remove(&oldest);
        self.stats.evictions += 1;
        debug!(evicted = %oldest, capacity = self.capacity, "Evicted oldest grid");
        Some(oldest)
    }

    /// Return the cached grid for `key`, computing and storing it on a miss.
    ///
    /// The boolean is `true` on a cache hit.
    pub fn get_or_compute<F>(&mut self, key: &str, compute: F) -> (Arc<Grid>, bool)
    where
        F: FnOnce() -> Grid,
    {
        if let Some(grid) = self.get(key) {
            return (grid, true);
        }

        let grid = Arc::new(compute());
        self.insert(key.to_string(), Arc::clone(&grid));
        (grid, false)
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    /// Drop every entry and reset the statistics.
    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}

impl Default for GridCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
