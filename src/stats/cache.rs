// Bounded pre-aggregation cache for (entity, term) counts.
//
// Counting every shingle of every message straight into the per-entity maps
// is fine for small archives, but memory grows with the number of distinct
// (entity, term) keys seen so far. The cache caps that working set: counts
// accumulate in a fixed-size map and spill into the partition aggregate
// whenever the map fills up.

use std::collections::HashMap;

use tracing::debug;

/// Default maximum number of cached (entity, term) keys.
pub const DEFAULT_CACHE_SIZE: usize = 10_000;

/// Per-entity term occurrence counts for one partition (or several, merged).
#[derive(Debug, Clone, Default)]
pub struct EntityTermCounts {
    counts: HashMap<String, HashMap<String, u64>>,
}

impl EntityTermCounts {
    pub fn add(&mut self, entity: &str, term: &str, count: u64) {
        let terms = self.counts.entry(entity.to_string()).or_default();
        *terms.entry(term.to_string()).or_insert(0) += count;
    }

    /// Make sure an entity exists even if it contributed no terms.
    pub fn touch(&mut self, entity: &str) {
        if !self.counts.contains_key(entity) {
            self.counts.insert(entity.to_string(), HashMap::new());
        }
    }

    pub fn merge(&mut self, other: EntityTermCounts) {
        for (entity, terms) in other.counts {
            let target = self.counts.entry(entity).or_default();
            for (term, count) in terms {
                *target.entry(term).or_insert(0) += count;
            }
        }
    }

    pub fn entity_count(&self) -> usize {
        self.counts.len()
    }

    pub fn get(&self, entity: &str, term: &str) -> u64 {
        self.counts
            .get(entity)
            .and_then(|terms| terms.get(term))
            .copied()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HashMap<String, u64>)> {
        self.counts.iter()
    }
}

/// Fixed-capacity counting cache in front of an `EntityTermCounts`.
#[derive(Debug)]
pub struct CandidateCache {
    capacity: usize,
    pending: HashMap<(String, String), u64>,
    spills: u64,
}

impl CandidateCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            pending: HashMap::with_capacity(capacity),
            spills: 0,
        }
    }

    /// Count one occurrence, spilling into `sink` first if a new key would
    /// overflow the cache.
    pub fn increment(&mut self, entity: &str, term: &str, sink: &mut EntityTermCounts) {
        let key = (entity.to_string(), term.to_string());
        if let Some(count) = self.pending.get_mut(&key) {
            *count += 1;
            return;
        }

        if self.pending.len() >= self.capacity {
            self.spill(sink);
        }
        self.pending.insert(key, 1);
    }

    /// Move every cached count into `sink`.
    pub fn spill(&mut self, sink: &mut EntityTermCounts) {
        if self.pending.is_empty() {
            return;
        }
        self.spills += 1;
        debug!(entries = self.pending.len(), spills = self.spills, "Spilling term cache");
        for ((entity, term), count) in self.pending.drain() {
            sink.add(&entity, &term, count);
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn spills(&self) -> u64 {
        self.spills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_survive_spills() {
        let mut sink = EntityTermCounts::default();
        let mut cache = CandidateCache::new(2);

        for term in ["a", "b", "a", "c", "a", "d"] {
            cache.increment("x@y", term, &mut sink);
        }
        assert!(cache.len() <= 2);
        assert!(cache.spills() >= 1);

        cache.spill(&mut sink);
        assert!(cache.is_empty());
        assert_eq!(sink.get("x@y", "a"), 3);
        assert_eq!(sink.get("x@y", "b"), 1);
        assert_eq!(sink.get("x@y", "d"), 1);
    }

    #[test]
    fn test_merge_adds_counts() {
        let mut left = EntityTermCounts::default();
        left.add("e", "t", 2);
        let mut right = EntityTermCounts::default();
        right.add("e", "t", 3);
        right.touch("quiet");
        left.merge(right);
        assert_eq!(left.get("e", "t"), 5);
        assert_eq!(left.entity_count(), 2);
    }
}
