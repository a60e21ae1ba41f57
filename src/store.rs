use lru::LruCache;
use std::num::NonZeroUsize;

use crate::cluster::LogCluster;

/// Bounded id-to-cluster map. This is the memory governor of the engine:
/// when it evicts, the tree is left holding dead ids that readers skip
/// and that the next insertion at the same leaf sweeps away.
///
/// `get` refreshes recency; `peek`, `contains`, `values` and `iterate`
/// leave the eviction order untouched.
pub struct ClusterStore {
    cache: LruCache<u64, LogCluster>,
}

impl ClusterStore {
    /// `max_clusters` of zero means unbounded.
    pub fn new(max_clusters: usize) -> Self {
        let cache = match NonZeroUsize::new(max_clusters) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        ClusterStore { cache }
    }

    pub fn set(&mut self, id: u64, cluster: LogCluster) {
        self.cache.put(id, cluster);
    }

    pub fn get(&mut self, id: u64) -> Option<&LogCluster> {
        self.cache.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Option<&mut LogCluster> {
        self.cache.get_mut(&id)
    }

    pub fn peek(&self, id: u64) -> Option<&LogCluster> {
        self.cache.peek(&id)
    }

    pub(crate) fn peek_mut(&mut self, id: u64) -> Option<&mut LogCluster> {
        self.cache.peek_mut(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.cache.contains(&id)
    }

    pub fn remove(&mut self, id: u64) {
        self.cache.pop(&id);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    // Snapshot of live clusters, least recently used first.
    pub fn values(&self) -> Vec<&LogCluster> {
        self.cache.iter().rev().map(|(_, cluster)| cluster).collect()
    }

    /// Visits live clusters, least recently used first, stopping when the
    /// visitor returns false.
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(&LogCluster) -> bool,
    {
        for (_, cluster) in self.cache.iter().rev() {
            if !visit(cluster) {
                return;
            }
        }
    }
}
