//! Search tree nodes and the hash-keyed node pool.
//!
//! Nodes are shared between worker threads. Statistics are published through
//! atomics so that UCB scans of sibling nodes can read them without taking a
//! lock: the values may be slightly stale, never torn. Writers serialise on
//! the per-node mutex.

use mcaixi_common::HistoryHash;
use std::collections::HashMap;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Worker-scoped search failures.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search node pool exhausted at {0} nodes")]
    PoolExhausted(usize),
}

/// The two alternating node kinds of the expectimax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The agent chooses an action.
    Decision,
    /// The environment returns a percept.
    Chance,
}

/// Statistics about a single state of the search, keyed by history hash.
pub struct SearchNode {
    kind: NodeKind,
    mean_bits: AtomicU64,
    visits: AtomicU64,
    lock: Mutex<()>,
}

impl SearchNode {
    fn new(kind: NodeKind) -> Self {
        SearchNode {
            kind,
            mean_bits: AtomicU64::new(0f64.to_bits()),
            visits: AtomicU64::new(0),
            lock: Mutex::new(()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Expected reward from this node until the horizon.
    pub fn expectation(&self) -> f64 {
        f64::from_bits(self.mean_bits.load(Ordering::Relaxed))
    }

    /// Number of times this node has been visited.
    pub fn visits(&self) -> u64 {
        self.visits.load(Ordering::Relaxed)
    }

    /// Hold this node's mutex across an expansion decision.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold one sampled reward into the running mean.
    pub(crate) fn record_sample(&self, reward: f64) {
        let _guard = self.lock();
        let visits = self.visits.load(Ordering::Relaxed) as f64;
        let mean = f64::from_bits(self.mean_bits.load(Ordering::Relaxed));
        let new_mean = (mean * visits + reward) / (visits + 1.0);
        self.mean_bits.store(new_mean.to_bits(), Ordering::Relaxed);
        self.visits.fetch_add(1, Ordering::Relaxed);
    }
}

/// Hash-keyed registry of search nodes, shared by all workers.
pub struct NodePool {
    map: Mutex<HashMap<HistoryHash, Arc<SearchNode>>>,
    max_nodes: usize,
}

impl NodePool {
    pub fn new(max_nodes: usize) -> Self {
        NodePool {
            map: Mutex::new(HashMap::new()),
            max_nodes,
        }
    }

    /// Size the pool from a memory budget in bytes, assuming the overhead
    /// per node is bounded by the key, the map entry, and a few pointers.
    pub fn with_memory_budget(bytes: usize) -> Self {
        let slot_size = mem::size_of::<HistoryHash>()
            + mem::size_of::<(HistoryHash, Arc<SearchNode>)>()
            + mem::size_of::<SearchNode>()
            + 4 * mem::size_of::<usize>();
        Self::new(bytes / slot_size)
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn len(&self) -> usize {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the pool has reached its capacity.
    pub fn is_full(&self) -> bool {
        self.len() >= self.max_nodes
    }

    /// Look up the node for a history hash.
    pub fn find(&self, hash: HistoryHash) -> Option<Arc<SearchNode>> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hash)
            .cloned()
    }

    /// Look up the node for a history hash, creating it on first visit.
    pub fn find_or_create(
        &self,
        hash: HistoryHash,
        kind: NodeKind,
    ) -> Result<Arc<SearchNode>, SearchError> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(node) = map.get(&hash) {
            return Ok(Arc::clone(node));
        }
        if map.len() >= self.max_nodes {
            return Err(SearchError::PoolExhausted(map.len()));
        }
        let node = Arc::new(SearchNode::new(kind));
        map.insert(hash, Arc::clone(&node));
        Ok(node)
    }

    /// Remove a node from the registry.
    pub fn destroy(&self, hash: HistoryHash) {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&hash);
    }

    /// Drop every node, typically at the start of a search cycle.
    pub fn clear(&self) {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Reclaim memory from nodes no longer reachable from the current root.
    ///
    /// TODO: retain the subtree under the chosen action between cycles
    /// instead of clearing the whole pool each search.
    pub fn garbage_collect(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sample_tracks_running_mean() {
        let node = SearchNode::new(NodeKind::Decision);
        assert_eq!(node.visits(), 0);
        assert_eq!(node.expectation(), 0.0);

        node.record_sample(1.0);
        node.record_sample(0.0);
        node.record_sample(0.5);
        assert_eq!(node.visits(), 3);
        assert!((node.expectation() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn find_or_create_is_idempotent() {
        let pool = NodePool::new(16);
        let a = pool
            .find_or_create(42, NodeKind::Chance)
            .expect("capacity available");
        let b = pool
            .find_or_create(42, NodeKind::Chance)
            .expect("already present");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
        assert_eq!(a.kind(), NodeKind::Chance);
    }

    #[test]
    fn capacity_is_enforced_for_new_nodes() {
        let pool = NodePool::new(2);
        pool.find_or_create(1, NodeKind::Decision).expect("slot 1");
        pool.find_or_create(2, NodeKind::Chance).expect("slot 2");
        assert!(pool.is_full());

        // Existing nodes stay reachable, new hashes are refused.
        assert!(pool.find_or_create(1, NodeKind::Decision).is_ok());
        assert!(matches!(
            pool.find_or_create(3, NodeKind::Decision),
            Err(SearchError::PoolExhausted(2))
        ));
    }

    #[test]
    fn clear_and_destroy() {
        let pool = NodePool::new(8);
        pool.find_or_create(7, NodeKind::Decision).expect("create");
        pool.find_or_create(8, NodeKind::Chance).expect("create");
        pool.destroy(7);
        assert!(pool.find(7).is_none());
        assert!(pool.find(8).is_some());
        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn memory_budget_yields_reasonable_capacity() {
        let pool = NodePool::with_memory_budget(32 * 1024 * 1024);
        assert!(pool.max_nodes() > 100_000);
        assert!(pool.garbage_collect() == 0);
    }
}
