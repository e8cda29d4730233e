//! Position/velocity state carried between snapshots

use ahash::AHashMap;
use reposcape_core::{Motion, Node};

/// Last known motion of every node, keyed by node id
///
/// Owned by one timeline; replaced after every layout pass and cleared when
/// a new timeline begins.
#[derive(Debug, Clone, Default)]
pub struct PositionStore {
    entries: AHashMap<String, Motion>,
}

impl PositionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Update an entry (None = remove)
    pub fn update(&mut self, id: &str, motion: Option<Motion>) {
        match motion {
            Some(motion) => {
                self.entries.insert(id.to_string(), motion);
            }
            None => {
                self.entries.remove(id);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Motion> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Replace the whole store with the placed nodes of one pass
    pub fn replace_with(&mut self, nodes: &[Node]) {
        self.entries.clear();
        for node in nodes {
            if let Some(motion) = node.motion {
                self.entries.insert(node.id.clone(), motion);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_and_remove() {
        let mut store = PositionStore::new();
        store.update("a.rs", Some(Motion::at(1.0, 0.0, 0.0)));
        assert_eq!(store.get("a.rs").map(|m| m.x), Some(1.0));

        store.update("a.rs", None);
        assert!(!store.contains("a.rs"));
    }

    #[test]
    fn test_replace_with_skips_unplaced_nodes() {
        let mut store = PositionStore::new();
        store.update("stale.rs", Some(Motion::default()));

        let mut placed = Node::file("a.rs", 3);
        placed.motion = Some(Motion::at(2.0, 2.0, 2.0));
        let unplaced = Node::file("b.rs", 3);

        store.replace_with(&[placed, unplaced]);
        assert_eq!(store.len(), 1);
        assert!(store.contains("a.rs"));
        assert!(!store.contains("stale.rs"));
    }
}
