//! Tree representation of a flat file list
//!
//! Turns `path -> size` entries into a node list (files, synthesized
//! directories and the virtual root) plus immediate-parent edges.

use crate::error::IntegrityWarning;
use crate::model::{Edge, FileEntry, Node, NodeKind, ROOT_ID};
use crate::path;
use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::warn;

/// Nodes, edges and the warnings raised while building them
#[derive(Debug, Clone, Default)]
pub struct BuiltTree {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub warnings: Vec<IntegrityWarning>,
}

/// Builds nodes and parent edges from file entries
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeEdgeBuilder;

/// Every path the tree will contain, keyed and sorted by path
struct Occupancy<'a> {
    /// Real entries, first occurrence wins
    entries: BTreeMap<&'a str, (i64, NodeKind)>,
    /// Directory prefixes not occupied by a real entry
    synthesized: BTreeSet<&'a str>,
    warnings: Vec<IntegrityWarning>,
}

impl<'a> Occupancy<'a> {
    fn collect(files: &'a [FileEntry]) -> Self {
        let mut entries = BTreeMap::new();
        for file in files {
            entries
                .entry(file.path.as_str())
                .or_insert((file.size, file.kind()));
        }

        let mut synthesized = BTreeSet::new();
        let mut warnings = Vec::new();
        let mut reported: AHashSet<&str> = AHashSet::new();

        for file in files {
            for prefix in path::ancestors(&file.path) {
                match entries.get(prefix) {
                    None => {
                        synthesized.insert(prefix);
                    }
                    Some((_, NodeKind::File)) => {
                        if reported.insert(prefix) {
                            warnings.push(IntegrityWarning::PathOccupiedByFile {
                                path: prefix.to_string(),
                            });
                        }
                    }
                    Some((_, NodeKind::Directory)) => {}
                }
            }
        }

        Self {
            entries,
            synthesized,
            warnings,
        }
    }
}

impl TreeEdgeBuilder {
    /// Build nodes and edges in one pass
    pub fn build(files: &[FileEntry]) -> BuiltTree {
        if files.is_empty() {
            return BuiltTree::default();
        }

        let occupancy = Occupancy::collect(files);
        let nodes = Self::nodes_from(&occupancy);
        let (edges, duplicates) = Self::edges_from(files, &occupancy);

        let mut warnings = occupancy.warnings;
        warnings.extend(duplicates);
        for warning in &warnings {
            warn!("{}", warning);
        }

        BuiltTree {
            nodes,
            edges,
            warnings,
        }
    }

    /// Node list: root first, then files and directories sorted by path
    pub fn build_nodes(files: &[FileEntry]) -> Vec<Node> {
        if files.is_empty() {
            return Vec::new();
        }
        Self::nodes_from(&Occupancy::collect(files))
    }

    /// Immediate-parent edges for every node except the root
    pub fn build_edges(files: &[FileEntry]) -> Vec<Edge> {
        if files.is_empty() {
            return Vec::new();
        }
        Self::edges_from(files, &Occupancy::collect(files)).0
    }

    fn nodes_from(occupancy: &Occupancy<'_>) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(1 + occupancy.entries.len() + occupancy.synthesized.len());
        nodes.push(Node::root());

        let mut real = occupancy.entries.iter().peekable();
        let mut dirs = occupancy.synthesized.iter().peekable();

        // Merge the two sorted sources
        loop {
            let take_real = match (real.peek(), dirs.peek()) {
                (Some((r, _)), Some(d)) => r < d,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };

            if take_real {
                if let Some((path, &(size, kind))) = real.next() {
                    nodes.push(match kind {
                        NodeKind::File => Node::file(path, size),
                        NodeKind::Directory => {
                            let mut dir = Node::directory(path);
                            dir.size = size;
                            dir
                        }
                    });
                }
            } else if let Some(path) = dirs.next() {
                nodes.push(Node::directory(path));
            }
        }

        nodes
    }

    fn edges_from(
        files: &[FileEntry],
        occupancy: &Occupancy<'_>,
    ) -> (Vec<Edge>, Vec<IntegrityWarning>) {
        let mut seen: AHashSet<(&str, &str)> = AHashSet::new();
        let mut edges = Vec::new();
        let mut duplicates = Vec::new();

        let children = files
            .iter()
            .map(|f| f.path.as_str())
            .chain(occupancy.synthesized.iter().copied());

        for child in children {
            let parent = path::parent(child).unwrap_or(ROOT_ID);
            if seen.insert((parent, child)) {
                edges.push(Edge::parent(parent, child));
            } else {
                duplicates.push(IntegrityWarning::DuplicateEdge {
                    source: parent.to_string(),
                    target: child.to_string(),
                });
            }
        }

        edges.sort_unstable_by(|a, b| a.target.cmp(&b.target));
        (edges, duplicates)
    }

    /// Ids of nodes not reachable from the root through parent edges
    pub fn find_orphans(nodes: &[Node], edges: &[Edge]) -> Vec<String> {
        if nodes.is_empty() {
            return Vec::new();
        }

        let mut children: AHashMap<&str, Vec<&str>> = AHashMap::new();
        for edge in edges {
            children
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }

        let mut reached: AHashSet<&str> = AHashSet::new();
        let mut queue = VecDeque::from([ROOT_ID]);
        reached.insert(ROOT_ID);
        while let Some(id) = queue.pop_front() {
            for &child in children.get(id).into_iter().flatten() {
                if reached.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        let mut orphans: Vec<String> = nodes
            .iter()
            .filter(|n| !reached.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect();
        orphans.sort_unstable();
        orphans
    }
}
