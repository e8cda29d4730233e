//! Snapshot classification: status, size direction, moves and ghosts

use crate::error::{IntegrityWarning, OrphanError};
use crate::model::{Edge, FileEntry, FileStatus, Node, NodeKind, SizeChange, ROOT_ID};
use crate::path::basename;
use crate::tree::TreeEdgeBuilder;
use crate::{PathSizes, RenameHints};
use ahash::{AHashMap, AHashSet};
use std::cmp::Ordering;
use tracing::warn;

/// Outcome of the name+size move heuristic for one new path
///
/// Best effort only: coincidental duplicates with equal name and size are
/// indistinguishable from genuine moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveDetection {
    /// Exactly one deleted path matches
    Moved { from: String },
    /// No deleted path matches
    Added,
    /// Several deleted paths match; left for the caller to resolve
    Ambiguous { candidates: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PreviousEntry {
    size: i64,
    kind: NodeKind,
}

/// Paths and sizes of the previous snapshot's live nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousState {
    entries: AHashMap<String, PreviousEntry>,
}

impl PreviousState {
    /// Record the live (non-ghost, non-root) nodes of a snapshot
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let entries = nodes
            .iter()
            .filter(|n| !n.is_root() && !n.is_ghost())
            .map(|n| {
                (
                    n.id.clone(),
                    PreviousEntry {
                        size: n.size,
                        kind: n.kind,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn size(&self, path: &str) -> Option<i64> {
        self.entries.get(path).map(|e| e.size)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build previous state from a plain path -> size map (all files)
impl From<&PathSizes> for PreviousState {
    fn from(sizes: &PathSizes) -> Self {
        sizes
            .iter()
            .map(|(path, &size)| (path.clone(), size))
            .collect()
    }
}

impl FromIterator<(String, i64)> for PreviousState {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(path, size)| {
                (
                    path,
                    PreviousEntry {
                        size,
                        kind: NodeKind::File,
                    },
                )
            })
            .collect();
        Self { entries }
    }
}

/// Classified nodes (ghosts appended) with their edges
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub warnings: Vec<IntegrityWarning>,
}

/// Combines tree building with historical context
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotAssembler {
    /// Promote orphan warnings to [`OrphanError`]
    pub strict_orphans: bool,
}

impl SnapshotAssembler {
    pub fn new(strict_orphans: bool) -> Self {
        Self { strict_orphans }
    }

    /// Build the tree for `files`, verify it and classify it against `previous`
    pub fn assemble(
        &self,
        previous: Option<&PreviousState>,
        files: &[FileEntry],
        renames: &RenameHints,
    ) -> Result<Classified, OrphanError> {
        let built = TreeEdgeBuilder::build(files);
        let mut warnings = built.warnings;
        warnings.extend(self.check_orphans(&built.nodes, &built.edges)?);

        let (nodes, classify_warnings) = Self::classify(previous, built.nodes, renames);
        warnings.extend(classify_warnings);

        Ok(Classified {
            nodes,
            edges: built.edges,
            warnings,
        })
    }

    /// Verify every node is reachable from the root
    ///
    /// Orphans are returned as warnings, or as [`OrphanError`] in strict mode.
    pub fn check_orphans(
        &self,
        nodes: &[Node],
        edges: &[Edge],
    ) -> Result<Vec<IntegrityWarning>, OrphanError> {
        let orphans = TreeEdgeBuilder::find_orphans(nodes, edges);
        if orphans.is_empty() {
            return Ok(Vec::new());
        }
        if self.strict_orphans {
            return Err(OrphanError { orphans });
        }
        Ok(orphans
            .into_iter()
            .map(|id| {
                warn!("Orphaned node {}", id);
                IntegrityWarning::OrphanNode { id }
            })
            .collect())
    }

    /// Enrich nodes with status and size direction, then append ghosts
    ///
    /// `renames` maps new paths to the path they were explicitly renamed
    /// from; those win over the name+size heuristic.
    pub fn classify(
        previous: Option<&PreviousState>,
        mut nodes: Vec<Node>,
        renames: &RenameHints,
    ) -> (Vec<Node>, Vec<IntegrityWarning>) {
        let Some(previous) = previous else {
            for node in &mut nodes {
                node.file_status = Some(FileStatus::Added);
                node.size_change = Some(SizeChange::Unchanged);
            }
            return (nodes, Vec::new());
        };

        let current: AHashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
        let mut claimed: AHashSet<String> = AHashSet::new();
        let mut warnings = Vec::new();

        // explicit renames claim their sources before any guessing
        let mut pending = Vec::new();
        for (i, node) in nodes.iter_mut().enumerate() {
            if node.is_root() {
                node.file_status = Some(FileStatus::Unchanged);
                node.size_change = Some(SizeChange::Unchanged);
                continue;
            }

            if let Some(prior) = previous.size(&node.id) {
                node.previous_size = Some(prior);
                node.file_status = Some(FileStatus::Unchanged);
                node.size_change = Some(compare_sizes(node.size, prior));
                continue;
            }

            if node.kind == NodeKind::Directory {
                node.file_status = Some(FileStatus::Added);
                node.size_change = Some(SizeChange::Increase);
                continue;
            }

            let explicit = renames
                .get(&node.id)
                .filter(|from| is_free_source(previous, &current, &claimed, from));

            match explicit {
                Some(from) => {
                    let prior = previous.size(from).unwrap_or(node.size);
                    let change = compare_sizes(node.size, prior);
                    mark_moved(node, from.clone(), prior, change);
                    claimed.insert(from.clone());
                }
                None => pending.push(i),
            }
        }

        for i in pending {
            let node = &mut nodes[i];
            match detect_move(previous, &current, &claimed, &node.id, node.size) {
                MoveDetection::Moved { from } => {
                    claimed.insert(from.clone());
                    let size = node.size;
                    mark_moved(node, from, size, SizeChange::Unchanged);
                }
                MoveDetection::Added => {
                    node.file_status = Some(FileStatus::Added);
                    node.size_change = Some(SizeChange::Increase);
                }
                MoveDetection::Ambiguous { candidates } => {
                    warn!(
                        "Ambiguous move for {} ({} candidates), classifying as added",
                        node.id,
                        candidates.len()
                    );
                    warnings.push(IntegrityWarning::AmbiguousMove {
                        path: node.id.clone(),
                        candidates,
                    });
                    node.file_status = Some(FileStatus::Added);
                    node.size_change = Some(SizeChange::Increase);
                }
            }
        }

        let mut vanished: Vec<(&String, &PreviousEntry)> = previous
            .entries
            .iter()
            .filter(|(path, _)| {
                path.as_str() != ROOT_ID && !current.contains(*path) && !claimed.contains(*path)
            })
            .collect();
        vanished.sort_unstable_by(|a, b| a.0.cmp(b.0));

        nodes.extend(vanished.into_iter().map(|(path, entry)| ghost(path, entry)));

        (nodes, warnings)
    }
}

/// Search deleted, unclaimed files with the same basename and size
pub fn detect_move(
    previous: &PreviousState,
    current: &AHashSet<String>,
    claimed: &AHashSet<String>,
    path: &str,
    size: i64,
) -> MoveDetection {
    let name = basename(path);

    let mut candidates: Vec<String> = previous
        .entries
        .iter()
        .filter(|(prev_path, entry)| {
            entry.kind == NodeKind::File
                && entry.size == size
                && basename(prev_path) == name
                && !current.contains(*prev_path)
                && !claimed.contains(*prev_path)
        })
        .map(|(prev_path, _)| prev_path.clone())
        .collect();

    match candidates.len() {
        0 => MoveDetection::Added,
        1 => MoveDetection::Moved {
            from: candidates.remove(0),
        },
        _ => {
            candidates.sort_unstable();
            MoveDetection::Ambiguous { candidates }
        }
    }
}

fn is_free_source(
    previous: &PreviousState,
    current: &AHashSet<String>,
    claimed: &AHashSet<String>,
    from: &str,
) -> bool {
    previous.contains(from) && !current.contains(from) && !claimed.contains(from)
}

fn compare_sizes(size: i64, prior: i64) -> SizeChange {
    match size.cmp(&prior) {
        Ordering::Greater => SizeChange::Increase,
        Ordering::Less => SizeChange::Decrease,
        Ordering::Equal => SizeChange::Unchanged,
    }
}

fn mark_moved(node: &mut Node, from: String, prior: i64, change: SizeChange) {
    node.file_status = Some(FileStatus::Moved);
    node.previous_path = Some(from);
    node.previous_size = Some(prior);
    node.size_change = Some(change);
}

fn ghost(path: &str, entry: &PreviousEntry) -> Node {
    let mut node = match entry.kind {
        NodeKind::File => Node::file(path, 0),
        NodeKind::Directory => Node::directory(path),
    };
    node.previous_size = Some(entry.size);
    node.file_status = Some(FileStatus::Deleted);
    node.size_change = Some(SizeChange::Decrease);
    node
}
