//! Data model shared by reconstruction, layout and consumers

use serde::{Deserialize, Deserializer, Serialize};

/// Id of the virtual root node
///
/// Normalized record paths are always relative, so `/` never names a real file.
pub const ROOT_ID: &str = "/";

/// Kind of change a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// File created
    Added,
    /// File deleted
    Removed,
    /// File content changed
    Modified,
    /// File moved from `previous_path`
    Renamed,
}

impl ChangeStatus {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "added" => Some(Self::Added),
            "removed" => Some(Self::Removed),
            "modified" => Some(Self::Modified),
            "renamed" => Some(Self::Renamed),
            _ => None,
        }
    }
}

/// Missing or unrecognized statuses decode as `None` and fail batch validation
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ChangeStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ChangeStatus::from_name))
}

/// One file's delta within one timeline step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Path touched by this change (missing paths decode as empty and fail validation)
    #[serde(default)]
    pub path: String,
    /// Kind of change
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<ChangeStatus>,
    /// Lines added
    #[serde(default)]
    pub additions: u64,
    /// Lines deleted
    #[serde(default)]
    pub deletions: u64,
    /// Source path for renames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

impl ChangeRecord {
    /// Create a record without a previous path
    pub fn new(path: impl Into<String>, status: ChangeStatus, additions: u64, deletions: u64) -> Self {
        Self {
            path: path.into(),
            status: Some(status),
            additions,
            deletions,
            previous_path: None,
        }
    }

    /// Create a rename record
    pub fn renamed(
        path: impl Into<String>,
        previous_path: impl Into<String>,
        additions: u64,
        deletions: u64,
    ) -> Self {
        Self {
            path: path.into(),
            status: Some(ChangeStatus::Renamed),
            additions,
            deletions,
            previous_path: Some(previous_path.into()),
        }
    }

    /// Net size delta (additions - deletions), `None` if either count exceeds `i64::MAX`
    pub fn delta(&self) -> Option<i64> {
        let additions = i64::try_from(self.additions).ok()?;
        let deletions = i64::try_from(self.deletions).ok()?;
        additions.checked_sub(deletions)
    }
}

/// One step of the input timeline (a commit or pull request)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub changes: Vec<ChangeRecord>,
}

/// Type of graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// Direction of a node's size change relative to the previous snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeChange {
    Increase,
    Decrease,
    Unchanged,
}

/// Lifecycle status of a node relative to the previous snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Unchanged,
    Moved,
    /// Ghost node kept only for removal animation
    Deleted,
}

/// Position and velocity of a node, owned by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Motion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

impl Motion {
    /// Motion at rest at the given point
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Self::default()
        }
    }
}

/// A file, directory or the virtual root in one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Full path (or [`ROOT_ID`] for the root)
    pub id: String,
    pub path: String,
    /// Last path segment
    pub name: String,
    pub size: i64,
    pub kind: NodeKind,
    /// `None` until the simulation (or continuity logic) places the node
    #[serde(flatten)]
    pub motion: Option<Motion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_change: Option<SizeChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_status: Option<FileStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

impl Node {
    fn new(path: &str, size: i64, kind: NodeKind) -> Self {
        Self {
            id: path.to_string(),
            path: path.to_string(),
            name: crate::path::basename(path).to_string(),
            size,
            kind,
            motion: None,
            previous_size: None,
            size_change: None,
            file_status: None,
            previous_path: None,
        }
    }

    /// Create a file node
    pub fn file(path: &str, size: i64) -> Self {
        Self::new(path, size, NodeKind::File)
    }

    /// Create a synthesized directory node (size 0)
    pub fn directory(path: &str) -> Self {
        Self::new(path, 0, NodeKind::Directory)
    }

    /// Create the virtual root node
    pub fn root() -> Self {
        Self::new(ROOT_ID, 0, NodeKind::Directory)
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Ghost nodes are excluded from the live simulation
    pub fn is_ghost(&self) -> bool {
        self.file_status == Some(FileStatus::Deleted)
    }
}

/// Kind of graph edge (only parent links exist today)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Parent,
}

/// Directed edge from ancestor to descendant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn parent(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Parent,
        }
    }
}

/// Input entry for the tree builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub size: i64,
    /// Defaults to [`NodeKind::File`]
    pub kind: Option<NodeKind>,
}

impl FileEntry {
    pub fn file(path: impl Into<String>, size: i64) -> Self {
        Self {
            path: path.into(),
            size,
            kind: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind.unwrap_or(NodeKind::File)
    }
}

/// Reconstructed graph at one point in the timeline
///
/// Immutable once produced except for node motion, which continuity logic
/// may overwrite before simulation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub message: String,
    pub author: String,
    pub timestamp: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Ghost nodes in this snapshot
    pub fn ghosts(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_ghost())
    }
}
