//! Node radius from size

use crate::SimulationConfig;
use reposcape_core::{Node, NodeKind};

/// Radius of a node
///
/// Files scale with `log10(size + 1)` clamped to the configured bounds;
/// directories (and the root) use a fixed radius.
pub fn node_radius(node: &Node, config: &SimulationConfig) -> f64 {
    match node.kind {
        NodeKind::Directory => config.directory_radius,
        NodeKind::File => file_radius(node.size, config),
    }
}

pub fn file_radius(size: i64, config: &SimulationConfig) -> f64 {
    let size = size.max(0) as f64;
    ((size + 1.0).log10() * config.radius_scale).clamp(config.min_radius, config.max_radius)
}

/// Rest length of an edge between two nodes
pub fn ideal_distance(source_radius: f64, target_radius: f64, config: &SimulationConfig) -> f64 {
    source_radius + target_radius + config.ideal_spacing
}
