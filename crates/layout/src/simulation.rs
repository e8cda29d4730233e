//! Force-directed 3D layout
//!
//! Each tick accumulates three forces per node and integrates:
//! - springs along parent edges, resting at `r(source) + r(target) + spacing`
//! - inverse-square repulsion between every pair, in terms of the gap
//!   between their surfaces (at least 1)
//! - a linear pull toward the origin
//!
//! Velocity is damped, clamped to `max_velocity` and Euler-integrated into
//! position. The pairwise pass is O(n²), fine for a few hundred nodes.

use crate::radius::{ideal_distance, node_radius};
use crate::seed::seed_position;
use crate::{SimulationConfig, Vec3};
use ahash::AHashMap;
use reposcape_core::{Edge, Motion, Node};
use tracing::debug;

/// Below this distance two points are treated as coincident
const COINCIDENT: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Spring {
    a: usize,
    b: usize,
    rest: f64,
}

/// Force simulation over one snapshot's active nodes
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    nodes: Vec<Node>,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    radii: Vec<f64>,
    springs: Vec<Spring>,
    forces: Vec<Vec3>,
    config: SimulationConfig,
    ticks: u64,
}

impl ForceSimulation {
    /// Create a simulation
    ///
    /// Nodes that already carry motion continue from it; the rest are seeded
    /// on the configured shell at rest. Edges naming unknown nodes are skipped.
    pub fn new(nodes: Vec<Node>, edges: &[Edge], config: SimulationConfig) -> crate::Result<Self> {
        config.validate()?;

        let mut positions = Vec::with_capacity(nodes.len());
        let mut velocities = Vec::with_capacity(nodes.len());
        let mut seeded = 0usize;

        for node in &nodes {
            match node.motion {
                Some(m) if Vec3::new(m.x, m.y, m.z).is_finite() => {
                    positions.push(Vec3::new(m.x, m.y, m.z));
                    let velocity = Vec3::new(m.vx, m.vy, m.vz);
                    velocities.push(if velocity.is_finite() { velocity } else { Vec3::ZERO });
                }
                _ => {
                    positions.push(seed_position(&node.id, &config));
                    velocities.push(Vec3::ZERO);
                    seeded += 1;
                }
            }
        }

        let radii: Vec<f64> = nodes.iter().map(|n| node_radius(n, &config)).collect();

        let index: AHashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut springs = Vec::with_capacity(edges.len());
        for edge in edges {
            match (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                (Some(&a), Some(&b)) if a != b => springs.push(Spring {
                    a,
                    b,
                    rest: ideal_distance(radii[a], radii[b], &config),
                }),
                _ => debug!("Skipping edge {} -> {} outside simulation", edge.source, edge.target),
            }
        }

        debug!(
            "Simulation over {} nodes ({} seeded), {} springs",
            nodes.len(),
            seeded,
            springs.len()
        );

        let forces = vec![Vec3::ZERO; nodes.len()];
        Ok(Self {
            nodes,
            positions,
            velocities,
            radii,
            springs,
            forces,
            config,
            ticks: 0,
        })
    }

    /// Advance the layout by one step
    pub fn tick(&mut self) {
        self.forces.iter_mut().for_each(|f| *f = Vec3::ZERO);

        self.apply_springs();
        self.apply_repulsion();
        self.apply_centering();
        self.integrate();

        self.ticks += 1;
    }

    fn apply_springs(&mut self) {
        let strength = self.config.spring_strength;
        for spring in &self.springs {
            let delta = self.positions[spring.b] - self.positions[spring.a];
            let distance = delta.length();
            let dir = direction(delta, distance, spring.a, spring.b);

            let force = dir * (strength * (distance - spring.rest));
            self.forces[spring.a] += force;
            self.forces[spring.b] -= force;
        }
    }

    fn apply_repulsion(&mut self) {
        let strength = self.config.repulsion_strength;
        let n = self.positions.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.positions[i] - self.positions[j];
                let distance = delta.length();
                let dir = direction(delta, distance, j, i);

                let reach = self.radii[i] + self.radii[j];
                let gap = (distance - reach).max(1.0);
                let force = dir * (strength * reach / (gap * gap));
                self.forces[i] += force;
                self.forces[j] -= force;
            }
        }
    }

    fn apply_centering(&mut self) {
        let strength = self.config.centering_strength;
        for (force, position) in self.forces.iter_mut().zip(&self.positions) {
            *force -= *position * strength;
        }
    }

    fn integrate(&mut self) {
        let damping = self.config.damping;
        let max_velocity = self.config.max_velocity;

        for i in 0..self.positions.len() {
            let mut velocity = (self.velocities[i] + self.forces[i]) * damping;
            if !velocity.is_finite() {
                velocity = Vec3::ZERO;
            }
            velocity = velocity.clamp_length(max_velocity);

            self.velocities[i] = velocity;
            self.positions[i] += velocity;
        }
    }

    /// Snapshot of the nodes with their current motion
    pub fn current_nodes(&self) -> Vec<Node> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let mut node = node.clone();
                node.motion = Some(self.motion(i));
                node
            })
            .collect()
    }

    /// Consume the simulation, returning nodes with their final motion
    pub fn into_nodes(self) -> Vec<Node> {
        let motions: Vec<Motion> = (0..self.nodes.len()).map(|i| self.motion(i)).collect();
        self.nodes
            .into_iter()
            .zip(motions)
            .map(|(mut node, motion)| {
                node.motion = Some(motion);
                node
            })
            .collect()
    }

    fn motion(&self, i: usize) -> Motion {
        let p = self.positions[i];
        let v = self.velocities[i];
        Motion {
            x: p.x,
            y: p.y,
            z: p.z,
            vx: v.x,
            vy: v.y,
            vz: v.z,
        }
    }

    /// Current position of node `i`
    pub fn position(&self, i: usize) -> Vec3 {
        self.positions[i]
    }

    /// Total kinetic energy (unit mass)
    pub fn kinetic_energy(&self) -> f64 {
        self.velocities.iter().map(|v| 0.5 * v.length_squared()).sum()
    }

    /// Fastest node speed
    pub fn max_speed(&self) -> f64 {
        self.velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max)
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Unit vector along `delta`, or a fixed per-pair axis when points coincide
fn direction(delta: Vec3, distance: f64, a: usize, b: usize) -> Vec3 {
    if distance > COINCIDENT {
        return delta / distance;
    }
    let angle = (a * 31 + b * 17) as f64 * 2.399_963_229_728_653;
    Vec3::new(angle.cos(), angle.sin(), 0.0)
}
