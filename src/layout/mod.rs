//! Force-directed placement on a fixed canvas.
//!
//! The simulation follows the usual velocity-Verlet scheme with a cooling
//! `alpha`: every step each force contributes a [`forces::Nudge`] per node,
//! the velocity deltas are summed and damped, and positions advance. The loop
//! always runs the configured number of steps; there is no convergence check.

mod forces;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::graph::{Edge, GraphSnapshot, Node, Position};

pub use forces::Nudge;

pub const CANVAS_WIDTH: f32 = 1200.0;
pub const CANVAS_HEIGHT: f32 = 800.0;
pub const CANVAS_PADDING: f32 = 50.0;
pub const ITERATIONS: usize = 300;
pub const DEFAULT_SEED: u64 = 0x5eed_1a70;

const ALPHA_MIN: f32 = 0.001;
const VELOCITY_DECAY: f32 = 0.4;
const LINK_BASE_DISTANCE: f32 = 100.0;
const CHARGE_BASE: f32 = 500.0;
const CHARGE_PER_SIZE: f32 = 10.0;
const COLLIDE_BASE_RADIUS: f32 = 80.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub iterations: usize,
    /// Seed for the horizontal scatter targets; equal seeds give equal layouts.
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            padding: CANVAS_PADDING,
            iterations: ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl LayoutConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width / 2.0, self.height / 2.0)
    }

    pub fn band_y(&self, band: u8) -> f32 {
        self.height * (0.25 + f32::from(band) * 0.25)
    }

    fn alpha_decay(&self) -> f32 {
        1.0 - ALPHA_MIN.powf(1.0 / self.iterations.max(1) as f32)
    }

    fn clamp(&self, point: Vec2) -> Position {
        Position::new(
            clamp_axis(point.x, self.width, self.padding),
            clamp_axis(point.y, self.height, self.padding),
        )
    }
}

fn clamp_axis(value: f32, extent: f32, padding: f32) -> f32 {
    let value = if value.is_finite() { value } else { 0.0 };
    value.max(padding).min(extent - padding)
}

#[derive(Clone, Debug)]
struct Body {
    collide_radius: f32,
    charge: f32,
    band_y: f32,
    scatter_x: f32,
}

#[derive(Clone, Copy, Debug)]
struct Link {
    source: usize,
    target: usize,
    distance: f32,
    strength: f32,
    bias: f32,
}

struct SimContext {
    bodies: Vec<Body>,
    links: Vec<Link>,
    incident: Vec<Vec<usize>>,
    center: Vec2,
}

impl SimContext {
    fn build(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let bodies = nodes
            .iter()
            .map(|node| Body {
                collide_radius: COLLIDE_BASE_RADIUS + node.size,
                charge: -(CHARGE_BASE + node.size * CHARGE_PER_SIZE),
                band_y: config.band_y(node.node_type.band()),
                scatter_x: config.width * (0.3 + rng.r#gen::<f32>() * 0.4),
            })
            .collect::<Vec<_>>();

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect::<HashMap<_, _>>();
        let pairs = edges
            .iter()
            .filter_map(|edge| {
                let source = *index_by_id.get(edge.source.as_str())?;
                let target = *index_by_id.get(edge.target.as_str())?;
                (source != target).then_some((source, target))
            })
            .collect::<Vec<_>>();

        let mut counts = vec![0usize; nodes.len()];
        for &(source, target) in &pairs {
            counts[source] += 1;
            counts[target] += 1;
        }

        let mut incident = vec![Vec::new(); nodes.len()];
        let links = pairs
            .iter()
            .enumerate()
            .map(|(index, &(source, target))| {
                incident[source].push(index);
                incident[target].push(index);
                let (source_count, target_count) = (counts[source] as f32, counts[target] as f32);
                Link {
                    source,
                    target,
                    distance: LINK_BASE_DISTANCE + (nodes[source].size + nodes[target].size) / 2.0,
                    strength: 1.0 / source_count.min(target_count),
                    bias: source_count / (source_count + target_count),
                }
            })
            .collect::<Vec<_>>();

        if links.len() != edges.len() {
            debug!(
                dropped = edges.len() - links.len(),
                "ignoring edges without both endpoints in the layout set"
            );
        }

        Self {
            bodies,
            links,
            incident,
            center: config.center(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct SimState {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    centroid: Vec2,
    alpha: f32,
}

impl SimState {
    fn new(positions: Vec<Vec2>, velocities: Vec<Vec2>, alpha: f32) -> Self {
        let centroid = if positions.is_empty() {
            Vec2::ZERO
        } else {
            positions.iter().fold(Vec2::ZERO, |sum, point| sum + *point) / positions.len() as f32
        };
        Self {
            positions,
            velocities,
            centroid,
            alpha,
        }
    }

    fn at_rest(positions: Vec<Vec2>) -> Self {
        let velocities = vec![Vec2::ZERO; positions.len()];
        Self::new(positions, velocities, 1.0)
    }

    fn step(&self, context: &SimContext, alpha_decay: f32) -> Self {
        let alpha = self.alpha - self.alpha * alpha_decay;

        let (positions, velocities) = (0..self.positions.len())
            .map(|index| {
                let nudge = forces::FORCES
                    .iter()
                    .fold(Nudge::default(), |sum, force| {
                        sum + force(index, context, self, alpha)
                    });
                let velocity = (self.velocities[index] + nudge.velocity) * (1.0 - VELOCITY_DECAY);
                let position = self.positions[index] + nudge.position + velocity;
                (position, velocity)
            })
            .unzip();

        Self::new(positions, velocities, alpha)
    }
}

/// Starting point for a node: its rendered position when finite, else a grid
/// slot keyed by the numeric id (or the node's index when the id is not a number).
pub fn initial_position(node: &Node, index: usize) -> Vec2 {
    if let Some(position) = node.position
        && position.x.is_finite()
        && position.y.is_finite()
    {
        return vec2(position.x, position.y);
    }

    let slot = node.id.trim().parse::<u64>().unwrap_or(index as u64);
    vec2(200.0 + (slot % 3) as f32 * 300.0, 100.0 + (slot / 3) as f32 * 200.0)
}

/// Positions every node and returns the placed copies in input order.
pub fn layout_nodes(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Node> {
    let initial = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| initial_position(node, index))
        .collect::<Vec<_>>();

    let positions = if nodes.len() < 2 {
        initial
    } else {
        let context = SimContext::build(nodes, edges, config);
        let alpha_decay = config.alpha_decay();
        let mut state = SimState::at_rest(initial);
        for _ in 0..config.iterations {
            state = state.step(&context, alpha_decay);
        }
        state.positions
    };

    nodes
        .iter()
        .zip(positions)
        .map(|(node, point)| {
            let mut node = node.clone();
            node.position = Some(config.clamp(point));
            node
        })
        .collect()
}

/// Lays out a snapshot, producing a new one with the same edges and metadata.
pub fn layout_snapshot(snapshot: &GraphSnapshot, config: &LayoutConfig) -> GraphSnapshot {
    let nodes = layout_nodes(&snapshot.nodes, &snapshot.edges, config);
    GraphSnapshot::new(nodes, snapshot.edges.clone()).with_metadata(snapshot.metadata)
}
