use std::ops::Add;

use eframe::egui::{Vec2, vec2};

use super::{SimContext, SimState};

pub(super) const CHARGE_DISTANCE_MAX: f32 = 300.0;
const CHARGE_DISTANCE_MIN: f32 = 1.0;
pub(super) const COLLISION_STRENGTH: f32 = 1.0;
pub(super) const TYPE_BAND_STRENGTH: f32 = 0.5;
pub(super) const SCATTER_STRENGTH: f32 = 0.1;
const JIGGLE: f32 = 1e-6;

/// What a single force asks of one node for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Nudge {
    pub velocity: Vec2,
    pub position: Vec2,
}

impl Nudge {
    fn velocity(velocity: Vec2) -> Self {
        Self {
            velocity,
            position: Vec2::ZERO,
        }
    }
}

impl Add for Nudge {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            velocity: self.velocity + other.velocity,
            position: self.position + other.position,
        }
    }
}

pub(super) type ForceFn = fn(usize, &SimContext, &SimState, f32) -> Nudge;

// Summation order.
pub(super) const FORCES: [ForceFn; 6] = [link, charge, center, collide, type_band, scatter];

// Coincident points get a tiny golden-angle offset so they can separate.
fn jiggle(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * JIGGLE
}

// Bias splits the correction by degree: hubs move less than leaves.
pub(super) fn link(index: usize, context: &SimContext, state: &SimState, alpha: f32) -> Nudge {
    let mut velocity = Vec2::ZERO;
    for &link_index in &context.incident[index] {
        let link = &context.links[link_index];
        let source = state.positions[link.source] + state.velocities[link.source];
        let target = state.positions[link.target] + state.velocities[link.target];

        let mut delta = target - source;
        if delta.length_sq() == 0.0 {
            delta = jiggle(link.source, link.target);
        }
        let distance = delta.length();
        let pull = delta * ((distance - link.distance) / distance * alpha * link.strength);

        if index == link.target {
            velocity -= pull * link.bias;
        } else {
            velocity += pull * (1.0 - link.bias);
        }
    }
    Nudge::velocity(velocity)
}

pub(super) fn charge(index: usize, context: &SimContext, state: &SimState, alpha: f32) -> Nudge {
    let point = state.positions[index];
    let max_sq = CHARGE_DISTANCE_MAX * CHARGE_DISTANCE_MAX;
    let min_sq = CHARGE_DISTANCE_MIN * CHARGE_DISTANCE_MIN;

    let mut velocity = Vec2::ZERO;
    for (other, body) in context.bodies.iter().enumerate() {
        if other == index {
            continue;
        }

        let mut delta = state.positions[other] - point;
        let mut distance_sq = delta.length_sq();
        if distance_sq >= max_sq {
            continue;
        }
        if distance_sq == 0.0 {
            delta = jiggle(index, other);
            distance_sq = delta.length_sq();
        }
        if distance_sq < min_sq {
            distance_sq = (min_sq * distance_sq).sqrt();
        }

        velocity += delta * (body.charge * alpha / distance_sq);
    }
    Nudge::velocity(velocity)
}

pub(super) fn center(_index: usize, context: &SimContext, state: &SimState, _alpha: f32) -> Nudge {
    if state.positions.is_empty() {
        return Nudge::default();
    }
    Nudge {
        velocity: Vec2::ZERO,
        position: context.center - state.centroid,
    }
}

// Not scaled by alpha.
pub(super) fn collide(index: usize, context: &SimContext, state: &SimState, _alpha: f32) -> Nudge {
    let radius = context.bodies[index].collide_radius;
    let radius_sq = radius * radius;
    let predicted = state.positions[index] + state.velocities[index];

    let mut velocity = Vec2::ZERO;
    for (other, body) in context.bodies.iter().enumerate() {
        if other == index {
            continue;
        }

        let reach = radius + body.collide_radius;
        let mut delta = predicted - (state.positions[other] + state.velocities[other]);
        let mut distance_sq = delta.length_sq();
        if distance_sq >= reach * reach {
            continue;
        }
        if distance_sq == 0.0 {
            let push = jiggle(index.min(other), index.max(other));
            delta = if index < other { push } else { -push };
            distance_sq = delta.length_sq();
        }

        let distance = distance_sq.sqrt();
        let overlap = (reach - distance) / distance * COLLISION_STRENGTH;
        let other_sq = body.collide_radius * body.collide_radius;
        let share = other_sq / (radius_sq + other_sq);
        velocity += delta * (overlap * share);
    }
    Nudge::velocity(velocity)
}

pub(super) fn type_band(index: usize, context: &SimContext, state: &SimState, alpha: f32) -> Nudge {
    let target = context.bodies[index].band_y;
    let pull = (target - state.positions[index].y) * TYPE_BAND_STRENGTH * alpha;
    Nudge::velocity(vec2(0.0, pull))
}

pub(super) fn scatter(index: usize, context: &SimContext, state: &SimState, alpha: f32) -> Nudge {
    let target = context.bodies[index].scatter_x;
    let pull = (target - state.positions[index].x) * SCATTER_STRENGTH * alpha;
    Nudge::velocity(vec2(pull, 0.0))
}
