//! Force model applied to every vertex of a growing path.
//!
//! All functions here are pure: they read a [`Vertex`] (and, for
//! repulsion, the step's [`SpatialIndex`]) and return a force vector to be
//! accumulated. The net force on a vertex is:
//!
//! 1. [`attraction_to_neighbors`] — pull toward the previous and next vertex,
//!    disabled once they are closer than `min_distance`.
//! 2. [`repulsion_from_nearby`] — push away from every indexed point in
//!    `repulsion_radius`, whichever entity it belongs to.
//! 3. [`alignment_to_neighbors`] — pull toward the midpoint of both
//!    neighbors, smoothing the path locally.
//! 4. [`boundary_repulsion`] — push near the edges of the bounding rectangle.

use crate::{
    config::{BoundaryRepulsion, Settings},
    geometry::{Bounds, lerp, midpoint},
    spatial_index::SpatialIndex,
    vertex::Vertex,
};
use glam::Vec2;

/// Magnitude applied to the boundary push.
pub const BOUNDARY_REPULSION_SCALE: f32 = 1.5;

/// Delta that moves `position` a fraction `intensity` of the way to `target`.
///
/// Returns [`Vec2::ZERO`] when `min_distance` is given and `position` is
/// already within it of `target`.
pub fn attraction(position: Vec2, target: Vec2, intensity: f32, min_distance: Option<f32>) -> Vec2 {
    match min_distance {
        Some(min) if position.distance(target) <= min => Vec2::ZERO,
        _ => lerp(position, target, intensity) - position,
    }
}

/// Sum of [`attraction`] toward each present neighbor.
pub fn attraction_to_neighbors(vertex: &Vertex, min_distance: f32, intensity: f32) -> Vec2 {
    [vertex.next, vertex.previous]
        .into_iter()
        .flatten()
        .map(|n| attraction(vertex.position, n, intensity, Some(min_distance)))
        .sum()
}

/// Attraction toward the midpoint of both neighbors, zero at open ends.
pub fn alignment_to_neighbors(vertex: &Vertex, intensity: f32) -> Vec2 {
    match (vertex.previous, vertex.next) {
        (Some(prev), Some(next)) => attraction(vertex.position, midpoint(prev, next), intensity, None),
        _ => Vec2::ZERO,
    }
}

/// Push away from every indexed point within `radius` of the vertex.
///
/// Each point contributes a unit vector scaled by `intensity`, regardless of
/// its distance. Points equal to the vertex position are ignored.
pub fn repulsion_from_nearby(
    vertex: &Vertex,
    radius: f32,
    intensity: f32,
    index: &SpatialIndex,
) -> Vec2 {
    let position = vertex.position;
    index
        .within_radius(position, radius)
        .filter(|&p| p != position)
        .map(|p| (position - p).normalize_or_zero() * intensity)
        .sum()
}

/// Push applied to a vertex closer than `radius` to the bounds perimeter.
///
/// Points exactly on the perimeter (distance zero) get no push.
pub fn boundary_repulsion(
    position: Vec2,
    bounds: &Bounds,
    radius: f32,
    mode: BoundaryRepulsion,
) -> Vec2 {
    let (distance, closest) = bounds.closest_boundary_point(position);
    if !(distance > 0.0 && distance < radius) {
        return Vec2::ZERO;
    }
    let direction = match mode {
        BoundaryRepulsion::Legacy => -(closest + position),
        BoundaryRepulsion::Outward => position - closest,
    };
    direction.normalize_or_zero() * BOUNDARY_REPULSION_SCALE
}

/// Net force on a vertex for one step.
///
/// Vertices outside the bounds get no force; they are dropped at the end of
/// the step.
pub fn net_force(vertex: &Vertex, settings: &Settings, index: &SpatialIndex) -> Vec2 {
    if !settings.bounds.contains(vertex.position) {
        return Vec2::ZERO;
    }

    attraction_to_neighbors(vertex, settings.min_distance, settings.attraction_force)
        + repulsion_from_nearby(
            vertex,
            settings.repulsion_radius,
            settings.repulsion_force,
            index,
        )
        + alignment_to_neighbors(vertex, settings.alignment_force)
        + boundary_repulsion(
            vertex.position,
            &settings.bounds,
            settings.repulsion_radius,
            settings.boundary_repulsion,
        )
}
