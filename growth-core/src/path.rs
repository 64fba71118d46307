//! A single growing contour.
//!
//! A [`GrowthPath`] stores only its ordered positions and a closedness
//! flag. Every call to [`GrowthPath::iterate`] runs the same pipeline:
//!
//! 1. Derive the transient [`Vertex`] view and apply [`forces::net_force`]
//!    to every vertex, moving it `max_velocity` of the way along the force.
//! 2. [`split_long_edges`] — insert the midpoint of every edge longer than
//!    `max_distance`.
//! 3. [`prune_short_edges`] — drop vertices closer than `min_distance` to
//!    their next neighbor.
//! 4. [`inject_random`] — at most once per `node_injection_interval` of
//!    simulated time, insert a midpoint before a random vertex.
//! 5. Drop positions that left the bounds, and go extinct when the path
//!    degenerates (closed with two points or fewer, or no points at all).
//!
//! Extinction is terminal: an extinct path never moves again.

use crate::{
    config::Settings,
    contour::Contour,
    error::GrowthError,
    forces,
    geometry::{lerp, midpoint},
    spatial_index::SpatialIndex,
    types::Color,
    vertex::{Vertex, vertices},
};
use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// One growing polyline.
///
/// ### Fields
/// - `positions` - Ordered points; the only state carried across steps.
/// - `closed` - Whether the last point connects back to the first.
/// - `extinct` - Set once the path collapses or leaves the bounds.
/// - `last_injection` - Simulated time of the last injection attempt.
/// - `settings` - Validated settings, copied at creation.
/// - `color` - Opaque display color for the host.
/// - `rng` - Private source for random injection.
#[derive(Debug, Clone)]
pub struct GrowthPath {
    positions: Vec<Vec2>,
    closed: bool,
    extinct: bool,
    last_injection: f64,
    settings: Settings,
    color: Option<Color>,
    rng: StdRng,
}

impl GrowthPath {
    /// Resamples `source` into `settings.sub_splits_number` points evenly
    /// spaced by arc length. The path is closed iff `source` is.
    ///
    /// ### Errors
    /// - [`GrowthError::EmptyContour`] if `source` has no points.
    /// - Any error from [`Settings::validate`].
    pub fn new(
        source: &Contour,
        settings: Settings,
        color: Option<Color>,
        rng: StdRng,
    ) -> Result<Self, GrowthError> {
        settings.validate()?;
        if source.is_empty() {
            return Err(GrowthError::EmptyContour);
        }

        let positions = source.resample(settings.sub_splits_number);
        if settings.debug_mode {
            tracing::debug!(count = positions.len(), closed = source.closed, "created path");
        }

        Ok(Self {
            positions,
            closed: source.closed,
            extinct: false,
            last_injection: 0.0,
            settings,
            color,
            rng,
        })
    }

    /// Same as [`GrowthPath::new`] with a generator seeded from `seed`.
    pub fn with_seed(source: &Contour, settings: Settings, seed: u64) -> Result<Self, GrowthError> {
        Self::new(source, settings, None, StdRng::seed_from_u64(seed))
    }

    /// Advances the path by one step against `index`.
    ///
    /// `now` is the host's simulated time in seconds; it only drives the
    /// injection interval. Does nothing once the path is extinct.
    pub fn iterate(&mut self, index: &SpatialIndex, now: f64) {
        if self.extinct {
            return;
        }
        let s = &self.settings;
        let before = self.positions.len();

        let moved: Vec<Vec2> = vertices(&self.positions, self.closed)
            .iter()
            .map(|v| {
                let force = forces::net_force(v, s, index);
                lerp(v.position, v.position + force, s.max_velocity)
            })
            .collect();

        let split = split_long_edges(&moved, self.closed, s.max_distance);
        if s.debug_mode {
            for (i, v) in vertices(&split, self.closed).iter().enumerate() {
                if is_crowded(v, s.min_distance) {
                    tracing::debug!(index = i, position = ?v.position, "pruned vertex");
                }
            }
        }
        let mut next = prune_short_edges(&split, self.closed, s.min_distance);

        if next.len() > 3 && now - self.last_injection >= s.node_injection_interval {
            let injected = inject_random(&mut next, self.closed, s.min_distance, &mut self.rng);
            if s.debug_mode && let Some(at) = injected {
                tracing::debug!(index = at, position = ?next[at], "injected vertex");
            }
            self.last_injection = now;
        }

        next.retain(|p| s.bounds.contains(*p));

        if next.is_empty() || (self.closed && next.len() <= 2) {
            next.clear();
            self.extinct = true;
            if s.debug_mode {
                tracing::debug!(before, "path went extinct");
            }
        }

        if s.debug_mode {
            tracing::debug!(before, after = next.len(), "iterated path");
        }
        self.positions = next;
    }

    /// Current positions; empty iff the path is extinct.
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Whether the path wraps around. Fixed at creation.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` once the path has collapsed. Never reverts.
    pub fn is_extinct(&self) -> bool {
        self.extinct
    }

    /// Display color given at registration, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Settings the path was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Simulated time of the last injection attempt.
    pub fn last_injection(&self) -> f64 {
        self.last_injection
    }

    /// Drawable geometry. Extinct paths, and closed paths of two points or
    /// fewer, yield an empty contour.
    pub fn contour(&self) -> Contour {
        if self.extinct || self.positions.is_empty() || (self.closed && self.positions.len() <= 2)
        {
            return Contour::empty();
        }
        Contour::new(self.positions.clone(), self.closed)
    }
}

/// Inserts the midpoint of every edge longer than `max_distance`.
///
/// For a closed path the wrap-around edge is considered too; its midpoint is
/// appended after the last position.
pub fn split_long_edges(positions: &[Vec2], closed: bool, max_distance: f32) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(positions.len() + positions.len() / 4);
    for v in vertices(positions, closed) {
        out.push(v.position);
        if let Some(next) = v.next
            && v.position.distance(next) > max_distance
        {
            out.push(midpoint(v.position, next));
        }
    }
    out
}

/// Keeps a vertex only if it is farther than `min_distance` from its next
/// neighbor. The tail of an open path has no next neighbor and is kept.
///
/// Neighbors are taken from the input sequence, so removing one vertex does
/// not change the decision for the others.
pub fn prune_short_edges(positions: &[Vec2], closed: bool, min_distance: f32) -> Vec<Vec2> {
    vertices(positions, closed)
        .into_iter()
        .filter(|v| !is_crowded(v, min_distance))
        .map(|v| v.position)
        .collect()
}

/// `true` when `vertex` lies within `min_distance` of its next neighbor.
fn is_crowded(vertex: &Vertex, min_distance: f32) -> bool {
    vertex
        .next
        .is_some_and(|next| vertex.position.distance(next) <= min_distance)
}

/// Picks a random non-first vertex and, if it has both neighbors and lies
/// farther than `min_distance` from its previous one, inserts their
/// midpoint right before it.
///
/// Returns the index of the inserted position. Paths with fewer than two
/// positions are left untouched.
pub fn inject_random(
    positions: &mut Vec<Vec2>,
    closed: bool,
    min_distance: f32,
    rng: &mut impl Rng,
) -> Option<usize> {
    if positions.len() < 2 {
        return None;
    }
    let i = rng.random_range(1..positions.len());
    let vertex = Vertex::at(positions, i, closed);

    match (vertex.previous, vertex.next) {
        (Some(prev), Some(_)) if vertex.position.distance(prev) > min_distance => {
            positions.insert(i, midpoint(vertex.position, prev));
            Some(i)
        }
        _ => None,
    }
}
