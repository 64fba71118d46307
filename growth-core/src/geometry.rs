//! Small 2-D geometry helpers shared by the force model and the paths.
//!
//! Points are plain [`glam::Vec2`] values; everything here is value based
//! and side-effect free.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Linear interpolation `a + (b - a) * t`.
///
/// Written out explicitly so that `lerp(a, a, t)` returns `a` bit for bit.
#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Midpoint of two points.
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) / 2.0
}

/// Returns the point of segment `[a, b]` closest to `p`.
///
/// The orthogonal projection of `p` is clamped to the segment. A
/// zero-length segment yields `a`.
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// Axis-aligned rectangle described by its top-left corner and size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// A zero-sized rectangle at the origin. Never valid for a simulation.
    pub const EMPTY: Bounds = Bounds {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a rectangle from its minimum corner `(x, y)` and its size.
    ///
    /// No validation happens here; see [`Bounds::is_empty`].
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Maximum corner, just outside the rectangle for [`Bounds::contains`].
    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Center of the rectangle.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// `true` when the rectangle has no positive area or is not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// Containment test, inclusive of the minimum edges and exclusive of
    /// the maximum edges.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// The four corners in clockwise order starting at the minimum corner.
    pub fn corners(&self) -> [Vec2; 4] {
        let min = self.min();
        let max = self.max();
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }

    /// Nearest point of the rectangle perimeter to `p`, with its distance.
    ///
    /// Works for points inside as well as outside the rectangle.
    pub fn closest_boundary_point(&self, p: Vec2) -> (f32, Vec2) {
        let corners = self.corners();
        let mut distance = f32::INFINITY;
        let mut closest = corners[0];

        for i in 0..corners.len() {
            let a = corners[i];
            let b = corners[(i + 1) % corners.len()];
            let candidate = closest_point_on_segment(a, b, p);
            let d = candidate.distance(p);
            if d < distance {
                distance = d;
                closest = candidate;
            }
        }

        (distance, closest)
    }
}
