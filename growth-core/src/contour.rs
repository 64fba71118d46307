//! Source and drawable polyline geometry.
//!
//! A [`Contour`] is what a host hands to the engine when registering a
//! path and what the engine hands back when asked for drawable output.
//! A [`Shape`] groups several contours (e.g. an outline plus its holes).

use crate::geometry::{Bounds, lerp};
use glam::Vec2;
use std::f32::consts::TAU;

/// Ordered polyline; a closed contour has an implicit edge from the last
/// point back to the first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

impl Contour {
    /// Creates a contour from raw points.
    ///
    /// ### Parameters
    /// - `points` - Ordered positions; may be empty.
    /// - `closed` - Whether the last point connects back to the first.
    pub fn new(points: Vec<Vec2>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// A contour with no points and nothing to draw.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Open polyline through `points`; its two ends stay free.
    pub fn open(points: Vec<Vec2>) -> Self {
        Self::new(points, false)
    }

    /// Closed outline through `points`.
    pub fn polygon(points: Vec<Vec2>) -> Self {
        Self::new(points, true)
    }

    /// Closed regular approximation of a circle, starting at angle zero.
    pub fn circle(center: Vec2, radius: f32, segments: usize) -> Self {
        let segments = segments.max(3);
        let points = (0..segments)
            .map(|i| {
                let t = i as f32 / segments as f32 * TAU;
                center + Vec2::new(t.cos(), t.sin()) * radius
            })
            .collect();
        Self::polygon(points)
    }

    /// Closed outline of a rectangle.
    pub fn rectangle(rect: Bounds) -> Self {
        Self::polygon(rect.corners().to_vec())
    }

    /// `true` when the contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points, not counting the implicit closing point.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Iterates the edges, including the closing edge of a closed contour.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        let count = match (n, self.closed) {
            (0 | 1, _) => 0,
            (_, true) => n,
            (_, false) => n - 1,
        };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Total arc length.
    pub fn length(&self) -> f32 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }

    /// Point located `distance` along the contour from its first point.
    ///
    /// The distance is clamped to `[0, length]`. Returns `None` only for a
    /// contour without points.
    pub fn point_at_length(&self, distance: f32) -> Option<Vec2> {
        let first = *self.points.first()?;
        let mut remaining = distance.max(0.0);
        let mut last = first;

        for (a, b) in self.segments() {
            let len = a.distance(b);
            if remaining <= len {
                if len <= f32::EPSILON {
                    return Some(a);
                }
                return Some(lerp(a, b, remaining / len));
            }
            remaining -= len;
            last = b;
        }

        Some(last)
    }

    /// Samples `count` points evenly spaced by arc length, starting at the
    /// first point. The end of an open contour is not sampled.
    pub fn resample(&self, count: usize) -> Vec<Vec2> {
        let perimeter = self.length();
        (0..count)
            .filter_map(|i| {
                let t = i as f32 / count as f32;
                self.point_at_length(t * perimeter)
            })
            .collect()
    }

    /// Points ready for a stroke renderer: closed contours repeat their
    /// first point at the end.
    pub fn polyline(&self) -> Vec<Vec2> {
        let mut out = self.points.clone();
        if self.closed
            && let Some(&first) = self.points.first()
        {
            out.push(first);
        }
        out
    }
}

/// A group of contours that belong together, such as a glyph and its holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    pub contours: Vec<Contour>,
}

impl Shape {
    /// Groups `contours`; the first is usually the outline, the rest holes.
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// `true` when no contour has anything to draw.
    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(Contour::is_empty)
    }
}

impl From<Contour> for Shape {
    fn from(contour: Contour) -> Self {
        Self::new(vec![contour])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Contour {
        Contour::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ])
    }

    #[test]
    fn closed_contour_includes_closing_edge() {
        let c = square();
        assert_eq!(c.segments().count(), 4);
        assert!((c.length() - 40.0).abs() < 1e-5);

        let open = Contour::open(c.points.clone());
        assert_eq!(open.segments().count(), 3);
        assert!((open.length() - 30.0).abs() < 1e-5);
    }

    #[test]
    fn point_at_length_walks_segments() {
        let c = square();
        assert_eq!(c.point_at_length(0.0), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(c.point_at_length(15.0), Some(Vec2::new(10.0, 5.0)));
        assert_eq!(c.point_at_length(35.0), Some(Vec2::new(0.0, 5.0)));
        // Clamped past the end.
        assert_eq!(c.point_at_length(100.0), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(Contour::empty().point_at_length(1.0), None);
    }

    #[test]
    fn resample_spaces_points_evenly() {
        let pts = square().resample(8);
        assert_eq!(pts.len(), 8);
        for (i, p) in pts.iter().enumerate() {
            let next = pts[(i + 1) % pts.len()];
            // Every corner is sampled, so each chord runs along one edge.
            assert!((p.distance(next) - 5.0).abs() < 1e-4, "{p:?} -> {next:?}");
        }
    }

    #[test]
    fn resample_single_point_contour_repeats_it() {
        let c = Contour::polygon(vec![Vec2::new(2.0, 3.0)]);
        let pts = c.resample(4);
        assert_eq!(pts, vec![Vec2::new(2.0, 3.0); 4]);
        assert!(Contour::empty().resample(4).is_empty());
    }

    #[test]
    fn polyline_repeats_first_point_when_closed() {
        let c = square();
        let line = c.polyline();
        assert_eq!(line.len(), 5);
        assert_eq!(line[0], line[4]);

        let open = Contour::open(vec![Vec2::ZERO, Vec2::ONE]);
        assert_eq!(open.polyline().len(), 2);
    }

    #[test]
    fn circle_points_lie_on_radius() {
        let c = Contour::circle(Vec2::new(5.0, 5.0), 3.0, 12);
        assert!(c.closed);
        assert_eq!(c.len(), 12);
        for p in &c.points {
            assert!((p.distance(Vec2::new(5.0, 5.0)) - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn rectangle_outlines_the_bounds() {
        let c = Contour::rectangle(Bounds::new(-2.0, 1.0, 8.0, 3.0));
        assert!(c.closed);
        assert_eq!(
            c.points,
            vec![
                Vec2::new(-2.0, 1.0),
                Vec2::new(6.0, 1.0),
                Vec2::new(6.0, 4.0),
                Vec2::new(-2.0, 4.0),
            ]
        );
        assert!((c.length() - 22.0).abs() < 1e-5);
        assert_eq!(c.resample(11).len(), 11);
    }

    #[test]
    fn shape_emptiness() {
        assert!(Shape::default().is_empty());
        assert!(Shape::new(vec![Contour::empty()]).is_empty());
        assert!(!Shape::from(square()).is_empty());
    }
}
