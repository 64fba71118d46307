//! Transient neighbor view over a path's positions.
//!
//! Paths store nothing but their ordered positions. Each step the engine
//! derives a [`Vertex`] per position, carrying the positions of its
//! topological neighbors. Closed paths wrap around; the two ends of an
//! open path have a missing neighbor.

use glam::Vec2;

/// A position with its neighbors; `None` at the ends of an open path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec2,
    pub previous: Option<Vec2>,
    pub next: Option<Vec2>,
}

impl Vertex {
    /// Builds the view of `positions[i]`.
    ///
    /// ### Panics
    /// Panics if `i` is out of bounds.
    pub fn at(positions: &[Vec2], i: usize, closed: bool) -> Self {
        let n = positions.len();
        let previous = if i > 0 {
            Some(positions[i - 1])
        } else if closed {
            Some(positions[n - 1])
        } else {
            None
        };
        let next = if i + 1 < n {
            Some(positions[i + 1])
        } else if closed {
            Some(positions[0])
        } else {
            None
        };

        Self {
            position: positions[i],
            previous,
            next,
        }
    }
}

/// Derives the vertex list for an ordered sequence of positions.
pub fn vertices(positions: &[Vec2], closed: bool) -> Vec<Vertex> {
    (0..positions.len())
        .map(|i| Vertex::at(positions, i, closed))
        .collect()
}
