//! Uniform grid over a point set for fixed-radius neighbor queries.
//!
//! The world rebuilds one [`SpatialIndex`] from the union of all live
//! vertices at the start of every step, then hands out shared references
//! to it while the entities iterate. Cells are sized from the repulsion
//! radius, so a repulsion query only visits the 3x3 block of cells around
//! the query point.

use glam::Vec2;

/// Upper bound on cells per axis; sparse, very spread-out point sets get
/// coarser cells instead of a huge grid.
const MAX_CELLS_PER_AXIS: usize = 512;

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// Requested minimum cell size.
    cell_size: f32,
    /// Cell size of the current build.
    cell: f32,
    origin: Vec2,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
    points: Vec<Vec2>,
}

impl SpatialIndex {
    /// Creates an empty index whose cells are at least `cell_size` wide.
    ///
    /// Non-positive or non-finite sizes fall back to `1.0`.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cell: cell_size,
            origin: Vec2::ZERO,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            points: Vec::new(),
        }
    }

    /// Builds an index over `points` in one go.
    pub fn build(points: impl IntoIterator<Item = Vec2>, cell_size: f32) -> Self {
        let mut index = Self::new(cell_size);
        index.rebuild(points);
        index
    }

    /// Replaces the indexed point set, reusing the cell allocations.
    ///
    /// Non-finite points are skipped.
    pub fn rebuild(&mut self, points: impl IntoIterator<Item = Vec2>) {
        self.points.clear();
        self.points.extend(points.into_iter().filter(|p| p.is_finite()));

        if self.points.is_empty() {
            self.cols = 0;
            self.rows = 0;
            self.cells.clear();
            return;
        }

        let (min, max) = self
            .points
            .iter()
            .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            });
        let extent = max - min;
        let cell = self
            .cell_size
            .max(extent.max_element() / MAX_CELLS_PER_AXIS as f32);

        self.origin = min;
        self.cols = (extent.x / cell) as usize + 1;
        self.rows = (extent.y / cell) as usize + 1;
        let wanted = self.cols * self.rows;
        self.cells.truncate(wanted);
        for bucket in &mut self.cells {
            bucket.clear();
        }
        self.cells.resize_with(wanted, Vec::new);

        self.cell = cell;
        for (i, p) in self.points.iter().enumerate() {
            let (cx, cy) = Self::cell_coords(self.origin, cell, *p);
            let cx = cx.min(self.cols - 1);
            let cy = cy.min(self.rows - 1);
            self.cells[cy * self.cols + cx].push(i);
        }
    }

    #[inline]
    fn cell_coords(origin: Vec2, cell: f32, p: Vec2) -> (usize, usize) {
        let local = ((p - origin) / cell).max(Vec2::ZERO);
        (local.x as usize, local.y as usize)
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All indexed points within `radius` of `center` (boundary included).
    ///
    /// The point equal to `center`, if indexed, is returned as well.
    pub fn within_radius(&self, center: Vec2, radius: f32) -> impl Iterator<Item = Vec2> + '_ {
        let r2 = radius * radius;
        let (xs, ys) = self.cell_span(center, radius);

        ys.flat_map(move |cy| xs.clone().map(move |cx| cy * self.cols + cx))
            .flat_map(move |c| self.cells[c].iter())
            .map(move |&i| self.points[i])
            .filter(move |p| p.distance_squared(center) <= r2)
    }

    /// Cell ranges overlapped by the query square; empty when it misses
    /// the grid.
    fn cell_span(
        &self,
        center: Vec2,
        radius: f32,
    ) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        if self.points.is_empty() || !center.is_finite() || !(radius >= 0.0) {
            return (0..0, 0..0);
        }
        let cell = self.cell;
        let lo = ((center - Vec2::splat(radius) - self.origin) / cell).floor();
        let hi = ((center + Vec2::splat(radius) - self.origin) / cell).floor();

        let axis = |lo: f32, hi: f32, count: usize| {
            if hi < 0.0 || lo >= count as f32 {
                return 0..0;
            }
            let start = lo.max(0.0) as usize;
            let end = (hi as usize).min(count - 1) + 1;
            start..end
        };

        (axis(lo.x, hi.x, self.cols), axis(lo.y, hi.y, self.rows))
    }
}
