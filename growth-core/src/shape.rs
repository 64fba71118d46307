//! Paths that grow together from one multi-contour source shape.

use crate::{
    config::Settings,
    contour::Shape,
    error::GrowthError,
    path::GrowthPath,
    spatial_index::SpatialIndex,
    types::Color,
};
use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// A set of [`GrowthPath`]s created from the sub-contours of one [`Shape`]
/// (typically an outline and its holes).
///
/// The paths are independent apart from repelling each other through the
/// shared spatial index. Extinct paths are dropped after each iteration.
#[derive(Debug, Clone)]
pub struct GrowthShape {
    paths: Vec<GrowthPath>,
    color: Option<Color>,
    settings: Settings,
}

impl GrowthShape {
    /// Creates one path per non-empty sub-contour of `source`, each with its
    /// own generator seeded from `rng`.
    ///
    /// ### Errors
    /// - [`GrowthError::EmptyContour`] if `source` has no non-empty contour.
    /// - Any error from [`Settings::validate`].
    pub fn new(
        source: &Shape,
        settings: Settings,
        color: Option<Color>,
        rng: &mut impl Rng,
    ) -> Result<Self, GrowthError> {
        settings.validate()?;
        let paths = source
            .contours
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| GrowthPath::new(c, settings, None, StdRng::seed_from_u64(rng.random())))
            .collect::<Result<Vec<_>, _>>()?;

        if paths.is_empty() {
            return Err(GrowthError::EmptyContour);
        }
        if settings.debug_mode {
            tracing::debug!(paths = paths.len(), "created shape");
        }

        Ok(Self {
            paths,
            color,
            settings,
        })
    }

    /// Iterates every owned path, then forgets the ones that went extinct.
    pub fn iterate(&mut self, index: &SpatialIndex, now: f64) {
        for path in &mut self.paths {
            path.iterate(index, now);
        }

        let before = self.paths.len();
        self.paths.retain(|p| !p.is_extinct());
        if self.settings.debug_mode && self.paths.len() < before {
            tracing::debug!(
                removed = before - self.paths.len(),
                remaining = self.paths.len(),
                "dropped extinct paths from shape"
            );
        }
    }

    /// Current positions of all surviving paths.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.paths.iter().flat_map(|p| p.positions().iter().copied())
    }

    /// Surviving paths, in the order of their source contours.
    pub fn paths(&self) -> &[GrowthPath] {
        &self.paths
    }

    /// `true` once every path has gone extinct.
    pub fn is_extinct(&self) -> bool {
        self.paths.is_empty()
    }

    /// Display color shared by every path of the shape.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Drawable shape made of the surviving paths' contours.
    pub fn shape(&self) -> Shape {
        Shape::new(self.paths.iter().map(GrowthPath::contour).collect())
    }
}
