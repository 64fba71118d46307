//! Orchestration of many growth entities sharing one spatial index.
//!
//! A [`World`] step has a strict two-phase shape:
//!
//! 1. Snapshot — collect the current points of every registered path and
//!    shape and rebuild the [`SpatialIndex`] from their union.
//! 2. Iterate — advance every entity against that snapshot. No entity sees
//!    another entity's updated positions within the same step, so the
//!    order of iteration does not matter and entities may be advanced in
//!    parallel (see [`World::set_parallel`]).

use crate::{
    config::{PartialSettings, Settings},
    contour::{Contour, Shape},
    error::GrowthError,
    path::GrowthPath,
    shape::GrowthShape,
    spatial_index::SpatialIndex,
    types::{Color, PathId, ShapeId},
};
use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use std::collections::HashSet;

/// All growth entities of a simulation and the index they share.
///
/// ### Fields
/// - `settings` - Validated settings handed to every new entity.
/// - `paths` / `shapes` - Registered entities; a handle is an index here.
/// - `paused` - When set, [`World::step`] does nothing.
/// - `parallel` - Iterate entities on the rayon pool.
/// - `index` - Point index, rebuilt at the start of every step.
/// - `rng` - Seeds the private generator of each new entity.
#[derive(Debug)]
pub struct World {
    settings: Settings,
    paths: Vec<GrowthPath>,
    shapes: Vec<GrowthShape>,
    paused: bool,
    parallel: bool,
    index: SpatialIndex,
    rng: StdRng,
}

impl World {
    /// Creates a world whose settings are `partial` merged over the
    /// defaults. Injection randomness is seeded from the OS.
    pub fn new(partial: &PartialSettings) -> Result<Self, GrowthError> {
        Ok(Self::with_rng(
            Settings::from_partial(partial)?,
            StdRng::from_os_rng(),
        ))
    }

    /// Like [`World::new`], but every run with the same seed, inputs and
    /// time values produces the same geometry.
    pub fn with_seed(partial: &PartialSettings, seed: u64) -> Result<Self, GrowthError> {
        Ok(Self::with_rng(
            Settings::from_partial(partial)?,
            StdRng::seed_from_u64(seed),
        ))
    }

    fn with_rng(settings: Settings, rng: StdRng) -> Self {
        Self {
            settings,
            paths: Vec::new(),
            shapes: Vec::new(),
            paused: false,
            parallel: false,
            index: SpatialIndex::new(settings.repulsion_radius),
            rng,
        }
    }

    /// Registers a standalone path grown from `source`.
    ///
    /// The path is not stepped until the next [`World::step`].
    ///
    /// ### Parameters
    /// - `source` - Contour resampled into `sub_splits_number` points.
    /// - `color` - Display color handed back by [`World::contours`].
    ///
    /// ### Returns
    /// - `Ok(id)` - Handle usable with [`World::path`].
    /// - `Err(GrowthError::EmptyContour)` if `source` has no points.
    pub fn add_path(&mut self, source: &Contour, color: Option<Color>) -> Result<PathId, GrowthError> {
        let rng = StdRng::seed_from_u64(self.rng.random());
        let path = GrowthPath::new(source, self.settings, color, rng)?;
        self.paths.push(path);
        Ok(self.paths.len() - 1)
    }

    /// Registers one path per contour, all with the same color.
    pub fn add_paths(
        &mut self,
        sources: &[Contour],
        color: Option<Color>,
    ) -> Result<Vec<PathId>, GrowthError> {
        sources.iter().map(|c| self.add_path(c, color)).collect()
    }

    /// Registers a shape whose sub-contours grow as separate paths.
    pub fn add_shape(&mut self, source: &Shape, color: Option<Color>) -> Result<ShapeId, GrowthError> {
        let shape = GrowthShape::new(source, self.settings, color, &mut self.rng)?;
        self.shapes.push(shape);
        Ok(self.shapes.len() - 1)
    }

    /// Registers one shape per entry of `sources`, all with the same color.
    ///
    /// ### Returns
    /// The handles in the order of `sources`, or the first error. Shapes
    /// registered before the failing one stay registered.
    pub fn add_shapes(
        &mut self,
        sources: &[Shape],
        color: Option<Color>,
    ) -> Result<Vec<ShapeId>, GrowthError> {
        sources.iter().map(|s| self.add_shape(s, color)).collect()
    }

    /// Advances every entity by one step. `now` is the host's simulated
    /// time in seconds.
    ///
    /// Does nothing while paused: neither the entities nor the index change.
    pub fn step(&mut self, now: f64) {
        if self.paused {
            return;
        }

        let mut seen = HashSet::new();
        let points = self
            .points()
            .filter(|p| seen.insert(p.to_array().map(f32::to_bits)))
            .collect::<Vec<_>>();
        self.index.rebuild(points);

        if self.settings.debug_mode {
            tracing::debug!(
                points = self.index.len(),
                paths = self.paths.len(),
                shapes = self.shapes.len(),
                "rebuilt spatial index"
            );
        }

        let index = &self.index;
        if self.parallel {
            rayon::join(
                || self.paths.par_iter_mut().for_each(|p| p.iterate(index, now)),
                || self.shapes.par_iter_mut().for_each(|s| s.iterate(index, now)),
            );
        } else {
            for shape in &mut self.shapes {
                shape.iterate(index, now);
            }
            for path in &mut self.paths {
                path.iterate(index, now);
            }
        }
    }

    /// Current positions of every registered entity, duplicates included.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.shapes
            .iter()
            .flat_map(|s| s.points())
            .chain(self.paths.iter().flat_map(|p| p.positions().iter().copied()))
    }

    /// Freezes the world: [`World::step`] becomes a no-op.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Lets [`World::step`] advance the world again.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flips between paused and running.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Whether [`World::step`] is currently ignored.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Iterates entities on the rayon thread pool when enabled. Results are
    /// identical to sequential stepping.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Validated settings shared by every registered entity.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of distinct points seen by the last step.
    pub fn point_count(&self) -> usize {
        self.index.len()
    }

    /// Path registered under `id`, extinct or not.
    pub fn path(&self, id: PathId) -> Option<&GrowthPath> {
        self.paths.get(id)
    }

    /// Shape registered under `id`, extinct or not.
    pub fn shape(&self, id: ShapeId) -> Option<&GrowthShape> {
        self.shapes.get(id)
    }

    /// All registered paths, extinct ones included.
    pub fn growth_paths(&self) -> &[GrowthPath] {
        &self.paths
    }

    /// All registered shapes, extinct ones included.
    pub fn growth_shapes(&self) -> &[GrowthShape] {
        &self.shapes
    }

    /// Drawable contours of the paths that are still alive.
    pub fn contours(&self) -> Vec<(Contour, Option<Color>)> {
        self.paths
            .iter()
            .map(|p| (p.contour(), p.color()))
            .filter(|(c, _)| !c.is_empty())
            .collect()
    }

    /// Drawable shapes that still have at least one live contour.
    pub fn shapes(&self) -> Vec<(Shape, Option<Color>)> {
        self.shapes
            .iter()
            .map(|s| (s.shape(), s.color()))
            .filter(|(s, _)| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;

    fn partial() -> PartialSettings {
        PartialSettings {
            sub_splits_number: Some(40),
            min_distance: Some(0.5),
            max_distance: Some(4.0),
            repulsion_radius: Some(5.0),
            node_injection_interval: Some(0.05),
            ..PartialSettings::new(Bounds::centered(Vec2::ZERO, 300.0, 300.0))
        }
    }

    fn seeded_world(seed: u64) -> World {
        let mut world = World::with_seed(&partial(), seed).unwrap();
        world
            .add_path(&Contour::circle(Vec2::new(-12.0, 0.0), 10.0, 48), Some([1, 2, 3, 255]))
            .unwrap();
        world
            .add_path(&Contour::circle(Vec2::new(12.0, 0.0), 10.0, 48), None)
            .unwrap();
        world
            .add_shape(
                &Shape::new(vec![
                    Contour::circle(Vec2::new(0.0, 40.0), 15.0, 48),
                    Contour::circle(Vec2::new(0.0, 40.0), 5.0, 48),
                ]),
                None,
            )
            .unwrap();
        world
    }

    fn snapshot(world: &World) -> Vec<Vec<Vec2>> {
        world
            .growth_paths()
            .iter()
            .map(|p| p.positions().to_vec())
            .chain(
                world
                    .growth_shapes()
                    .iter()
                    .flat_map(|s| s.paths().iter().map(|p| p.positions().to_vec())),
            )
            .collect()
    }

    #[test]
    fn new_rejects_invalid_settings() {
        let bad = PartialSettings {
            repulsion_radius: Some(-1.0),
            ..partial()
        };
        assert!(World::new(&bad).is_err());
        assert!(World::new(&PartialSettings::new(Bounds::EMPTY)).is_err());
    }

    #[test]
    fn registration_does_not_step() {
        let world = seeded_world(1);
        assert_eq!(world.growth_paths().len(), 2);
        assert_eq!(world.growth_shapes().len(), 1);
        assert_eq!(world.point_count(), 0);
        assert_eq!(world.contours().len(), 2);
        assert_eq!(world.contours()[0].1, Some([1, 2, 3, 255]));
        assert_eq!(world.shapes().len(), 1);
    }

    #[test]
    fn add_shapes_registers_each_shape_with_its_own_id() {
        let mut world = World::with_seed(&partial(), 6).unwrap();
        let ring = Shape::new(vec![
            Contour::circle(Vec2::new(-60.0, 0.0), 20.0, 48),
            Contour::circle(Vec2::new(-60.0, 0.0), 8.0, 48),
        ]);
        let block = Shape::from(Contour::rectangle(Bounds::new(40.0, -10.0, 30.0, 20.0)));

        let ids = world.add_shapes(&[ring, block], Some([9, 9, 9, 255])).unwrap();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(world.growth_shapes().len(), 2);
        assert_eq!(world.shape(1).unwrap().paths().len(), 1);

        let drawn = world.shapes();
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn[0].0.contours.len(), 2);
        assert_eq!(drawn[1].0.contours.len(), 1);
        assert!(drawn.iter().all(|(_, c)| *c == Some([9, 9, 9, 255])));

        world.step(0.0);
        assert_eq!(world.point_count(), 40 * 3);
    }

    #[test]
    fn add_shapes_stops_at_the_first_invalid_shape() {
        let mut world = World::with_seed(&partial(), 6).unwrap();
        let good = Shape::from(Contour::circle(Vec2::ZERO, 10.0, 32));
        let err = world
            .add_shapes(&[good, Shape::new(vec![Contour::empty()])], None)
            .unwrap_err();
        assert!(matches!(err, GrowthError::EmptyContour));
        assert_eq!(world.growth_shapes().len(), 1);
    }

    #[test]
    fn step_indexes_the_union_of_all_points() {
        let mut world = seeded_world(1);
        let before = world.points().count();
        world.step(0.0);
        assert_eq!(world.point_count(), before);
    }

    #[test]
    fn duplicate_points_are_indexed_once() {
        let mut world = World::with_seed(&partial(), 3).unwrap();
        let circle = Contour::circle(Vec2::ZERO, 10.0, 48);
        world.add_paths(&[circle.clone(), circle], None).unwrap();

        world.step(0.0);
        assert_eq!(world.point_count(), 40);
    }

    #[test]
    fn paused_world_is_frozen() {
        let mut world = seeded_world(2);
        world.step(0.0);
        let before = snapshot(&world);
        let indexed = world.point_count();

        world.pause();
        for t in 1..50 {
            world.step(t as f64);
        }
        assert_eq!(snapshot(&world), before);
        assert_eq!(world.point_count(), indexed);

        world.toggle_pause();
        assert!(!world.is_paused());
        world.step(100.0);
        assert_ne!(snapshot(&world), before);
    }

    #[test]
    fn entities_see_the_snapshot_taken_at_step_start() {
        let mut world = seeded_world(4);
        world.step(0.0);

        // Replay the next step by hand: build the index from the current
        // state once, then iterate clones of every entity against it.
        let index = SpatialIndex::build(
            {
                let mut seen = HashSet::new();
                world
                    .points()
                    .filter(|p| seen.insert(p.to_array().map(f32::to_bits)))
                    .collect::<Vec<_>>()
            },
            world.settings().repulsion_radius,
        );
        let mut paths = world.growth_paths().to_vec();
        let mut shapes = world.growth_shapes().to_vec();
        // Reverse order on purpose: order must not matter.
        for p in paths.iter_mut().rev() {
            p.iterate(&index, 0.02);
        }
        for s in shapes.iter_mut().rev() {
            s.iterate(&index, 0.02);
        }

        world.step(0.02);
        for (a, b) in world.growth_paths().iter().zip(&paths) {
            assert_eq!(a.positions(), b.positions());
        }
        for (a, b) in world.growth_shapes().iter().zip(&shapes) {
            assert_eq!(a.points().collect::<Vec<_>>(), b.points().collect::<Vec<_>>());
        }
    }

    #[test]
    fn parallel_and_sequential_steps_agree() {
        let mut seq = seeded_world(9);
        let mut par = seeded_world(9);
        par.set_parallel(true);

        for i in 0..30 {
            let now = i as f64 * 0.1;
            seq.step(now);
            par.step(now);
        }
        assert_eq!(snapshot(&seq), snapshot(&par));
    }

    #[test]
    fn extinct_paths_stay_registered_but_draw_nothing() {
        let mut world = World::with_seed(&partial(), 5).unwrap();
        // Entirely outside the bounds: extinct after the first step.
        world
            .add_path(&Contour::circle(Vec2::new(1000.0, 0.0), 10.0, 16), None)
            .unwrap();
        world
            .add_path(&Contour::circle(Vec2::ZERO, 10.0, 16), None)
            .unwrap();

        world.step(0.0);
        assert_eq!(world.growth_paths().len(), 2);
        assert!(world.path(0).unwrap().is_extinct());
        assert_eq!(world.contours().len(), 1);

        let alive = world.path(1).unwrap().positions().len();
        world.step(0.1);
        assert_eq!(world.point_count(), alive);
    }
}
