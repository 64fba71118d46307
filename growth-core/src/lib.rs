//! Core 2-D differential growth engine.
//!
//! Polylines grow frame by frame under local forces (attraction to path
//! neighbors, alignment, repulsion from every nearby point in the world and
//! from the bounds) combined with adaptive resampling.
//!
//! Main components:
//! - [`geometry`] — vector helpers and the bounding rectangle.
//! - [`contour`] — source and drawable polylines and shapes.
//! - [`spatial_index`] — grid for fixed-radius neighbor queries.
//! - [`config`] — engine settings and their partial overlay.
//! - [`forces`] — the per-vertex force model.
//! - [`vertex`] — transient neighbor view over a path's positions.
//! - [`path`] — a single growing contour and its resampling rules.
//! - [`shape`] — paths grown together from one multi-contour shape.
//! - [`world`] — orchestration of all entities over a shared index.
//! - [`types`] — shared handles and the display color type.

pub mod config;
pub mod contour;
pub mod error;
pub mod forces;
pub mod geometry;
pub mod path;
pub mod shape;
pub mod spatial_index;
pub mod types;
pub mod vertex;
pub mod world;

pub use config::{BoundaryRepulsion, PartialSettings, Settings};
pub use contour::{Contour, Shape};
pub use error::GrowthError;
pub use geometry::Bounds;
pub use path::GrowthPath;
pub use shape::GrowthShape;
pub use world::World;
