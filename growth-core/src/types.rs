/// Handle of a standalone path registered with a [`crate::world::World`].
///
/// This is an index into the world's path list. Paths are never removed
/// from a world, so a handle stays valid for the world's lifetime.
pub type PathId = usize;

/// Handle of a shape registered with a [`crate::world::World`].
pub type ShapeId = usize;

/// Display color attached to an entity, as straight RGBA bytes.
///
/// The engine only stores it for the host; it plays no part in the
/// simulation.
pub type Color = [u8; 4];
