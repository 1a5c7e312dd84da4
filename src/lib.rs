//! Ray visibility queries against static triangle mesh scenes.
//!
//! Meshes of a [`Scene`] are flattened into world space triangles, bounded by a
//! binary hierarchy and queried for the closest hit along a [`Ray`].

pub mod accel;
pub mod geometry;
pub mod scene;

pub use accel::{
    Accel, AccelConfig, AccelError, Bvh, GeometryError,
    bvh::{BvhStatistics, Distribution},
};
pub use geometry::Ray;
pub use scene::{Intersection, Mesh, Primitive, Scene, StaticScene, SurfaceGeometry, TriangleHit};
