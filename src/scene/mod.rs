mod mesh;
mod surface;

use std::sync::Arc;

pub use mesh::Mesh;
pub use surface::{Intersection, SurfaceGeometry, TriangleHit};

use crate::geometry::{Triangle, WorldPoint, WorldTransform};

/// Scene object instance, a mesh placed into the world.
#[derive(Clone, Debug)]
pub struct Primitive {
    /// Primitives without a mesh (lights, sensors) are invisible to ray queries.
    pub mesh: Option<Arc<Mesh>>,
    pub transform: WorldTransform,
}

impl Primitive {
    pub fn new(mesh: Arc<Mesh>, transform: WorldTransform) -> Self {
        Primitive {
            mesh: Some(mesh),
            transform,
        }
    }

    pub fn without_mesh(transform: WorldTransform) -> Self {
        Primitive {
            mesh: None,
            transform,
        }
    }

    /// World space vertices of a mesh face.
    /// Returns None for primitives without a mesh and for faces or vertices that don't exist.
    pub fn world_triangle(&self, face_index: usize) -> Option<Triangle<WorldPoint>> {
        let mesh = self.mesh.as_ref()?;
        if face_index >= mesh.num_faces() {
            return None;
        }

        let face = mesh.face(face_index);
        if face.iter().any(|v| *v >= mesh.num_vertices()) {
            return None;
        }

        Some(face.map(|v| self.transform.transform_point(&mesh.position(*v))))
    }
}

/// Read only view of the renderable scene, as seen by the acceleration structures.
pub trait Scene {
    fn num_primitives(&self) -> usize;

    /// Panics if index is out of range.
    fn primitive_at(&self, index: usize) -> &Primitive;
}

/// Scene that is just a list of primitives.
#[derive(Clone, Debug, Default)]
pub struct StaticScene {
    pub primitives: Vec<Primitive>,
}

impl StaticScene {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        StaticScene { primitives }
    }
}

impl Scene for StaticScene {
    fn num_primitives(&self) -> usize {
        self.primitives.len()
    }

    fn primitive_at(&self, index: usize) -> &Primitive {
        &self.primitives[index]
    }
}
