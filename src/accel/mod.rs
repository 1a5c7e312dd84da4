//! Acceleration structures answering "what does this ray hit first".
//!
//! Every structure is built once from a static scene and then queried read-only,
//! possibly from many threads at once.

pub mod bvh;

use bon::Builder;
use thiserror::Error;

use crate::{
    geometry::{EPSILON, FloatType, Ray},
    scene::{Intersection, Scene},
};

pub use bvh::Bvh;

/// Ranges shorter than this are stored as a single leaf.
pub const DEFAULT_LEAF_THRESHOLD: usize = 10;

/// Capability interface of an acceleration structure, so that a renderer can
/// pick between implementations by name.
pub trait Accel: Send + Sync {
    /// Key under which the implementation is registered.
    fn name(&self) -> &'static str;

    /// Validates and stores the configuration for the following builds.
    fn initialize(&mut self, config: &AccelConfig) -> Result<(), AccelError>;

    /// Replaces the structure with one built from the scene.
    /// On error the previously built structure stays in place.
    fn build(&mut self, scene: &dyn Scene) -> Result<(), AccelError>;

    /// Finds the closest intersection with t in the open interval (min_t, max_t).
    /// `scene` must be the one the structure was built from.
    fn intersect(
        &self,
        scene: &dyn Scene,
        ray: &Ray,
        min_t: FloatType,
        max_t: FloatType,
    ) -> Option<Intersection>;
}

#[derive(Clone, Debug, PartialEq, Builder)]
pub struct AccelConfig {
    /// Index ranges shorter than this become leaves.
    #[builder(default = DEFAULT_LEAF_THRESHOLD)]
    pub leaf_threshold: usize,

    /// Padding added to the bounds of every triangle.
    #[builder(default = EPSILON)]
    pub bound_epsilon: FloatType,
}

impl AccelConfig {
    pub fn validate(&self) -> Result<(), AccelError> {
        // Threshold of 1 would keep splitting single triangle ranges forever
        if self.leaf_threshold < 2 {
            return Err(AccelError::InvalidLeafThreshold(self.leaf_threshold));
        }
        if !self.bound_epsilon.is_finite() || self.bound_epsilon < 0.0 {
            return Err(AccelError::InvalidBoundEpsilon(self.bound_epsilon));
        }
        Ok(())
    }
}

impl Default for AccelConfig {
    fn default() -> Self {
        AccelConfig::builder().build()
    }
}

#[derive(Debug, Error)]
pub enum AccelError {
    #[error("Invalid geometry in primitive {primitive}: {reason}")]
    InvalidGeometry {
        primitive: usize,
        #[source]
        reason: GeometryError,
    },

    #[error("Leaf threshold must be at least 2, got {0}")]
    InvalidLeafThreshold(usize),

    #[error("Bound epsilon must be finite and non-negative, got {0}")]
    InvalidBoundEpsilon(FloatType),
}

/// Ways a mesh can be malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("position buffer length {0} is not a multiple of 3")]
    PositionsNotTriples(usize),

    #[error("face buffer length {0} is not a multiple of 3")]
    FacesNotTriples(usize),

    #[error("face {face} references vertex {vertex}, but the mesh has only {vertex_count} vertices")]
    VertexOutOfRange {
        face: usize,
        vertex: u32,
        vertex_count: usize,
    },

    #[error("normal buffer has {len} values, expected {expected}")]
    NormalsMismatch { len: usize, expected: usize },

    #[error("texture coordinate buffer has {len} values, expected {expected}")]
    TexcoordsMismatch { len: usize, expected: usize },
}
