//! Per-face quadtree LOD management driven by screen-space error.

mod face_quadtree_lod;
mod frustum;
mod selector;

pub use face_quadtree_lod::{FaceQuadtreeLod, LodAction, LodChunkDescriptor, LodForest};
pub use frustum::{Frustum, Plane};
pub use selector::{CameraProjection, LodConfig, geometric_error, projected_size, screen_space_error};
