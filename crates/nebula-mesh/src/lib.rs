//! Turns the LOD forest's visible-patch selection into a renderer-ready
//! frame: cube-sphere grid sampling, shared-vertex identity, parity
//! triangulation, T-junction stitching across LOD boundaries, and
//! concurrent assembly.

mod assembler;
mod collaborators;
mod error;
mod frame;
mod params;
mod patch_mesh;

pub use assembler::{DrawEntry, FrameOutput, FrameStats, PackedVertex, PatchBounds};
pub use collaborators::{CameraPose, CameraSource, Displacement, DisplacementError, DisplacementField, FrameSink};
pub use error::MeshError;
pub use frame::PlanetMesher;
pub use params::MesherParams;
pub use patch_mesh::PatchMeshOutput;
