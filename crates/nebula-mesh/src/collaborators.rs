//! Interfaces the mesher consumes from its embedding application.
//!
//! None of these are implemented here: the core only knows the shape of
//! its terrain field, its camera, and its renderer. Tests in this crate
//! supply trivial stand-ins.

use glam::DVec3;
use nebula_lod::Plane;

/// Height and (optionally) analytic normal returned by a displacement field
/// for a single point on the unit sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Displacement {
    pub height: f64,
    pub analytic_normal: Option<DVec3>,
}

/// A failure from the injected displacement field. Fatal for the frame
/// that triggered it (see `MeshError::DisplacementFailed`).
#[derive(Debug, Clone, thiserror::Error)]
#[error("displacement field failed: {0}")]
pub struct DisplacementError(pub String);

impl DisplacementError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Pure, deterministic, thread-safe terrain height field.
///
/// `sphere_normal` is always unit length. Implementations must be callable
/// concurrently from any worker thread: the patch mesher may invoke this
/// from many threads at once during parallel meshing.
pub trait DisplacementField: Send + Sync {
    fn displace(&self, sphere_normal: DVec3) -> Result<Displacement, DisplacementError>;
}

/// A read-only snapshot of the camera for one frame.
#[derive(Clone, Copy, Debug)]
pub struct CameraPose {
    /// Camera position in the planet's local f64 space (not i128 world mm).
    pub position: DVec3,
    /// Column-major view-projection matrix, as the renderer expects it.
    pub view_proj: glam::Mat4,
    /// Six inward-facing frustum planes derived from `view_proj`.
    pub frustum_planes: [Plane; 6],
}

/// Supplies the current camera pose. Read-only per frame.
pub trait CameraSource {
    fn camera_pose(&self) -> CameraPose;
}

/// Receives a completed frame. The core never touches the GPU itself.
pub trait FrameSink {
    fn submit(&self, frame_output: &crate::assembler::FrameOutput);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// A displacement field with zero height everywhere, for tests that
    /// only care about mesh topology.
    pub struct FlatDisplacement;

    impl DisplacementField for FlatDisplacement {
        fn displace(&self, _sphere_normal: DVec3) -> Result<Displacement, DisplacementError> {
            Ok(Displacement { height: 0.0, analytic_normal: None })
        }
    }

    /// Counts calls so tests can assert at-most-once materialization.
    pub struct CountingDisplacement {
        pub calls: AtomicU64,
    }

    impl CountingDisplacement {
        pub fn new() -> Self {
            Self { calls: AtomicU64::new(0) }
        }
    }

    impl DisplacementField for CountingDisplacement {
        fn displace(&self, sphere_normal: DVec3) -> Result<Displacement, DisplacementError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Displacement { height: sphere_normal.x * 10.0, analytic_normal: None })
        }
    }
}
