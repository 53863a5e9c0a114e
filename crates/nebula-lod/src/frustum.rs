//! Frustum culling against local f64 bounding spheres.
//!
//! `collect_visible` needs a cheap visibility test for patches in the
//! planet-local space `BoundingSphere` already lives in, not an
//! i128 world-space test meant for sector-scale culling.

use glam::DVec3;
use nebula_cubesphere::BoundingSphere;

/// A plane in local space: points `p` with `normal.dot(p) + distance >= 0`
/// are on the inside half-space.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: DVec3,
    pub distance: f64,
}

impl Plane {
    #[must_use]
    pub fn new(normal: DVec3, distance: f64) -> Self {
        Self { normal, distance }
    }

    #[must_use]
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.distance
    }
}

/// Six inward-facing planes (near, far, left, right, top, bottom) bounding
/// the camera's view volume in local (planet-center-relative) space.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    #[must_use]
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// A bounding sphere intersects the frustum unless some plane places
    /// it entirely in the outside half-space (center further than
    /// `radius` beyond the plane).
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(sphere.center) >= -sphere.radius)
    }
}
