//! Chunk bounding volumes for frustum culling and spatial queries.

use glam::DVec3;

use crate::{ChunkAddress, FaceCoord, face_coord_to_sphere_everitt};

/// A bounding sphere in local f64 space (relative to planet center).
#[derive(Clone, Copy, Debug)]
pub struct BoundingSphere {
    /// Center of the sphere, relative to the planet center.
    pub center: DVec3,
    /// Radius of the bounding sphere.
    pub radius: f64,
}

impl BoundingSphere {
    /// Compute the bounding sphere for a cubesphere chunk.
    ///
    /// - `addr`: the chunk's address (determines its UV extent on the face)
    /// - `planet_radius`: radius of the planet in engine units (mm)
    /// - `min_height`: minimum terrain height (can be negative for valleys/oceans)
    /// - `max_height`: maximum terrain height above the sphere surface within this chunk
    pub fn from_chunk(
        addr: &ChunkAddress,
        planet_radius: f64,
        min_height: f64,
        max_height: f64,
    ) -> Self {
        let (u_min, v_min, u_max, v_max) = addr.uv_bounds();

        let corners = [
            FaceCoord::new(addr.face, u_min, v_min),
            FaceCoord::new(addr.face, u_max, v_min),
            FaceCoord::new(addr.face, u_min, v_max),
            FaceCoord::new(addr.face, u_max, v_max),
        ];
        let center_fc = FaceCoord::new(addr.face, (u_min + u_max) * 0.5, (v_min + v_max) * 0.5);

        let sphere_center = face_coord_to_sphere_everitt(&center_fc);

        // Center at midpoint height
        let mid_radius = planet_radius + (min_height + max_height) * 0.5;
        let bs_center = sphere_center * mid_radius;

        // Radius must encompass angular extent and height variation
        let mut max_dist_sq: f64 = 0.0;
        for corner_fc in &corners {
            let corner_dir = face_coord_to_sphere_everitt(corner_fc);
            for &h in &[min_height, max_height] {
                let pos = corner_dir * (planet_radius + h);
                let d = (pos - bs_center).length_squared();
                max_dist_sq = max_dist_sq.max(d);
            }
        }

        // Also check center point at extreme heights
        let center_max = sphere_center * (planet_radius + max_height);
        let center_min = sphere_center * (planet_radius + min_height);
        max_dist_sq = max_dist_sq
            .max((center_max - bs_center).length_squared())
            .max((center_min - bs_center).length_squared());

        Self {
            center: bs_center,
            radius: max_dist_sq.sqrt(),
        }
    }
}
