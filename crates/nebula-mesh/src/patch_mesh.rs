//! Turns one selected quadtree leaf into a triangle list over shared,
//! cache-deduplicated vertices.
//!
//! Cross-face and cross-level cracks never need position reconciliation
//! here: the vertex cache guarantees at most one materialization per
//! identity, so whichever patch reaches a shared grid node first decides
//! its position for every other patch that shares it. This module only
//! has to get its own grid, its own diagonals, and its own edge fans
//! right.

use glam::DVec3;
use nebula_cubesphere::{ChunkAddress, FaceCoord, cube_to_sphere_everitt, emit_triangle, face_coord_to_cube_point};
use nebula_identity::VertexId;
use nebula_lod::LodChunkDescriptor;
use nebula_vertex_cache::{CacheError, VertexCache, VertexRecord};

use crate::collaborators::{Displacement, DisplacementError, DisplacementField};
use crate::error::MeshError;
use crate::params::MesherParams;

/// Smallest cube-space triangle area worth emitting. Below this a triangle
/// contributes nothing visible and only adds index traffic.
const MIN_TRIANGLE_AREA: f64 = 1e-6;

/// Step size in face (u, v) parameter space used for the central-difference
/// normal fallback. Small enough to stay local, large enough to survive
/// f64 rounding once projected to world scale.
const NORMAL_DIFFERENCE_EPSILON: f64 = 1e-4;

pub struct PatchMeshOutput {
    pub patch: ChunkAddress,
    pub level: u8,
    pub indices: Vec<u32>,
    pub min_height: f64,
    pub max_height: f64,
}

/// Edge of a patch's own grid, in the same order `LodForest::neighbor_levels`
/// returns: [North, East, South, West].
#[derive(Clone, Copy)]
enum Edge {
    North,
    East,
    South,
    West,
}

const EDGE_ORDER: [Edge; 4] = [Edge::North, Edge::East, Edge::South, Edge::West];

pub fn mesh_patch<D: DisplacementField>(
    descriptor: &LodChunkDescriptor,
    neighbor_levels: [u8; 4],
    cache: &VertexCache,
    displacement: &D,
    params: &MesherParams,
    flip_table: &[bool; 6],
) -> Result<PatchMeshOutput, MeshError> {
    let addr = descriptor.address;
    let n = params.patch_grid_n as usize;
    let (u_min, v_min, u_max, v_max) = addr.uv_bounds();
    let face_bit = 1u8 << (addr.face as usize);
    let flip = flip_table[addr.face as usize];

    let mut slots = vec![vec![0u32; n + 1]; n + 1];
    let mut points = vec![vec![DVec3::ZERO; n + 1]; n + 1];

    for j in 0..=n {
        let v = lerp(v_min, v_max, j as f64 / n as f64);
        for i in 0..=n {
            let u = lerp(u_min, u_max, i as f64 / n as f64);
            let fc = FaceCoord::new(addr.face, u, v);
            let cube_point = face_coord_to_cube_point(&fc);
            points[i][j] = nebula_identity::snap_to_cube_boundary(cube_point, params.boundary_epsilon);

            let id = nebula_identity::identity(cube_point, params.boundary_epsilon, params.quantization_bits);
            let epsilon = params.boundary_epsilon;
            let planet_radius = params.planet_radius;
            let tex_uv = [u as f32, v as f32];

            let slot = cache
                .get_or_create(id, face_bit, move || {
                    produce_vertex(id, fc, cube_point, epsilon, planet_radius, displacement, tex_uv)
                })
                .map_err(|err| match err {
                    CacheError::Producer(source) => MeshError::DisplacementFailed { id, source },
                    CacheError::Poisoned => MeshError::CacheContention,
                })?;
            slots[i][j] = slot.0;
        }
    }

    let mut min_height = f64::INFINITY;
    let mut max_height = f64::NEG_INFINITY;
    for row in &slots {
        for &slot in row {
            let record = cache.vertex(nebula_vertex_cache::Slot(slot));
            let h = DVec3::from_array(record.world_pos).length() - params.planet_radius;
            min_height = min_height.min(h);
            max_height = max_height.max(h);
        }
    }

    let mut skip = vec![vec![false; n]; n];
    let mut indices = Vec::new();

    if params.enable_tjunction_fix {
        for (slot_idx, edge) in EDGE_ORDER.into_iter().enumerate() {
            let own_level = descriptor.level;
            let neighbor_level = neighbor_levels[slot_idx];
            if neighbor_level >= own_level {
                continue;
            }
            let level_diff = own_level - neighbor_level;
            stitch_edge(edge, level_diff, n, &slots, &points, flip, &mut indices);
            mark_skip(edge, n, &mut skip);
        }
    }

    for j in 0..n {
        for i in 0..n {
            if skip[i][j] {
                continue;
            }
            emit_cell(i, j, &slots, &points, flip, &mut indices);
        }
    }

    Ok(PatchMeshOutput { patch: addr, level: descriptor.level, indices, min_height, max_height })
}

fn mark_skip(edge: Edge, n: usize, skip: &mut [Vec<bool>]) {
    match edge {
        Edge::West => {
            for j in 0..n {
                skip[0][j] = true;
            }
        }
        Edge::East => {
            for j in 0..n {
                skip[n - 1][j] = true;
            }
        }
        Edge::South => {
            for i in 0..n {
                skip[i][0] = true;
            }
        }
        Edge::North => {
            for i in 0..n {
                skip[i][n - 1] = true;
            }
        }
    }
}

/// Fan-stitches one edge against a coarser neighbor. The neighbor only
/// shares every `2^level_diff`-th sample along the edge; the row one cell
/// in from the edge stays at this patch's full density. In practice the
/// quadtree's balance invariant keeps `level_diff` at 1, but the fan is
/// built generically from the level difference rather than hardcoded to a
/// single stride.
fn stitch_edge(
    edge: Edge,
    level_diff: u8,
    n: usize,
    slots: &[Vec<u32>],
    points: &[Vec<DVec3>],
    flip: bool,
    indices: &mut Vec<u32>,
) {
    let stride = 1usize << level_diff;
    if stride > n {
        return;
    }
    let segments = n / stride;

    for s in 0..segments {
        let c0 = s * stride;
        let c1 = ((s + 1) * stride).min(n);

        let (coarse0, coarse1, fine): (u32, u32, Vec<(u32, DVec3)>) = match edge {
            Edge::West => (
                slots[0][c0],
                slots[0][c1],
                (c0..=c1).map(|j| (slots[1][j], points[1][j])).collect(),
            ),
            Edge::East => (
                slots[n][c0],
                slots[n][c1],
                (c0..=c1).map(|j| (slots[n - 1][j], points[n - 1][j])).collect(),
            ),
            Edge::South => (
                slots[c0][0],
                slots[c1][0],
                (c0..=c1).map(|i| (slots[i][1], points[i][1])).collect(),
            ),
            Edge::North => (
                slots[c0][n],
                slots[c1][n],
                (c0..=c1).map(|i| (slots[i][n - 1], points[i][n - 1])).collect(),
            ),
        };

        let coarse0_p = match edge {
            Edge::West => points[0][c0],
            Edge::East => points[n][c0],
            Edge::South => points[c0][0],
            Edge::North => points[c0][n],
        };
        let coarse1_p = match edge {
            Edge::West => points[0][c1],
            Edge::East => points[n][c1],
            Edge::South => points[c1][0],
            Edge::North => points[c1][n],
        };

        for pair in fine.windows(2) {
            let (f0, p0) = pair[0];
            let (f1, p1) = pair[1];
            push_triangle(indices, flip, [coarse0, f0, f1], [coarse0_p, p0, p1]);
        }
        let (f_last, p_last) = *fine.last().expect("a fan segment always samples at least one fine vertex");
        push_triangle(indices, flip, [coarse0, f_last, coarse1], [coarse0_p, p_last, coarse1_p]);
    }
}

/// Standard-quad triangulation for one interior cell, alternating the
/// diagonal by `(i + j)` parity so shading doesn't pick up a directional
/// bias from always splitting the same way.
fn emit_cell(i: usize, j: usize, slots: &[Vec<u32>], points: &[Vec<DVec3>], flip: bool, indices: &mut Vec<u32>) {
    let v00 = slots[i][j];
    let v10 = slots[i + 1][j];
    let v01 = slots[i][j + 1];
    let v11 = slots[i + 1][j + 1];
    let p00 = points[i][j];
    let p10 = points[i + 1][j];
    let p01 = points[i][j + 1];
    let p11 = points[i + 1][j + 1];

    if (i + j) % 2 == 0 {
        push_triangle(indices, flip, [v00, v10, v11], [p00, p10, p11]);
        push_triangle(indices, flip, [v00, v11, v01], [p00, p11, p01]);
    } else {
        push_triangle(indices, flip, [v00, v10, v01], [p00, p10, p01]);
        push_triangle(indices, flip, [v10, v11, v01], [p10, p11, p01]);
    }
}

fn push_triangle(indices: &mut Vec<u32>, flip: bool, v: [u32; 3], p: [DVec3; 3]) {
    let area = (p[1] - p[0]).cross(p[2] - p[0]).length() * 0.5;
    if area < MIN_TRIANGLE_AREA {
        return;
    }
    indices.extend_from_slice(&emit_triangle(v[0], v[1], v[2], flip));
}

fn produce_vertex<D: DisplacementField>(
    id: VertexId,
    fc: FaceCoord,
    cube_point: DVec3,
    epsilon: f64,
    planet_radius: f64,
    displacement: &D,
    tex_uv: [f32; 2],
) -> Result<VertexRecord, DisplacementError> {
    let snapped = nebula_identity::snap_to_cube_boundary(cube_point, epsilon);
    let sphere_normal = cube_to_sphere_everitt(snapped);
    let Displacement { height, analytic_normal } = displacement.displace(sphere_normal)?;
    let world_pos = sphere_normal * (planet_radius + height);

    let normal = match analytic_normal {
        Some(n) => n.normalize(),
        None => central_difference_normal(fc, planet_radius, displacement, sphere_normal)?,
    };

    Ok(VertexRecord {
        id,
        world_pos: world_pos.to_array(),
        normal: normal.to_array(),
        tex_uv,
        face_mask: 0,
    })
}

/// Estimates the surface normal from the patch's own cube-space grid
/// neighbors rather than the sphere: the mesher already has to sample the
/// face's (u, v) parameterization for the grid itself, so the central
/// difference reuses that same local frame instead of constructing an
/// arbitrary tangent basis on the sphere.
fn central_difference_normal<D: DisplacementField>(
    fc: FaceCoord,
    planet_radius: f64,
    displacement: &D,
    fallback_normal: DVec3,
) -> Result<DVec3, DisplacementError> {
    let sample = |du: f64, dv: f64| -> Result<DVec3, DisplacementError> {
        // Constructed directly rather than through `FaceCoord::new`: the
        // differencing step can legitimately push u/v a hair outside
        // [0, 1] at a patch's own edge, and the affine cube-point map is
        // well-defined there regardless.
        let neighbor = FaceCoord { face: fc.face, u: fc.u + du, v: fc.v + dv };
        let cube_point = face_coord_to_cube_point(&neighbor);
        let sphere_normal = cube_to_sphere_everitt(cube_point);
        let d = displacement.displace(sphere_normal)?;
        Ok(sphere_normal * (planet_radius + d.height))
    };

    let pu_pos = sample(NORMAL_DIFFERENCE_EPSILON, 0.0)?;
    let pu_neg = sample(-NORMAL_DIFFERENCE_EPSILON, 0.0)?;
    let pv_pos = sample(0.0, NORMAL_DIFFERENCE_EPSILON)?;
    let pv_neg = sample(0.0, -NORMAL_DIFFERENCE_EPSILON)?;

    let du = pu_pos - pu_neg;
    let dv = pv_pos - pv_neg;
    let mut normal = du.cross(dv).normalize();
    if normal.dot(fallback_normal) < 0.0 {
        normal = -normal;
    }
    Ok(normal)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::test_support::{CountingDisplacement, FlatDisplacement};
    use nebula_cubesphere::{CubeFace, compute_winding_flip_table};
    use nebula_lod::LodChunkDescriptor;
    use nebula_vertex_cache::VertexCache;

    fn descriptor_for(addr: ChunkAddress, level: u8) -> LodChunkDescriptor {
        LodChunkDescriptor {
            address: addr,
            level,
            bounding_sphere: nebula_cubesphere::BoundingSphere { center: DVec3::ZERO, radius: 1.0 },
            distance: 0.0,
            screen_space_error: 0.0,
        }
    }

    fn test_params(grid_n: u16) -> MesherParams {
        MesherParams {
            planet_radius: 1000.0,
            max_level: 10,
            patch_grid_n: grid_n,
            split_pixels: 8.0,
            merge_pixels: 3.0,
            boundary_epsilon: 1e-7,
            quantization_bits: 24,
            enable_tjunction_fix: true,
            keep_cache_across_frames: false,
            worker_threads: 1,
        }
    }

    #[test]
    fn flat_patch_produces_nonempty_indices_in_triangles() {
        let cache = VertexCache::new();
        let flip_table = compute_winding_flip_table();
        let addr = ChunkAddress::new(CubeFace::PosZ, 2, 0, 0);
        let descriptor = descriptor_for(addr, 2);
        let params = test_params(4);
        let displacement = FlatDisplacement;

        let output = mesh_patch(&descriptor, [2, 2, 2, 2], &cache, &displacement, &params, &flip_table).unwrap();

        assert!(!output.indices.is_empty());
        assert_eq!(output.indices.len() % 3, 0);
        assert_eq!(output.patch, addr);
    }

    #[test]
    fn shared_edge_materializes_vertex_only_once() {
        let cache = VertexCache::new();
        let flip_table = compute_winding_flip_table();
        let params = test_params(4);
        let displacement = CountingDisplacement::new();

        let a = ChunkAddress::new(CubeFace::PosZ, 1, 0, 0);
        let b = ChunkAddress::new(CubeFace::PosZ, 1, 1, 0);
        let descriptor_a = descriptor_for(a, 1);
        let descriptor_b = descriptor_for(b, 1);

        mesh_patch(&descriptor_a, [1, 1, 1, 1], &cache, &displacement, &params, &flip_table).unwrap();
        let calls_after_a = displacement.calls.load(std::sync::atomic::Ordering::SeqCst);

        mesh_patch(&descriptor_b, [1, 1, 1, 1], &cache, &displacement, &params, &flip_table).unwrap();
        let calls_after_b = displacement.calls.load(std::sync::atomic::Ordering::SeqCst);

        // Patch b shares its west column with patch a's east column, so it
        // materializes strictly fewer new identities than patch a had to
        // (which started from an empty cache and owes for every one of its
        // own grid points).
        assert!(calls_after_b - calls_after_a < calls_after_a);
    }

    #[test]
    fn coarser_neighbor_skips_fine_edge_quads() {
        let cache = VertexCache::new();
        let flip_table = compute_winding_flip_table();
        let addr = ChunkAddress::new(CubeFace::PosZ, 2, 2, 2);
        let descriptor = descriptor_for(addr, 2);
        let params = test_params(4);
        let displacement = FlatDisplacement;

        let uniform = mesh_patch(&descriptor, [2, 2, 2, 2], &cache, &displacement, &params, &flip_table).unwrap();
        let cache2 = VertexCache::new();
        let stitched = mesh_patch(&descriptor, [1, 2, 2, 2], &cache2, &displacement, &params, &flip_table).unwrap();

        assert_ne!(uniform.indices.len(), stitched.indices.len());
    }

    #[test]
    fn degenerate_triangles_are_dropped() {
        let mut indices = Vec::new();
        let p = DVec3::new(1.0, 0.0, 0.0);
        push_triangle(&mut indices, false, [0, 1, 2], [p, p, p]);
        assert!(indices.is_empty());
    }
}
