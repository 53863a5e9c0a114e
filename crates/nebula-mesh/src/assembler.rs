//! Concatenates per-patch index lists and the cache's dense vertex snapshot
//! into one renderer-ready frame.
//!
//! Slots already are the frame's vertex-buffer indices: `VertexCache`
//! appends records in allocation order and `snapshot()` preserves that
//! order, so a patch's slot-based indices need no remapping table, only a
//! straight `u32` cast.

use glam::DVec3;
use nebula_cubesphere::{ChunkAddress, CubeFace};
use nebula_vertex_cache::VertexCache;

use crate::patch_mesh::PatchMeshOutput;

/// One vertex as the renderer wants to consume it: camera-relative and
/// narrowed to f32, since nothing visible in a single frame needs more
/// precision than that once it's within a few planet radii of the camera.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub face_mask: u8,
    pub _pad: [u8; 3],
}

/// One contiguous run of indices belonging to a single patch, for
/// per-patch draw calls or GPU-driven culling.
#[derive(Clone, Copy, Debug)]
pub struct DrawEntry {
    pub first_index: u32,
    pub index_count: u32,
    pub patch_id: ChunkAddress,
}

/// A patch's world-space bounding sphere, computed from its own sampled
/// displacement range rather than the LOD stage's coarser undisplaced
/// approximation used for selection and culling.
#[derive(Clone, Copy, Debug)]
pub struct PatchBounds {
    pub patch_id: ChunkAddress,
    pub center: DVec3,
    pub radius: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    pub patches_per_face: [u32; 6],
    pub vertices_per_face: [u32; 6],
    pub draw_calls: u32,
    pub cache_hits: u64,
    pub cache_materializations: u64,
}

pub struct FrameOutput {
    pub vertices: Vec<PackedVertex>,
    pub indices: Vec<u32>,
    pub draw_list: Vec<DrawEntry>,
    pub patch_bounds: Vec<PatchBounds>,
    pub stats: FrameStats,
}

/// Builds one frame from the patch mesher's per-patch outputs and the
/// vertex cache's current snapshot.
///
/// `cache_hits`/`cache_materializations` must be measured by the caller
/// across the frame (the cache itself doesn't track them) and passed
/// through so `FrameStats` stays a per-frame value, never a cumulative one.
pub fn assemble(
    patches: &[PatchMeshOutput],
    cache: &VertexCache,
    camera_position: DVec3,
    planet_radius: f64,
    cache_hits: u64,
    cache_materializations: u64,
) -> FrameOutput {
    let records = cache.snapshot();
    let mut vertices = Vec::with_capacity(records.len());
    for record in &records {
        let world_pos = DVec3::from_array(record.world_pos);
        let relative = (world_pos - camera_position).as_vec3();
        vertices.push(PackedVertex {
            pos: relative.to_array(),
            normal: [record.normal[0] as f32, record.normal[1] as f32, record.normal[2] as f32],
            uv: record.tex_uv,
            face_mask: record.face_mask,
            _pad: [0; 3],
        });
    }

    let mut indices = Vec::new();
    let mut draw_list = Vec::with_capacity(patches.len());
    let mut patch_bounds = Vec::with_capacity(patches.len());
    let mut stats = FrameStats { cache_hits, cache_materializations, ..Default::default() };

    for patch in patches {
        let face_idx = patch.patch.face as usize;
        let first_index = indices.len() as u32;
        indices.extend_from_slice(&patch.indices);
        let index_count = patch.indices.len() as u32;

        draw_list.push(DrawEntry { first_index, index_count, patch_id: patch.patch });
        stats.patches_per_face[face_idx] += 1;
        stats.draw_calls += 1;

        patch_bounds.push(patch_world_bounds(patch, planet_radius));
    }

    for (i, face) in CubeFace::ALL.iter().enumerate() {
        stats.vertices_per_face[i] = records.iter().filter(|r| r.face_mask & (1 << (*face as usize)) != 0).count() as u32;
    }

    FrameOutput { vertices, indices, draw_list, patch_bounds, stats }
}

fn patch_world_bounds(patch: &PatchMeshOutput, planet_radius: f64) -> PatchBounds {
    let center_coord = patch.patch.center_face_coord();
    let cube_point = nebula_cubesphere::face_coord_to_cube_point(&center_coord);
    let unit_dir = nebula_cubesphere::cube_to_sphere_everitt(cube_point);
    let mid_height = (patch.min_height + patch.max_height) * 0.5;
    let half_spread = (patch.max_height - patch.min_height).abs() * 0.5;

    PatchBounds {
        patch_id: patch.patch,
        center: unit_dir * (planet_radius + mid_height),
        radius: half_spread.max(1e-6),
    }
}
