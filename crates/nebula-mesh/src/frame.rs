//! Per-frame driver: serial LOD selection, parallel patch meshing, serial
//! assembly.
//!
//! The quadtree is read-only for the whole meshing phase; the vertex cache
//! is the only state shared across worker threads, and it's already safe
//! for that (see `nebula_vertex_cache`). Work items are handed to workers
//! up front with their original `collect_visible` index attached, and
//! results are sorted back into that order afterward so the draw list's
//! ordering stays deterministic regardless of which worker finishes first.

use glam::DVec3;
use nebula_cubesphere::compute_winding_flip_table;
use nebula_lod::{CameraProjection, Frustum, LodForest};
use nebula_vertex_cache::VertexCache;

use crate::assembler::{self, FrameOutput};
use crate::collaborators::{CameraPose, DisplacementField};
use crate::error::MeshError;
use crate::params::MesherParams;
use crate::patch_mesh::{self, PatchMeshOutput};

pub struct PlanetMesher {
    forest: LodForest,
    cache: VertexCache,
    params: MesherParams,
    flip_table: [bool; 6],
}

impl PlanetMesher {
    #[must_use]
    pub fn new(params: MesherParams) -> Self {
        let lod_config = nebula_lod::LodConfig::new(
            params.planet_radius,
            params.max_level,
            params.split_pixels,
            params.merge_pixels,
            0.5,
        );
        Self {
            forest: LodForest::new(lod_config),
            cache: VertexCache::new(),
            params,
            flip_table: compute_winding_flip_table(),
        }
    }

    #[must_use]
    pub fn params(&self) -> &MesherParams {
        &self.params
    }

    pub fn reset(&mut self) {
        self.forest.reset();
        self.cache.clear();
    }

    /// Runs one full frame: LOD selection, parallel meshing, assembly.
    ///
    /// Any patch's `DisplacementFailed`/`CacheContention` aborts the whole
    /// frame — the caller should keep rendering the previous frame's
    /// output, since re-submitting it is allowed by the renderer contract.
    pub fn run_frame<D: DisplacementField>(
        &mut self,
        camera: CameraPose,
        camera_projection: CameraProjection,
        displacement: &D,
    ) -> Result<FrameOutput, MeshError> {
        self.cache.begin_frame(self.params.keep_cache_across_frames);

        let level_limit_hits = self.forest.update(camera.position, camera_projection);
        if level_limit_hits > 0 {
            tracing::warn!(level_limit_hits, "LOD update hit the configured max_level");
        }

        let frustum = Frustum::new(camera.frustum_planes);
        let visible = self.forest.collect_visible(&frustum);

        let cache_len_before = self.cache.len() as u64;
        let patches = self.mesh_visible(&visible, displacement)?;
        let cache_len_after = self.cache.len() as u64;

        let materializations = cache_len_after.saturating_sub(cache_len_before);
        let grid_points_per_patch = (u64::from(self.params.patch_grid_n) + 1).pow(2);
        let total_lookups = visible.len() as u64 * grid_points_per_patch;
        let cache_hits = total_lookups.saturating_sub(materializations);

        Ok(assembler::assemble(
            &patches,
            &self.cache,
            camera.position,
            self.params.planet_radius,
            cache_hits,
            materializations,
        ))
    }

    fn mesh_visible<D: DisplacementField>(
        &self,
        visible: &[nebula_lod::LodChunkDescriptor],
        displacement: &D,
    ) -> Result<Vec<PatchMeshOutput>, MeshError> {
        if visible.is_empty() {
            return Ok(Vec::new());
        }

        let worker_count = self.params.worker_threads.min(visible.len()).max(1);
        let (work_tx, work_rx) = crossbeam_channel::unbounded::<(usize, nebula_lod::LodChunkDescriptor)>();
        for (i, descriptor) in visible.iter().enumerate() {
            work_tx.send((i, *descriptor)).expect("work channel receiver outlives this scope");
        }
        drop(work_tx);

        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, Result<PatchMeshOutput, MeshError>)>();

        std::thread::scope(|scope| {
            for _ in 0..worker_count {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let cache = &self.cache;
                let params = &self.params;
                let flip_table = &self.flip_table;
                let forest = &self.forest;
                scope.spawn(move || {
                    for (index, descriptor) in work_rx {
                        let neighbor_levels = forest.neighbor_levels(descriptor.address);
                        let outcome =
                            patch_mesh::mesh_patch(&descriptor, neighbor_levels, cache, displacement, params, flip_table);
                        if result_tx.send((index, outcome)).is_err() {
                            return;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut results: Vec<(usize, Result<PatchMeshOutput, MeshError>)> = result_rx.iter().collect();
        results.sort_by_key(|(index, _)| *index);

        let mut patches = Vec::with_capacity(results.len());
        for (_, outcome) in results {
            patches.push(outcome?);
        }
        Ok(patches)
    }
}
