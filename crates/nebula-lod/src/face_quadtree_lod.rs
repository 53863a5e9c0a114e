//! Per-face quadtree LOD controller, and the forest tying all six together.
//!
//! Splitting/merging is driven by screen-space error instead of a fixed
//! distance table, and neighbor resolution now crosses face boundaries —
//! a patch at the edge of `+X` can have its coarser/finer neighbor sitting
//! on `+Y`, and the balance constraint and T-junction handling both need
//! to see through that seam.

use glam::DVec3;
use nebula_cubesphere::{
    BoundingSphere, ChunkAddress, CubeFace, FaceDirection, FaceQuadtree, QuadNode,
    SameFaceNeighbor, face_adjacency,
};

use crate::frustum::Frustum;
use crate::selector::{CameraProjection, LodConfig, screen_space_error};

/// Result of evaluating a node during quadtree traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodAction {
    Keep,
    Split,
    Merge,
}

/// Describes an active (leaf) patch produced by the quadtree LOD update.
#[derive(Clone, Debug)]
pub struct LodChunkDescriptor {
    pub address: ChunkAddress,
    /// Depth from the face root: 0 at the unsplit root, deeper means finer.
    pub level: u8,
    pub bounding_sphere: BoundingSphere,
    pub distance: f64,
    pub screen_space_error: f32,
}

fn level_of(addr: &ChunkAddress) -> u8 {
    ChunkAddress::MAX_LOD - addr.lod
}

fn node_descriptor(
    addr: ChunkAddress,
    cam: DVec3,
    camera: CameraProjection,
    config: &LodConfig,
) -> LodChunkDescriptor {
    let bounding_sphere = BoundingSphere::from_chunk(&addr, config.planet_radius, 0.0, 0.0);
    let distance = (bounding_sphere.center - cam).length();
    let level = level_of(&addr);
    let ess = screen_space_error(bounding_sphere.radius, distance, level, camera, config);
    LodChunkDescriptor {
        address: addr,
        level,
        bounding_sphere,
        distance,
        screen_space_error: ess,
    }
}

/// Per-face quadtree LOD controller.
pub struct FaceQuadtreeLod {
    tree: FaceQuadtree,
}

impl FaceQuadtreeLod {
    #[must_use]
    pub fn new(face: CubeFace) -> Self {
        Self {
            tree: FaceQuadtree::new(face),
        }
    }

    #[must_use]
    pub fn face(&self) -> CubeFace {
        self.tree.face
    }

    #[must_use]
    pub fn tree(&self) -> &FaceQuadtree {
        &self.tree
    }

    /// Split/merge this face's tree against the current camera. Returns
    /// the number of leaves that wanted to split past `L_max` (surfaced
    /// by the caller as `LevelLimitExceeded`, not fatal).
    fn update(&mut self, cam: DVec3, camera: CameraProjection, config: &LodConfig) -> u32 {
        let mut level_limit_hits = 0;
        Self::update_node(&mut self.tree.root, cam, camera, config, &mut level_limit_hits);
        level_limit_hits
    }

    fn update_node(
        node: &mut QuadNode,
        cam: DVec3,
        camera: CameraProjection,
        config: &LodConfig,
        level_limit_hits: &mut u32,
    ) {
        match node {
            QuadNode::Leaf { address } => {
                let addr = *address;
                let level = level_of(&addr);
                let bs = BoundingSphere::from_chunk(&addr, config.planet_radius, 0.0, 0.0);
                let distance = (bs.center - cam).length();
                let ess = screen_space_error(bs.radius, distance, level, camera, config);

                if ess > config.split_pixels {
                    if level < config.max_level && addr.lod > 0 {
                        node.subdivide();
                        if let QuadNode::Branch { children, .. } = node {
                            for child in children.iter_mut() {
                                Self::update_node(child, cam, camera, config, level_limit_hits);
                            }
                        }
                    } else if level >= config.max_level {
                        *level_limit_hits += 1;
                    }
                }
            }
            QuadNode::Branch { children, .. } => {
                for child in children.iter_mut() {
                    Self::update_node(child, cam, camera, config, level_limit_hits);
                }
                let all_below_merge = children.iter().all(|child| match child {
                    QuadNode::Leaf { address } => {
                        let bs = BoundingSphere::from_chunk(address, config.planet_radius, 0.0, 0.0);
                        let distance = (bs.center - cam).length();
                        let ess = screen_space_error(bs.radius, distance, level_of(address), camera, config);
                        ess < config.merge_pixels
                    }
                    QuadNode::Branch { .. } => false,
                });
                if all_below_merge {
                    node.merge();
                }
            }
        }
    }

    fn leaf_descriptors(&self, cam: DVec3, camera: CameraProjection, config: &LodConfig) -> Vec<LodChunkDescriptor> {
        self.tree
            .root
            .all_leaves()
            .into_iter()
            .map(|addr| node_descriptor(addr, cam, camera, config))
            .collect()
    }

    /// Reset to a single root leaf.
    pub fn reset(&mut self) {
        self.tree = FaceQuadtree::new(self.tree.face);
    }
}

/// Samples points along the shared edge between `expected` (the address a
/// same-granularity neighbor would have) and whatever the target tree
/// actually holds there, returning the finest level encountered.
///
/// Mirrors the `leaves_along_edge` idiom used for same-face resolution,
/// generalized to run against any face's tree so cross-face lookups use
/// the identical sampling strategy.
fn resolve_neighbor_level(tree: &FaceQuadtree, expected: &ChunkAddress, edge: FaceDirection) -> u8 {
    let (u0, v0, u1, v1) = expected.uv_bounds();
    let u_mid = (u0 + u1) * 0.5;
    let v_mid = (v0 + v1) * 0.5;
    let actual = tree.root.find_leaf(u_mid, v_mid);

    if actual.lod >= expected.lod {
        return level_of(&actual);
    }

    // Actual leaf is finer than expected: the edge may be shared with
    // several leaves. Sample along it and report the finest (highest
    // spec-level) one found — the balance constraint keeps them within
    // one level of each other.
    let samples = 16;
    let mut finest = level_of(&actual);
    for i in 0..=samples {
        let t = i as f64 / f64::from(samples);
        let (u, v) = match edge {
            FaceDirection::East => (u0, v0 + t * (v1 - v0)),
            FaceDirection::West => (u1, v0 + t * (v1 - v0)),
            FaceDirection::North => (u0 + t * (u1 - u0), v0),
            FaceDirection::South => (u0 + t * (u1 - u0), v1),
        };
        let leaf = tree.root.find_leaf(u.clamp(0.0, 1.0 - 1e-12), v.clamp(0.0, 1.0 - 1e-12));
        finest = finest.max(level_of(&leaf));
    }
    finest
}

/// Unconditionally split the leaf at `target`'s address, wherever it sits
/// in `node`'s subtree. Used only to force-correct a balance violation;
/// the node being split already failed the screen-space-error test
/// implicitly by being coarser than the balance constraint allows.
fn force_split_at(node: &mut QuadNode, target: &ChunkAddress) -> bool {
    if node.address() == *target {
        if node.is_leaf() && target.lod > 0 {
            node.subdivide();
            return true;
        }
        return false;
    }
    if let QuadNode::Branch { children, .. } = node {
        for child in children.iter_mut() {
            if force_split_at(child, target) {
                return true;
            }
        }
    }
    false
}

/// All six per-face quadtrees, managed together so neighbor resolution and
/// balance enforcement can cross face boundaries.
pub struct LodForest {
    faces: [FaceQuadtreeLod; 6],
    config: LodConfig,
    last_camera: DVec3,
}

impl LodForest {
    #[must_use]
    pub fn new(config: LodConfig) -> Self {
        Self {
            faces: CubeFace::ALL.map(FaceQuadtreeLod::new),
            config,
            last_camera: DVec3::ZERO,
        }
    }

    fn tree_for(&self, face: CubeFace) -> &FaceQuadtreeLod {
        &self.faces[face as usize]
    }

    fn tree_for_mut(&mut self, face: CubeFace) -> &mut FaceQuadtreeLod {
        &mut self.faces[face as usize]
    }

    /// Split/merge every face tree against the camera, then enforce the
    /// cross-face balance constraint. Returns the total number of nodes
    /// that wanted to split past `L_max` this call.
    pub fn update(&mut self, camera_pos: DVec3, camera: CameraProjection) -> u32 {
        self.last_camera = camera_pos;
        let mut level_limit_hits = 0;
        for face_tree in &mut self.faces {
            level_limit_hits += face_tree.update(camera_pos, camera, &self.config);
        }
        self.enforce_balance();
        level_limit_hits
    }

    /// The ordered sequence of leaf patches whose bounding sphere
    /// intersects `frustum`.
    #[must_use]
    pub fn collect_visible(&self, frustum: &Frustum) -> Vec<LodChunkDescriptor> {
        let mut visible = Vec::new();
        for face_tree in &self.faces {
            for desc in face_tree.leaf_descriptors(self.last_camera, CAMERA_UNUSED, &self.config) {
                if frustum.intersects_sphere(&desc.bounding_sphere) {
                    visible.push(desc);
                }
            }
        }
        visible
    }

    /// Level of the neighboring leaf across each of a leaf's 4 edges, in
    /// `[North, East, South, West]` order. Cross-face edges are resolved
    /// through the face-adjacency table; same-face edges walk the local
    /// quadtree.
    #[must_use]
    pub fn neighbor_levels(&self, addr: ChunkAddress) -> [u8; 4] {
        let dirs = [
            FaceDirection::North,
            FaceDirection::East,
            FaceDirection::South,
            FaceDirection::West,
        ];
        let mut levels = [0u8; 4];
        for (i, dir) in dirs.into_iter().enumerate() {
            levels[i] = match addr.same_face_neighbor(dir) {
                SameFaceNeighbor::Same(expected) => {
                    resolve_neighbor_level(self.tree_for(addr.face).tree(), &expected, dir)
                }
                SameFaceNeighbor::OffFace => {
                    let adj = face_adjacency(addr.face, dir);
                    let expected = addr.cross_face_neighbor(dir);
                    resolve_neighbor_level(self.tree_for(adj.neighbor_face).tree(), &expected, adj.neighbor_edge)
                }
            };
        }
        levels
    }

    /// No leaf may differ by more than one level from any same-face or
    /// cross-face neighbor; force-split coarser neighbors until stable.
    fn enforce_balance(&mut self) {
        for _ in 0..=self.config.max_level {
            let mut changed = false;
            let snapshot: Vec<(CubeFace, ChunkAddress)> = CubeFace::ALL
                .iter()
                .flat_map(|&face| {
                    self.tree_for(face)
                        .tree()
                        .root
                        .all_leaves()
                        .into_iter()
                        .map(move |addr| (face, addr))
                })
                .collect();

            for (face, addr) in &snapshot {
                for dir in FaceDirection::ALL {
                    let (neighbor_face, expected) = match addr.same_face_neighbor(dir) {
                        SameFaceNeighbor::Same(n) => (*face, n),
                        SameFaceNeighbor::OffFace => {
                            let adj = face_adjacency(*face, dir);
                            (adj.neighbor_face, addr.cross_face_neighbor(dir))
                        }
                    };

                    let (u0, v0, u1, v1) = expected.uv_bounds();
                    let u_mid = (u0 + u1) * 0.5;
                    let v_mid = (v0 + v1) * 0.5;
                    let actual = self.tree_for(neighbor_face).tree().root.find_leaf(u_mid, v_mid);

                    if actual.lod > addr.lod + 1 {
                        let tree = self.tree_for_mut(neighbor_face);
                        if force_split_at(&mut tree.tree.root, &actual) {
                            changed = true;
                        }
                    }
                }
            }

            if !changed {
                break;
            }
        }
    }

    pub fn reset(&mut self) {
        for face_tree in &mut self.faces {
            face_tree.reset();
        }
    }
}

/// `leaf_descriptors` recomputes distance/screen-space-error from the
/// camera already recorded by `update`; `collect_visible` only needs the
/// bounding sphere, so the camera projection parameters it recomputes
/// with are irrelevant to the frustum test and any fixed value will do.
const CAMERA_UNUSED: CameraProjection = CameraProjection {
    viewport_height: 1080.0,
    vertical_fov_radians: 1.0,
    near_plane: 0.1,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LodConfig {
        LodConfig::default()
    }

    fn camera() -> CameraProjection {
        CameraProjection {
            viewport_height: 1080.0,
            vertical_fov_radians: std::f32::consts::FRAC_PI_3,
            near_plane: 1.0,
        }
    }

    fn on_surface(config: &LodConfig) -> DVec3 {
        DVec3::new(0.0, config.planet_radius, 0.0)
    }

    #[test]
    fn test_camera_near_surface_subdivides() {
        let config = config();
        let mut forest = LodForest::new(config);
        forest.update(on_surface(&config), camera());
        let visible = forest.collect_visible(&unbounded_frustum());
        assert!(visible.len() > 6, "camera on the surface should split past the 6 root leaves");
    }

    #[test]
    fn test_camera_far_away_keeps_roots_coarse() {
        let config = config();
        let mut forest = LodForest::new(config);
        let far = DVec3::new(0.0, config.planet_radius * 1000.0, 0.0);
        forest.update(far, camera());
        let visible = forest.collect_visible(&unbounded_frustum());
        assert_eq!(visible.len(), 6, "a distant camera should leave every face at its root leaf");
    }

    #[test]
    fn test_moving_camera_closer_increases_patch_count() {
        let config = config();
        let mut forest = LodForest::new(config);
        let far = DVec3::new(0.0, config.planet_radius * 1000.0, 0.0);
        forest.update(far, camera());
        let far_count = forest.collect_visible(&unbounded_frustum()).len();

        forest.update(on_surface(&config), camera());
        let near_count = forest.collect_visible(&unbounded_frustum()).len();

        assert!(near_count > far_count);
    }

    #[test]
    fn test_neighbor_levels_within_one_after_balance() {
        let config = config();
        let mut forest = LodForest::new(config);
        let offset = DVec3::new(config.planet_radius * 0.1, config.planet_radius, 0.0);
        forest.update(offset, camera());

        for face in CubeFace::ALL {
            for addr in forest.tree_for(face).tree().root.all_leaves() {
                let levels = forest.neighbor_levels(addr);
                let own = level_of(&addr);
                for level in levels {
                    assert!(
                        (own as i16 - level as i16).abs() <= 1,
                        "leaf at level {own} has a neighbor at level {level}, violates balance"
                    );
                }
            }
        }
    }

    #[test]
    fn test_reset_returns_to_six_root_leaves() {
        let config = config();
        let mut forest = LodForest::new(config);
        forest.update(on_surface(&config), camera());
        forest.reset();
        let far = DVec3::new(0.0, config.planet_radius * 1000.0, 0.0);
        forest.update(far, camera());
        assert_eq!(forest.collect_visible(&unbounded_frustum()).len(), 6);
    }

    #[test]
    fn test_idempotent_reinvocation_without_camera_change() {
        let config = config();
        let mut forest = LodForest::new(config);
        let cam = on_surface(&config);
        forest.update(cam, camera());
        let first = forest.collect_visible(&unbounded_frustum()).len();
        forest.update(cam, camera());
        let second = forest.collect_visible(&unbounded_frustum()).len();
        assert_eq!(first, second);
    }

    fn unbounded_frustum() -> Frustum {
        use crate::frustum::Plane;
        let huge = 1.0e18;
        Frustum::new([
            Plane::new(DVec3::new(0.0, 0.0, 1.0), huge),
            Plane::new(DVec3::new(0.0, 0.0, -1.0), huge),
            Plane::new(DVec3::new(1.0, 0.0, 0.0), huge),
            Plane::new(DVec3::new(-1.0, 0.0, 0.0), huge),
            Plane::new(DVec3::new(0.0, 1.0, 0.0), huge),
            Plane::new(DVec3::new(0.0, -1.0, 0.0), huge),
        ])
    }
}
