//! The eight vertices of the cube and their relationship to face corners.
//!
//! Every face has four corners, and each corner is shared by exactly three
//! faces (3 faces meet at every cube vertex). This module resolves a
//! per-face corner into the cube vertex it sits on, and back out to the
//! other two faces that share it, so that identity and LOD-balance checks
//! at a cube vertex see a single canonical point rather than three
//! independent ones.

use crate::neighbor::FaceDirection;
use crate::{ChunkAddress, CubeFace};

/// One of the four corners of a face's UV square, named by its north/south
/// and east/west edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceCorner {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl FaceCorner {
    pub const ALL: [FaceCorner; 4] = [
        FaceCorner::NorthEast,
        FaceCorner::NorthWest,
        FaceCorner::SouthEast,
        FaceCorner::SouthWest,
    ];

    /// `+1` if this corner sits on the `East` edge (`u = 1`), `-1` if on `West` (`u = 0`).
    #[must_use]
    pub fn u_sign(self) -> i8 {
        match self {
            FaceCorner::NorthEast | FaceCorner::SouthEast => 1,
            FaceCorner::NorthWest | FaceCorner::SouthWest => -1,
        }
    }

    /// `+1` if this corner sits on the `North` edge (`v = 1`), `-1` if on `South` (`v = 0`).
    #[must_use]
    pub fn v_sign(self) -> i8 {
        match self {
            FaceCorner::NorthEast | FaceCorner::NorthWest => 1,
            FaceCorner::SouthEast | FaceCorner::SouthWest => -1,
        }
    }

    /// The two edges bordering this corner.
    #[must_use]
    pub fn edges(self) -> (FaceDirection, FaceDirection) {
        match self {
            FaceCorner::NorthEast => (FaceDirection::North, FaceDirection::East),
            FaceCorner::NorthWest => (FaceDirection::North, FaceDirection::West),
            FaceCorner::SouthEast => (FaceDirection::South, FaceDirection::East),
            FaceCorner::SouthWest => (FaceDirection::South, FaceDirection::West),
        }
    }
}

/// One of the eight vertices of the cube, identified by the sign of each
/// axis. This is the same all-or-nothing-at-`+-1` point the vertex identity
/// key tags separately from the interior of a face or edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CubeCorner {
    pub x: i8,
    pub y: i8,
    pub z: i8,
}

impl CubeCorner {
    pub const ALL: [CubeCorner; 8] = [
        CubeCorner { x: 1, y: 1, z: 1 },
        CubeCorner { x: 1, y: 1, z: -1 },
        CubeCorner { x: 1, y: -1, z: 1 },
        CubeCorner { x: 1, y: -1, z: -1 },
        CubeCorner { x: -1, y: 1, z: 1 },
        CubeCorner { x: -1, y: 1, z: -1 },
        CubeCorner { x: -1, y: -1, z: 1 },
        CubeCorner { x: -1, y: -1, z: -1 },
    ];

    /// Index in `0..8`, one bit per axis sign. Stable and dense, suitable
    /// for packing into a few bits of a vertex identity key.
    #[must_use]
    pub fn index(self) -> u8 {
        let bx = u8::from(self.x > 0);
        let by = u8::from(self.y > 0);
        let bz = u8::from(self.z > 0);
        (bx << 2) | (by << 1) | bz
    }
}

/// The three `(face, corner)` pairs that meet at a single cube vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CornerNeighbors {
    pub corners: [(CubeFace, FaceCorner); 3],
}

impl CornerNeighbors {
    /// Find the three face corners that coincide at `cube_corner`.
    ///
    /// # Panics
    ///
    /// Panics if fewer or more than three faces map to the given corner,
    /// which would indicate a bug in [`face_corner_to_cube_corner`] or the
    /// face basis tables it relies on.
    #[must_use]
    pub fn at(cube_corner: CubeCorner) -> Self {
        let mut found = Vec::with_capacity(3);
        for face in CubeFace::ALL {
            for corner in FaceCorner::ALL {
                if face_corner_to_cube_corner(face, corner) == cube_corner {
                    found.push((face, corner));
                }
            }
        }
        assert_eq!(
            found.len(),
            3,
            "cube corner {cube_corner:?} should be shared by exactly 3 faces, found {}",
            found.len()
        );
        CornerNeighbors {
            corners: [found[0], found[1], found[2]],
        }
    }
}

/// Map a face corner to the cube vertex it sits on.
///
/// The face's normal, tangent, and bitangent are each axis-aligned unit
/// vectors, so `normal + tangent * u_sign + bitangent * v_sign` has exactly
/// one nonzero, unit-magnitude component per axis: the signs of those three
/// components are the cube corner.
#[must_use]
pub fn face_corner_to_cube_corner(face: CubeFace, corner: FaceCorner) -> CubeCorner {
    let point =
        face.normal() + face.tangent() * f64::from(corner.u_sign()) + face.bitangent() * f64::from(corner.v_sign());

    let sign = |v: f64| -> i8 {
        if v >= 0.0 {
            1
        } else {
            -1
        }
    };

    CubeCorner {
        x: sign(point.x),
        y: sign(point.y),
        z: sign(point.z),
    }
}

/// The chunk occupying the given corner of a face at `lod`.
#[must_use]
pub fn corner_chunk_on_face(face: CubeFace, corner: FaceCorner, lod: u8) -> ChunkAddress {
    let grid = ChunkAddress::grid_size(lod);
    let x = if corner.u_sign() > 0 { grid - 1 } else { 0 };
    let y = if corner.v_sign() > 0 { grid - 1 } else { 0 };
    ChunkAddress::new(face, lod, x, y)
}

/// Whether a set of chunks sharing a cube corner satisfies the one-level
/// LOD balance constraint: no two of them may differ by more than one LOD.
///
/// Takes an arbitrary slice (rather than exactly three) so callers can pass
/// whatever subset of the corner's chunks currently exist in the active
/// quadtree, e.g. while a split or merge is still in flight.
#[must_use]
pub fn corner_lod_valid(addrs: &[ChunkAddress]) -> bool {
    let Some(min) = addrs.iter().map(|a| a.lod).min() else {
        return true;
    };
    let max = addrs.iter().map(|a| a.lod).max().unwrap_or(min);
    max - min <= 1
}
