//! Unique chunk identifier on the cubesphere.

use crate::{CubeFace, FaceCoord};

/// Uniquely identifies a chunk on the cubesphere.
///
/// - `face`: which of the 6 cube faces this chunk belongs to.
/// - `lod`: level of detail. LOD 0 is the highest detail (smallest chunks).
///   Higher LOD values represent coarser, larger chunks.
/// - `x`, `y`: grid coordinates within the face at this LOD level.
///   At LOD `l`, the face is divided into a `grid_size(l) Ã— grid_size(l)` grid,
///   where `grid_size(l) = MAX_CHUNKS_PER_AXIS >> l`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkAddress {
    /// Which cube face this chunk belongs to.
    pub face: CubeFace,
    /// Level of detail (0 = finest, [`Self::MAX_LOD`] = coarsest).
    pub lod: u8,
    /// Horizontal grid coordinate within the face at this LOD.
    pub x: u32,
    /// Vertical grid coordinate within the face at this LOD.
    pub y: u32,
}

impl ChunkAddress {
    /// Maximum number of chunks along one axis at LOD 0 (highest detail).
    ///
    /// 2^20 = 1,048,576 chunks per face axis at max detail. At 32 m per chunk
    /// this covers a planet with ~33,554 km circumference (Earth-like).
    pub const MAX_LOD0_AXIS: u32 = 1 << 20;

    /// Maximum valid LOD level. LOD 20 means the entire face is one chunk.
    pub const MAX_LOD: u8 = 20;

    /// Number of chunks along one axis at the given LOD level.
    ///
    /// # Panics
    ///
    /// Panics if `lod` exceeds [`Self::MAX_LOD`].
    #[must_use]
    pub fn grid_size(lod: u8) -> u32 {
        assert!(
            lod <= Self::MAX_LOD,
            "LOD {lod} exceeds MAX_LOD {}",
            Self::MAX_LOD
        );
        Self::MAX_LOD0_AXIS >> lod
    }

    /// Construct a `ChunkAddress`, validating that `x` and `y` are within
    /// the grid bounds for the given LOD.
    ///
    /// # Panics
    ///
    /// Panics if `lod` exceeds [`Self::MAX_LOD`] or if `x`/`y` are out of range.
    #[must_use]
    pub fn new(face: CubeFace, lod: u8, x: u32, y: u32) -> Self {
        let size = Self::grid_size(lod);
        assert!(x < size, "x={x} out of range for LOD {lod} (max {size})");
        assert!(y < size, "y={y} out of range for LOD {lod} (max {size})");
        Self { face, lod, x, y }
    }

    /// Compute the UV bounding box of this chunk on its face.
    ///
    /// Returns `(u_min, v_min, u_max, v_max)` where all values are in \[0, 1\].
    #[must_use]
    pub fn uv_bounds(&self) -> (f64, f64, f64, f64) {
        let size = Self::grid_size(self.lod) as f64;
        let u_min = self.x as f64 / size;
        let v_min = self.y as f64 / size;
        let u_max = (self.x + 1) as f64 / size;
        let v_max = (self.y + 1) as f64 / size;
        (u_min, v_min, u_max, v_max)
    }

    /// Return the [`FaceCoord`] at the center of this chunk.
    #[must_use]
    pub fn center_face_coord(&self) -> FaceCoord {
        let (u_min, v_min, u_max, v_max) = self.uv_bounds();
        FaceCoord::new(self.face, (u_min + u_max) * 0.5, (v_min + v_max) * 0.5)
    }

    /// The parent chunk at the next coarser LOD level.
    ///
    /// Returns `None` if already at [`Self::MAX_LOD`].
    #[must_use]
    pub fn parent(&self) -> Option<ChunkAddress> {
        if self.lod >= Self::MAX_LOD {
            return None;
        }
        Some(ChunkAddress {
            face: self.face,
            lod: self.lod + 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// The four child chunks at the next finer LOD level.
    ///
    /// Returns `None` if already at LOD 0.
    #[must_use]
    pub fn children(&self) -> Option<[ChunkAddress; 4]> {
        if self.lod == 0 {
            return None;
        }
        let child_lod = self.lod - 1;
        let cx = self.x * 2;
        let cy = self.y * 2;
        Some([
            ChunkAddress::new(self.face, child_lod, cx, cy),
            ChunkAddress::new(self.face, child_lod, cx + 1, cy),
            ChunkAddress::new(self.face, child_lod, cx, cy + 1),
            ChunkAddress::new(self.face, child_lod, cx + 1, cy + 1),
        ])
    }
}

impl std::fmt::Display for ChunkAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:?}, lod={}, x={}, y={})",
            self.face, self.lod, self.x, self.y
        )
    }
}
