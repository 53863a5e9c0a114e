//! Sphere-to-cube inverse projection: recover face and UV from a direction or sphere point.

use glam::DVec3;

use crate::projection::face_coord_to_sphere_everitt;
use crate::{CubeFace, FaceCoord};

/// Determine which cube face a direction vector belongs to.
///
/// The face is determined by the axis with the largest absolute component.
/// Ties are broken by a fixed priority: X > Y > Z, positive > negative.
/// A zero vector maps to [`CubeFace::PosX`].
#[must_use]
pub fn direction_to_face(dir: DVec3) -> CubeFace {
    let ax = dir.x.abs();
    let ay = dir.y.abs();
    let az = dir.z.abs();

    if ax >= ay && ax >= az {
        if dir.x >= 0.0 {
            CubeFace::PosX
        } else {
            CubeFace::NegX
        }
    } else if ay >= az {
        if dir.y >= 0.0 {
            CubeFace::PosY
        } else {
            CubeFace::NegY
        }
    } else if dir.z >= 0.0 {
        CubeFace::PosZ
    } else {
        CubeFace::NegZ
    }
}

/// Convert a direction vector to a [`FaceCoord`] by simple projection.
///
/// This is the exact inverse of [`face_coord_to_cube_point`](crate::face_coord_to_cube_point)
/// followed by normalization. The direction does not need to be unit length.
#[must_use]
pub fn direction_to_face_coord(dir: DVec3) -> FaceCoord {
    let face = direction_to_face(dir);
    let n = face.normal();
    let tang = face.tangent();
    let bitan = face.bitangent();

    // Project onto the cube face plane.
    let d = dir.dot(n);
    // Guard against zero (degenerate direction along the face plane).
    if d.abs() < 1e-30 {
        return FaceCoord::new(face, 0.5, 0.5);
    }
    let projected = dir / d;

    let s = projected.dot(tang);
    let t = projected.dot(bitan);

    let u = (s + 1.0) * 0.5;
    let v = (t + 1.0) * 0.5;

    FaceCoord::new(face, u, v)
}

/// Inverse of the Everitt cube-to-sphere mapping.
///
/// Given a unit sphere point, returns the [`FaceCoord`] that would produce it
/// via [`face_coord_to_sphere_everitt`]. Uses Newton-Raphson iteration for
/// sub-epsilon accuracy. Typically converges in 3â€“5 iterations.
#[must_use]
pub fn sphere_to_face_coord_everitt(sphere_point: DVec3) -> FaceCoord {
    let approx = direction_to_face_coord(sphere_point);
    let face = approx.face;

    let mut u = approx.u;
    let mut v = approx.v;
    let target = sphere_point.normalize();

    for _ in 0..10 {
        let fc = FaceCoord::new_unchecked(face, u, v);
        let current = face_coord_to_sphere_everitt(&fc);
        let error = target - current;

        if error.length() < 1e-14 {
            break;
        }

        let du = 1e-8;
        let dv = 1e-8;
        let fc_du = FaceCoord::new_unchecked(face, (u + du).min(1.0), v);
        let fc_dv = FaceCoord::new_unchecked(face, u, (v + dv).min(1.0));
        let dp_du = (face_coord_to_sphere_everitt(&fc_du) - current) / du;
        let dp_dv = (face_coord_to_sphere_everitt(&fc_dv) - current) / dv;

        let a11 = dp_du.dot(dp_du);
        let a12 = dp_du.dot(dp_dv);
        let a22 = dp_dv.dot(dp_dv);
        let b1 = dp_du.dot(error);
        let b2 = dp_dv.dot(error);

        let det = a11 * a22 - a12 * a12;
        if det.abs() < 1e-20 {
            break;
        }

        let delta_u = (a22 * b1 - a12 * b2) / det;
        let delta_v = (a11 * b2 - a12 * b1) / det;

        u = (u + delta_u).clamp(0.0, 1.0);
        v = (v + delta_v).clamp(0.0, 1.0);
    }

    FaceCoord::new(face, u, v)
}
