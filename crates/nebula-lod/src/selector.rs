//! Screen-space-error LOD selection.
//!
//! Replaces a fixed distance-threshold table with a single formula: a
//! node's screen-space error is how many pixels wide its geometric
//! error would project to at the camera's current distance. Splitting
//! and merging both key off this one number instead of a per-level
//! lookup table, so the same selector works uniformly from orbit down
//! to the surface.

/// Tunable LOD behavior, independent of any one frame's camera state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodConfig {
    /// Planet radius in meters; scales the geometric error estimate.
    pub planet_radius: f64,
    /// Coarsest level a leaf is allowed to split past (`L_max`).
    pub max_level: u8,
    /// Split threshold in pixels (`τ_split`).
    pub split_pixels: f32,
    /// Merge threshold in pixels (`τ_merge`).
    pub merge_pixels: f32,
    /// `c` in `geometric_error(level) ≈ R · 2^(−level) · c`.
    pub geometric_error_constant: f64,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            planet_radius: 6_371_000.0,
            max_level: 10,
            split_pixels: 8.0,
            merge_pixels: 3.0,
            geometric_error_constant: 0.5,
        }
    }
}

impl LodConfig {
    /// # Panics
    ///
    /// Panics if `split_pixels <= merge_pixels` (hysteresis requires
    /// a strict gap between the two thresholds) or either threshold
    /// is non-positive.
    #[must_use]
    pub fn new(
        planet_radius: f64,
        max_level: u8,
        split_pixels: f32,
        merge_pixels: f32,
        geometric_error_constant: f64,
    ) -> Self {
        assert!(split_pixels > 0.0 && merge_pixels > 0.0, "pixel thresholds must be positive");
        assert!(
            split_pixels > merge_pixels,
            "split_pixels ({split_pixels}) must exceed merge_pixels ({merge_pixels}) to provide hysteresis"
        );
        Self {
            planet_radius,
            max_level,
            split_pixels,
            merge_pixels,
            geometric_error_constant,
        }
    }
}

/// The camera parameters `projected_size` needs to convert a world-space
/// length into a pixel count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraProjection {
    pub viewport_height: f32,
    pub vertical_fov_radians: f32,
    /// Distances below this are clamped before projecting, to avoid a
    /// divide-by-zero or negative-size blowup for a bounding sphere
    /// whose center sits inside the near plane.
    pub near_plane: f64,
}

/// The world-space error a level's geometry tolerates, approximately
/// `R · 2^(−level) · c`: each level halves the error the previous one
/// allowed.
#[must_use]
pub fn geometric_error(level: u8, planet_radius: f64, constant: f64) -> f64 {
    planet_radius * 2f64.powi(-i32::from(level)) * constant
}

/// Project a world-space radius at `distance` from the camera to a
/// pixel count, using the standard
/// `pixels = (radius / distance) * (viewport_height / (2 * tan(fov/2)))`
/// approximation.
#[must_use]
pub fn projected_size(radius: f64, distance: f64, camera: CameraProjection) -> f32 {
    let clamped_distance = distance.max(camera.near_plane).max(f64::EPSILON);
    let half_fov = f64::from(camera.vertical_fov_radians) / 2.0;
    let scale = f64::from(camera.viewport_height) / (2.0 * half_fov.tan());
    ((radius / clamped_distance) * scale) as f32
}

/// `ε_s = projected_size(bsphere) · geometric_error(level)`: the pixel
/// quantity `update` compares against `τ_split`/`τ_merge`.
#[must_use]
pub fn screen_space_error(
    bounding_radius: f64,
    distance: f64,
    level: u8,
    camera: CameraProjection,
    config: &LodConfig,
) -> f32 {
    let size = projected_size(bounding_radius, distance, camera);
    let error = geometric_error(level, config.planet_radius, config.geometric_error_constant);
    size * error as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraProjection {
        CameraProjection {
            viewport_height: 1080.0,
            vertical_fov_radians: std::f32::consts::FRAC_PI_3,
            near_plane: 0.1,
        }
    }

    #[test]
    fn test_geometric_error_halves_per_level() {
        let config = LodConfig::default();
        let e0 = geometric_error(0, config.planet_radius, config.geometric_error_constant);
        let e1 = geometric_error(1, config.planet_radius, config.geometric_error_constant);
        assert!((e0 / 2.0 - e1).abs() < 1e-6);
    }

    #[test]
    fn test_geometric_error_at_level_zero() {
        let config = LodConfig::default();
        let e = geometric_error(0, config.planet_radius, config.geometric_error_constant);
        assert!((e - config.planet_radius * config.geometric_error_constant).abs() < 1e-3);
    }

    #[test]
    fn test_projected_size_shrinks_with_distance() {
        let c = camera();
        let near = projected_size(1000.0, 2000.0, c);
        let far = projected_size(1000.0, 20_000.0, c);
        assert!(far < near);
    }

    #[test]
    fn test_projected_size_clamps_inside_near_plane() {
        let c = camera();
        let at_near = projected_size(1000.0, c.near_plane, c);
        let inside_near = projected_size(1000.0, c.near_plane / 100.0, c);
        assert_eq!(at_near, inside_near, "distances below near_plane should clamp identically");
        assert!(at_near.is_finite());
    }

    #[test]
    fn test_screen_space_error_decreases_with_level() {
        let config = LodConfig::default();
        let c = camera();
        let err0 = screen_space_error(10_000.0, 50_000.0, 0, c, &config);
        let err5 = screen_space_error(10_000.0, 50_000.0, 5, c, &config);
        assert!(err5 < err0, "coarser levels (smaller geometric error) should score lower");
    }

    #[test]
    fn test_screen_space_error_decreases_with_distance() {
        let config = LodConfig::default();
        let c = camera();
        let close = screen_space_error(10_000.0, 20_000.0, 3, c, &config);
        let far = screen_space_error(10_000.0, 2_000_000.0, 3, c, &config);
        assert!(far < close);
    }

    #[test]
    #[should_panic(expected = "must exceed merge_pixels")]
    fn test_config_rejects_non_hysteretic_thresholds() {
        LodConfig::new(6_371_000.0, 10, 3.0, 8.0, 0.5);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_config_rejects_non_positive_threshold() {
        LodConfig::new(6_371_000.0, 10, 8.0, 0.0, 0.5);
    }
}
