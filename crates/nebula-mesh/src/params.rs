//! Resolved, validated runtime parameters for one `PlanetMesher`.
//!
//! This is the mesher's own construction-time gate on top of
//! `nebula_config`'s generic range validation: `nebula-config` knows nothing
//! about `nebula-identity`'s bit-packing scheme, so it accepts
//! `quantization_bits` anywhere in `[1, 62]`. `MesherParams::new` layers the
//! tighter `nebula_identity::MAX_QUANTIZATION_BITS` ceiling on top, because
//! only identity's packing layout knows where precision actually runs out.

use nebula_config::{Config, ConfigError, MesherConfig};
use nebula_cubesphere::ChunkAddress;

#[derive(Clone, Copy, Debug)]
pub struct MesherParams {
    pub planet_radius: f64,
    pub max_level: u8,
    pub patch_grid_n: u16,
    pub split_pixels: f32,
    pub merge_pixels: f32,
    pub boundary_epsilon: f64,
    pub quantization_bits: u8,
    pub enable_tjunction_fix: bool,
    pub keep_cache_across_frames: bool,
    pub worker_threads: usize,
}

impl MesherParams {
    /// Resolves both halves of an ambient `Config` into one validated set
    /// of mesher parameters, turning `runtime.worker_threads == 0` into the
    /// host's available parallelism.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let worker_threads = if config.runtime.worker_threads == 0 {
            num_cpus::get()
        } else {
            config.runtime.worker_threads
        };
        Self::new(&config.mesher, worker_threads)
    }

    pub fn new(config: &MesherConfig, worker_threads: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.quantization_bits > nebula_identity::MAX_QUANTIZATION_BITS {
            return Err(ConfigError::Invalid(format!(
                "quantization_bits {} exceeds the identity packer's limit of {}",
                config.quantization_bits,
                nebula_identity::MAX_QUANTIZATION_BITS,
            )));
        }
        if config.max_level as u32 > ChunkAddress::MAX_LOD as u32 {
            return Err(ConfigError::Invalid(format!(
                "max_level {} exceeds the structural limit of {}",
                config.max_level,
                ChunkAddress::MAX_LOD,
            )));
        }
        Ok(Self {
            planet_radius: config.planet_radius,
            max_level: config.max_level,
            patch_grid_n: config.patch_grid_n,
            split_pixels: config.split_pixels,
            merge_pixels: config.merge_pixels,
            boundary_epsilon: config.boundary_epsilon,
            quantization_bits: config.quantization_bits,
            enable_tjunction_fix: config.enable_tjunction_fix,
            keep_cache_across_frames: config.keep_cache_across_frames,
            worker_threads: worker_threads.max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_quantization_bits_above_identity_limit() {
        let mut config = MesherConfig::default();
        config.quantization_bits = nebula_identity::MAX_QUANTIZATION_BITS + 1;
        assert!(MesherParams::new(&config, 1).is_err());
    }

    #[test]
    fn rejects_max_level_above_structural_limit() {
        let mut config = MesherConfig::default();
        config.max_level = ChunkAddress::MAX_LOD + 1;
        assert!(MesherParams::new(&config, 1).is_err());
    }

    #[test]
    fn zero_worker_threads_resolves_to_available_parallelism() {
        let config = Config::default();
        let params = MesherParams::from_config(&config).unwrap();
        assert!(params.worker_threads >= 1);
    }

    #[test]
    fn defaults_validate_cleanly() {
        let config = MesherConfig::default();
        assert!(MesherParams::new(&config, 4).is_ok());
    }
}
