//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bit width nebula-identity's vertex packer is built to accept; generic
/// enough for this crate to validate against without depending on it.
const MAX_QUANTIZATION_BITS: u8 = 62;

/// Top-level mesher configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Terrain meshing settings.
    pub mesher: MesherConfig,
    /// Process-level settings not specific to meshing.
    pub runtime: RuntimeConfig,
}

/// Terrain patch mesher configuration. See each field for the option it
/// corresponds to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MesherConfig {
    /// Planet radius in meters.
    pub planet_radius: f64,
    /// Coarsest level a leaf is allowed to split past.
    pub max_level: u8,
    /// Patch grid resolution: each patch is an (N+1)x(N+1) vertex grid.
    pub patch_grid_n: u16,
    /// Split threshold in pixels.
    pub split_pixels: f32,
    /// Merge threshold in pixels.
    pub merge_pixels: f32,
    /// Snap tolerance for cube-face-boundary vertex identity, in cube units.
    pub boundary_epsilon: f64,
    /// Bits of precision used to quantize a snapped cube-surface position
    /// into a vertex identity.
    pub quantization_bits: u8,
    /// Stitch coarser-neighbor edges with triangle fans instead of leaving
    /// T-junction cracks.
    pub enable_tjunction_fix: bool,
    /// Keep materialized vertices across frames instead of clearing the
    /// cache at the start of every frame.
    pub keep_cache_across_frames: bool,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            planet_radius: 6_371_000.0,
            max_level: 10,
            patch_grid_n: 64,
            split_pixels: 8.0,
            merge_pixels: 3.0,
            boundary_epsilon: 1e-7,
            quantization_bits: 30,
            enable_tjunction_fix: true,
            keep_cache_across_frames: false,
        }
    }
}

impl MesherConfig {
    /// Generic range validation. Unaware of `nebula-identity`'s tighter
    /// packing limit; the mesher layers its own check for that on top of
    /// this one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planet_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "planet_radius must be positive, got {}",
                self.planet_radius
            )));
        }
        if self.merge_pixels >= self.split_pixels {
            return Err(ConfigError::Invalid(format!(
                "merge_pixels ({}) must be less than split_pixels ({})",
                self.merge_pixels, self.split_pixels
            )));
        }
        if self.split_pixels <= 0.0 || self.merge_pixels <= 0.0 {
            return Err(ConfigError::Invalid("split_pixels and merge_pixels must be positive".to_string()));
        }
        if self.quantization_bits < 1 || self.quantization_bits > MAX_QUANTIZATION_BITS {
            return Err(ConfigError::Invalid(format!(
                "quantization_bits must be in [1, {MAX_QUANTIZATION_BITS}], got {}",
                self.quantization_bits
            )));
        }
        if self.patch_grid_n == 0 {
            return Err(ConfigError::Invalid("patch_grid_n must be nonzero".to_string()));
        }
        Ok(())
    }
}

/// Process-level settings: worker pool size, logging, and where the
/// on-disk config file lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of patch-meshing worker threads. 0 means "use available
    /// parallelism".
    pub worker_threads: usize,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Where `load_or_create`/`save`/`reload` read and write `config.ron`.
    pub config_path: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            log_level: "info".to_string(),
            config_path: None,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.mesher.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.mesher.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
