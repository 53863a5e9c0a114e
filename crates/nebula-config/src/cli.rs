//! Command-line argument parsing for the mesher.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Mesher command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "nebula-mesh", about = "Planet-scale terrain mesher")]
pub struct CliArgs {
    /// Planet radius in meters.
    #[arg(long)]
    pub planet_radius: Option<f64>,

    /// Number of patch-meshing worker threads (0 = all available).
    #[arg(long)]
    pub worker_threads: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(radius) = args.planet_radius {
            self.mesher.planet_radius = radius;
        }
        if let Some(workers) = args.worker_threads {
            self.runtime.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.runtime.log_level = level.clone();
        }
        if let Some(ref path) = args.config {
            self.runtime.config_path = Some(path.display().to_string());
        }
    }
}
