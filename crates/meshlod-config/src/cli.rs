//! Command-line overrides shared by every meshlod subcommand.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Global options. Values given here override settings loaded from `config.ron`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Octree depth used for LOD generation.
    #[arg(long, global = true)]
    pub max_depth: Option<u32>,

    /// Comma-separated depths to generate, e.g. `6,7,9,10`.
    #[arg(long, global = true, value_delimiter = ',')]
    pub depths: Option<Vec<u32>>,

    /// Per-frame triangle budget.
    #[arg(long, global = true)]
    pub triangle_budget: Option<u64>,

    /// Half-angle of the field-of-view test, in degrees.
    #[arg(long, global = true)]
    pub half_fov: Option<f32>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(depth) = args.max_depth {
            self.simplify.max_depth = depth;
        }
        if let Some(ref depths) = args.depths {
            self.simplify.target_depths = depths.clone();
            self.selection.lod_depths = depths.clone();
        }
        if let Some(budget) = args.triangle_budget {
            self.selection.triangle_budget = budget;
        }
        if let Some(fov) = args.half_fov {
            self.selection.half_fov_degrees = fov;
        }
    }
}
