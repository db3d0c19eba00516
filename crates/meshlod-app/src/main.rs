//! `meshlod`: offline LOD generation and budgeted LOD selection.
//!
//! ```text
//! meshlod simplify models/dragon.ply --depths 6,7,9,10
//! meshlod select --scene map/scene.ron --x 3.5 --z 7.0 --yaw 90
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use glam::Vec2;
use meshlod_config::{CliArgs, Config, default_config_dir};
use meshlod_lod::Camera;
use tracing::{error, info};

/// Octree LOD generation and budgeted LOD selection.
#[derive(Parser, Debug)]
#[command(name = "meshlod", version)]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate `<name>_LOD<depth>.ply` files from an ASCII PLY mesh.
    Simplify {
        /// Input mesh.
        input: PathBuf,

        /// Output directory (defaults to the configured one, then the input's).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run one selection pass over a scene and print the draw list.
    Select {
        /// RON scene description.
        #[arg(long)]
        scene: PathBuf,

        /// Camera grid x.
        #[arg(long, default_value_t = 0.5)]
        x: f32,

        /// Camera grid z.
        #[arg(long, default_value_t = 0.5)]
        z: f32,

        /// Camera heading in degrees; 0 looks along +x, 90 along +z.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        yaw: f32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_dir = cli.args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("meshlod: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.apply_cli_overrides(&cli.args);
    if let Err(e) = config.validate() {
        eprintln!("meshlod: {e}");
        return ExitCode::FAILURE;
    }

    let log_dir = config
        .debug
        .log_dir
        .clone()
        .unwrap_or_else(|| config_dir.join("logs"));
    meshlod_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let result = match &cli.command {
        Command::Simplify { input, output } => {
            commands::run_simplify(&config.simplify, input, output.as_deref()).map(|written| {
                for path in &written {
                    info!("Wrote {}", path.display());
                }
                println!("wrote {} LOD files", written.len());
            })
        }
        Command::Select { scene, x, z, yaw } => {
            let camera = Camera::new(Vec2::new(*x, *z), yaw.to_radians());
            commands::run_select(&config.selection, scene, &camera).map(|(scene, frame)| {
                print!("{}", commands::format_selection(&scene, &frame));
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("meshlod: {e}");
            ExitCode::FAILURE
        }
    }
}
