//! The `simplify` and `select` subcommands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use meshlod_config::{SelectionConfig, SimplifyConfig};
use meshlod_lod::{BudgetedLodSelector, Camera, FrameSelection, LodError, Scene};
use meshlod_mesh::{MeshError, read_ply_file};
use meshlod_simplify::{LodGenerator, SimplifyError, write_lod_set};
use tracing::info;

/// Errors surfaced by a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Simplify(#[from] SimplifyError),

    #[error(transparent)]
    Lod(#[from] LodError),
}

/// Generate the configured LOD set for `input` and write it to disk.
///
/// Files land in `output`, else `config.output_dir`, else next to `input`.
pub fn run_simplify(
    config: &SimplifyConfig,
    input: &Path,
    output: Option<&Path>,
) -> Result<Vec<PathBuf>, CommandError> {
    let mesh = read_ply_file(input)?;
    info!(
        "Loaded {}: {} vertices, {} triangles",
        input.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let levels = LodGenerator::new(config.max_depth)
        .with_normalize_epsilon(config.normalize_epsilon)
        .with_determinant_threshold(config.determinant_threshold)
        .generate(&mesh, &config.target_depths)?;

    let dir = output
        .map(Path::to_path_buf)
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| input.parent().map(Path::to_path_buf).unwrap_or_default());
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());

    Ok(write_lod_set(&dir, &stem, &levels)?)
}

/// Load a scene and run one selection pass from `camera`.
pub fn run_select(
    config: &SelectionConfig,
    scene_path: &Path,
    camera: &Camera,
) -> Result<(Scene, FrameSelection), CommandError> {
    let scene = Scene::load(scene_path, &config.lod_depths)?;
    let selector = BudgetedLodSelector::with_half_fov(config.triangle_budget, config.half_fov_degrees);
    let frame = selector.select(&scene, camera);
    Ok((scene, frame))
}

/// Human-readable draw list.
pub fn format_selection(scene: &Scene, frame: &FrameSelection) -> String {
    let mut out = String::new();
    for draw in frame.draw_commands() {
        let (depth, triangles) = scene
            .entity(draw.entity)
            .map_or((0, 0), |e| (e.depth(draw.lod), e.triangle_count(draw.lod)));
        let _ = writeln!(
            out,
            "entity {} at ({}, {}): LOD {} (depth {depth}, {triangles} triangles)",
            draw.entity, draw.cell.x, draw.cell.y, draw.lod
        );
    }
    let _ = writeln!(
        out,
        "{} instances, {} triangles, {} upgrades",
        frame.candidate_count(),
        frame.total_triangles,
        frame.upgrades
    );
    out
}
