//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Offline LOD generation.
    pub simplify: SimplifyConfig,
    /// Per-frame LOD selection.
    pub selection: SelectionConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Offline LOD generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Depth the octree is built to.
    pub max_depth: u32,
    /// Depths a level is generated at, one output file each.
    pub target_depths: Vec<u32>,
    /// Expansion applied when normalizing into the unit cube.
    pub normalize_epsilon: f32,
    /// Cluster quadrics with `|det|` at or below this fall back to the centroid.
    pub determinant_threshold: f64,
    /// Where LOD files are written. Defaults to the input mesh's directory.
    pub output_dir: Option<PathBuf>,
}

/// Per-frame selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum triangles drawn per frame before upgrades stop.
    pub triangle_budget: u64,
    /// Half-angle of the conservative field-of-view test, in degrees.
    pub half_fov_degrees: f32,
    /// Depths loaded for each entity, as `<stem>_LOD<depth>.ply`.
    pub lod_depths: Vec<u32>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for the JSON log file in debug builds.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            target_depths: vec![6, 7, 9, 10],
            normalize_epsilon: 1e-4,
            determinant_threshold: 1e-3,
            output_dir: None,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            triangle_budget: 2_000_000,
            half_fov_degrees: 60.0,
            lod_depths: vec![6, 7, 9, 10],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Platform config directory for meshlod, e.g. `~/.config/meshlod` on Linux.
///
/// Falls back to `./.meshlod` when the platform has no config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("meshlod"))
        .unwrap_or_else(|| PathBuf::from(".meshlod"))
}

// --- Validation ---

impl Config {
    /// Reject settings no component could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.simplify;
        if s.target_depths.is_empty() {
            return Err(invalid("simplify.target_depths", "at least one depth is required"));
        }
        if let Some(&d) = s.target_depths.iter().find(|&&d| d > s.max_depth) {
            return Err(invalid(
                "simplify.target_depths",
                format!("depth {d} is deeper than max_depth {}", s.max_depth),
            ));
        }
        if !(s.normalize_epsilon >= 0.0) {
            return Err(invalid("simplify.normalize_epsilon", "must be non-negative"));
        }
        if !(s.determinant_threshold >= 0.0) {
            return Err(invalid("simplify.determinant_threshold", "must be non-negative"));
        }

        let sel = &self.selection;
        if !(sel.half_fov_degrees > 0.0 && sel.half_fov_degrees <= 180.0) {
            return Err(invalid(
                "selection.half_fov_degrees",
                format!("{} is outside (0, 180]", sel.half_fov_degrees),
            ));
        }
        if sel.lod_depths.is_empty() {
            return Err(invalid("selection.lod_depths", "at least one depth is required"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            config.validate()?;
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

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: returns `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
