//! Configuration for the meshlod tools.
//!
//! Settings persist to disk as RON, every section falls back to defaults when
//! missing, and global command-line flags override whatever was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, SelectionConfig, SimplifyConfig, default_config_dir};
pub use error::ConfigError;
