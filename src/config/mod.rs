// src/config/mod.rs

//! Configuration loading and resolution for stylewatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Locate and load config modules through an evictable cache (`loader.rs`).
//! - Walk the preset graph of a config file (`graph.rs`).
//! - Merge defaults, presets and user config (`resolve.rs`).

pub mod defaults;
pub mod graph;
pub mod loader;
pub mod model;
pub mod resolve;

pub use defaults::default_config;
pub use graph::{load_config_graph, ConfigModule, LoadedConfig};
pub use loader::{locate_config, ModuleCache, CONFIG_FILE_NAME};
pub use model::{
    ContentConfig, ContentEntry, ContentSpec, Declarations, RawConfig, RawContent,
    ResolvedConfig, Screen,
};
pub use resolve::{ConfigResolver, LayeredResolver};
