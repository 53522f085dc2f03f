// src/config/graph.rs

//! Module graph of a configuration file and its presets.
//!
//! The graph answers two questions: which files affect the resolved
//! configuration (the config dependency set), and in which order preset
//! modules are layered during resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::config::loader::{load_module, ModuleCache};
use crate::config::model::RawConfig;
use crate::errors::{Result, StyleError};
use crate::fs::{normalize, FileSystem};

/// A single loaded configuration module.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub path: PathBuf,
    pub raw: RawConfig,
    /// Indices of this module's presets, in declaration order.
    pub presets: Vec<usize>,
}

/// The root configuration module plus everything it pulls in.
///
/// `root == None` means no configuration file applies and only the
/// built-in defaults are used.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub root: Option<usize>,
    pub modules: Vec<ConfigModule>,
}

impl LoadedConfig {
    /// Configuration with no file behind it.
    pub fn defaults_only() -> Self {
        Self::default()
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.root.map(|i| self.modules[i].path.as_path())
    }

    /// Every file whose content affects the resolved configuration.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.modules.iter().map(|m| m.path.clone()).collect()
    }
}

/// Walk `root` and its presets, loading each module through `cache`.
///
/// Preset paths are resolved relative to the declaring module. A preset
/// cycle is reported as a configuration error.
pub fn load_config_graph(
    cache: &mut ModuleCache,
    fs: &dyn FileSystem,
    root: &Path,
) -> Result<LoadedConfig> {
    let mut modules: Vec<ConfigModule> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

    let root_path = normalize(fs, root);
    let raw = load_module(cache, fs, &root_path)?;
    index.insert(root_path.clone(), 0);
    graph.add_node(0);
    modules.push(ConfigModule {
        path: root_path,
        raw,
        presets: Vec::new(),
    });

    let mut stack = vec![0usize];
    while let Some(current) = stack.pop() {
        let declared = modules[current].raw.presets.clone().unwrap_or_default();
        let base_dir = modules[current]
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        for preset in declared {
            let preset_path = normalize(fs, &base_dir.join(&preset));
            let idx = match index.get(&preset_path) {
                Some(&idx) => idx,
                None => {
                    debug!(preset = ?preset_path, "loading config preset");
                    let raw = load_module(cache, fs, &preset_path)?;
                    let idx = modules.len();
                    modules.push(ConfigModule {
                        path: preset_path.clone(),
                        raw,
                        presets: Vec::new(),
                    });
                    index.insert(preset_path, idx);
                    graph.add_node(idx);
                    stack.push(idx);
                    idx
                }
            };
            modules[current].presets.push(idx);
            graph.add_edge(current, idx, ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        let path = &modules[cycle.node_id()].path;
        return Err(StyleError::Config(format!(
            "preset cycle detected involving {:?}",
            path
        )));
    }

    Ok(LoadedConfig {
        root: Some(0),
        modules,
    })
}
