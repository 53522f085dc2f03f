// src/config/loader.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::RawConfig;
use crate::errors::{Result, StyleError};
use crate::fs::{find_upward, FileSystem};

/// File name searched for when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "stylewatch.config.toml";

/// Parsed configuration modules keyed by absolute path.
///
/// Loading the same module twice returns the cached parse; callers must
/// [`evict`](ModuleCache::evict) a path to force the next load to hit disk.
#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: HashMap<PathBuf, toml::Table>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the parsed table for `path`, reading and parsing it on a miss.
    pub fn load(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<toml::Table> {
        if let Some(table) = self.modules.get(path) {
            return Ok(table.clone());
        }

        debug!("module cache miss: loading {:?}", path);
        let contents = fs.read_to_string(path)?;
        let table: toml::Table = toml::from_str(&contents).map_err(|source| StyleError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        self.modules.insert(path.to_path_buf(), table.clone());
        Ok(table)
    }

    /// Drop the cached parse for `path`, if any.
    pub fn evict(&mut self, path: &Path) -> bool {
        let removed = self.modules.remove(path).is_some();
        if removed {
            debug!("evicted cached module {:?}", path);
        }
        removed
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.modules.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Load one configuration module through the cache and deserialize it.
pub fn load_module(cache: &mut ModuleCache, fs: &dyn FileSystem, path: &Path) -> Result<RawConfig> {
    let table = cache.load(fs, path)?;
    parse_table(path, table)
}

/// Deserialize an already-parsed TOML table into a [`RawConfig`].
pub fn parse_table(path: &Path, table: toml::Table) -> Result<RawConfig> {
    toml::Value::Table(table)
        .try_into::<RawConfig>()
        .map_err(|source| StyleError::Toml {
            path: path.to_path_buf(),
            source,
        })
}

/// Decide which configuration file applies to this invocation.
///
/// An explicit path always wins (even if it does not exist; loading it
/// will then fail). Otherwise the nearest [`CONFIG_FILE_NAME`] found by
/// walking upward from `search_from` is used. `None` means "use the
/// built-in defaults".
pub fn locate_config(
    fs: &dyn FileSystem,
    explicit: Option<&Path>,
    search_from: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    find_upward(fs, search_from, CONFIG_FILE_NAME)
}
