// src/pipeline/declaration.rs

//! External pipeline declarations.
//!
//! A declaration file lists stages by name, in order:
//!
//! ```toml
//! map = true
//!
//! [[stage]]
//! name = "import"
//!
//! [[stage]]
//! name = "stylewatch"
//!
//! [[stage]]
//! name = "banner"
//! text = "built by stylewatch"
//! ```
//!
//! Names are resolved through a [`StageRegistry`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{Result, StyleError};
use crate::fs::{find_upward, FileSystem};
use crate::pipeline::imports::ImportInlineStage;
use crate::pipeline::stages::{BannerStage, FormatStage, MinifyStage, PrefixStage};
use crate::pipeline::StageRef;

/// File name searched for when `--postcss` is given without a path.
pub const PIPELINE_FILE_NAME: &str = "stylewatch.pipeline.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDeclaration {
    /// Request a source map for the output.
    #[serde(default)]
    pub map: bool,

    #[serde(default, rename = "stage")]
    pub stages: Vec<StageDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StageDeclaration {
    pub name: String,

    /// Every other key of the `[[stage]]` table.
    #[serde(flatten)]
    pub options: toml::Table,
}

impl PipelineDeclaration {
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name.as_str())
    }
}

/// Read and parse a declaration file.
pub fn load_declaration(fs: &dyn FileSystem, path: &Path) -> Result<PipelineDeclaration> {
    debug!("loading pipeline declaration from {:?}", path);
    let contents = fs.read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| StyleError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the declaration file for `--postcss [path]`.
///
/// An explicit path is used as-is; otherwise the nearest
/// [`PIPELINE_FILE_NAME`] above `search_from`.
pub fn locate_declaration(
    fs: &dyn FileSystem,
    explicit: Option<&Path>,
    search_from: &Path,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    find_upward(fs, search_from, PIPELINE_FILE_NAME).ok_or_else(|| {
        StyleError::Config(format!(
            "no {PIPELINE_FILE_NAME} found above {:?}",
            search_from
        ))
    })
}

/// Everything a stage constructor may need.
#[derive(Debug)]
pub struct StageArgs<'a> {
    pub options: &'a toml::Table,
    /// The session's generation stage; the `stylewatch` entry resolves to it.
    pub generation: &'a StageRef,
    pub fs: &'a Arc<dyn FileSystem>,
    pub root: &'a Path,
}

impl StageArgs<'_> {
    fn string_option(&self, stage: &str, key: &str) -> Result<String> {
        match self.options.get(key) {
            Some(toml::Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(StyleError::Config(format!(
                "stage '{stage}': option '{key}' must be a string, got {}",
                other.type_str()
            ))),
            None => Err(StyleError::Config(format!(
                "stage '{stage}': missing required option '{key}'"
            ))),
        }
    }
}

pub type StageConstructor = fn(&StageArgs<'_>) -> Result<StageRef>;

/// Maps declared stage names to constructors.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    constructors: BTreeMap<String, StageConstructor>,
}

impl Default for StageRegistry {
    fn default() -> Self {
        let mut registry = Self {
            constructors: BTreeMap::new(),
        };
        registry.register("import", |args| {
            Ok(Arc::new(ImportInlineStage::new(Arc::clone(args.fs), args.root)))
        });
        registry.register("stylewatch", |args| Ok(Arc::clone(args.generation)));
        registry.register("format", |_| Ok(Arc::new(FormatStage)));
        registry.register("prefix", |_| Ok(Arc::new(PrefixStage)));
        registry.register("minify", |_| Ok(Arc::new(MinifyStage)));
        registry.register("banner", |args| {
            Ok(Arc::new(BannerStage::new(args.string_option("banner", "text")?)))
        });
        registry
    }
}

impl StageRegistry {
    pub fn register(&mut self, name: &str, constructor: StageConstructor) {
        self.constructors.insert(name.to_string(), constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Fail on the first declared stage that has no constructor.
    pub fn validate(&self, declaration: &PipelineDeclaration) -> Result<()> {
        for name in declaration.stage_names() {
            if !self.contains(name) {
                let known: Vec<&str> = self.names().collect();
                return Err(StyleError::Pipeline(format!(
                    "unknown stage '{name}' (known stages: {})",
                    known.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Construct every declared stage, in declaration order.
    pub fn instantiate(
        &self,
        declaration: &PipelineDeclaration,
        generation: &StageRef,
        fs: &Arc<dyn FileSystem>,
        root: &Path,
    ) -> Result<Vec<StageRef>> {
        self.validate(declaration)?;

        let mut stages = Vec::with_capacity(declaration.stages.len());
        for decl in &declaration.stages {
            let constructor = self.constructors[&decl.name];
            let args = StageArgs {
                options: &decl.options,
                generation,
                fs,
                root,
            };
            stages.push(constructor(&args)?);
        }
        Ok(stages)
    }
}
