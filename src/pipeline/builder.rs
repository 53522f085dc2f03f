// src/pipeline/builder.rs

//! Pipeline assembly.
//!
//! [`PipelineBuilder::build`] decides what runs before and after the
//! generation stage; [`assemble`] turns that into the final stage order.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::declaration::{PipelineDeclaration, StageRegistry};
use crate::pipeline::imports::{ImportInlineStage, PreserveToolImports, RestoreToolImports};
use crate::pipeline::stages::{FormatStage, MinifyStage, PrefixStage};
use crate::pipeline::{is_generation_stage, StageRef};

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineMode {
    /// No external declaration: guard tool imports around the import inliner.
    BuiltIn,
    /// Stages come from a user declaration.
    Sourced(PipelineDeclaration),
}

/// Options the pipeline forwards to the processor unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassthroughOptions {
    pub map: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineParts {
    pub before: Vec<StageRef>,
    pub after: Vec<StageRef>,
    pub options: PassthroughOptions,
}

#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    mode: PipelineMode,
    registry: StageRegistry,
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl PipelineBuilder {
    pub fn new(mode: PipelineMode, fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            registry: StageRegistry::default(),
            fs,
            root: root.into(),
        }
    }

    pub fn with_registry(mut self, registry: StageRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn mode(&self) -> &PipelineMode {
        &self.mode
    }

    /// Split the stages into those before and after `generation`.
    pub fn build(&self, generation: &StageRef) -> Result<PipelineParts> {
        match &self.mode {
            PipelineMode::BuiltIn => {
                let before: Vec<StageRef> = vec![
                    Arc::new(PreserveToolImports),
                    Arc::new(ImportInlineStage::new(Arc::clone(&self.fs), self.root.clone())),
                    Arc::new(RestoreToolImports),
                ];
                Ok(PipelineParts {
                    before,
                    after: Vec::new(),
                    options: PassthroughOptions::default(),
                })
            }
            PipelineMode::Sourced(declaration) => {
                let stages = self
                    .registry
                    .instantiate(declaration, generation, &self.fs, &self.root)?;
                let (before, after) = split_at_generation(stages);
                debug!(
                    before = before.len(),
                    after = after.len(),
                    "split declared stages around generation"
                );
                Ok(PipelineParts {
                    before,
                    after,
                    options: PassthroughOptions {
                        map: declaration.map,
                    },
                })
            }
        }
    }
}

/// Split at the first stage carrying the generation marker; that stage
/// itself is dropped. Without one, every stage runs after generation.
pub fn split_at_generation(mut stages: Vec<StageRef>) -> (Vec<StageRef>, Vec<StageRef>) {
    match stages.iter().position(|s| is_generation_stage(s.as_ref())) {
        Some(idx) => {
            let after = stages.split_off(idx + 1);
            stages.truncate(idx);
            (stages, after)
        }
        None => (Vec::new(), stages),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleFlags {
    pub minify: bool,
    pub autoprefixer: bool,
}

impl Default for AssembleFlags {
    fn default() -> Self {
        Self {
            minify: false,
            autoprefixer: true,
        }
    }
}

/// Final order: before, generation, format, after, prefix, minify.
///
/// Formatting is skipped when minifying; prefixing is skipped when
/// disabled; minification only runs when requested.
pub fn assemble(parts: &PipelineParts, generation: &StageRef, flags: AssembleFlags) -> Vec<StageRef> {
    let format: Option<StageRef> = (!flags.minify).then(|| Arc::new(FormatStage) as StageRef);
    let prefix: Option<StageRef> = flags.autoprefixer.then(|| Arc::new(PrefixStage) as StageRef);
    let minify: Option<StageRef> = flags.minify.then(|| Arc::new(MinifyStage) as StageRef);

    parts
        .before
        .iter()
        .cloned()
        .map(Some)
        .chain([Some(Arc::clone(generation)), format])
        .chain(parts.after.iter().cloned().map(Some))
        .chain([prefix, minify])
        .flatten()
        .collect()
}
