// src/pipeline/mod.rs

//! CSS transform pipeline.
//!
//! - [`builder`] decides which user/built-in stages run before and after
//!   the generation stage, and assembles the final stage order.
//! - [`declaration`] loads an external pipeline declaration and maps stage
//!   names to constructors.
//! - [`generation`] is the tool's own stage.
//! - [`imports`] holds the import inliner and the stages that keep
//!   tool-namespace imports away from it.
//! - [`stages`] holds the formatting, prefixing, minifying and banner stages.
//! - [`processor`] runs an ordered stage list over one stylesheet.

pub mod builder;
pub mod declaration;
pub mod generation;
pub mod imports;
pub mod processor;
pub mod stages;

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::css::Stylesheet;
use crate::errors::Result;

pub use builder::{
    assemble, split_at_generation, AssembleFlags, PassthroughOptions, PipelineBuilder, PipelineMode,
    PipelineParts,
};
pub use declaration::{
    load_declaration, locate_declaration, PipelineDeclaration, StageRegistry, PIPELINE_FILE_NAME,
};
pub use generation::GenerationStage;
pub use processor::{process, process_blocking, ProcessOptions, ProcessResult};

/// What a stage is, as far as pipeline assembly is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any ordinary transform.
    Transform,
    /// The tool's own generation stage. Pipeline assembly splits the user's
    /// declared stages around the stage carrying this marker.
    Generation,
}

/// Side information reported by a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// `file` was read while processing and affects the output.
    Dependency {
        file: PathBuf,
        parent: Option<PathBuf>,
    },
    Warning {
        stage: String,
        text: String,
    },
}

/// Mutable per-run state handed to each stage.
#[derive(Debug, Default)]
pub struct RunState {
    pub options: ProcessOptions,
    pub messages: Vec<Message>,
}

impl RunState {
    pub fn new(options: ProcessOptions) -> Self {
        Self {
            options,
            messages: Vec::new(),
        }
    }

    pub fn warn(&mut self, stage: &str, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(stage, "{text}");
        self.messages.push(Message::Warning {
            stage: stage.to_string(),
            text,
        });
    }
}

/// One transform over a stylesheet.
pub trait Stage: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn capability(&self) -> Capability {
        Capability::Transform
    }

    fn apply(&self, sheet: &mut Stylesheet, run: &mut RunState) -> Result<()>;
}

pub type StageRef = Arc<dyn Stage>;

/// True for the stage carrying the [`Capability::Generation`] marker.
pub fn is_generation_stage(stage: &dyn Stage) -> bool {
    stage.capability() == Capability::Generation
}
