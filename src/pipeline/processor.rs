// src/pipeline/processor.rs

use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::debug;

use crate::css;
use crate::errors::{Result, StyleError};
use crate::pipeline::{Message, RunState, StageRef};

/// Options passed through to every stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Input file; `None` for stdin or the built-in default input.
    pub from: Option<PathBuf>,
    /// Output file; `None` for stdout.
    pub to: Option<PathBuf>,
    /// Produce a source map.
    pub map: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub css: String,
    pub map: Option<String>,
    pub messages: Vec<Message>,
}

impl ProcessResult {
    /// Files reported as `Dependency` messages.
    pub fn dependencies(&self) -> impl Iterator<Item = &Path> {
        self.messages.iter().filter_map(|m| match m {
            Message::Dependency { file, .. } => Some(file.as_path()),
            Message::Warning { .. } => None,
        })
    }
}

/// Run `stages` over `input` on a blocking worker thread.
pub async fn process(stages: Vec<StageRef>, input: String, options: ProcessOptions) -> Result<ProcessResult> {
    tokio::task::spawn_blocking(move || process_blocking(&stages, &input, options))
        .await
        .map_err(|e| StyleError::Pipeline(format!("pipeline worker failed: {e}")))?
}

/// Parse `input`, apply each stage in order and print the result.
pub fn process_blocking(stages: &[StageRef], input: &str, options: ProcessOptions) -> Result<ProcessResult> {
    let mut sheet = css::parse(input)?;
    let mut run = RunState::new(options);

    for stage in stages {
        debug!(stage = stage.name(), "applying stage");
        stage.apply(&mut sheet, &mut run)?;
    }

    let mut output = sheet.to_css();
    let map = if run.options.map {
        let (map, annotation) = source_map(input, &run.options)?;
        if let Some(annotation) = annotation {
            if !output.ends_with('\n') && !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&annotation);
            output.push('\n');
        }
        Some(map)
    } else {
        None
    };

    Ok(ProcessResult {
        css: output,
        map,
        messages: run.messages,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A version 3 source map naming the input and embedding its content.
///
/// Stages do not track node origins, so `mappings` is empty.
fn source_map(input: &str, options: &ProcessOptions) -> Result<(String, Option<String>)> {
    let source = options
        .from
        .as_deref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<input css>".to_string());
    let file = options.to.as_deref().map(file_name).unwrap_or_default();

    let map = json!({
        "version": 3,
        "file": file,
        "sources": [source],
        "sourcesContent": [input],
        "names": [],
        "mappings": "",
    });
    let text = serde_json::to_string(&map)
        .map_err(|e| StyleError::Pipeline(format!("serializing source map: {e}")))?;

    let annotation = options
        .to
        .as_deref()
        .map(|to| format!("/*# sourceMappingURL={}.map */", file_name(to)));
    Ok((text, annotation))
}
