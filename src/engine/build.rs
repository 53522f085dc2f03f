// src/engine/build.rs

//! The build executor.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::engine::session::{InputSource, Session};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::{assemble, process, GenerationStage, ProcessOptions, StageRef};
use crate::watch::path_utils::map_path;

/// Input used when no `--input` is given.
pub const DEFAULT_INPUT: &str = "@stylewatch base;\n@stylewatch components;\n@stylewatch utilities;\n";

/// Outcome of one build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub css: String,
    pub map: Option<String>,
    /// Files the pipeline reported reading.
    pub dependencies: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

async fn read_input(fs: &dyn FileSystem, source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            Ok(text)
        }
        InputSource::File(path) => Ok(fs.read_to_string(path)?),
        InputSource::Default => Ok(DEFAULT_INPUT.to_string()),
    }
}

async fn write_output(fs: &dyn FileSystem, output: Option<&Path>, css: &str, map: Option<&str>) -> Result<()> {
    let Some(output) = output else {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(css.as_bytes()).await?;
        stdout.flush().await?;
        return Ok(());
    };

    fs.write(output, css.as_bytes())?;
    if let Some(map) = map {
        fs.write(&map_path(output), map.as_bytes())?;
    }
    debug!(output = ?output, "wrote output");
    Ok(())
}

/// Run one build: read the input, run the assembled pipeline, feed
/// reported dependencies back into the tracker (when watching) and write
/// the result.
pub async fn build(session: &mut Session) -> Result<BuildReport> {
    let start = Instant::now();

    // Only `Sync` handles may be held across awaits; the session itself is not.
    let fs = Arc::clone(session.fs());
    let source = session.options().input.clone();
    let output = session.options().output.clone();

    let input = read_input(fs.as_ref(), &source).await?;

    let context = session.context()?;
    let generation: StageRef = Arc::new(GenerationStage::new(context));
    let parts = session.pipeline().build(&generation)?;
    let stages = assemble(&parts, &generation, session.assemble_flags());

    let options = ProcessOptions {
        from: source.path().map(Path::to_path_buf),
        to: output.clone(),
        map: parts.options.map,
    };
    let result = process(stages, input, options).await?;
    let dependencies: Vec<PathBuf> = result.dependencies().map(|p| p.to_path_buf()).collect();

    if session.has_watcher() {
        for dep in &dependencies {
            session.tracker_mut().record_context_dependency(dep);
        }
        session.refresh_watcher()?;
    }

    write_output(fs.as_ref(), output.as_deref(), &result.css, result.map.as_deref()).await?;

    let report = BuildReport {
        css: result.css,
        map: result.map,
        dependencies,
        elapsed: start.elapsed(),
    };
    info!(elapsed_ms = report.elapsed_ms(), "build finished");
    eprintln!("Done in {}ms.", report.elapsed_ms());
    Ok(report)
}
