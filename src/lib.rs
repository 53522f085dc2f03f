// src/lib.rs

pub mod cli;
pub mod config;
pub mod context;
pub mod css;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod init;
pub mod logging;
pub mod pipeline;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{BuildArgs, CliArgs, Command, PipelineSource};
use crate::engine::{build, BuildOptions, InputSource, Runtime, RuntimeEvent, Session};
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{load_declaration, locate_declaration, PipelineMode, StageRegistry};

/// Quiet period after the last filesystem event before a batch is sent.
pub const WATCH_DEBOUNCE: Duration = Duration::from_millis(50);

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let root = std::env::current_dir().context("resolving working directory")?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    match args.command {
        Some(Command::Init { pipeline, full }) => {
            for path in init::init_project(fs.as_ref(), &root, pipeline, full)? {
                println!("Created {}", path.display());
            }
            Ok(())
        }
        None => run_build(&args.build, fs, &root).await,
    }
}

/// Translate CLI flags into [`BuildOptions`].
///
/// The pipeline declaration (if any) is loaded and checked here, once per
/// invocation.
pub fn build_options(args: &BuildArgs, fs: &dyn FileSystem, root: &Path) -> Result<BuildOptions> {
    let pipeline = match args.pipeline_source() {
        None => PipelineMode::BuiltIn,
        Some(source) => {
            let explicit = match source {
                PipelineSource::Discover => None,
                PipelineSource::File(path) => Some(root.join(path)),
            };
            let path = locate_declaration(fs, explicit.as_deref(), root)?;
            let declaration = load_declaration(fs, &path)?;
            StageRegistry::default().validate(&declaration)?;
            debug!(file = ?path, stages = declaration.stages.len(), "using pipeline declaration");
            PipelineMode::Sourced(declaration)
        }
    };

    Ok(BuildOptions {
        root: root.to_path_buf(),
        input: InputSource::from_arg(args.input.as_deref()),
        output: args.output.clone(),
        config: args.config.clone(),
        content: args.content_patterns(),
        minify: args.minify,
        autoprefixer: !args.no_autoprefixer,
        pipeline,
    })
}

async fn run_build(args: &BuildArgs, fs: Arc<dyn FileSystem>, root: &Path) -> Result<()> {
    let options = build_options(args, fs.as_ref(), root)?;
    let mut session = Session::new(options, fs);

    if !args.watch {
        build(&mut session).await?;
        return Ok(());
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let watcher = watch::spawn_watcher(root, rt_tx.clone(), WATCH_DEBOUNCE)?;
    session.set_watcher(Box::new(watcher));

    // The first build must succeed; later failures only log.
    build(&mut session).await?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }
    drop(rt_tx);

    info!("watching for changes");
    Runtime::new(session, rt_rx).run().await?;
    Ok(())
}
