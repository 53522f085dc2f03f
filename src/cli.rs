// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::warn;

/// Command-line arguments for `stylewatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stylewatch",
    version,
    about = "Build utility-class CSS from your templates, incrementally.",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub build: BuildArgs,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STYLEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write a starter config file into the current directory.
    Init {
        /// Also write a pipeline declaration.
        #[arg(long, short = 'p')]
        pipeline: bool,

        /// Write the complete default config instead of a minimal one.
        #[arg(long)]
        full: bool,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Input stylesheet; `-` reads standard input.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<String>,

    /// Output file; standard output when omitted.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Rebuild whenever inputs change.
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Path to a config file.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Load the stage list from a pipeline declaration. Without a value,
    /// the nearest `stylewatch.pipeline.toml` is used.
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "")]
    pub postcss: Option<String>,

    /// Content paths to scan, comma separated.
    #[arg(long, value_name = "PATTERNS")]
    pub content: Option<String>,

    /// Deprecated: use --content.
    #[arg(long, value_name = "PATTERNS", hide = true)]
    pub purge: Option<String>,

    /// Minify the output.
    #[arg(long, short = 'm')]
    pub minify: bool,

    /// Skip vendor prefixing.
    #[arg(long)]
    pub no_autoprefixer: bool,
}

/// Where `--postcss` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineSource {
    /// Search upward for the default declaration file.
    Discover,
    File(PathBuf),
}

impl BuildArgs {
    /// `--content`, falling back to the deprecated `--purge`.
    pub fn content_patterns(&self) -> Option<Vec<String>> {
        if let Some(purge) = &self.purge {
            warn!("the --purge flag has been deprecated; use --content instead");
            if self.content.is_none() {
                return Some(split_content_arg(purge));
            }
        }
        self.content.as_deref().map(split_content_arg)
    }

    pub fn pipeline_source(&self) -> Option<PipelineSource> {
        self.postcss.as_deref().map(|value| match value {
            "" => PipelineSource::Discover,
            path => PipelineSource::File(PathBuf::from(path)),
        })
    }
}

/// Split on commas that are not inside `{...}` groups.
///
/// `src/**/*.{html,js},lib/*.html` -> `["src/**/*.{html,js}", "lib/*.html"]`
pub fn split_content_arg(arg: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for ch in arg.chars() {
        match ch {
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
