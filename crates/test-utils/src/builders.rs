#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stylewatch::css::{Node, Stylesheet};
use stylewatch::engine::{BuildOptions, InputSource, Session};
use stylewatch::errors::Result;
use stylewatch::fs::mock::MockFileSystem;
use stylewatch::fs::FileSystem;
use stylewatch::pipeline::{Capability, RunState, Stage, StageRef};

/// Root of every in-memory project.
pub const PROJECT_ROOT: &str = "/project";

/// Builds an in-memory project and a [`Session`] over it.
///
/// ```ignore
/// let project = ProjectBuilder::new()
///     .file("src/index.html", r#"<div class="flex">"#)
///     .content(&["src/**/*.html"]);
/// let mut session = project.session();
/// ```
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    fs: MockFileSystem,
    options: BuildOptions,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        // Keep the root present even when no file is added.
        fs.add_file(Path::new(PROJECT_ROOT).join(".keep"), "");
        Self {
            fs,
            options: BuildOptions::new(PROJECT_ROOT),
        }
    }

    pub fn path(rel: &str) -> PathBuf {
        Path::new(PROJECT_ROOT).join(rel)
    }

    pub fn file(self, rel: &str, contents: &str) -> Self {
        self.fs.add_file(Self::path(rel), contents);
        self
    }

    /// Write `stylewatch.config.toml` at the root.
    pub fn config(self, toml: &str) -> Self {
        self.file(stylewatch::config::CONFIG_FILE_NAME, toml)
    }

    /// Use `rel` as the input stylesheet.
    pub fn input(mut self, rel: &str, contents: &str) -> Self {
        self.options.input = InputSource::File(Self::path(rel));
        self.file(rel, contents)
    }

    pub fn output(mut self, rel: &str) -> Self {
        self.options.output = Some(Self::path(rel));
        self
    }

    /// Same as `--content a,b`.
    pub fn content(mut self, patterns: &[&str]) -> Self {
        self.options.content = Some(patterns.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn options(mut self, f: impl FnOnce(&mut BuildOptions)) -> Self {
        f(&mut self.options);
        self
    }

    pub fn fs(&self) -> MockFileSystem {
        self.fs.clone()
    }

    pub fn session(&self) -> Session {
        let fs: Arc<dyn FileSystem> = Arc::new(self.fs.clone());
        Session::new(self.options.clone(), fs)
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A stage that appends `/* name */` so tests can read back the order in
/// which stages ran. [`MarkerStage::generation`] carries the generation
/// marker without generating anything.
#[derive(Debug, Clone)]
pub struct MarkerStage {
    name: String,
    capability: Capability,
}

impl MarkerStage {
    pub fn new(name: &str) -> StageRef {
        Arc::new(Self {
            name: name.to_string(),
            capability: Capability::Transform,
        })
    }

    pub fn generation(name: &str) -> StageRef {
        Arc::new(Self {
            name: name.to_string(),
            capability: Capability::Generation,
        })
    }
}

impl Stage for MarkerStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    fn apply(&self, sheet: &mut Stylesheet, _run: &mut RunState) -> Result<()> {
        sheet.nodes.push(Node::comment(format!(" {} ", self.name)));
        Ok(())
    }
}

/// Names of `stages`, in order.
pub fn stage_names(stages: &[StageRef]) -> Vec<String> {
    stages.iter().map(|s| s.name().to_string()).collect()
}
