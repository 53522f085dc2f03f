// src/pipeline/imports.rs

//! Import handling.
//!
//! The generic [`ImportInlineStage`] replaces `@import` rules with the
//! imported file's contents. Imports of the tool's own namespace
//! (`@import "stylewatch/utilities"`) are not files: the generation stage
//! resolves them. [`PreserveToolImports`] hides those imports in marker
//! comments before inlining and [`RestoreToolImports`] turns the markers
//! back into `@import` rules afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::css::{self, Node, Stylesheet};
use crate::errors::{Result, StyleError};
use crate::fs::{normalize, FileSystem};
use crate::pipeline::{Message, RunState, Stage};
use crate::types::TOOL_NAMESPACE;

/// Prefix of the comment that carries a preserved import's parameters.
pub const RESTORE_MARKER: &str = "__STYLEWATCH_RESTORE__";

/// Target of an `@import` rule's params: `"a.css" screen` -> `a.css`,
/// `url(a.css)` -> `a.css`.
pub fn import_target(params: &str) -> Option<&str> {
    let params = params.trim();
    if let Some(rest) = params.strip_prefix("url(") {
        let end = rest.find(')')?;
        return Some(rest[..end].trim().trim_matches(['"', '\'']));
    }
    let quote = params.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &params[1..];
    let end = rest.find(quote)?;
    Some(&rest[..end])
}

/// Whatever follows the target, e.g. a media query list.
fn import_media(params: &str) -> &str {
    let params = params.trim();
    let end = if params.starts_with("url(") {
        params.find(')').map(|i| i + 1)
    } else {
        params
            .chars()
            .next()
            .and_then(|q| params[1..].find(q).map(|i| i + 2))
    };
    end.map(|i| params[i..].trim()).unwrap_or("")
}

fn is_tool_import(params: &str) -> bool {
    import_target(params)
        .map(|target| target.starts_with(&format!("{TOOL_NAMESPACE}/")))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveToolImports;

impl Stage for PreserveToolImports {
    fn name(&self) -> &str {
        "preserve-tool-imports"
    }

    fn apply(&self, sheet: &mut Stylesheet, _run: &mut RunState) -> Result<()> {
        sheet.flat_map(|node| match node {
            Node::AtRule(at) if at.name == "import" && at.nodes.is_none() && is_tool_import(&at.params) => {
                Ok(vec![Node::comment(format!("{RESTORE_MARKER}{}", at.params))])
            }
            other => Ok(vec![other]),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RestoreToolImports;

impl Stage for RestoreToolImports {
    fn name(&self) -> &str {
        "restore-tool-imports"
    }

    fn apply(&self, sheet: &mut Stylesheet, _run: &mut RunState) -> Result<()> {
        sheet.flat_map(|node| match node {
            Node::Comment(text) if text.starts_with(RESTORE_MARKER) => {
                Ok(vec![Node::at_rule("import", &text[RESTORE_MARKER.len()..])])
            }
            other => Ok(vec![other]),
        })
    }
}

/// Inline `@import` rules that point at local files.
///
/// Paths resolve against the importing file's directory (the input's
/// directory, or `root` when reading stdin). Each file is inlined at most
/// once per run; remote URLs and tool-namespace imports are left alone.
#[derive(Debug, Clone)]
pub struct ImportInlineStage {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl ImportInlineStage {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    fn resolve(&self, base: &Path, target: &str) -> Option<PathBuf> {
        let candidate = base.join(target);
        if self.fs.is_file(&candidate) {
            return Some(normalize(self.fs.as_ref(), &candidate));
        }
        if candidate.extension().is_none() {
            let with_ext = candidate.with_extension("css");
            if self.fs.is_file(&with_ext) {
                return Some(normalize(self.fs.as_ref(), &with_ext));
            }
        }
        None
    }

    fn inline(
        &self,
        nodes: Vec<Node>,
        base: &Path,
        parent: Option<&Path>,
        seen: &mut HashSet<PathBuf>,
        run: &mut RunState,
    ) -> Result<Vec<Node>> {
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            let Node::AtRule(at) = &node else {
                out.push(node);
                continue;
            };
            if at.name != "import" || at.nodes.is_some() {
                out.push(node);
                continue;
            }
            let Some(target) = import_target(&at.params) else {
                out.push(node);
                continue;
            };
            // Tool imports can also come from partials, below the preserve step.
            if is_remote(target) || is_tool_import(&at.params) {
                out.push(node);
                continue;
            }

            let path = self.resolve(base, target).ok_or_else(|| {
                StyleError::Pipeline(format!(
                    "failed to resolve import '{target}' from {:?}",
                    base
                ))
            })?;

            if !seen.insert(path.clone()) {
                debug!(file = ?path, "skipping duplicate import");
                continue;
            }

            debug!(file = ?path, "inlining import");
            let text = self.fs.read_to_string(&path)?;
            run.messages.push(Message::Dependency {
                file: path.clone(),
                parent: parent.map(Path::to_path_buf),
            });

            let child_base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let imported = css::parse(&text)?.nodes;
            let inlined = self.inline(imported, &child_base, Some(&path), seen, run)?;

            let media = import_media(&at.params);
            if media.is_empty() {
                out.extend(inlined);
            } else {
                out.push(Node::at_block("media", media, inlined));
            }
        }

        Ok(out)
    }
}

fn is_remote(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://") || target.starts_with("//")
}

impl Stage for ImportInlineStage {
    fn name(&self) -> &str {
        "import"
    }

    fn apply(&self, sheet: &mut Stylesheet, run: &mut RunState) -> Result<()> {
        let from = run.options.from.clone();
        let base = from
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        let mut seen = HashSet::new();
        let nodes = std::mem::take(&mut sheet.nodes);
        sheet.nodes = self.inline(nodes, &base, from.as_deref(), &mut seen, run)?;
        Ok(())
    }
}
