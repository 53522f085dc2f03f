// src/watch/patterns.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str;

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Compiled content patterns.
///
/// Patterns are relative to the project root unless absolute. A leading `!`
/// marks an exclude pattern:
///
/// ```toml
/// content = ["src/**/*.html", "!src/vendor/**"]
/// ```
#[derive(Clone)]
pub struct ContentPatterns {
    sources: Vec<String>,
    include: GlobSet,
    exclude: Option<GlobSet>,
    /// Literal directory prefix of each include pattern.
    bases: Vec<PathBuf>,
}

impl fmt::Debug for ContentPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentPatterns")
            .field("sources", &self.sources)
            .field("bases", &self.bases)
            .finish_non_exhaustive()
    }
}

impl Default for ContentPatterns {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            include: GlobSet::empty(),
            exclude: None,
            bases: Vec::new(),
        }
    }
}

fn clean(pattern: &str) -> &str {
    let mut p = pattern.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p
}

/// Leading path components that contain no glob syntax.
///
/// `src/**/*.html` -> `src`, `index.html` -> `index.html`, `*.html` -> ``.
fn literal_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let parts: Vec<&str> = pattern.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if part.contains(GLOB_META) {
            break;
        }
        if i == 0 && part.is_empty() {
            base.push("/");
        } else {
            base.push(part);
        }
    }
    base
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid content pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

impl ContentPatterns {
    pub fn compile(patterns: &[String]) -> Result<Self> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for raw in patterns {
            match raw.trim().strip_prefix('!') {
                Some(neg) => exclude.push(clean(neg)),
                None => include.push(clean(raw)),
            }
        }

        let bases = include.iter().map(|p| literal_base(p)).collect();
        let include_set = build_globset(&include).context("building content globset")?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(&exclude).context("building content exclude globset")?)
        };

        Ok(Self {
            sources: patterns.to_vec(),
            include: include_set,
            exclude: exclude_set,
            bases,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// The patterns as written.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Directories (or single files) to search, made absolute against `root`.
    pub fn base_dirs(&self, root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .bases
            .iter()
            .map(|b| if b.as_os_str().is_empty() { root.to_path_buf() } else { root.join(b) })
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }

    /// True when `path` is matched by an include pattern and no exclude.
    ///
    /// Patterns are tried against both the root-relative and the absolute
    /// form of the path.
    pub fn matches(&self, root: &Path, path: &Path) -> bool {
        let abs = path.to_string_lossy().replace('\\', "/");
        let rel = relative_str(root, path);

        let hit = |set: &GlobSet| set.is_match(&abs) || rel.as_deref().is_some_and(|r| set.is_match(r));

        if !hit(&self.include) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !hit(exclude),
            None => true,
        }
    }
}

/// Every file under the patterns' base directories that the patterns match.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &ContentPatterns,
) -> Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    let mut stack: Vec<PathBuf> = Vec::new();

    for base in patterns.base_dirs(root) {
        if fs.is_file(&base) {
            if patterns.matches(root, &base) {
                files.insert(base);
            }
        } else if fs.is_dir(&base) {
            stack.push(base);
        }
    }

    let mut visited = BTreeSet::new();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let entries = fs
            .read_dir(&dir)
            .with_context(|| format!("expanding content patterns under {:?}", dir))?;
        for path in entries {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) && patterns.matches(root, &path) {
                files.insert(path);
            }
        }
    }

    Ok(files)
}
