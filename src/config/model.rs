// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// CSS declarations keyed by property name.
pub type Declarations = BTreeMap<String, String>;

/// One configuration module as read from a TOML file.
///
/// ```toml
/// presets = ["./brand.toml"]
/// content = ["src/**/*.html", { raw = "<b class='p-4'>", extension = "html" }]
/// important = false
///
/// [screens]
/// md = "768px"
///
/// [base."html"]
/// line-height = "1.5"
///
/// [utilities."p-4"]
/// padding = "1rem"
/// ```
///
/// Every field is optional; missing fields are filled from presets or the
/// built-in defaults during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawConfig {
    /// Preset modules, relative to the declaring file.
    ///
    /// `None` means "build on the defaults"; `Some(vec![])` means "build on
    /// nothing".
    #[serde(default)]
    pub presets: Option<Vec<String>>,

    #[serde(default)]
    pub content: Option<ContentSpec>,

    #[serde(default)]
    pub important: Option<bool>,

    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub screens: BTreeMap<String, String>,

    #[serde(default)]
    pub base: BTreeMap<String, Declarations>,

    #[serde(default)]
    pub components: BTreeMap<String, Declarations>,

    #[serde(default)]
    pub utilities: BTreeMap<String, Declarations>,
}

/// `content` may be given directly as a list or as `{ files = [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentSpec {
    Files(Vec<ContentEntry>),
    Section { files: Vec<ContentEntry> },
}

impl ContentSpec {
    pub fn entries(&self) -> &[ContentEntry] {
        match self {
            ContentSpec::Files(files) => files,
            ContentSpec::Section { files } => files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ContentEntry {
    /// Glob pattern; a leading `!` excludes matches.
    Pattern(String),
    /// Inline template text scanned as-is.
    Raw {
        raw: String,
        #[serde(default)]
        extension: Option<String>,
    },
}

/// Inline content declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    pub text: String,
    pub extension: String,
}

/// Normalized `content` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentConfig {
    pub patterns: Vec<String>,
    pub raw: Vec<RawContent>,
}

impl ContentConfig {
    pub fn from_entries(entries: &[ContentEntry]) -> Self {
        let mut content = ContentConfig::default();
        for entry in entries {
            match entry {
                ContentEntry::Pattern(p) => content.patterns.push(p.clone()),
                ContentEntry::Raw { raw, extension } => content.raw.push(RawContent {
                    text: raw.clone(),
                    extension: extension.clone().unwrap_or_else(|| "html".to_string()),
                }),
            }
        }
        content
    }
}

/// A responsive breakpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub name: String,
    pub min_width: String,
}

/// Fully resolved configuration: defaults/presets/user merged and
/// normalized. This is what the context factory consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    /// Config file this was loaded from; `None` for built-in defaults.
    pub source: Option<PathBuf>,
    pub content: ContentConfig,
    pub important: bool,
    pub prefix: String,
    /// Ordered by ascending min-width.
    pub screens: Vec<Screen>,
    pub base: BTreeMap<String, Declarations>,
    pub components: BTreeMap<String, Declarations>,
    pub utilities: BTreeMap<String, Declarations>,
}
