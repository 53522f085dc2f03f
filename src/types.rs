// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Namespace of the tool itself: the generation directive is
/// `@stylewatch <layer>;` and `@import "stylewatch/<layer>"` is resolved
/// by the generation stage rather than by the import inliner.
pub const TOOL_NAMESPACE: &str = "stylewatch";

/// Output layers the generation stage knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Base,
    Components,
    Utilities,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Base => "base",
            Layer::Components => "components",
            Layer::Utilities => "utilities",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" => Ok(Layer::Base),
            "components" => Ok(Layer::Components),
            "utilities" => Ok(Layer::Utilities),
            other => Err(format!(
                "unknown layer: {other} (expected \"base\", \"components\" or \"utilities\")"
            )),
        }
    }
}

/// How a changed file affects the next build.
///
/// - `ConfigDependency`: the resolved configuration may differ; the context
///   must be rebuilt from a fresh config load.
/// - `ContextDependency`: a file read as a side effect of the last pipeline
///   run; the context must be rebuilt.
/// - `ContentFile`: anything else; handled incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeClass {
    ConfigDependency,
    ContextDependency,
    ContentFile,
}

impl ChangeClass {
    /// Whether this class forces the current context to be discarded.
    pub fn invalidates_context(self) -> bool {
        !matches!(self, ChangeClass::ContentFile)
    }
}
