// src/config/defaults.rs

//! Built-in configuration used when no file (or no preset) supplies one.

use std::path::Path;

use crate::config::loader::parse_table;
use crate::config::model::RawConfig;
use crate::errors::{Result, StyleError};

/// Defaults layered under every config that does not declare `presets`.
pub const DEFAULT_CONFIG: &str = r##"
content = []

[screens]
sm = "640px"
md = "768px"
lg = "1024px"

[base."*"]
box-sizing = "border-box"
margin = "0"

[base."html"]
line-height = "1.5"

[base."img"]
display = "block"
max-width = "100%"

[utilities."block"]
display = "block"

[utilities."flex"]
display = "flex"

[utilities."hidden"]
display = "none"

[utilities."items-center"]
align-items = "center"

[utilities."m-4"]
margin = "1rem"

[utilities."p-2"]
padding = "0.5rem"

[utilities."p-4"]
padding = "1rem"

[utilities."select-none"]
user-select = "none"

[utilities."text-center"]
text-align = "center"

[utilities."font-bold"]
font-weight = "700"
"##;

/// Written by `stylewatch init`.
pub const STARTER_CONFIG: &str = r##"# stylewatch configuration
content = ["./src/**/*.html"]

[utilities]
"##;

/// Written by `stylewatch init --pipeline`.
pub const STARTER_PIPELINE: &str = r##"# stylewatch pipeline declaration
map = false

[[stage]]
name = "import"

[[stage]]
name = "stylewatch"
"##;

/// Parse [`DEFAULT_CONFIG`].
pub fn default_config() -> Result<RawConfig> {
    let table: toml::Table = toml::from_str(DEFAULT_CONFIG).map_err(|source| StyleError::Toml {
        path: Path::new("<built-in defaults>").to_path_buf(),
        source,
    })?;
    parse_table(Path::new("<built-in defaults>"), table)
}
