// src/config/resolve.rs

use std::fmt::Debug;

use crate::config::graph::LoadedConfig;
use crate::config::model::{ContentConfig, RawConfig, ResolvedConfig, Screen};
use crate::errors::{Result, StyleError};

/// Turns loaded configuration modules into a [`ResolvedConfig`].
pub trait ConfigResolver: Send + Sync + Debug {
    fn resolve(&self, loaded: &LoadedConfig, defaults: &RawConfig) -> Result<ResolvedConfig>;
}

/// Layered resolution:
///
/// - A module without `presets` is layered over `defaults`.
/// - A module with `presets` is layered over its presets (in order), and
///   the defaults are not used for it.
/// - Maps merge key-wise (later layer wins); scalars and `content` are
///   taken from the nearest layer that sets them.
#[derive(Debug, Clone, Default)]
pub struct LayeredResolver;

impl ConfigResolver for LayeredResolver {
    fn resolve(&self, loaded: &LoadedConfig, defaults: &RawConfig) -> Result<ResolvedConfig> {
        let merged = match loaded.root {
            Some(root) => resolve_module(loaded, root, defaults, 0)?,
            None => defaults.clone(),
        };
        normalize(merged, loaded)
    }
}

fn resolve_module(
    loaded: &LoadedConfig,
    idx: usize,
    defaults: &RawConfig,
    depth: usize,
) -> Result<RawConfig> {
    // The graph loader rejects cycles; this only guards hand-built inputs.
    if depth > loaded.modules.len() {
        return Err(StyleError::Config("preset nesting too deep".to_string()));
    }

    let module = &loaded.modules[idx];
    let base = if module.raw.presets.is_none() {
        defaults.clone()
    } else {
        let mut acc = RawConfig::default();
        for &preset in &module.presets {
            let resolved = resolve_module(loaded, preset, defaults, depth + 1)?;
            acc = layer(acc, &resolved);
        }
        acc
    };

    Ok(layer(base, &module.raw))
}

/// Apply `over` on top of `base`.
pub fn layer(mut base: RawConfig, over: &RawConfig) -> RawConfig {
    if over.content.is_some() {
        base.content = over.content.clone();
    }
    if over.important.is_some() {
        base.important = over.important;
    }
    if over.prefix.is_some() {
        base.prefix = over.prefix.clone();
    }
    base.screens
        .extend(over.screens.iter().map(|(k, v)| (k.clone(), v.clone())));
    base.base
        .extend(over.base.iter().map(|(k, v)| (k.clone(), v.clone())));
    base.components
        .extend(over.components.iter().map(|(k, v)| (k.clone(), v.clone())));
    base.utilities
        .extend(over.utilities.iter().map(|(k, v)| (k.clone(), v.clone())));
    base.presets = None;
    base
}

fn normalize(raw: RawConfig, loaded: &LoadedConfig) -> Result<ResolvedConfig> {
    let content = raw
        .content
        .as_ref()
        .map(|spec| ContentConfig::from_entries(spec.entries()))
        .unwrap_or_default();

    let mut screens = Vec::with_capacity(raw.screens.len());
    for (name, min_width) in raw.screens {
        if screen_width(&min_width).is_none() {
            return Err(StyleError::Config(format!(
                "screen '{name}' has an unparseable min-width '{min_width}'"
            )));
        }
        screens.push(Screen { name, min_width });
    }
    screens.sort_by(|a, b| {
        let wa = screen_width(&a.min_width).unwrap_or(0.0);
        let wb = screen_width(&b.min_width).unwrap_or(0.0);
        wa.total_cmp(&wb).then_with(|| a.name.cmp(&b.name))
    });

    Ok(ResolvedConfig {
        source: loaded.root_path().map(|p| p.to_path_buf()),
        content,
        important: raw.important.unwrap_or(false),
        prefix: raw.prefix.unwrap_or_default(),
        screens,
        base: raw.base,
        components: raw.components,
        utilities: raw.utilities,
    })
}

/// Leading numeric part of a length like `"640px"` or `"48em"`.
fn screen_width(value: &str) -> Option<f64> {
    let number: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse().ok()
}
