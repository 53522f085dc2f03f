// src/context/engine.rs

//! Built-in design system.
//!
//! Known classes come from the `components` and `utilities` tables of the
//! resolved configuration. A candidate is `variant:variant:class`, where a
//! variant is either a pseudo-class (`hover`, `focus`, `active`) or a
//! screen name from `screens`. Candidates are accumulated for the lifetime
//! of the context, so incremental scans only ever add rules.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::{Declarations, ResolvedConfig};
use crate::context::candidates::extract_candidates;
use crate::context::{BuildContext, ChangedContentItem, ContextFactory, DesignSystem};
use crate::css::{Declaration, Node};
use crate::errors::Result;
use crate::types::Layer;

const PSEUDO_VARIANTS: &[&str] = &["hover", "focus", "active"];

#[derive(Debug, Clone, Copy, Default)]
pub struct UtilityContextFactory;

impl ContextFactory for UtilityContextFactory {
    fn create_context(
        &self,
        config: Arc<ResolvedConfig>,
        changed_content: Vec<ChangedContentItem>,
    ) -> Result<BuildContext> {
        let engine = UtilityEngine::new(Arc::clone(&config));
        Ok(BuildContext::new(config, changed_content, Box::new(engine)))
    }
}

/// A recognised candidate, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Parsed<'a> {
    /// Index into `config.screens`, if any.
    screen: Option<usize>,
    pseudos: Vec<&'a str>,
    /// Class name without variants and without the configured prefix.
    class: &'a str,
    layer: Layer,
}

#[derive(Debug)]
pub struct UtilityEngine {
    config: Arc<ResolvedConfig>,
    candidates: BTreeSet<String>,
}

impl UtilityEngine {
    pub fn new(config: Arc<ResolvedConfig>) -> Self {
        Self {
            config,
            candidates: BTreeSet::new(),
        }
    }

    /// Candidates recognised so far.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }

    fn parse<'a>(&self, candidate: &'a str) -> Option<Parsed<'a>> {
        let mut parts: Vec<&str> = candidate.split(':').collect();
        let raw_class = parts.pop()?;
        let class = raw_class.strip_prefix(self.config.prefix.as_str())?;

        let layer = if self.config.utilities.contains_key(class) {
            Layer::Utilities
        } else if self.config.components.contains_key(class) {
            Layer::Components
        } else {
            return None;
        };

        let mut screen = None;
        let mut pseudos = Vec::new();
        for variant in parts {
            if let Some(idx) = self.config.screens.iter().position(|s| s.name == variant) {
                // One breakpoint per candidate.
                if screen.replace(idx).is_some() {
                    return None;
                }
            } else if PSEUDO_VARIANTS.contains(&variant) {
                pseudos.push(variant);
            } else {
                return None;
            }
        }

        Some(Parsed {
            screen,
            pseudos,
            class,
            layer,
        })
    }

    fn declarations(&self, layer: Layer, class: &str) -> Option<&Declarations> {
        match layer {
            Layer::Utilities => self.config.utilities.get(class),
            Layer::Components => self.config.components.get(class),
            Layer::Base => None,
        }
    }

    fn rule_for(&self, candidate: &str, parsed: &Parsed<'_>) -> Option<Node> {
        let decls = self.declarations(parsed.layer, parsed.class)?;
        let important = self.config.important && parsed.layer == Layer::Utilities;

        let mut selector = format!(".{}", escape_class(candidate));
        for pseudo in &parsed.pseudos {
            selector.push(':');
            selector.push_str(pseudo);
        }

        let nodes = decls
            .iter()
            .map(|(prop, value)| {
                Node::Decl(Declaration {
                    prop: prop.clone(),
                    value: value.clone(),
                    important,
                })
            })
            .collect();
        Some(Node::rule(selector, nodes))
    }

    fn generate_classes(&self, layer: Layer) -> Vec<Node> {
        let mut matched: Vec<(&str, Parsed<'_>)> = self
            .candidates
            .iter()
            .filter_map(|c| self.parse(c).map(|p| (c.as_str(), p)))
            .filter(|(_, p)| p.layer == layer)
            .collect();

        // Plain rules first, then one media block per screen in ascending
        // width; inside each group, class name then variant count.
        matched.sort_by(|(ca, a), (cb, b)| {
            a.screen
                .cmp(&b.screen)
                .then_with(|| a.class.cmp(&b.class))
                .then_with(|| a.pseudos.len().cmp(&b.pseudos.len()))
                .then_with(|| ca.cmp(cb))
        });

        let mut nodes = Vec::new();
        let mut media: Option<(usize, Vec<Node>)> = None;

        for (candidate, parsed) in &matched {
            let Some(rule) = self.rule_for(candidate, parsed) else {
                continue;
            };
            match parsed.screen {
                None => nodes.push(rule),
                Some(idx) => {
                    let same_screen = matches!(&media, Some((current, _)) if *current == idx);
                    if !same_screen {
                        if let Some((prev, rules)) = media.take() {
                            nodes.push(self.media_block(prev, rules));
                        }
                        media = Some((idx, Vec::new()));
                    }
                    if let Some((_, rules)) = media.as_mut() {
                        rules.push(rule);
                    }
                }
            }
        }
        if let Some((prev, rules)) = media.take() {
            nodes.push(self.media_block(prev, rules));
        }

        nodes
    }

    fn media_block(&self, screen: usize, rules: Vec<Node>) -> Node {
        let width = &self.config.screens[screen].min_width;
        Node::at_block("media", format!("(min-width: {width})"), rules)
    }
}

impl DesignSystem for UtilityEngine {
    fn scan(&mut self, item: &ChangedContentItem) -> usize {
        let mut added = 0;
        for candidate in extract_candidates(&item.text) {
            if self.candidates.contains(candidate) || self.parse(candidate).is_none() {
                continue;
            }
            self.candidates.insert(candidate.to_string());
            added += 1;
        }
        if added > 0 {
            debug!(extension = %item.extension, added, "new class candidates");
        }
        added
    }

    fn generate(&self, layer: Layer) -> Vec<Node> {
        match layer {
            Layer::Base => self
                .config
                .base
                .iter()
                .map(|(selector, decls)| {
                    let nodes = decls
                        .iter()
                        .map(|(prop, value)| Node::decl(prop.clone(), value.clone()))
                        .collect();
                    Node::rule(selector.clone(), nodes)
                })
                .collect(),
            Layer::Components | Layer::Utilities => self.generate_classes(layer),
        }
    }
}

/// Escape a class name for use in a selector.
pub fn escape_class(class: &str) -> String {
    let mut out = String::with_capacity(class.len());
    for c in class.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}
