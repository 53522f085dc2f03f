// src/pipeline/stages.rs

use crate::css::{Layout, Node, Stylesheet};
use crate::errors::Result;
use crate::pipeline::{RunState, Stage};

/// Properties that get a `-webkit-` copy from [`PrefixStage`].
pub const PREFIXED_PROPERTIES: &[&str] = &[
    "appearance",
    "backdrop-filter",
    "mask-image",
    "text-size-adjust",
    "user-select",
];

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes whitespace and selects the pretty layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatStage;

impl Stage for FormatStage {
    fn name(&self) -> &str {
        "format"
    }

    fn apply(&self, sheet: &mut Stylesheet, _run: &mut RunState) -> Result<()> {
        sheet.walk_mut(|node| match node {
            Node::Rule(rule) => rule.selector = collapse_whitespace(&rule.selector),
            Node::AtRule(at) => at.params = collapse_whitespace(&at.params),
            Node::Decl(decl) => decl.value = collapse_whitespace(&decl.value),
            Node::Comment(_) => {}
        });
        sheet.layout = Layout::Pretty;
        Ok(())
    }
}

/// Adds `-webkit-` prefixed copies of a fixed set of properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixStage;

fn prefix_block(nodes: &mut Vec<Node>) {
    let present: Vec<String> = nodes
        .iter()
        .filter_map(|n| match n {
            Node::Decl(d) => Some(d.prop.clone()),
            _ => None,
        })
        .collect();

    let old = std::mem::take(nodes);
    for mut node in old {
        if let Some(children) = node.children_mut() {
            prefix_block(children);
        }
        if let Node::Decl(decl) = &node {
            let prefixed = format!("-webkit-{}", decl.prop);
            if PREFIXED_PROPERTIES.contains(&decl.prop.as_str()) && !present.contains(&prefixed) {
                let mut copy = decl.clone();
                copy.prop = prefixed;
                nodes.push(Node::Decl(copy));
            }
        }
        nodes.push(node);
    }
}

impl Stage for PrefixStage {
    fn name(&self) -> &str {
        "prefix"
    }

    fn apply(&self, sheet: &mut Stylesheet, _run: &mut RunState) -> Result<()> {
        prefix_block(&mut sheet.nodes);
        Ok(())
    }
}

/// Drops comments (except `/*! ... */`) and selects the compact layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyStage;

impl Stage for MinifyStage {
    fn name(&self) -> &str {
        "minify"
    }

    fn apply(&self, sheet: &mut Stylesheet, _run: &mut RunState) -> Result<()> {
        sheet.flat_map(|node| match node {
            Node::Comment(text) if !text.starts_with('!') => Ok(Vec::new()),
            Node::Decl(mut decl) => {
                decl.value = collapse_whitespace(&decl.value);
                Ok(vec![Node::Decl(decl)])
            }
            other => Ok(vec![other]),
        })?;
        sheet.layout = Layout::Compact;
        Ok(())
    }
}

/// Prepends a preserved `/*! text */` comment.
#[derive(Debug, Clone)]
pub struct BannerStage {
    text: String,
}

impl BannerStage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Stage for BannerStage {
    fn name(&self) -> &str {
        "banner"
    }

    fn apply(&self, sheet: &mut Stylesheet, _run: &mut RunState) -> Result<()> {
        sheet.nodes.insert(0, Node::comment(format!("! {} ", self.text)));
        Ok(())
    }
}
