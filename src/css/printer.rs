// src/css/printer.rs

use crate::css::ast::{Layout, Node, Stylesheet};

impl Stylesheet {
    /// Serialize using the stylesheet's current layout.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        match self.layout {
            Layout::Pretty => write_pretty(&mut out, &self.nodes, 0),
            Layout::Compact => write_compact(&mut out, &self.nodes),
        }
        out
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn is_statement(node: &Node) -> bool {
    matches!(node, Node::AtRule(at) if at.nodes.is_none())
}

fn at_prelude(name: &str, params: &str) -> String {
    if params.is_empty() {
        format!("@{name}")
    } else {
        format!("@{name} {params}")
    }
}

fn write_pretty(out: &mut String, nodes: &[Node], depth: usize) {
    for (i, node) in nodes.iter().enumerate() {
        // Blank line between top-level blocks; consecutive statements stay grouped.
        if depth == 0 && i > 0 && !(is_statement(node) && is_statement(&nodes[i - 1])) {
            out.push('\n');
        }

        indent(out, depth);
        match node {
            Node::Rule(rule) => {
                out.push_str(&rule.selector);
                out.push_str(" {\n");
                write_pretty(out, &rule.nodes, depth + 1);
                indent(out, depth);
                out.push_str("}\n");
            }
            Node::AtRule(at) => {
                out.push_str(&at_prelude(&at.name, &at.params));
                match &at.nodes {
                    Some(children) => {
                        out.push_str(" {\n");
                        write_pretty(out, children, depth + 1);
                        indent(out, depth);
                        out.push_str("}\n");
                    }
                    None => out.push_str(";\n"),
                }
            }
            Node::Decl(decl) => {
                out.push_str(&decl.prop);
                out.push_str(": ");
                out.push_str(&decl.value);
                if decl.important {
                    out.push_str(" !important");
                }
                out.push_str(";\n");
            }
            Node::Comment(text) => {
                out.push_str("/*");
                out.push_str(text);
                out.push_str("*/\n");
            }
        }
    }
}

fn write_compact(out: &mut String, nodes: &[Node]) {
    // A declaration is terminated by whatever follows it, never by itself.
    let mut after_decl = false;
    for node in nodes {
        if after_decl {
            out.push(';');
        }
        after_decl = matches!(node, Node::Decl(_));
        match node {
            Node::Rule(rule) => {
                out.push_str(&rule.selector);
                out.push('{');
                write_compact(out, &rule.nodes);
                out.push('}');
            }
            Node::AtRule(at) => {
                out.push_str(&at_prelude(&at.name, &at.params));
                match &at.nodes {
                    Some(children) => {
                        out.push('{');
                        write_compact(out, children);
                        out.push('}');
                    }
                    None => out.push(';'),
                }
            }
            Node::Decl(decl) => {
                out.push_str(&decl.prop);
                out.push(':');
                out.push_str(&decl.value);
                if decl.important {
                    out.push_str("!important");
                }
            }
            Node::Comment(text) => {
                out.push_str("/*");
                out.push_str(text);
                out.push_str("*/");
            }
        }
    }
}
