// src/css/ast.rs

/// A node in a stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Decl(Declaration),
    /// Comment text without the `/*` `*/` delimiters.
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
}

/// `@name params;` when `nodes` is `None`, `@name params { ... }` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    pub nodes: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub prop: String,
    pub value: String,
    pub important: bool,
}

impl Node {
    pub fn rule(selector: impl Into<String>, nodes: Vec<Node>) -> Self {
        Node::Rule(Rule {
            selector: selector.into(),
            nodes,
        })
    }

    pub fn at_rule(name: impl Into<String>, params: impl Into<String>) -> Self {
        Node::AtRule(AtRule {
            name: name.into(),
            params: params.into(),
            nodes: None,
        })
    }

    pub fn at_block(name: impl Into<String>, params: impl Into<String>, nodes: Vec<Node>) -> Self {
        Node::AtRule(AtRule {
            name: name.into(),
            params: params.into(),
            nodes: Some(nodes),
        })
    }

    pub fn decl(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Node::Decl(Declaration {
            prop: prop.into(),
            value: value.into(),
            important: false,
        })
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Node::Comment(text.into())
    }

    /// Child nodes, if this node has a block.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Rule(rule) => Some(&mut rule.nodes),
            Node::AtRule(at) => at.nodes.as_mut(),
            Node::Decl(_) | Node::Comment(_) => None,
        }
    }
}

/// Printing layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    #[default]
    Pretty,
    Compact,
}

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
    pub layout: Layout,
}

impl Stylesheet {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            layout: Layout::default(),
        }
    }

    /// Replace every node (depth-first, children before parents) with the
    /// nodes returned by `f`. Returning `vec![node]` keeps it unchanged.
    pub fn flat_map<F>(&mut self, mut f: F) -> crate::errors::Result<()>
    where
        F: FnMut(Node) -> crate::errors::Result<Vec<Node>>,
    {
        flat_map_nodes(&mut self.nodes, &mut f)
    }

    /// Visit every node mutably, parents before children.
    pub fn walk_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Node),
    {
        walk_nodes_mut(&mut self.nodes, &mut f);
    }
}

fn flat_map_nodes<F>(nodes: &mut Vec<Node>, f: &mut F) -> crate::errors::Result<()>
where
    F: FnMut(Node) -> crate::errors::Result<Vec<Node>>,
{
    let old = std::mem::take(nodes);
    for mut node in old {
        if let Some(children) = node.children_mut() {
            flat_map_nodes(children, f)?;
        }
        nodes.extend(f(node)?);
    }
    Ok(())
}

fn walk_nodes_mut<F>(nodes: &mut [Node], f: &mut F)
where
    F: FnMut(&mut Node),
{
    for node in nodes.iter_mut() {
        f(node);
        if let Some(children) = node.children_mut() {
            walk_nodes_mut(children, f);
        }
    }
}
