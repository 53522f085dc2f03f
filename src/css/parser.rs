// src/css/parser.rs

//! Minimal CSS parser.
//!
//! Understands rules, at-rules (statement and block form), declarations and
//! comments. Strings and parenthesised groups are kept intact so that
//! `url(a;b)` or `content: "}"` do not end a statement early. Values and
//! selectors are stored as trimmed source text; nothing is tokenized further.

use crate::css::ast::{AtRule, Declaration, Node, Rule, Stylesheet};
use crate::errors::{Result, StyleError};

pub fn parse(input: &str) -> Result<Stylesheet> {
    let mut parser = Parser { src: input, pos: 0 };
    let nodes = parser.parse_block(false)?;
    Ok(Stylesheet::new(nodes))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

/// What ended a prelude.
enum Terminator {
    Semicolon,
    OpenBrace,
    CloseBrace,
    Eof,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> StyleError {
        StyleError::Css {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn parse_block(&mut self, nested: bool) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            self.skip_whitespace();

            let Some(c) = self.peek() else {
                if nested {
                    return Err(self.error("unclosed block"));
                }
                return Ok(nodes);
            };

            if self.rest().starts_with("/*") {
                nodes.push(Node::Comment(self.read_comment()?));
                continue;
            }

            match c {
                '}' => {
                    if !nested {
                        return Err(self.error("unexpected '}'"));
                    }
                    self.bump();
                    return Ok(nodes);
                }
                ';' => {
                    self.bump();
                    continue;
                }
                _ => {}
            }

            let start = self.pos;
            let (prelude, terminator) = self.read_prelude()?;
            let prelude = prelude.trim();

            match terminator {
                Terminator::OpenBrace => {
                    let children = self.parse_block(true)?;
                    nodes.push(block_node(prelude, children));
                }
                Terminator::Semicolon | Terminator::CloseBrace | Terminator::Eof => {
                    nodes.push(statement_node(prelude).ok_or_else(|| StyleError::Css {
                        offset: start,
                        message: format!("expected a declaration or at-rule, found '{prelude}'"),
                    })?);
                }
            }
        }
    }

    fn read_comment(&mut self) -> Result<String> {
        let body_start = self.pos + 2;
        match self.src[body_start..].find("*/") {
            Some(len) => {
                let text = self.src[body_start..body_start + len].to_string();
                self.pos = body_start + len + 2;
                Ok(text)
            }
            None => Err(self.error("unclosed comment")),
        }
    }

    /// Read up to (and consume) the next top-level `;` or `{`. A `}` ends the
    /// prelude without being consumed.
    fn read_prelude(&mut self) -> Result<(&'a str, Terminator)> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(c) = self.peek() {
            if let Some(q) = quote {
                self.bump();
                if c == '\\' {
                    self.bump();
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ';' if depth == 0 => {
                    let text = &self.src[start..self.pos];
                    self.bump();
                    return Ok((text, Terminator::Semicolon));
                }
                '{' if depth == 0 => {
                    let text = &self.src[start..self.pos];
                    self.bump();
                    return Ok((text, Terminator::OpenBrace));
                }
                '}' if depth == 0 => {
                    return Ok((&self.src[start..self.pos], Terminator::CloseBrace));
                }
                _ => {}
            }
            self.bump();
        }

        if quote.is_some() {
            return Err(self.error("unterminated string"));
        }
        Ok((&self.src[start..self.pos], Terminator::Eof))
    }
}

fn split_at_rule(prelude: &str) -> (String, String) {
    let body = &prelude[1..];
    let name_len = body
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(body.len());
    let name = body[..name_len].to_string();
    let params = body[name_len..].trim().to_string();
    (name, params)
}

fn block_node(prelude: &str, children: Vec<Node>) -> Node {
    if prelude.starts_with('@') {
        let (name, params) = split_at_rule(prelude);
        Node::AtRule(AtRule {
            name,
            params,
            nodes: Some(children),
        })
    } else {
        Node::Rule(Rule {
            selector: prelude.to_string(),
            nodes: children,
        })
    }
}

fn statement_node(prelude: &str) -> Option<Node> {
    if prelude.starts_with('@') {
        let (name, params) = split_at_rule(prelude);
        return Some(Node::AtRule(AtRule {
            name,
            params,
            nodes: None,
        }));
    }

    let (prop, value) = prelude.split_once(':')?;
    let prop = prop.trim();
    if prop.is_empty() {
        return None;
    }

    let value = value.trim();
    let (value, important) = match strip_important(value) {
        Some(stripped) => (stripped, true),
        None => (value, false),
    };

    Some(Node::Decl(Declaration {
        prop: prop.to_string(),
        value: value.to_string(),
        important,
    }))
}

fn strip_important(value: &str) -> Option<&str> {
    let bang = value.rfind('!')?;
    if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
        Some(value[..bang].trim_end())
    } else {
        None
    }
}
