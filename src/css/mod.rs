// src/css/mod.rs

//! Small CSS syntax tree used by the transform pipeline.
//!
//! - [`ast`] defines the node types and tree traversal helpers.
//! - [`parser`] turns source text into a [`Stylesheet`].
//! - [`printer`] turns a [`Stylesheet`] back into text (pretty or compact).

pub mod ast;
pub mod parser;
pub mod printer;

pub use ast::{AtRule, Declaration, Layout, Node, Rule, Stylesheet};
pub use parser::parse;
