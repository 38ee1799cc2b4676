//! Introspectable AST model for parser construction
//!
//! This crate provides the tree side of a parser toolchain:
//!
//! - [`ast`] — the node model: declaration macros, property introspection,
//!   origins and spans, issues, placeholder nodes, references, generic walks
//!   and debug printing
//! - [`parsing`] — the two-stage parse driver contract
//! - [`testing`] — a miniature s-expression language used by tests here and
//!   in downstream crates
//!
//! Node types are declared with [`ast_node!`]; their structure is then
//! walkable through [`ast::AstNode`] without per-type code. The companion
//! crate `sylva-bridge` builds the generic tree transformer and the
//! metamodel/export boundary on top of this contract.

pub mod ast;
pub mod parsing;
pub mod testing;
