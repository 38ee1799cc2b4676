//! Generic tree walks
//!
//! These passes operate on any [`AstNode`] through the introspection layer;
//! they never look at concrete node types. [`assign_parents`] is the
//! dedicated post-construction pass that makes parent links consistent with
//! child containment.

use super::node::{AstNode, NodeIdSource};
use super::properties::{properties_of, PropertyValue};

/// Assign ids and parent links to a whole tree, post-order safe
///
/// Nodes that already carry an id keep it, so the transformer's eagerly
/// assigned ids survive a later pass over the same tree.
pub fn assign_parents(node: &mut dyn AstNode, ids: &mut NodeIdSource) {
    let id = match node.base().id() {
        Some(id) => id,
        None => {
            let id = ids.fresh();
            node.base_mut().set_id(id);
            id
        }
    };
    for child in node.children_mut() {
        child.base_mut().set_parent(id);
        assign_parents(child, ids);
    }
}

/// Child nodes of one node, honoring the ignore-set for derived properties
pub fn child_nodes<'a>(node: &'a dyn AstNode, ignore: &[&str]) -> Vec<&'a dyn AstNode> {
    let mut nodes: Vec<&dyn AstNode> = Vec::new();
    for property in properties_of(node, ignore) {
        match property.value {
            PropertyValue::Node(Some(child)) => nodes.push(child),
            PropertyValue::Nodes(children) => nodes.extend(children),
            _ => {}
        }
    }
    nodes
}

/// Pre-order traversal of a whole tree, root included
pub fn walk<'a>(root: &'a dyn AstNode) -> Vec<&'a dyn AstNode> {
    let mut nodes = Vec::new();
    collect(root, &mut nodes);
    nodes
}

fn collect<'a>(node: &'a dyn AstNode, nodes: &mut Vec<&'a dyn AstNode>) {
    nodes.push(node);
    for child in node.children() {
        collect(child, nodes);
    }
}
