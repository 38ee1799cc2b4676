//! Indented debug dump of a tree
//!
//! Renders a node and its subtree line by line through the introspection
//! layer, one node or data property per line. Used for golden tests and for
//! eyeballing transformation results.

use super::node::AstNode;
use super::properties::{properties_of, PropertyValue};

/// Render a whole tree as an indented dump
pub fn debug_print(root: &dyn AstNode) -> String {
    debug_print_filtered(root, &[])
}

/// Render a tree, skipping the given property names on every node
pub fn debug_print_filtered(root: &dyn AstNode, ignore: &[&str]) -> String {
    let mut out = String::new();
    print_node(root, 0, ignore, &mut out);
    out
}

fn print_node(node: &dyn AstNode, depth: usize, ignore: &[&str], out: &mut String) {
    indent(depth, out);
    out.push_str(node.node_kind());
    if let Some(origin) = node.origin() {
        if let Some(span) = &origin.span {
            out.push_str(&format!(" @ {}", span));
        }
    }
    out.push('\n');

    for property in properties_of(node, ignore) {
        match property.value {
            PropertyValue::Data(value) => {
                indent(depth + 1, out);
                out.push_str(&format!("{} = {}\n", property.name, value));
            }
            PropertyValue::Reference { name, resolved } => {
                indent(depth + 1, out);
                let state = if resolved { "resolved" } else { "unresolved" };
                out.push_str(&format!("{} -> '{}' ({})\n", property.name, name, state));
            }
            PropertyValue::Node(None) => {
                indent(depth + 1, out);
                out.push_str(&format!("{} = null\n", property.name));
            }
            PropertyValue::Node(Some(child)) => {
                indent(depth + 1, out);
                out.push_str(&format!("{}:\n", property.name));
                print_node(child, depth + 2, ignore, out);
            }
            PropertyValue::Nodes(children) => {
                indent(depth + 1, out);
                out.push_str(&format!("{}: [{}]\n", property.name, children.len()));
                for child in children {
                    print_node(child, depth + 2, ignore, out);
                }
            }
        }
    }
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
