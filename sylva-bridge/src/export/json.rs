//! JSON object-graph export
//!
//! Serializes a finished tree through the introspection layer. Property
//! names and node kinds in the output match the metamodel's feature and
//! classifier names because both walk the same property tables.

use serde_json::{json, Map, Value};

use sylva_ast::ast::{AstNode, Issue, PropertyValue};

/// Serialize one node and its subtree
pub fn node_to_json(node: &dyn AstNode) -> Value {
    let mut object = Map::new();
    object.insert("kind".to_string(), json!(node.node_kind()));
    if let Some(origin) = node.origin() {
        object.insert(
            "origin".to_string(),
            serde_json::to_value(origin).unwrap_or(Value::Null),
        );
    }
    for property in node.properties() {
        let value = match property.value {
            PropertyValue::Data(data) => serde_json::to_value(&data).unwrap_or(Value::Null),
            PropertyValue::Reference { name, resolved } => {
                json!({ "reference": name, "resolved": resolved })
            }
            PropertyValue::Node(None) => Value::Null,
            PropertyValue::Node(Some(child)) => node_to_json(child),
            PropertyValue::Nodes(children) => {
                Value::Array(children.into_iter().map(node_to_json).collect())
            }
        };
        object.insert(property.name.to_string(), value);
    }
    Value::Object(object)
}

/// Serialize a transformation result: the (possibly partial) tree plus the
/// accumulated issue list
pub fn result_to_json(root: Option<&dyn AstNode>, issues: &[Issue]) -> Value {
    json!({
        "root": root.map(node_to_json).unwrap_or(Value::Null),
        "issues": serde_json::to_value(issues).unwrap_or(Value::Null),
    })
}
