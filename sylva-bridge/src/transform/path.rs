//! Precompiled dotted-path accessors
//!
//! Synthesized child mappings read their source value through a dotted path
//! (`"declarations.name"`). Paths are compiled once per registration into a
//! segment list and resolved segment-wise at transform time; intermediate
//! collections are traversed element-wise, but nested collections are never
//! flattened implicitly.

use sylva_ast::ast::{AstNode, PropertyValue};

use super::error::TransformError;

/// A dotted source path, split once at compile time
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPath {
    path: String,
    segments: Vec<String>,
    lenient_head: bool,
}

impl CompiledPath {
    /// Compile a dotted path
    ///
    /// With `lenient_head`, a first segment that the source simply does not
    /// declare resolves to "nothing" instead of an error. Same-name
    /// synthesized mappings use this so reflective discovery stays total;
    /// explicitly declared paths are strict everywhere.
    pub fn compile(path: &str, lenient_head: bool) -> Self {
        Self {
            path: path.to_string(),
            segments: path.split('.').map(str::to_string).collect(),
            lenient_head,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolve against a source node
    ///
    /// `Ok(None)` means the lenient head did not match; `Ok(Some(..))` is the
    /// resolved raw value, which may still be an absent node value.
    pub fn resolve<'a>(
        &self,
        source: &'a dyn AstNode,
    ) -> Result<Option<PropertyValue<'a>>, TransformError> {
        let mut current = PropertyValue::Node(Some(source));

        for (index, segment) in self.segments.iter().enumerate() {
            current = match current {
                // absence propagates through the rest of the path
                PropertyValue::Node(None) => return Ok(Some(PropertyValue::Node(None))),
                PropertyValue::Node(Some(node)) => match node.property(segment) {
                    Some(property) => property.value,
                    None => {
                        if index == 0 && self.lenient_head {
                            return Ok(None);
                        }
                        return Err(self.unresolved(segment, node.node_kind().to_string()));
                    }
                },
                PropertyValue::Nodes(nodes) => {
                    let mut collected: Vec<&dyn AstNode> = Vec::new();
                    for node in nodes {
                        let Some(property) = node.property(segment) else {
                            return Err(self.unresolved(segment, node.node_kind().to_string()));
                        };
                        match property.value {
                            PropertyValue::Node(Some(child)) => collected.push(child),
                            PropertyValue::Node(None) => {}
                            PropertyValue::Nodes(_) => {
                                return Err(TransformError::CollectionTransform {
                                    context: format!(
                                        "path '{}' produces nested collections at segment '{}'; \
                                         flattening is up to the caller",
                                        self.path, segment
                                    ),
                                });
                            }
                            PropertyValue::Data(_) | PropertyValue::Reference { .. } => {
                                return Err(self.unresolved(
                                    segment,
                                    format!(
                                        "{} (data value inside a collection)",
                                        node.node_kind()
                                    ),
                                ));
                            }
                        }
                    }
                    PropertyValue::Nodes(collected)
                }
                PropertyValue::Data(_) | PropertyValue::Reference { .. } => {
                    return Err(self.unresolved(segment, "a data value".to_string()));
                }
            };
        }

        Ok(Some(current))
    }

    fn unresolved(&self, segment: &str, on: String) -> TransformError {
        TransformError::PathResolution {
            path: self.path.clone(),
            segment: segment.to_string(),
            on,
        }
    }
}
