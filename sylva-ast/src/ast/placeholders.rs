//! Placeholder nodes for partial-failure transformations
//!
//! When the transformer runs in fault-tolerant mode, sources without a
//! matching factory become a [`GenericNode`] and constructor failures become
//! a [`GenericErrorNode`]. Both keep the tree total: siblings are unaffected
//! and the problem is reported through the issue list instead of aborting.
//!
//! Both types implement [`AstNode`] by hand, which also makes them the
//! reference example for foreign node types that cannot use `ast_node!`.

use std::any::Any;

use super::node::{AstNode, NodeBase, NodeDescriptor, TypedNode};
use super::properties::{
    DataKind, DataValue, MappedPath, Multiplicity, Property, PropertyType, PropertyValue,
    ValueKind,
};

/// Stand-in for a source construct with no registered factory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericNode {
    pub base: NodeBase,
    /// Kind of the source node that could not be mapped
    pub source_kind: String,
}

impl GenericNode {
    pub fn new(source_kind: impl Into<String>) -> Self {
        Self {
            base: NodeBase::new(),
            source_kind: source_kind.into(),
        }
    }
}

impl TypedNode for GenericNode {
    const KIND: &'static str = "GenericNode";
    const TYPE_TAGS: &'static [&'static str] = &["GenericNode"];
    const PROPERTIES: &'static [PropertyType] = &[PropertyType {
        name: "source_kind",
        multiplicity: Multiplicity::Singular,
        value: ValueKind::Data(DataKind::String),
        mapped: MappedPath::None,
    }];

    fn descriptor() -> &'static NodeDescriptor {
        static DESCRIPTOR: NodeDescriptor = NodeDescriptor {
            kind: "GenericNode",
            tags: &["GenericNode"],
            properties: GenericNode::PROPERTIES,
        };
        &DESCRIPTOR
    }
}

impl AstNode for GenericNode {
    fn node_kind(&self) -> &'static str {
        Self::KIND
    }

    fn type_tags(&self) -> &'static [&'static str] {
        Self::TYPE_TAGS
    }

    fn property_types(&self) -> &'static [PropertyType] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<Property<'_>> {
        if name == "source_kind" {
            return Some(Property {
                name: "source_kind",
                multiplicity: Multiplicity::Singular,
                value: PropertyValue::Data(DataValue::String(self.source_kind.clone())),
            });
        }
        None
    }

    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn children_mut(&mut self) -> Vec<&mut dyn AstNode> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Stand-in for a node whose constructor failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericErrorNode {
    pub base: NodeBase,
    /// Description of the failure that produced this placeholder
    pub message: String,
}

impl GenericErrorNode {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            base: NodeBase::new(),
            message: message.into(),
        }
    }
}

impl TypedNode for GenericErrorNode {
    const KIND: &'static str = "GenericErrorNode";
    const TYPE_TAGS: &'static [&'static str] = &["GenericErrorNode"];
    const PROPERTIES: &'static [PropertyType] = &[PropertyType {
        name: "message",
        multiplicity: Multiplicity::Singular,
        value: ValueKind::Data(DataKind::String),
        mapped: MappedPath::None,
    }];

    fn descriptor() -> &'static NodeDescriptor {
        static DESCRIPTOR: NodeDescriptor = NodeDescriptor {
            kind: "GenericErrorNode",
            tags: &["GenericErrorNode"],
            properties: GenericErrorNode::PROPERTIES,
        };
        &DESCRIPTOR
    }
}

impl AstNode for GenericErrorNode {
    fn node_kind(&self) -> &'static str {
        Self::KIND
    }

    fn type_tags(&self) -> &'static [&'static str] {
        Self::TYPE_TAGS
    }

    fn property_types(&self) -> &'static [PropertyType] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<Property<'_>> {
        if name == "message" {
            return Some(Property {
                name: "message",
                multiplicity: Multiplicity::Singular,
                value: PropertyValue::Data(DataValue::String(self.message.clone())),
            });
        }
        None
    }

    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn children_mut(&mut self) -> Vec<&mut dyn AstNode> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
