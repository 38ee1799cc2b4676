//! The introspectable tree model
//!
//! Nodes declared with [`ast_node!`](crate::ast_node) expose their structure
//! through [`AstNode`]: an ordered list of properties, each classified as
//! child-node-valued, reference-valued, or data-valued, with a multiplicity.
//! Everything downstream (parent assignment, printing, transformation,
//! metamodel generation) walks trees through this one contract instead of
//! per-type code.

pub mod issues;
pub mod macros;
pub mod node;
pub mod origin;
pub mod placeholders;
pub mod printing;
pub mod properties;
pub mod range;
pub mod reference;
pub mod walking;

pub use issues::{Issue, IssueSeverity, IssueStage};
pub use node::{
    base_node_descriptor, downcast_node, AstNode, NodeBase, NodeDescriptor, NodeError, NodeId,
    NodeIdSource, SetValue, TypedNode,
};
pub use origin::Origin;
pub use placeholders::{GenericErrorNode, GenericNode};
pub use printing::{debug_print, debug_print_filtered};
pub use properties::{
    properties_of, property_types_of, AttributeValue, DataKind, DataValue, EnumDescriptor,
    IntrospectionError, MappedPath, Multiplicity, NodeRef, Property, PropertyType, PropertyValue,
    ValueKind,
};
pub use range::{LineIndex, Position, Span};
pub use reference::ReferenceByName;
pub use walking::{assign_parents, child_nodes, walk};
