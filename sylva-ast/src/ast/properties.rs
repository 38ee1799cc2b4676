//! Property introspection over node types
//!
//! Every node type declares an ordered list of [`PropertyType`]s: name,
//! multiplicity, and a [`ValueKind`] deciding whether the property holds
//! child nodes, a non-owning reference, or plain data. The list is recorded
//! at declaration time (by `ast_node!` or a hand-written impl) and never
//! derived from runtime values, so classification is decidable without
//! instantiating anything.
//!
//! The per-instance view is [`Property`]: the same shape with the resolved
//! [`PropertyValue`]. [`properties_of`] adds the ignore-set used by generic
//! walks to skip derived properties.

use serde::Serialize;
use std::fmt;

use super::node::{AstNode, NodeDescriptor, TypedNode};

/// How many values a property holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Multiplicity {
    Optional,
    Singular,
    Many,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Optional => write!(f, "optional"),
            Multiplicity::Singular => write!(f, "singular"),
            Multiplicity::Many => write!(f, "many"),
        }
    }
}

/// Description of an enumeration attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: &'static str,
    pub literals: &'static [&'static str],
}

/// Recognized data types for attribute properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    String,
    Int,
    Float,
    Bool,
    Enum(&'static EnumDescriptor),
}

impl DataKind {
    /// External name of this data type, as exposed to schema consumers
    pub fn type_name(&self) -> &'static str {
        match self {
            DataKind::String => "String",
            DataKind::Int => "Int",
            DataKind::Float => "Float",
            DataKind::Bool => "Bool",
            DataKind::Enum(descriptor) => descriptor.name,
        }
    }
}

/// A link to a node type, resolvable to its descriptor without an instance
#[derive(Clone, Copy)]
pub struct NodeRef {
    pub kind: &'static str,
    descriptor: fn() -> &'static NodeDescriptor,
}

impl NodeRef {
    pub const fn new(kind: &'static str, descriptor: fn() -> &'static NodeDescriptor) -> Self {
        Self { kind, descriptor }
    }

    pub const fn of<T: TypedNode>() -> Self {
        Self {
            kind: T::KIND,
            descriptor: T::descriptor,
        }
    }

    /// Reference to the base node capability, used by dynamically typed
    /// child properties
    pub const fn base() -> Self {
        Self {
            kind: "Node",
            descriptor: super::node::base_node_descriptor,
        }
    }

    pub fn descriptor(&self) -> &'static NodeDescriptor {
        (self.descriptor)()
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({})", self.kind)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for NodeRef {}

/// Static classification of a property's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// The property owns child nodes of the referenced type
    Node(NodeRef),
    /// The property holds a non-owning, name-resolved reference
    Reference(NodeRef),
    /// The property holds plain data
    Data(DataKind),
    /// The property's classification cannot be determined statically.
    /// Walks that must classify it signal [`IntrospectionError`].
    Opaque(&'static str),
}

impl ValueKind {
    pub fn provides_nodes(&self) -> bool {
        matches!(self, ValueKind::Node(_))
    }
}

/// Where a synthesized child mapping reads its source value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedPath {
    /// No mapping: the property is never populated by discovery
    None,
    /// Read the source property with the same name; absence means "no child"
    SameName,
    /// Read the given dotted path; missing segments are an error
    Path(&'static str),
}

/// Static description of one structural property of a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyType {
    pub name: &'static str,
    pub multiplicity: Multiplicity,
    pub value: ValueKind,
    pub mapped: MappedPath,
}

impl PropertyType {
    pub fn provides_nodes(&self) -> bool {
        self.value.provides_nodes()
    }

    /// The dotted source path this property maps from, if any
    pub fn mapped_path(&self) -> Option<&'static str> {
        match self.mapped {
            MappedPath::None => None,
            MappedPath::SameName => Some(self.name),
            MappedPath::Path(path) => Some(path),
        }
    }
}

/// A plain data value carried by an attribute property
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(value) => write!(f, "{}", value),
            DataValue::Int(value) => write!(f, "{}", value),
            DataValue::Float(value) => write!(f, "{}", value),
            DataValue::String(value) => write!(f, "{:?}", value),
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

/// Types usable as attribute properties
///
/// Implemented for the primitive types and for enums declared with
/// `ast_enum!`. The `KIND` constant makes classification available in
/// `const` position, where the `ast_node!` property tables are built.
pub trait AttributeValue: Sized {
    const KIND: DataKind;

    fn to_data(&self) -> DataValue;
    fn from_data(value: DataValue) -> Option<Self>;
}

impl AttributeValue for String {
    const KIND: DataKind = DataKind::String;

    fn to_data(&self) -> DataValue {
        DataValue::String(self.clone())
    }

    fn from_data(value: DataValue) -> Option<Self> {
        match value {
            DataValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl AttributeValue for i64 {
    const KIND: DataKind = DataKind::Int;

    fn to_data(&self) -> DataValue {
        DataValue::Int(*self)
    }

    fn from_data(value: DataValue) -> Option<Self> {
        match value {
            DataValue::Int(value) => Some(value),
            _ => None,
        }
    }
}

impl AttributeValue for f64 {
    const KIND: DataKind = DataKind::Float;

    fn to_data(&self) -> DataValue {
        DataValue::Float(*self)
    }

    fn from_data(value: DataValue) -> Option<Self> {
        match value {
            DataValue::Float(value) => Some(value),
            DataValue::Int(value) => Some(value as f64),
            _ => None,
        }
    }
}

impl AttributeValue for bool {
    const KIND: DataKind = DataKind::Bool;

    fn to_data(&self) -> DataValue {
        DataValue::Bool(*self)
    }

    fn from_data(value: DataValue) -> Option<Self> {
        match value {
            DataValue::Bool(value) => Some(value),
            _ => None,
        }
    }
}

/// The resolved value of one property on one node instance
#[derive(Debug)]
pub enum PropertyValue<'a> {
    /// An optional or singular child node
    Node(Option<&'a dyn AstNode>),
    /// An ordered sequence of child nodes
    Nodes(Vec<&'a dyn AstNode>),
    /// A non-owning reference, possibly not yet resolved
    Reference { name: String, resolved: bool },
    /// Plain data
    Data(DataValue),
}

/// One property of one node instance: static shape plus resolved value
#[derive(Debug)]
pub struct Property<'a> {
    pub name: &'static str,
    pub multiplicity: Multiplicity,
    pub value: PropertyValue<'a>,
}

impl<'a> Property<'a> {
    pub fn provides_nodes(&self) -> bool {
        matches!(
            self.value,
            PropertyValue::Node(_) | PropertyValue::Nodes(_)
        )
    }
}

/// The per-instance introspection entry point
///
/// Returns the node's properties in declaration order, skipping any name in
/// `ignore`. The ignore-set exists so generic walks (parent assignment,
/// printing) can exclude derived properties that would recurse forever.
pub fn properties_of<'a>(node: &'a dyn AstNode, ignore: &[&str]) -> Vec<Property<'a>> {
    node.property_types()
        .iter()
        .filter(|property_type| !ignore.contains(&property_type.name))
        .filter_map(|property_type| node.property(property_type.name))
        .collect()
}

/// The per-type introspection entry point
pub fn property_types_of<T: TypedNode>() -> &'static [PropertyType] {
    T::PROPERTIES
}

/// Failure to classify a property from static type information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntrospectionError {
    /// A property's node-or-data classification is statically undecidable
    Unclassifiable { kind: String, property: String },
}

impl fmt::Display for IntrospectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntrospectionError::Unclassifiable { kind, property } => write!(
                f,
                "cannot classify property '{}' of {}: value kind is opaque",
                property, kind
            ),
        }
    }
}

impl std::error::Error for IntrospectionError {}
