//! The node capability
//!
//! [`AstNode`] is the object-safe trait every tree element implements: it
//! exposes the node's kind, its capability tags (for factory dispatch), its
//! declared properties, dynamic property access, and the per-node state held
//! in [`NodeBase`] (origin, id, parent). [`TypedNode`] is the compile-time
//! companion carrying the same information as constants, which makes the type
//! graph traversable without instances.
//!
//! Nodes exclusively own their children. Parent links are ids, not pointers:
//! they are minted by a [`NodeIdSource`] during a dedicated assignment pass
//! (two-stage parsing) or eagerly during transformation.

use std::any::Any;
use std::fmt;

use super::origin::Origin;
use super::properties::{DataValue, Multiplicity, Property, PropertyType, PropertyValue};

/// Identity of a node within one tree, minted by a [`NodeIdSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of fresh node ids
#[derive(Debug, Default)]
pub struct NodeIdSource {
    next: u32,
}

impl NodeIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// Per-node state shared by every node type: origin, id, parent link
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeBase {
    origin: Option<Origin>,
    id: Option<NodeId>,
    parent: Option<NodeId>,
}

impl NodeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = Some(origin);
    }

    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn set_id(&mut self, id: NodeId) {
        self.id = Some(id);
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }

    pub fn set_parent_link(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

/// A value being written into a node property
#[derive(Debug)]
pub enum SetValue {
    /// For optional and singular node properties
    Node(Option<Box<dyn AstNode>>),
    /// For many-valued node properties
    Nodes(Vec<Box<dyn AstNode>>),
    /// For data and reference properties
    Data(DataValue),
}

/// Errors from dynamic property access
#[derive(Debug, Clone, PartialEq)]
pub enum NodeError {
    /// The node type declares no property with this name
    UnknownProperty { kind: &'static str, property: String },
    /// The node type does not support writes (e.g. first-stage trees)
    NotWritable { kind: &'static str, property: String },
    /// A node value did not have the property's declared element type
    NodeTypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A data value did not match the property's declared data kind
    DataTypeMismatch { property: String, value: DataValue },
    /// The written value's shape did not match the property's multiplicity
    MultiplicityMismatch {
        property: String,
        expected: Multiplicity,
    },
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::UnknownProperty { kind, property } => {
                write!(f, "{} has no property '{}'", kind, property)
            }
            NodeError::NotWritable { kind, property } => {
                write!(f, "property '{}' of {} is not writable", property, kind)
            }
            NodeError::NodeTypeMismatch {
                property,
                expected,
                found,
            } => write!(
                f,
                "property '{}' expects {} but received a {} node",
                property, expected, found
            ),
            NodeError::DataTypeMismatch { property, value } => {
                write!(f, "property '{}' cannot hold {}", property, value)
            }
            NodeError::MultiplicityMismatch { property, expected } => write!(
                f,
                "property '{}' is {} but received a value of another shape",
                property, expected
            ),
        }
    }
}

impl std::error::Error for NodeError {}

/// The uniform capability of every tree element
///
/// Generated by `ast_node!` for declared node types; implemented by hand for
/// foreign types that cannot use the macro (first-stage trees, placeholders).
/// Hand-written impls only need the required methods; writes default to
/// [`NodeError::NotWritable`].
pub trait AstNode: Any + fmt::Debug {
    /// Structural identity of this node
    fn node_kind(&self) -> &'static str;

    /// Prioritized dispatch tags: own kind first, then supertype/capability
    /// tags in most-specific-first order
    fn type_tags(&self) -> &'static [&'static str];

    /// Declared properties, in declaration order
    fn property_types(&self) -> &'static [PropertyType];

    /// Resolved value of one property, `None` for undeclared names
    fn property(&self, name: &str) -> Option<Property<'_>>;

    fn base(&self) -> &NodeBase;

    fn base_mut(&mut self) -> &mut NodeBase;

    /// All properties with resolved values, in declaration order
    fn properties(&self) -> Vec<Property<'_>> {
        self.property_types()
            .iter()
            .filter_map(|property_type| self.property(property_type.name))
            .collect()
    }

    /// Child nodes in property declaration order
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut nodes: Vec<&dyn AstNode> = Vec::new();
        for property in self.properties() {
            match property.value {
                PropertyValue::Node(Some(child)) => nodes.push(child),
                PropertyValue::Nodes(children) => nodes.extend(children),
                _ => {}
            }
        }
        nodes
    }

    /// Mutable access to child nodes, for generic passes
    fn children_mut(&mut self) -> Vec<&mut dyn AstNode>;

    /// Write one property; read-only node types reject all writes
    fn set_property_value(&mut self, name: &str, value: SetValue) -> Result<(), NodeError> {
        let _ = value;
        Err(NodeError::NotWritable {
            kind: self.node_kind(),
            property: name.to_string(),
        })
    }

    fn origin(&self) -> Option<&Origin> {
        self.base().origin()
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Static description of a node type, traversable without instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub kind: &'static str,
    pub tags: &'static [&'static str],
    pub properties: &'static [PropertyType],
}

impl NodeDescriptor {
    pub fn property(&self, name: &str) -> Option<&PropertyType> {
        self.properties
            .iter()
            .find(|property| property.name == name)
    }
}

/// Descriptor of the base node capability itself
///
/// Dynamically typed child properties (`node` fields) reference this instead
/// of a concrete node type; schema generation maps it onto the shared base
/// classifier rather than redefining it per consumer.
pub fn base_node_descriptor() -> &'static NodeDescriptor {
    static BASE: NodeDescriptor = NodeDescriptor {
        kind: "Node",
        tags: &["Node"],
        properties: &[],
    };
    &BASE
}

/// Compile-time companion of [`AstNode`] for declared node types
pub trait TypedNode: AstNode + Sized {
    const KIND: &'static str;
    const TYPE_TAGS: &'static [&'static str];
    const PROPERTIES: &'static [PropertyType];

    fn descriptor() -> &'static NodeDescriptor;
}

/// Downcast a boxed node to a concrete type, reporting the property involved
pub fn downcast_node<T: AstNode>(node: Box<dyn AstNode>, property: &str) -> Result<Box<T>, NodeError> {
    let found = node.node_kind();
    match node.into_any().downcast::<T>() {
        Ok(node) => Ok(node),
        Err(_) => Err(NodeError::NodeTypeMismatch {
            property: property.to_string(),
            expected: std::any::type_name::<T>(),
            found,
        }),
    }
}
