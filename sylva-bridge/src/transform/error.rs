//! Error taxonomy of the transformation engine
//!
//! Recoverable per-node problems (no factory, a failing constructor) only
//! surface as errors when fault tolerance is off; structural and programmer
//! errors (collection misuse, unresolvable paths, bad property writes) are
//! always fatal and never downgraded to issues.

use std::fmt;

use sylva_ast::ast::{IntrospectionError, NodeError};

#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A collection reached a position where a single value is required
    CollectionTransform { context: String },
    /// No factory matched the source's type tags and fault tolerance is off
    UnmappedNode { kind: String },
    /// A registered constructor failed
    ConstructorFailure { kind: String, message: String },
    /// A dotted child path could not be resolved against the source
    PathResolution {
        path: String,
        segment: String,
        on: String,
    },
    /// A property write on the destination node was rejected
    Node(NodeError),
    /// A property's classification could not be determined
    Introspection(IntrospectionError),
}

impl TransformError {
    pub fn constructor_failure(kind: impl Into<String>, message: impl Into<String>) -> Self {
        TransformError::ConstructorFailure {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::CollectionTransform { context } => {
                write!(f, "cannot transform a collection here: {}", context)
            }
            TransformError::UnmappedNode { kind } => {
                write!(f, "no factory registered for source node {}", kind)
            }
            TransformError::ConstructorFailure { kind, message } => {
                write!(f, "constructor for {} failed: {}", kind, message)
            }
            TransformError::PathResolution { path, segment, on } => write!(
                f,
                "cannot resolve segment '{}' of path '{}' on {}",
                segment, path, on
            ),
            TransformError::Node(error) => write!(f, "{}", error),
            TransformError::Introspection(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for TransformError {}

impl From<NodeError> for TransformError {
    fn from(error: NodeError) -> Self {
        TransformError::Node(error)
    }
}

impl From<IntrospectionError> for TransformError {
    fn from(error: IntrospectionError) -> Self {
        TransformError::Introspection(error)
    }
}
