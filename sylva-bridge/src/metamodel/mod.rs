//! Metamodel generation from node descriptors
//!
//! [`MetamodelBuilder`] walks a set of root node types and everything
//! transitively reachable through their properties, and emits a
//! [`Metamodel`]: one classifier per node kind, with each property exposed
//! as an attribute (data-valued), a containment (node-valued) or a
//! reference. Because the builder reads the same property tables the
//! transformer's child discovery uses, classifier and feature names agree
//! with the tree by construction.
//!
//! Kinds with a registered [`ExternalClassifier`] are not generated: they
//! point at a pre-published schema instead. The placeholder node kinds ship
//! as built-in externals so every consumer shares one base schema.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use sylva_ast::ast::{
    DataKind, EnumDescriptor, IntrospectionError, Multiplicity, NodeDescriptor, TypedNode,
    ValueKind,
};

/// A generated schema: classifiers, enumerations, external pointers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metamodel {
    pub name: String,
    pub uri: String,
    pub classifiers: Vec<Classifier>,
    pub enumerations: Vec<Enumeration>,
    pub externals: Vec<ExternalClassifier>,
}

impl Metamodel {
    pub fn classifier(&self, name: &str) -> Option<&Classifier> {
        self.classifiers
            .iter()
            .find(|classifier| classifier.name == name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enumeration> {
        self.enumerations
            .iter()
            .find(|enumeration| enumeration.name == name)
    }
}

/// Schema element describing one node kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classifier {
    pub name: String,
    pub features: Vec<Feature>,
}

impl Classifier {
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.name() == name)
    }
}

/// One feature of a classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role")]
pub enum Feature {
    /// Data-valued property with a recognized primitive or enum type
    Attribute {
        name: String,
        data_type: String,
        multiplicity: Multiplicity,
    },
    /// Non-owning reference to another classifier
    Reference {
        name: String,
        target: String,
        multiplicity: Multiplicity,
    },
    /// Owned child nodes of another classifier
    Containment {
        name: String,
        target: String,
        multiplicity: Multiplicity,
    },
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Feature::Attribute { name, .. }
            | Feature::Reference { name, .. }
            | Feature::Containment { name, .. } => name,
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        match self {
            Feature::Attribute { multiplicity, .. }
            | Feature::Reference { multiplicity, .. }
            | Feature::Containment { multiplicity, .. } => *multiplicity,
        }
    }
}

/// Schema element describing an enumeration attribute type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enumeration {
    pub name: String,
    pub literals: Vec<String>,
}

/// Pointer to a classifier published in another schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalClassifier {
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetamodelError {
    /// Two distinct types map to the same externally visible name
    DuplicateClassifier { name: String },
    Introspection(IntrospectionError),
}

impl fmt::Display for MetamodelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetamodelError::DuplicateClassifier { name } => {
                write!(f, "duplicate classifier name '{}'", name)
            }
            MetamodelError::Introspection(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for MetamodelError {}

impl From<IntrospectionError> for MetamodelError {
    fn from(error: IntrospectionError) -> Self {
        MetamodelError::Introspection(error)
    }
}

/// Shared base schema for the node kinds every consumer has
static BUILTIN_EXTERNALS: Lazy<HashMap<&'static str, ExternalClassifier>> = Lazy::new(|| {
    let base_uri = "https://sylva.dev/metamodels/base/v1";
    HashMap::from([
        (
            "Node",
            ExternalClassifier {
                name: "Node".to_string(),
                uri: base_uri.to_string(),
            },
        ),
        (
            "GenericNode",
            ExternalClassifier {
                name: "GenericNode".to_string(),
                uri: base_uri.to_string(),
            },
        ),
        (
            "GenericErrorNode",
            ExternalClassifier {
                name: "GenericErrorNode".to_string(),
                uri: base_uri.to_string(),
            },
        ),
    ])
});

/// Builds a [`Metamodel`] from registered root node types
pub struct MetamodelBuilder {
    name: String,
    uri: String,
    roots: Vec<&'static NodeDescriptor>,
    externals: HashMap<&'static str, ExternalClassifier>,
}

impl MetamodelBuilder {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            roots: Vec::new(),
            externals: BUILTIN_EXTERNALS.clone(),
        }
    }

    /// Register a root type; everything reachable from it is generated too
    pub fn add_node<T: TypedNode>(&mut self) -> &mut Self {
        self.roots.push(T::descriptor());
        self
    }

    /// Map a kind onto a pre-published classifier instead of generating one
    pub fn with_external(&mut self, kind: &'static str, external: ExternalClassifier) -> &mut Self {
        self.externals.insert(kind, external);
        self
    }

    pub fn build(&self) -> Result<Metamodel, MetamodelError> {
        let mut queue: VecDeque<&'static NodeDescriptor> = self.roots.iter().copied().collect();
        let mut visited: HashMap<&'static str, &'static NodeDescriptor> = HashMap::new();
        let mut classifiers: Vec<Classifier> = Vec::new();
        let mut enumerations: Vec<Enumeration> = Vec::new();
        let mut known_enums: HashMap<&'static str, &'static EnumDescriptor> = HashMap::new();
        let mut used_externals: Vec<ExternalClassifier> = Vec::new();
        let mut external_kinds: HashSet<&'static str> = HashSet::new();

        while let Some(descriptor) = queue.pop_front() {
            if let Some(external) = self.externals.get(descriptor.kind) {
                if external_kinds.insert(descriptor.kind) {
                    used_externals.push(external.clone());
                }
                continue;
            }
            if let Some(existing) = visited.get(descriptor.kind) {
                if std::ptr::eq(*existing, descriptor) {
                    continue;
                }
                return Err(MetamodelError::DuplicateClassifier {
                    name: descriptor.kind.to_string(),
                });
            }
            visited.insert(descriptor.kind, descriptor);

            let mut features = Vec::new();
            for property in descriptor.properties {
                match property.value {
                    ValueKind::Node(node_ref) => {
                        features.push(Feature::Containment {
                            name: property.name.to_string(),
                            target: node_ref.kind.to_string(),
                            multiplicity: property.multiplicity,
                        });
                        queue.push_back(node_ref.descriptor());
                    }
                    ValueKind::Reference(node_ref) => {
                        features.push(Feature::Reference {
                            name: property.name.to_string(),
                            target: node_ref.kind.to_string(),
                            multiplicity: property.multiplicity,
                        });
                        queue.push_back(node_ref.descriptor());
                    }
                    ValueKind::Data(DataKind::Enum(enum_descriptor)) => {
                        match known_enums.get(enum_descriptor.name) {
                            Some(existing) if existing.literals == enum_descriptor.literals => {}
                            Some(_) => {
                                return Err(MetamodelError::DuplicateClassifier {
                                    name: enum_descriptor.name.to_string(),
                                });
                            }
                            None => {
                                known_enums.insert(enum_descriptor.name, enum_descriptor);
                                enumerations.push(Enumeration {
                                    name: enum_descriptor.name.to_string(),
                                    literals: enum_descriptor
                                        .literals
                                        .iter()
                                        .map(|literal| literal.to_string())
                                        .collect(),
                                });
                            }
                        }
                        features.push(Feature::Attribute {
                            name: property.name.to_string(),
                            data_type: enum_descriptor.name.to_string(),
                            multiplicity: property.multiplicity,
                        });
                    }
                    ValueKind::Data(data_kind) => {
                        features.push(Feature::Attribute {
                            name: property.name.to_string(),
                            data_type: data_kind.type_name().to_string(),
                            multiplicity: property.multiplicity,
                        });
                    }
                    ValueKind::Opaque(_) => {
                        return Err(IntrospectionError::Unclassifiable {
                            kind: descriptor.kind.to_string(),
                            property: property.name.to_string(),
                        }
                        .into());
                    }
                }
            }
            classifiers.push(Classifier {
                name: descriptor.kind.to_string(),
                features,
            });
        }

        // an enumeration clashing with a classifier is a duplicate too
        for enumeration in &enumerations {
            if visited.contains_key(enumeration.name.as_str()) {
                return Err(MetamodelError::DuplicateClassifier {
                    name: enumeration.name.clone(),
                });
            }
        }

        Ok(Metamodel {
            name: self.name.clone(),
            uri: self.uri.clone(),
            classifiers,
            enumerations,
            externals: used_externals,
        })
    }
}
