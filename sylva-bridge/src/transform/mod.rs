//! Generic tree transformation
//!
//! [`TreeTransformer`] maps a tree of arbitrary source shape onto a declared
//! destination shape. Source types are matched to [`NodeFactory`] recipes by
//! walking their capability tags most-specific-first; children of each
//! constructed node are discovered from the destination type's declared
//! properties and transformed recursively. With fault tolerance on (the
//! default), sources without a factory become [`GenericNode`] placeholders
//! and failing constructors become [`GenericErrorNode`]s, so one bad node
//! never takes down its siblings.
//!
//! One transformer owns its factory registry, the per-kind tag resolution
//! cache, the per-(destination, property) discovery cache and the issue
//! list; nothing is global. Transformation is synchronous, single-threaded
//! recursion; source trees are assumed acyclic and a cyclic source will
//! exhaust the call stack.

mod error;
mod factory;
mod path;

pub use error::TransformError;
pub use factory::{ChildGetter, ChildKey, ChildNodeFactory, ChildSetter, NodeFactory};
pub use path::CompiledPath;

use std::collections::HashMap;
use std::rc::Rc;

use sylva_ast::ast::{
    AstNode, DataValue, GenericErrorNode, GenericNode, IntrospectionError, Issue, IssueSeverity,
    IssueStage, Multiplicity, NodeBase, NodeError, NodeId, NodeIdSource, PropertyType,
    PropertyValue, SetValue, TypedNode, ValueKind,
};

/// The generic tree-to-tree transformation engine
pub struct TreeTransformer {
    factories: HashMap<&'static str, Rc<NodeFactory>>,
    /// Chosen factory tag per encountered source kind
    resolution_cache: HashMap<&'static str, Option<&'static str>>,
    /// Synthesized (or absent) child mapping per (destination kind, property)
    discovery_cache: HashMap<(&'static str, &'static str), Option<Rc<ChildNodeFactory>>>,
    issues: Vec<Issue>,
    ids: NodeIdSource,
    fault_tolerant: bool,
}

impl TreeTransformer {
    /// Fault-tolerant transformer: unmapped sources and failing constructors
    /// become placeholders plus issues
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            resolution_cache: HashMap::new(),
            discovery_cache: HashMap::new(),
            issues: Vec::new(),
            ids: NodeIdSource::new(),
            fault_tolerant: true,
        }
    }

    /// Strict transformer: unmapped sources and failing constructors abort
    /// the whole transformation
    pub fn strict() -> Self {
        Self {
            fault_tolerant: false,
            ..Self::new()
        }
    }

    pub fn is_fault_tolerant(&self) -> bool {
        self.fault_tolerant
    }

    /// Associate a source tag with a recipe; the last registration for a
    /// given tag wins
    pub fn register_factory(&mut self, tag: &'static str, factory: NodeFactory) {
        self.factories.insert(tag, Rc::new(factory));
        // a new registration can shadow supertype choices made earlier
        self.resolution_cache.clear();
    }

    /// Trivial one-to-one registration: the destination is default-constructed
    /// and populated entirely by child discovery
    pub fn register_default<S: TypedNode, T: TypedNode + Default>(&mut self) {
        self.register_factory(
            S::KIND,
            NodeFactory::new(|_, _| Ok(Some(Box::new(T::default()) as Box<dyn AstNode>))),
        );
    }

    /// Identity passthrough: the source is cloned into the destination tree
    /// as-is and its subtree is not re-processed
    pub fn register_identity<S: TypedNode + Clone>(&mut self) {
        self.register_factory(
            S::KIND,
            NodeFactory::new(|source, _| {
                let typed = source.as_any().downcast_ref::<S>().ok_or_else(|| {
                    TransformError::constructor_failure(
                        source.node_kind(),
                        format!(
                            "identity registration expected {}",
                            std::any::type_name::<S>()
                        ),
                    )
                })?;
                Ok(Some(Box::new(typed.clone()) as Box<dyn AstNode>))
            })
            .skipping_children(),
        );
    }

    /// Issues accumulated across all `transform` calls so far
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn take_issues(&mut self) -> Vec<Issue> {
        std::mem::take(&mut self.issues)
    }

    /// Transform one source value into a destination node
    ///
    /// Absence propagates: a `None` source yields `Ok(None)`. A factory may
    /// also decide the source maps to nothing. The returned node carries a
    /// fresh id and the supplied parent link; its children were assigned
    /// their parents eagerly during construction.
    pub fn transform(
        &mut self,
        source: Option<&dyn AstNode>,
        parent: Option<NodeId>,
    ) -> Result<Option<Box<dyn AstNode>>, TransformError> {
        let Some(source) = source else {
            return Ok(None);
        };

        let Some(factory) = self.resolve_factory(source) else {
            if !self.fault_tolerant {
                return Err(TransformError::UnmappedNode {
                    kind: source.node_kind().to_string(),
                });
            }
            let mut placeholder = GenericNode::new(source.node_kind());
            let issue = issue_for(
                source,
                IssueSeverity::Info,
                format!("Source node not mapped: {}", source.node_kind()),
            );
            self.issues.push(issue);
            self.finish_placeholder(&mut placeholder.base, source, parent);
            return Ok(Some(Box::new(placeholder)));
        };

        let mut node = match factory.construct(source, self) {
            Ok(Some(node)) => node,
            Ok(None) => return Ok(None),
            Err(error) => {
                if !self.fault_tolerant {
                    return Err(error);
                }
                let mut placeholder = GenericErrorNode::new(error.to_string());
                let issue = issue_for(
                    source,
                    IssueSeverity::Error,
                    format!("Failed to transform {}: {}", source.node_kind(), error),
                );
                self.issues.push(issue);
                self.finish_placeholder(&mut placeholder.base, source, parent);
                return Ok(Some(Box::new(placeholder)));
            }
        };

        let id = self.ids.fresh();
        node.base_mut().set_id(id);
        node.base_mut().set_parent_link(parent);

        if !factory.skips_children() {
            self.discover_children(source, &mut *node, &factory)?;
        }

        factory.finalize(&mut *node);

        if node.base().origin().is_none() {
            if let Some(origin) = source.origin() {
                node.base_mut().set_origin(origin.clone());
            }
        }

        Ok(Some(node))
    }

    /// Nearest factory for a source: its own kind first, then its capability
    /// tags in declared order; the choice is cached per encountered kind
    fn resolve_factory(&mut self, source: &dyn AstNode) -> Option<Rc<NodeFactory>> {
        let kind = source.node_kind();
        if let Some(resolution) = self.resolution_cache.get(kind) {
            return resolution.and_then(|tag| self.factories.get(tag).cloned());
        }
        let mut chosen = None;
        for tag in source.type_tags() {
            if self.factories.contains_key(tag) {
                chosen = Some(*tag);
                break;
            }
        }
        self.resolution_cache.insert(kind, chosen);
        chosen.and_then(|tag| self.factories.get(tag).cloned())
    }

    fn finish_placeholder(
        &mut self,
        base: &mut NodeBase,
        source: &dyn AstNode,
        parent: Option<NodeId>,
    ) {
        // best-effort: whatever provenance the source exposes survives, even
        // when construction itself failed
        if let Some(origin) = source.origin() {
            base.set_origin(origin.clone());
        }
        let id = self.ids.fresh();
        base.set_id(id);
        base.set_parent_link(parent);
    }

    /// Populate the destination node's properties from the source
    ///
    /// Per property: an explicit registration on the recipe wins (the
    /// destination-scoped key before the global one), then a mapping is
    /// synthesized from the property's mapped path and cached, including
    /// negatively.
    fn discover_children(
        &mut self,
        source: &dyn AstNode,
        node: &mut dyn AstNode,
        factory: &Rc<NodeFactory>,
    ) -> Result<(), TransformError> {
        let target_kind = node.node_kind();
        for property in node.property_types() {
            let child_factory = match factory.child_for(target_kind, property.name) {
                Some(explicit) => Some(explicit),
                None => self.discovered_child(target_kind, property),
            };
            let Some(child_factory) = child_factory else {
                continue;
            };
            let Some(raw) = child_factory.read(source)? else {
                continue;
            };
            self.populate_property(node, property, &child_factory, raw)?;
        }
        Ok(())
    }

    fn discovered_child(
        &mut self,
        target_kind: &'static str,
        property: &'static PropertyType,
    ) -> Option<Rc<ChildNodeFactory>> {
        let key = (target_kind, property.name);
        if let Some(cached) = self.discovery_cache.get(&key) {
            return cached.clone();
        }
        let synthesized = ChildNodeFactory::synthesized(property).map(Rc::new);
        self.discovery_cache.insert(key, synthesized.clone());
        synthesized
    }

    fn populate_property(
        &mut self,
        node: &mut dyn AstNode,
        property: &PropertyType,
        child_factory: &ChildNodeFactory,
        raw: PropertyValue<'_>,
    ) -> Result<(), TransformError> {
        let parent = node.base().id();
        let value = match property.value {
            ValueKind::Node(_) => {
                if property.multiplicity == Multiplicity::Many {
                    let elements: Vec<&dyn AstNode> = match raw {
                        PropertyValue::Node(Some(element)) => vec![element],
                        PropertyValue::Node(None) => Vec::new(),
                        PropertyValue::Nodes(elements) => elements,
                        PropertyValue::Data(_) | PropertyValue::Reference { .. } => {
                            return Err(TransformError::Node(NodeError::NodeTypeMismatch {
                                property: property.name.to_string(),
                                expected: "node values",
                                found: "a data value",
                            }));
                        }
                    };
                    let mut transformed: Vec<Box<dyn AstNode>> = Vec::new();
                    for element in elements {
                        // elements that map to nothing are dropped
                        if let Some(child) = self.transform(Some(element), parent)? {
                            transformed.push(child);
                        }
                    }
                    SetValue::Nodes(transformed)
                } else {
                    let element = match raw {
                        PropertyValue::Node(element) => element,
                        PropertyValue::Nodes(elements) => {
                            return Err(TransformError::CollectionTransform {
                                context: format!(
                                    "property '{}' of {} is {} but the source value is a \
                                     collection of {} elements",
                                    property.name,
                                    node.node_kind(),
                                    property.multiplicity,
                                    elements.len()
                                ),
                            });
                        }
                        PropertyValue::Data(_) | PropertyValue::Reference { .. } => {
                            return Err(TransformError::Node(NodeError::NodeTypeMismatch {
                                property: property.name.to_string(),
                                expected: "a node value",
                                found: "a data value",
                            }));
                        }
                    };
                    SetValue::Node(self.transform(element, parent)?)
                }
            }
            ValueKind::Data(_) => match raw {
                PropertyValue::Data(data) => SetValue::Data(data),
                PropertyValue::Node(None) => SetValue::Data(DataValue::Null),
                PropertyValue::Reference { name, .. } => SetValue::Data(DataValue::String(name)),
                PropertyValue::Node(Some(_)) | PropertyValue::Nodes(_) => {
                    return Err(TransformError::Node(NodeError::NodeTypeMismatch {
                        property: property.name.to_string(),
                        expected: "a data value",
                        found: "a node value",
                    }));
                }
            },
            ValueKind::Reference(_) => match raw {
                PropertyValue::Reference { name, .. } => SetValue::Data(DataValue::String(name)),
                PropertyValue::Data(DataValue::String(name)) => {
                    SetValue::Data(DataValue::String(name))
                }
                _ => {
                    return Err(TransformError::Node(NodeError::NodeTypeMismatch {
                        property: property.name.to_string(),
                        expected: "a reference name",
                        found: "another value shape",
                    }));
                }
            },
            ValueKind::Opaque(_) => {
                return Err(TransformError::Introspection(
                    IntrospectionError::Unclassifiable {
                        kind: node.node_kind().to_string(),
                        property: property.name.to_string(),
                    },
                ));
            }
        };
        child_factory.write(node, value).map_err(TransformError::Node)
    }
}

impl Default for TreeTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn issue_for(source: &dyn AstNode, severity: IssueSeverity, message: String) -> Issue {
    let mut issue = Issue::new(severity, IssueStage::Translation, message);
    if let Some(span) = source.origin().and_then(|origin| origin.span.clone()) {
        issue = issue.with_span(span);
    }
    issue
}
