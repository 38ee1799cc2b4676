//! Factory recipes
//!
//! A [`NodeFactory`] describes how one source type becomes one destination
//! node: a constructor, explicit child mappings, an optional finalizer, and
//! a flag to skip automatic child discovery. A [`ChildNodeFactory`] is the
//! getter/setter pair used to move one child value across: explicit ones are
//! registered on the recipe's fluent builder, synthesized ones are compiled
//! from the destination property's mapped path.

use std::collections::HashMap;
use std::rc::Rc;

use sylva_ast::ast::{
    AstNode, MappedPath, NodeError, PropertyType, PropertyValue, SetValue, TypedNode,
};

use super::error::TransformError;
use super::path::CompiledPath;
use super::TreeTransformer;

type ConstructorFn =
    Box<dyn Fn(&dyn AstNode, &mut TreeTransformer) -> Result<Option<Box<dyn AstNode>>, TransformError>>;
type FinalizerFn = Box<dyn Fn(&mut dyn AstNode)>;

/// Reads one raw child value out of a source node
pub trait ChildGetter {
    fn get<'a>(&self, source: &'a dyn AstNode)
        -> Result<Option<PropertyValue<'a>>, TransformError>;
}

/// Writes one transformed child value into a destination node
pub trait ChildSetter {
    fn set(&self, target: &mut dyn AstNode, value: SetValue) -> Result<(), NodeError>;
}

struct TypedGetter<S> {
    read: for<'a> fn(&'a S) -> Option<PropertyValue<'a>>,
}

impl<S: AstNode> ChildGetter for TypedGetter<S> {
    fn get<'a>(
        &self,
        source: &'a dyn AstNode,
    ) -> Result<Option<PropertyValue<'a>>, TransformError> {
        match source.as_any().downcast_ref::<S>() {
            Some(typed) => Ok((self.read)(typed)),
            None => Err(TransformError::constructor_failure(
                source.node_kind(),
                format!("child getter expected {}", std::any::type_name::<S>()),
            )),
        }
    }
}

struct TypedSetter<T> {
    write: fn(&mut T, SetValue) -> Result<(), NodeError>,
}

impl<T: AstNode> ChildSetter for TypedSetter<T> {
    fn set(&self, target: &mut dyn AstNode, value: SetValue) -> Result<(), NodeError> {
        let found = target.node_kind();
        match target.as_any_mut().downcast_mut::<T>() {
            Some(typed) => (self.write)(typed, value),
            None => Err(NodeError::NodeTypeMismatch {
                property: "<custom setter>".to_string(),
                expected: std::any::type_name::<T>(),
                found,
            }),
        }
    }
}

enum Getter {
    Path(CompiledPath),
    Custom(Box<dyn ChildGetter>),
}

enum Setter {
    Property(String),
    Custom(Box<dyn ChildSetter>),
}

/// Getter/setter pair moving one child value from source to destination
pub struct ChildNodeFactory {
    name: String,
    getter: Getter,
    setter: Setter,
}

impl ChildNodeFactory {
    /// Read `path` from the source, write the destination property `name`.
    /// The path is strict: missing segments are an error.
    pub fn mapped(name: impl Into<String>, path: &str) -> Self {
        let name = name.into();
        Self {
            setter: Setter::Property(name.clone()),
            getter: Getter::Path(CompiledPath::compile(path, false)),
            name,
        }
    }

    /// Custom reader, destination property writer
    pub fn computed<S: AstNode>(
        name: impl Into<String>,
        read: for<'a> fn(&'a S) -> Option<PropertyValue<'a>>,
    ) -> Self {
        let name = name.into();
        Self {
            setter: Setter::Property(name.clone()),
            getter: Getter::Custom(Box::new(TypedGetter { read })),
            name,
        }
    }

    /// Fully custom accessor pair
    pub fn accessors<S: AstNode, T: AstNode>(
        name: impl Into<String>,
        read: for<'a> fn(&'a S) -> Option<PropertyValue<'a>>,
        write: fn(&mut T, SetValue) -> Result<(), NodeError>,
    ) -> Self {
        Self {
            name: name.into(),
            getter: Getter::Custom(Box::new(TypedGetter { read })),
            setter: Setter::Custom(Box::new(TypedSetter { write })),
        }
    }

    /// Build the implicit mapping for a destination property, if it has one
    pub(crate) fn synthesized(property: &PropertyType) -> Option<Self> {
        let path = property.mapped_path()?;
        let lenient = matches!(property.mapped, MappedPath::SameName);
        Some(Self {
            name: property.name.to_string(),
            getter: Getter::Path(CompiledPath::compile(path, lenient)),
            setter: Setter::Property(property.name.to_string()),
        })
    }

    /// Diagnostic name of this mapping
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn read<'a>(
        &self,
        source: &'a dyn AstNode,
    ) -> Result<Option<PropertyValue<'a>>, TransformError> {
        match &self.getter {
            Getter::Path(path) => path.resolve(source),
            Getter::Custom(getter) => getter.get(source),
        }
    }

    pub(crate) fn write(
        &self,
        target: &mut dyn AstNode,
        value: SetValue,
    ) -> Result<(), NodeError> {
        match &self.setter {
            Setter::Property(name) => target.set_property_value(name, value),
            Setter::Custom(setter) => setter.set(target, value),
        }
    }
}

/// Key for explicit child registrations: global or destination-type-scoped
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildKey {
    pub scope: Option<&'static str>,
    pub property: String,
}

impl ChildKey {
    pub fn global(property: impl Into<String>) -> Self {
        Self {
            scope: None,
            property: property.into(),
        }
    }

    pub fn scoped(scope: &'static str, property: impl Into<String>) -> Self {
        Self {
            scope: Some(scope),
            property: property.into(),
        }
    }
}

/// Recipe for building one destination node from one source type
pub struct NodeFactory {
    constructor: ConstructorFn,
    children: HashMap<ChildKey, Rc<ChildNodeFactory>>,
    finalizer: Option<FinalizerFn>,
    skip_children: bool,
}

impl NodeFactory {
    /// Recipe with an untyped constructor; use for factories registered
    /// under a capability tag that must accept several source types
    pub fn new(
        constructor: impl Fn(&dyn AstNode, &mut TreeTransformer) -> Result<Option<Box<dyn AstNode>>, TransformError>
            + 'static,
    ) -> Self {
        Self {
            constructor: Box::new(constructor),
            children: HashMap::new(),
            finalizer: None,
            skip_children: false,
        }
    }

    /// Recipe with a typed constructor; the source is downcast before `build`
    /// runs and a mismatch is reported as a constructor failure
    pub fn mapping<S: AstNode, T: TypedNode>(
        build: fn(&S, &mut TreeTransformer) -> Result<Option<T>, TransformError>,
    ) -> Self {
        Self::new(move |source, context| {
            let typed = source.as_any().downcast_ref::<S>().ok_or_else(|| {
                TransformError::constructor_failure(
                    source.node_kind(),
                    format!("factory expected source type {}", std::any::type_name::<S>()),
                )
            })?;
            Ok(build(typed, context)?.map(|node| Box::new(node) as Box<dyn AstNode>))
        })
    }

    /// Register a child mapping for this property name on any destination
    pub fn with_child(mut self, property: &str, child: ChildNodeFactory) -> Self {
        self.children
            .insert(ChildKey::global(property), Rc::new(child));
        self
    }

    /// Register a child mapping scoped to one destination type; it wins over
    /// a global registration with the same property name
    pub fn with_child_for<T: TypedNode>(mut self, property: &str, child: ChildNodeFactory) -> Self {
        self.children
            .insert(ChildKey::scoped(T::KIND, property), Rc::new(child));
        self
    }

    /// Run a callback on the fully populated node
    pub fn with_finalizer(mut self, finalize: impl Fn(&mut dyn AstNode) + 'static) -> Self {
        self.finalizer = Some(Box::new(finalize));
        self
    }

    /// Do not discover children for nodes built by this recipe
    pub fn skipping_children(mut self) -> Self {
        self.skip_children = true;
        self
    }

    pub(crate) fn construct(
        &self,
        source: &dyn AstNode,
        context: &mut TreeTransformer,
    ) -> Result<Option<Box<dyn AstNode>>, TransformError> {
        (self.constructor)(source, context)
    }

    pub(crate) fn child_for(
        &self,
        scope: &'static str,
        property: &str,
    ) -> Option<Rc<ChildNodeFactory>> {
        self.children
            .get(&ChildKey::scoped(scope, property))
            .or_else(|| self.children.get(&ChildKey::global(property)))
            .cloned()
    }

    pub(crate) fn skips_children(&self) -> bool {
        self.skip_children
    }

    pub(crate) fn finalize(&self, node: &mut dyn AstNode) {
        if let Some(finalize) = &self.finalizer {
            finalize(node);
        }
    }
}
