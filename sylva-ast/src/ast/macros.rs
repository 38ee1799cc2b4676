//! Node declaration macros
//!
//! `ast_node!` declares a node type and records its structural properties in
//! declaration order, so the introspection layer and the transformer can walk
//! instances without per-type code. Field markers classify each property:
//!
//! ```ignore
//! ast_node! {
//!     /// A group of leaves.
//!     pub struct Group extends ["Container"] {
//!         label: attr String,
//!         children: child[many] Leaf = "items",
//!         fallback: child[opt] Leaf,
//!         extras: node[many],
//!     }
//! }
//! ```
//!
//! - `attr T` / `attr[opt] T` — plain data, `T: AttributeValue`
//! - `child T` / `child[opt] T` / `child[many] T` — owned sub-nodes of one
//!   concrete type
//! - `node` / `node[opt]` / `node[many]` — owned sub-nodes of any type
//!   (`Box<dyn AstNode>` storage); their element type is the base node
//!   capability, which placeholder nodes also satisfy
//! - `reference T` — a non-owning [`ReferenceByName`](crate::ast::ReferenceByName)
//!
//! Every property maps from the same-named source property during child
//! discovery unless an explicit `= "dotted.path"` override is given.
//! `extends [..]` appends capability tags after the own kind, most specific
//! first; the transformer's factory lookup walks them in order.
//!
//! `ast_enum!` declares an enumeration usable as an attribute type; the first
//! variant is the `Default`.

/// Declare an introspectable node type
#[macro_export]
macro_rules! ast_node {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(extends [$($tag:literal),+ $(,)?])? {
            $($body:tt)*
        }
    ) => {
        // The field grammar `marker [mode]? Type?` has two adjacent optionals
        // whose first sets overlap on `[` (a mode bracket vs. a slice/array
        // `ty`), which `macro_rules!` rejects as a local ambiguity. Normalize
        // each field through a token muncher that uses explicit, unambiguous
        // arms, then emit from the normalized field list.
        $crate::__sylva_ast_node_munch! {
            @emit { $(#[$meta])* } { $vis } { $name } { $($($tag,)+)? }
            @fields { }
            @input { $($body)* }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sylva_ast_node_munch {
    // marker [mode] Type = "path"
    (
        @emit $meta:tt $vis:tt $name:tt $tags:tt
        @fields { $($done:tt)* }
        @input {
            $f:ident : $marker:ident [ $mode:ident ] $t:ty = $path:literal
            $(, $($rest:tt)*)?
        }
    ) => {
        $crate::__sylva_ast_node_munch! {
            @emit $meta $vis $name $tags
            @fields { $($done)* { $f $marker ( $mode ) ( $t ) ( $path ) } }
            @input { $($($rest)*)? }
        }
    };
    // marker [mode] Type
    (
        @emit $meta:tt $vis:tt $name:tt $tags:tt
        @fields { $($done:tt)* }
        @input {
            $f:ident : $marker:ident [ $mode:ident ] $t:ty
            $(, $($rest:tt)*)?
        }
    ) => {
        $crate::__sylva_ast_node_munch! {
            @emit $meta $vis $name $tags
            @fields { $($done)* { $f $marker ( $mode ) ( $t ) ( ) } }
            @input { $($($rest)*)? }
        }
    };
    // marker [mode] = "path"   (no type, e.g. node[many] = "children")
    (
        @emit $meta:tt $vis:tt $name:tt $tags:tt
        @fields { $($done:tt)* }
        @input {
            $f:ident : $marker:ident [ $mode:ident ] = $path:literal
            $(, $($rest:tt)*)?
        }
    ) => {
        $crate::__sylva_ast_node_munch! {
            @emit $meta $vis $name $tags
            @fields { $($done)* { $f $marker ( $mode ) ( ) ( $path ) } }
            @input { $($($rest)*)? }
        }
    };
    // marker [mode]   (no type, e.g. node[opt]/node[many])
    (
        @emit $meta:tt $vis:tt $name:tt $tags:tt
        @fields { $($done:tt)* }
        @input {
            $f:ident : $marker:ident [ $mode:ident ]
            $(, $($rest:tt)*)?
        }
    ) => {
        $crate::__sylva_ast_node_munch! {
            @emit $meta $vis $name $tags
            @fields { $($done)* { $f $marker ( $mode ) ( ) ( ) } }
            @input { $($($rest)*)? }
        }
    };
    // marker Type = "path"
    (
        @emit $meta:tt $vis:tt $name:tt $tags:tt
        @fields { $($done:tt)* }
        @input {
            $f:ident : $marker:ident $t:ty = $path:literal
            $(, $($rest:tt)*)?
        }
    ) => {
        $crate::__sylva_ast_node_munch! {
            @emit $meta $vis $name $tags
            @fields { $($done)* { $f $marker ( ) ( $t ) ( $path ) } }
            @input { $($($rest)*)? }
        }
    };
    // marker Type
    (
        @emit $meta:tt $vis:tt $name:tt $tags:tt
        @fields { $($done:tt)* }
        @input {
            $f:ident : $marker:ident $t:ty
            $(, $($rest:tt)*)?
        }
    ) => {
        $crate::__sylva_ast_node_munch! {
            @emit $meta $vis $name $tags
            @fields { $($done)* { $f $marker ( ) ( $t ) ( ) } }
            @input { $($($rest)*)? }
        }
    };
    // marker = "path"   (no mode, no type)
    (
        @emit $meta:tt $vis:tt $name:tt $tags:tt
        @fields { $($done:tt)* }
        @input {
            $f:ident : $marker:ident = $path:literal
            $(, $($rest:tt)*)?
        }
    ) => {
        $crate::__sylva_ast_node_munch! {
            @emit $meta $vis $name $tags
            @fields { $($done)* { $f $marker ( ) ( ) ( $path ) } }
            @input { $($($rest)*)? }
        }
    };
    // marker   (no mode, no type, e.g. bare `node`)
    (
        @emit $meta:tt $vis:tt $name:tt $tags:tt
        @fields { $($done:tt)* }
        @input {
            $f:ident : $marker:ident
            $(, $($rest:tt)*)?
        }
    ) => {
        $crate::__sylva_ast_node_munch! {
            @emit $meta $vis $name $tags
            @fields { $($done)* { $f $marker ( ) ( ) ( ) } }
            @input { $($($rest)*)? }
        }
    };
    // Base case: all fields normalized, emit the node definition.
    (
        @emit { $(#[$meta:meta])* } { $vis:vis } { $name:ident } { $($tag:literal),* $(,)? }
        @fields {
            $( { $f:ident $marker:ident ( $($mode:ident)? ) ( $($t:ty)? ) ( $($path:literal)? ) } )*
        }
        @input { }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        $vis struct $name {
            /// Shared node state: origin, id, parent link
            pub base: $crate::ast::NodeBase,
            $( pub $f: $crate::__sylva_field_storage!($marker $([$mode])?, { $($t)? }), )*
        }

        impl $crate::ast::TypedNode for $name {
            const KIND: &'static str = stringify!($name);
            const TYPE_TAGS: &'static [&'static str] = &[stringify!($name) $(, $tag)*];
            const PROPERTIES: &'static [$crate::ast::PropertyType] = &[
                $( $crate::__sylva_property_type!($marker $([$mode])?, $f, { $($t)? }, ($($path)?)) ),*
            ];

            fn descriptor() -> &'static $crate::ast::NodeDescriptor {
                static DESCRIPTOR: $crate::ast::NodeDescriptor = $crate::ast::NodeDescriptor {
                    kind: stringify!($name),
                    tags: &[stringify!($name) $(, $tag)*],
                    properties: &[
                        $( $crate::__sylva_property_type!($marker $([$mode])?, $f, { $($t)? }, ($($path)?)) ),*
                    ],
                };
                &DESCRIPTOR
            }
        }

        impl $crate::ast::AstNode for $name {
            fn node_kind(&self) -> &'static str {
                <$name as $crate::ast::TypedNode>::KIND
            }

            fn type_tags(&self) -> &'static [&'static str] {
                <$name as $crate::ast::TypedNode>::TYPE_TAGS
            }

            fn property_types(&self) -> &'static [$crate::ast::PropertyType] {
                <$name as $crate::ast::TypedNode>::PROPERTIES
            }

            fn property(&self, name: &str) -> ::std::option::Option<$crate::ast::Property<'_>> {
                $(
                    if name == stringify!($f) {
                        return ::std::option::Option::Some($crate::__sylva_property!(
                            $marker $([$mode])?, $f, (&self.$f)
                        ));
                    }
                )*
                ::std::option::Option::None
            }

            fn base(&self) -> &$crate::ast::NodeBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::ast::NodeBase {
                &mut self.base
            }

            fn children(&self) -> ::std::vec::Vec<&dyn $crate::ast::AstNode> {
                #[allow(unused_mut)]
                let mut nodes: ::std::vec::Vec<&dyn $crate::ast::AstNode> =
                    ::std::vec::Vec::new();
                $( $crate::__sylva_collect_children!($marker $([$mode])?, (&self.$f), nodes); )*
                nodes
            }

            fn children_mut(&mut self) -> ::std::vec::Vec<&mut dyn $crate::ast::AstNode> {
                #[allow(unused_mut)]
                let mut nodes: ::std::vec::Vec<&mut dyn $crate::ast::AstNode> =
                    ::std::vec::Vec::new();
                $( $crate::__sylva_collect_children_mut!($marker $([$mode])?, (&mut self.$f), nodes); )*
                nodes
            }

            fn set_property_value(
                &mut self,
                name: &str,
                value: $crate::ast::SetValue,
            ) -> ::std::result::Result<(), $crate::ast::NodeError> {
                $(
                    if name == stringify!($f) {
                        return $crate::__sylva_set_property!(
                            $marker $([$mode])?, $f, { $($t)? }, (&mut self.$f), value
                        );
                    }
                )*
                ::std::result::Result::Err($crate::ast::NodeError::UnknownProperty {
                    kind: <$name as $crate::ast::TypedNode>::KIND,
                    property: name.to_string(),
                })
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }
    };
}

/// Declare an enumeration usable as an attribute type
#[macro_export]
macro_rules! ast_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $first:ident $(, $rest:ident)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $first,
            $($rest,)*
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                $name::$first
            }
        }

        impl $crate::ast::AttributeValue for $name {
            const KIND: $crate::ast::DataKind =
                $crate::ast::DataKind::Enum(&$crate::ast::EnumDescriptor {
                    name: stringify!($name),
                    literals: &[stringify!($first) $(, stringify!($rest))*],
                });

            fn to_data(&self) -> $crate::ast::DataValue {
                $crate::ast::DataValue::String(
                    match self {
                        $name::$first => stringify!($first),
                        $($name::$rest => stringify!($rest),)*
                    }
                    .to_string(),
                )
            }

            fn from_data(value: $crate::ast::DataValue) -> ::std::option::Option<Self> {
                match value {
                    $crate::ast::DataValue::String(value) => {
                        if value == stringify!($first) {
                            return ::std::option::Option::Some($name::$first);
                        }
                        $(
                            if value == stringify!($rest) {
                                return ::std::option::Option::Some($name::$rest);
                            }
                        )*
                        ::std::option::Option::None
                    }
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(match self {
                    $name::$first => stringify!($first),
                    $($name::$rest => stringify!($rest),)*
                })
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sylva_field_storage {
    (attr, { $t:ty }) => { $t };
    (attr [opt], { $t:ty }) => { ::std::option::Option<$t> };
    (child, { $t:ty }) => { ::std::option::Option<::std::boxed::Box<$t>> };
    (child [opt], { $t:ty }) => { ::std::option::Option<::std::boxed::Box<$t>> };
    (child [many], { $t:ty }) => { ::std::vec::Vec<$t> };
    (node, { }) => { ::std::option::Option<::std::boxed::Box<dyn $crate::ast::AstNode>> };
    (node [opt], { }) => { ::std::option::Option<::std::boxed::Box<dyn $crate::ast::AstNode>> };
    (node [many], { }) => { ::std::vec::Vec<::std::boxed::Box<dyn $crate::ast::AstNode>> };
    (reference, { $t:ty }) => { $crate::ast::ReferenceByName<$t> };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sylva_mapped {
    () => {
        $crate::ast::MappedPath::SameName
    };
    ($path:literal) => {
        $crate::ast::MappedPath::Path($path)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sylva_property_type {
    (attr, $f:ident, { $t:ty }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Singular,
            value: $crate::ast::ValueKind::Data(<$t as $crate::ast::AttributeValue>::KIND),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
    (attr [opt], $f:ident, { $t:ty }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Optional,
            value: $crate::ast::ValueKind::Data(<$t as $crate::ast::AttributeValue>::KIND),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
    (child, $f:ident, { $t:ty }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Singular,
            value: $crate::ast::ValueKind::Node($crate::ast::NodeRef::of::<$t>()),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
    (child [opt], $f:ident, { $t:ty }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Optional,
            value: $crate::ast::ValueKind::Node($crate::ast::NodeRef::of::<$t>()),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
    (child [many], $f:ident, { $t:ty }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Many,
            value: $crate::ast::ValueKind::Node($crate::ast::NodeRef::of::<$t>()),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
    (node, $f:ident, { }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Singular,
            value: $crate::ast::ValueKind::Node($crate::ast::NodeRef::base()),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
    (node [opt], $f:ident, { }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Optional,
            value: $crate::ast::ValueKind::Node($crate::ast::NodeRef::base()),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
    (node [many], $f:ident, { }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Many,
            value: $crate::ast::ValueKind::Node($crate::ast::NodeRef::base()),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
    (reference, $f:ident, { $t:ty }, ($($path:literal)?)) => {
        $crate::ast::PropertyType {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Singular,
            value: $crate::ast::ValueKind::Reference($crate::ast::NodeRef::of::<$t>()),
            mapped: $crate::__sylva_mapped!($($path)?),
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sylva_property {
    (attr, $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Singular,
            value: $crate::ast::PropertyValue::Data($crate::ast::AttributeValue::to_data($e)),
        }
    };
    (attr [opt], $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Optional,
            value: match $e {
                ::std::option::Option::Some(value) => $crate::ast::PropertyValue::Data(
                    $crate::ast::AttributeValue::to_data(value),
                ),
                ::std::option::Option::None => {
                    $crate::ast::PropertyValue::Data($crate::ast::DataValue::Null)
                }
            },
        }
    };
    (child, $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Singular,
            value: $crate::ast::PropertyValue::Node(
                $e.as_deref().map(|child| child as &dyn $crate::ast::AstNode),
            ),
        }
    };
    (child [opt], $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Optional,
            value: $crate::ast::PropertyValue::Node(
                $e.as_deref().map(|child| child as &dyn $crate::ast::AstNode),
            ),
        }
    };
    (child [many], $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Many,
            value: $crate::ast::PropertyValue::Nodes(
                $e.iter()
                    .map(|child| child as &dyn $crate::ast::AstNode)
                    .collect(),
            ),
        }
    };
    (node, $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Singular,
            value: $crate::ast::PropertyValue::Node($e.as_deref()),
        }
    };
    (node [opt], $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Optional,
            value: $crate::ast::PropertyValue::Node($e.as_deref()),
        }
    };
    (node [many], $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Many,
            value: $crate::ast::PropertyValue::Nodes(
                $e.iter().map(|child| child.as_ref()).collect(),
            ),
        }
    };
    (reference, $f:ident, ($e:expr)) => {
        $crate::ast::Property {
            name: stringify!($f),
            multiplicity: $crate::ast::Multiplicity::Singular,
            value: $crate::ast::PropertyValue::Reference {
                name: $e.name.clone(),
                resolved: $e.resolved(),
            },
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sylva_collect_children {
    (attr, ($e:expr), $out:ident) => {};
    (attr [opt], ($e:expr), $out:ident) => {};
    (reference, ($e:expr), $out:ident) => {};
    (child, ($e:expr), $out:ident) => {
        if let ::std::option::Option::Some(child) = $e.as_deref() {
            $out.push(child as &dyn $crate::ast::AstNode);
        }
    };
    (child [opt], ($e:expr), $out:ident) => {
        if let ::std::option::Option::Some(child) = $e.as_deref() {
            $out.push(child as &dyn $crate::ast::AstNode);
        }
    };
    (child [many], ($e:expr), $out:ident) => {
        for child in $e.iter() {
            $out.push(child as &dyn $crate::ast::AstNode);
        }
    };
    (node, ($e:expr), $out:ident) => {
        if let ::std::option::Option::Some(child) = $e.as_deref() {
            $out.push(child);
        }
    };
    (node [opt], ($e:expr), $out:ident) => {
        if let ::std::option::Option::Some(child) = $e.as_deref() {
            $out.push(child);
        }
    };
    (node [many], ($e:expr), $out:ident) => {
        for child in $e.iter() {
            $out.push(child.as_ref());
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sylva_collect_children_mut {
    (attr, ($e:expr), $out:ident) => {};
    (attr [opt], ($e:expr), $out:ident) => {};
    (reference, ($e:expr), $out:ident) => {};
    (child, ($e:expr), $out:ident) => {
        if let ::std::option::Option::Some(child) = $e.as_deref_mut() {
            $out.push(child as &mut dyn $crate::ast::AstNode);
        }
    };
    (child [opt], ($e:expr), $out:ident) => {
        if let ::std::option::Option::Some(child) = $e.as_deref_mut() {
            $out.push(child as &mut dyn $crate::ast::AstNode);
        }
    };
    (child [many], ($e:expr), $out:ident) => {
        for child in $e.iter_mut() {
            $out.push(child as &mut dyn $crate::ast::AstNode);
        }
    };
    (node, ($e:expr), $out:ident) => {
        if let ::std::option::Option::Some(child) = $e.as_deref_mut() {
            $out.push(child);
        }
    };
    (node [opt], ($e:expr), $out:ident) => {
        if let ::std::option::Option::Some(child) = $e.as_deref_mut() {
            $out.push(child);
        }
    };
    (node [many], ($e:expr), $out:ident) => {
        for child in $e.iter_mut() {
            $out.push(child.as_mut());
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sylva_set_property {
    (attr, $f:ident, { $t:ty }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Data(data) => {
                match <$t as $crate::ast::AttributeValue>::from_data(data.clone()) {
                    ::std::option::Option::Some(parsed) => {
                        *$e = parsed;
                        ::std::result::Result::Ok(())
                    }
                    ::std::option::Option::None => {
                        ::std::result::Result::Err($crate::ast::NodeError::DataTypeMismatch {
                            property: stringify!($f).to_string(),
                            value: data,
                        })
                    }
                }
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Singular,
            }),
        }
    };
    (attr [opt], $f:ident, { $t:ty }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Data($crate::ast::DataValue::Null) => {
                *$e = ::std::option::Option::None;
                ::std::result::Result::Ok(())
            }
            $crate::ast::SetValue::Data(data) => {
                match <$t as $crate::ast::AttributeValue>::from_data(data.clone()) {
                    ::std::option::Option::Some(parsed) => {
                        *$e = ::std::option::Option::Some(parsed);
                        ::std::result::Result::Ok(())
                    }
                    ::std::option::Option::None => {
                        ::std::result::Result::Err($crate::ast::NodeError::DataTypeMismatch {
                            property: stringify!($f).to_string(),
                            value: data,
                        })
                    }
                }
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Optional,
            }),
        }
    };
    (child, $f:ident, { $t:ty }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Node(child) => {
                *$e = match child {
                    ::std::option::Option::Some(node) => ::std::option::Option::Some(
                        $crate::ast::downcast_node::<$t>(node, stringify!($f))?,
                    ),
                    ::std::option::Option::None => ::std::option::Option::None,
                };
                ::std::result::Result::Ok(())
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Singular,
            }),
        }
    };
    (child [opt], $f:ident, { $t:ty }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Node(child) => {
                *$e = match child {
                    ::std::option::Option::Some(node) => ::std::option::Option::Some(
                        $crate::ast::downcast_node::<$t>(node, stringify!($f))?,
                    ),
                    ::std::option::Option::None => ::std::option::Option::None,
                };
                ::std::result::Result::Ok(())
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Optional,
            }),
        }
    };
    (child [many], $f:ident, { $t:ty }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Nodes(children) => {
                let mut collected = ::std::vec::Vec::with_capacity(children.len());
                for child in children {
                    collected.push(*$crate::ast::downcast_node::<$t>(child, stringify!($f))?);
                }
                *$e = collected;
                ::std::result::Result::Ok(())
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Many,
            }),
        }
    };
    (node, $f:ident, { }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Node(child) => {
                *$e = child;
                ::std::result::Result::Ok(())
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Singular,
            }),
        }
    };
    (node [opt], $f:ident, { }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Node(child) => {
                *$e = child;
                ::std::result::Result::Ok(())
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Optional,
            }),
        }
    };
    (node [many], $f:ident, { }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Nodes(children) => {
                *$e = children;
                ::std::result::Result::Ok(())
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Many,
            }),
        }
    };
    (reference, $f:ident, { $t:ty }, ($e:expr), $value:ident) => {
        match $value {
            $crate::ast::SetValue::Data($crate::ast::DataValue::String(name)) => {
                *$e = $crate::ast::ReferenceByName::new(name);
                ::std::result::Result::Ok(())
            }
            $crate::ast::SetValue::Data(data) => {
                ::std::result::Result::Err($crate::ast::NodeError::DataTypeMismatch {
                    property: stringify!($f).to_string(),
                    value: data,
                })
            }
            _ => ::std::result::Result::Err($crate::ast::NodeError::MultiplicityMismatch {
                property: stringify!($f).to_string(),
                expected: $crate::ast::Multiplicity::Singular,
            }),
        }
    };
}
