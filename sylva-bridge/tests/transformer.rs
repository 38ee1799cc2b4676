//! Transformation engine: factories, child discovery, fallback semantics

use proptest::prelude::*;

use sylva_ast::ast::{AstNode, IssueSeverity, SetValue, TypedNode};
use sylva_ast::ast_node;
use sylva_ast::testing::parse_sexp;
use sylva_bridge::transform::{ChildNodeFactory, NodeFactory, TransformError, TreeTransformer};

// --- source shapes ---------------------------------------------------------

ast_node! {
    pub struct SLeaf {
        value: attr String,
    }
}

ast_node! {
    pub struct SGroup {
        items: child[many] SLeaf,
    }
}

ast_node! {
    pub struct SIfStmt extends ["Stmt"] {
        condition: attr String,
    }
}

ast_node! {
    pub struct SReturnStmt extends ["Stmt"] {
        value: attr String,
    }
}

ast_node! {
    pub struct SPair {
        left: child[many] SLeaf,
        right: child[many] SLeaf,
        pick_alpha: attr bool,
    }
}

// --- destination shapes ----------------------------------------------------

ast_node! {
    pub struct DLeaf {
        value: attr String,
    }
}

ast_node! {
    pub struct DGroup {
        label: attr[opt] String,
        children: child[many] DLeaf = "items",
    }
}

ast_node! {
    pub struct DSingle {
        only: child[opt] DLeaf = "items",
    }
}

ast_node! {
    pub struct DBadPath {
        children: child[many] DLeaf = "itemz",
    }
}

ast_node! {
    pub struct DAtom {
        value: attr String = "text",
    }
}

ast_node! {
    pub struct DDoc {
        forms: node[many] = "children",
    }
}

ast_node! {
    pub struct DIf {}
}

ast_node! {
    pub struct DReturn {}
}

ast_node! {
    pub struct DAlpha {
        items: node[many],
    }
}

ast_node! {
    pub struct DBeta {
        items: node[many],
    }
}

ast_node! {
    #[derive(Clone)]
    pub struct Already {
        value: attr String,
        inner: child[opt] Already,
    }
}

// --- helpers ---------------------------------------------------------------

fn leaf(value: &str) -> SLeaf {
    SLeaf {
        value: value.to_string(),
        ..Default::default()
    }
}

fn group(values: &[&str]) -> SGroup {
    SGroup {
        items: values.iter().map(|value| leaf(value)).collect(),
        ..Default::default()
    }
}

fn sexp_transformer() -> TreeTransformer {
    let mut transformer = TreeTransformer::new();
    transformer.register_factory(
        "sexp.file",
        NodeFactory::new(|_, _| Ok(Some(Box::new(DDoc::default()) as Box<dyn AstNode>))),
    );
    transformer.register_factory(
        "sexp.atom",
        NodeFactory::new(|_, _| Ok(Some(Box::new(DAtom::default()) as Box<dyn AstNode>))),
    );
    transformer
}

// --- null propagation (P1) -------------------------------------------------

#[test]
fn null_source_transforms_to_null() {
    let mut transformer = TreeTransformer::new();
    let result = transformer.transform(None, None).unwrap();
    assert!(result.is_none());
    assert!(transformer.issues().is_empty());
}

// --- scenario A: trivial one-to-one ----------------------------------------

#[test]
fn default_registration_copies_mapped_data() {
    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SLeaf, DLeaf>();

    let source = leaf("x");
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DLeaf>().unwrap();
    assert_eq!(result.value, "x");
    assert!(transformer.issues().is_empty());
}

// --- scenario B: mapped collection -----------------------------------------

#[test]
fn mapped_path_transforms_each_element() {
    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SGroup, DGroup>();
    transformer.register_default::<SLeaf, DLeaf>();

    let source = group(&["a", "b"]);
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DGroup>().unwrap();
    assert_eq!(result.children.len(), 2);
    assert_eq!(result.children[0].value, "a");
    assert_eq!(result.children[1].value, "b");
    // the optional label has no source counterpart and stays empty
    assert!(result.label.is_none());
    assert!(transformer.issues().is_empty());
}

// --- multiplicity round-trip (P2) ------------------------------------------

#[test]
fn empty_source_collection_yields_empty_sequence() {
    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SGroup, DGroup>();
    transformer.register_default::<SLeaf, DLeaf>();

    let source = group(&[]);
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DGroup>().unwrap();
    assert!(result.children.is_empty());
}

#[test]
fn elements_mapping_to_nothing_are_dropped() {
    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SGroup, DGroup>();
    // every leaf maps to nothing
    transformer.register_factory(SLeaf::KIND, NodeFactory::new(|_, _| Ok(None)));

    let source = group(&["a", "b", "c"]);
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DGroup>().unwrap();
    assert!(result.children.is_empty());
    assert!(transformer.issues().is_empty());
}

proptest! {
    #[test]
    fn many_property_preserves_element_count(values in proptest::collection::vec("[a-z]{0,8}", 0..16)) {
        let mut transformer = TreeTransformer::new();
        transformer.register_default::<SGroup, DGroup>();
        transformer.register_default::<SLeaf, DLeaf>();

        let source = SGroup {
            items: values.iter().map(|value| leaf(value)).collect(),
            ..Default::default()
        };
        let node = transformer.transform(Some(&source), None).unwrap().unwrap();
        let result = node.as_any().downcast_ref::<DGroup>().unwrap();
        prop_assert_eq!(result.children.len(), values.len());
        for (child, value) in result.children.iter().zip(&values) {
            prop_assert_eq!(&child.value, value);
        }
    }
}

// --- placeholder isolation (P3) --------------------------------------------

#[test]
fn unmapped_interior_node_becomes_a_placeholder() {
    let mut transformer = TreeTransformer::new();
    transformer.register_factory(
        "sexp.file",
        NodeFactory::new(|_, _| Ok(Some(Box::new(DDoc::default()) as Box<dyn AstNode>))),
    );
    transformer.register_factory(
        "sexp.atom",
        NodeFactory::new(|_, _| Ok(Some(Box::new(DAtom::default()) as Box<dyn AstNode>))),
    );
    // no factory for sexp.list

    let first_stage = parse_sexp("alpha (nested thing) omega");
    let root = first_stage.root.unwrap();
    let node = transformer.transform(Some(&root), None).unwrap().unwrap();
    let doc = node.as_any().downcast_ref::<DDoc>().unwrap();

    assert_eq!(doc.forms.len(), 3);
    assert_eq!(doc.forms[0].node_kind(), "DAtom");
    assert_eq!(doc.forms[1].node_kind(), "GenericNode");
    assert_eq!(doc.forms[2].node_kind(), "DAtom");

    // siblings fully transformed
    let alpha = doc.forms[0].as_any().downcast_ref::<DAtom>().unwrap();
    assert_eq!(alpha.value, "alpha");
    let omega = doc.forms[2].as_any().downcast_ref::<DAtom>().unwrap();
    assert_eq!(omega.value, "omega");

    // placeholder does not descend into its subtree
    assert!(doc.forms[1].children().is_empty());

    // exactly one informational issue for the unmapped node
    assert_eq!(transformer.issues().len(), 1);
    let issue = &transformer.issues()[0];
    assert_eq!(issue.severity, IssueSeverity::Info);
    assert_eq!(issue.message, "Source node not mapped: sexp.list");
}

#[test]
fn unmapped_node_is_fatal_without_fault_tolerance() {
    let mut transformer = TreeTransformer::strict();
    let source = leaf("x");
    let error = transformer.transform(Some(&source), None).unwrap_err();
    assert_eq!(
        error,
        TransformError::UnmappedNode {
            kind: "SLeaf".to_string()
        }
    );
}

// --- scenario C: constructor failure isolation ------------------------------

#[test]
fn failing_constructor_becomes_an_error_placeholder() {
    let mut transformer = sexp_transformer();
    // lists always fail to construct
    transformer.register_factory(
        "sexp.list",
        NodeFactory::new(|source, _| {
            Err(TransformError::constructor_failure(
                source.node_kind(),
                "lists are not supported here",
            ))
        }),
    );

    let first_stage = parse_sexp("good (bad form) tail");
    let root = first_stage.root.unwrap();
    let node = transformer.transform(Some(&root), None).unwrap().unwrap();
    let doc = node.as_any().downcast_ref::<DDoc>().unwrap();

    assert_eq!(doc.forms.len(), 3);
    assert_eq!(doc.forms[1].node_kind(), "GenericErrorNode");
    let placeholder = doc.forms[1]
        .as_any()
        .downcast_ref::<sylva_ast::ast::GenericErrorNode>()
        .unwrap();
    assert!(placeholder.message.contains("lists are not supported here"));

    // siblings are unaffected and the call succeeds with one error issue
    assert_eq!(doc.forms[0].node_kind(), "DAtom");
    assert_eq!(doc.forms[2].node_kind(), "DAtom");
    let errors: Vec<_> = transformer
        .issues()
        .iter()
        .filter(|issue| issue.severity == IssueSeverity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Failed to transform sexp.list"));
}

#[test]
fn error_placeholders_keep_best_effort_provenance() {
    let mut transformer = sexp_transformer();
    transformer.register_factory(
        "sexp.list",
        NodeFactory::new(|source, _| {
            Err(TransformError::constructor_failure(
                source.node_kind(),
                "nope",
            ))
        }),
    );

    let first_stage = parse_sexp("(broken)");
    let root = first_stage.root.unwrap();
    let node = transformer.transform(Some(&root), None).unwrap().unwrap();
    let doc = node.as_any().downcast_ref::<DDoc>().unwrap();

    let origin = doc.forms[0].origin().expect("placeholder keeps provenance");
    assert_eq!(origin.source_text.as_deref(), Some("(broken)"));
    assert!(origin.span.is_some());
}

#[test]
fn failing_constructor_is_fatal_without_fault_tolerance() {
    let mut transformer = TreeTransformer::strict();
    transformer.register_factory(
        SLeaf::KIND,
        NodeFactory::new(|source, _| {
            Err(TransformError::constructor_failure(
                source.node_kind(),
                "boom",
            ))
        }),
    );
    let source = leaf("x");
    let error = transformer.transform(Some(&source), None).unwrap_err();
    assert!(matches!(error, TransformError::ConstructorFailure { .. }));
}

// --- scoped vs global child mappings (P5) -----------------------------------

#[test]
fn scoped_child_mapping_wins_over_global() {
    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SLeaf, DLeaf>();
    transformer.register_factory(
        SPair::KIND,
        NodeFactory::new(|source, _| {
            let pair = source.as_any().downcast_ref::<SPair>().ok_or_else(|| {
                TransformError::constructor_failure(source.node_kind(), "expected SPair")
            })?;
            if pair.pick_alpha {
                Ok(Some(Box::new(DAlpha::default()) as Box<dyn AstNode>))
            } else {
                Ok(Some(Box::new(DBeta::default()) as Box<dyn AstNode>))
            }
        })
        .with_child_for::<DAlpha>("items", ChildNodeFactory::mapped("items", "left"))
        .with_child("items", ChildNodeFactory::mapped("items", "right")),
    );

    let source = SPair {
        left: vec![leaf("l1"), leaf("l2")],
        right: vec![leaf("r1")],
        pick_alpha: true,
        ..Default::default()
    };
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let alpha = node.as_any().downcast_ref::<DAlpha>().unwrap();
    assert_eq!(alpha.items.len(), 2);

    let source = SPair {
        left: vec![leaf("l1"), leaf("l2")],
        right: vec![leaf("r1")],
        pick_alpha: false,
        ..Default::default()
    };
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let beta = node.as_any().downcast_ref::<DBeta>().unwrap();
    assert_eq!(beta.items.len(), 1);
}

// --- scenario D: most specific factory wins ----------------------------------

#[test]
fn subtype_factory_is_preferred_over_supertype() {
    let mut transformer = TreeTransformer::new();
    transformer.register_factory(
        "Stmt",
        NodeFactory::new(|_, _| Ok(Some(Box::new(DReturn::default()) as Box<dyn AstNode>))),
    );
    transformer.register_factory(
        SIfStmt::KIND,
        NodeFactory::new(|_, _| Ok(Some(Box::new(DIf::default()) as Box<dyn AstNode>))),
    );

    let if_stmt = SIfStmt::default();
    let node = transformer.transform(Some(&if_stmt), None).unwrap().unwrap();
    assert_eq!(node.node_kind(), "DIf");

    // a sibling subtype without its own factory falls back to the supertype tag
    let return_stmt = SReturnStmt::default();
    let node = transformer
        .transform(Some(&return_stmt), None)
        .unwrap()
        .unwrap();
    assert_eq!(node.node_kind(), "DReturn");
}

#[test]
fn later_registration_shadows_cached_resolution() {
    let mut transformer = TreeTransformer::new();
    transformer.register_factory(
        "Stmt",
        NodeFactory::new(|_, _| Ok(Some(Box::new(DReturn::default()) as Box<dyn AstNode>))),
    );

    let if_stmt = SIfStmt::default();
    let node = transformer.transform(Some(&if_stmt), None).unwrap().unwrap();
    assert_eq!(node.node_kind(), "DReturn");

    transformer.register_factory(
        SIfStmt::KIND,
        NodeFactory::new(|_, _| Ok(Some(Box::new(DIf::default()) as Box<dyn AstNode>))),
    );
    let node = transformer.transform(Some(&if_stmt), None).unwrap().unwrap();
    assert_eq!(node.node_kind(), "DIf");
}

#[test]
fn last_registration_for_a_tag_wins() {
    let mut transformer = TreeTransformer::new();
    transformer.register_factory(
        SLeaf::KIND,
        NodeFactory::new(|_, _| Ok(Some(Box::new(DIf::default()) as Box<dyn AstNode>))),
    );
    transformer.register_factory(
        SLeaf::KIND,
        NodeFactory::new(|_, _| Ok(Some(Box::new(DLeaf::default()) as Box<dyn AstNode>))),
    );
    let source = leaf("x");
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    assert_eq!(node.node_kind(), "DLeaf");
}

// --- structural errors are always fatal --------------------------------------

#[test]
fn collection_into_singular_property_is_an_error() {
    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SGroup, DSingle>();
    transformer.register_default::<SLeaf, DLeaf>();

    let source = group(&["a", "b"]);
    let error = transformer.transform(Some(&source), None).unwrap_err();
    assert!(matches!(error, TransformError::CollectionTransform { .. }));
}

#[test]
fn unresolvable_explicit_path_is_an_error() {
    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SGroup, DBadPath>();
    transformer.register_default::<SLeaf, DLeaf>();

    let source = group(&["a"]);
    let error = transformer.transform(Some(&source), None).unwrap_err();
    match error {
        TransformError::PathResolution { path, segment, .. } => {
            assert_eq!(path, "itemz");
            assert_eq!(segment, "itemz");
        }
        other => panic!("expected a path resolution error, got {:?}", other),
    }
}

// --- identity passthrough -----------------------------------------------------

#[test]
fn identity_registration_clones_and_skips_children() {
    let mut transformer = TreeTransformer::new();
    transformer.register_identity::<Already>();

    let source = Already {
        value: "outer".to_string(),
        inner: Some(Box::new(Already {
            value: "inner".to_string(),
            ..Default::default()
        })),
        ..Default::default()
    };
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<Already>().unwrap();
    assert_eq!(result.value, "outer");
    // the subtree came through untouched, without needing more factories
    assert_eq!(result.inner.as_ref().unwrap().value, "inner");
    assert!(transformer.issues().is_empty());
}

// --- finalizer and skip-children ----------------------------------------------

#[test]
fn finalizer_sees_the_fully_populated_node() {
    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SLeaf, DLeaf>();
    transformer.register_factory(
        SGroup::KIND,
        NodeFactory::new(|_, _| Ok(Some(Box::new(DGroup::default()) as Box<dyn AstNode>)))
            .with_finalizer(|node| {
                if let Some(group) = node.as_any_mut().downcast_mut::<DGroup>() {
                    group.label = Some(format!("{} children", group.children.len()));
                }
            }),
    );

    let source = group(&["a", "b", "c"]);
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DGroup>().unwrap();
    assert_eq!(result.label.as_deref(), Some("3 children"));
}

#[test]
fn skip_children_leaves_properties_untouched() {
    let mut transformer = TreeTransformer::new();
    transformer.register_factory(
        SGroup::KIND,
        NodeFactory::new(|_, _| Ok(Some(Box::new(DGroup::default()) as Box<dyn AstNode>)))
            .skipping_children(),
    );

    let source = group(&["a", "b"]);
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DGroup>().unwrap();
    assert!(result.children.is_empty());
}

// --- origins and parent links ---------------------------------------------------

#[test]
fn origins_propagate_from_the_source() {
    let mut transformer = sexp_transformer();
    let first_stage = parse_sexp("hello");
    let root = first_stage.root.unwrap();
    let node = transformer.transform(Some(&root), None).unwrap().unwrap();

    let doc = node.as_any().downcast_ref::<DDoc>().unwrap();
    let atom_origin = doc.forms[0].origin().expect("atom keeps its origin");
    assert_eq!(atom_origin.source_text.as_deref(), Some("hello"));
    assert!(atom_origin
        .artifact
        .as_deref()
        .unwrap()
        .starts_with("sexp.atom@"));
}

#[test]
fn parents_are_assigned_eagerly_during_construction() {
    let mut transformer = sexp_transformer();
    let first_stage = parse_sexp("one two");
    let root = first_stage.root.unwrap();
    let node = transformer.transform(Some(&root), None).unwrap().unwrap();

    let doc_id = node.base().id();
    assert!(doc_id.is_some());
    assert!(node.base().parent().is_none());
    let doc = node.as_any().downcast_ref::<DDoc>().unwrap();
    for form in &doc.forms {
        assert_eq!(form.base().parent(), doc_id);
    }
}

// --- explicit child factories with custom accessors ------------------------------

#[test]
fn computed_child_factory_feeds_the_property_setter() {
    fn first_item_only(source: &SGroup) -> Option<sylva_ast::ast::PropertyValue<'_>> {
        Some(sylva_ast::ast::PropertyValue::Node(
            source.items.first().map(|item| item as &dyn AstNode),
        ))
    }

    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SLeaf, DLeaf>();
    transformer.register_factory(
        SGroup::KIND,
        NodeFactory::new(|_, _| Ok(Some(Box::new(DSingle::default()) as Box<dyn AstNode>)))
            .with_child("only", ChildNodeFactory::computed::<SGroup>("only", first_item_only)),
    );

    let source = group(&["first", "second"]);
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DSingle>().unwrap();
    assert_eq!(result.only.as_ref().unwrap().value, "first");
}

#[test]
fn accessor_pair_bypasses_the_property_system() {
    fn read_items(source: &SGroup) -> Option<sylva_ast::ast::PropertyValue<'_>> {
        Some(sylva_ast::ast::PropertyValue::Nodes(
            source.items.iter().map(|item| item as &dyn AstNode).collect(),
        ))
    }
    fn write_reversed(target: &mut DGroup, value: SetValue) -> Result<(), sylva_ast::ast::NodeError> {
        target.set_property_value("children", value)?;
        target.children.reverse();
        Ok(())
    }

    let mut transformer = TreeTransformer::new();
    transformer.register_default::<SLeaf, DLeaf>();
    transformer.register_factory(
        SGroup::KIND,
        NodeFactory::new(|_, _| Ok(Some(Box::new(DGroup::default()) as Box<dyn AstNode>)))
            .with_child(
                "children",
                ChildNodeFactory::accessors::<SGroup, DGroup>("children", read_items, write_reversed),
            ),
    );

    let source = group(&["a", "b"]);
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DGroup>().unwrap();
    assert_eq!(result.children[0].value, "b");
    assert_eq!(result.children[1].value, "a");
}

// --- typed constructor sugar -------------------------------------------------------

#[test]
fn typed_mapping_receives_the_downcast_source() {
    fn build(source: &SLeaf, _: &mut TreeTransformer) -> Result<Option<DLeaf>, TransformError> {
        Ok(Some(DLeaf {
            value: source.value.to_uppercase(),
            ..Default::default()
        }))
    }

    let mut transformer = TreeTransformer::new();
    transformer.register_factory(SLeaf::KIND, NodeFactory::mapping::<SLeaf, DLeaf>(build));

    let source = leaf("quiet");
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    let result = node.as_any().downcast_ref::<DLeaf>().unwrap();
    assert_eq!(result.value, "QUIET");
}

#[test]
fn typed_mapping_against_wrong_source_is_a_constructor_failure() {
    fn build(_: &SLeaf, _: &mut TreeTransformer) -> Result<Option<DLeaf>, TransformError> {
        Ok(Some(DLeaf::default()))
    }

    let mut transformer = TreeTransformer::new();
    // registered under the wrong tag on purpose
    transformer.register_factory(SGroup::KIND, NodeFactory::mapping::<SLeaf, DLeaf>(build));

    let source = group(&["x"]);
    let node = transformer.transform(Some(&source), None).unwrap().unwrap();
    assert_eq!(node.node_kind(), "GenericErrorNode");
    assert_eq!(transformer.issues().len(), 1);
}
