//! Two-stage parse driver over the s-expression test language
//!
//! The first stage is the logos-based s-expression parser from
//! `sylva_ast::testing`; the second stage maps `(key value)` pairs onto a
//! typed configuration AST by hand.

use sylva_ast::ast::{AstNode, Issue, Origin};
use sylva_ast::ast_node;
use sylva_ast::parsing::{FirstStageResult, TwoStageParser};
use sylva_ast::testing::{parse_sexp, CstNode, ATOM_RULE, LIST_RULE};

ast_node! {
    /// One `(key value)` pair.
    pub struct ConfigEntry {
        key: attr String,
        value: attr String,
    }
}

ast_node! {
    /// A whole configuration file.
    pub struct ConfigDoc {
        entries: child[many] ConfigEntry,
    }
}

struct ConfigParser;

impl TwoStageParser for ConfigParser {
    type FirstStage = CstNode;

    fn parse_first_stage(&self, code: &str) -> FirstStageResult<CstNode> {
        parse_sexp(code)
    }

    fn build_ast(
        &mut self,
        first_stage: &CstNode,
        issues: &mut Vec<Issue>,
    ) -> Option<Box<dyn AstNode>> {
        let mut doc = ConfigDoc::default();
        for form in &first_stage.children {
            match entry_from(form) {
                Some(entry) => doc.entries.push(entry),
                None => {
                    let mut issue =
                        Issue::semantic(format!("expected a (key value) pair, found {}", form.rule));
                    if let Some(span) = form.base.origin().and_then(|origin| origin.span.clone()) {
                        issue = issue.with_span(span);
                    }
                    issues.push(issue);
                }
            }
        }
        if let Some(origin) = first_stage.base.origin() {
            doc.base.set_origin(origin.clone());
        }
        Some(Box::new(doc))
    }
}

fn entry_from(form: &CstNode) -> Option<ConfigEntry> {
    if form.rule != LIST_RULE || form.children.len() != 2 {
        return None;
    }
    let key = &form.children[0];
    let value = &form.children[1];
    if key.rule != ATOM_RULE || value.rule != ATOM_RULE {
        return None;
    }
    let mut entry = ConfigEntry {
        key: key.text.clone(),
        value: value.text.clone(),
        ..Default::default()
    };
    if let Some(origin) = form.base.origin() {
        entry.base.set_origin(origin.clone());
    }
    Some(entry)
}

fn doc_of(result: &sylva_ast::parsing::ParsingResult) -> &ConfigDoc {
    result
        .root
        .as_deref()
        .and_then(|root| root.as_any().downcast_ref::<ConfigDoc>())
        .expect("expected a ConfigDoc root")
}

#[test]
fn parses_entries_with_values() {
    let mut parser = ConfigParser;
    let result = parser.parse("(host localhost) (port 8080)");
    assert!(result.correct());

    let doc = doc_of(&result);
    assert_eq!(doc.entries.len(), 2);
    assert_eq!(doc.entries[0].key, "host");
    assert_eq!(doc.entries[0].value, "localhost");
    assert_eq!(doc.entries[1].key, "port");
    assert_eq!(doc.entries[1].value, "8080");
}

#[test]
fn parents_are_assigned_after_the_second_stage() {
    let mut parser = ConfigParser;
    let result = parser.parse("(a 1) (b 2)");

    let doc = doc_of(&result);
    let root_id = doc.base.id();
    assert!(root_id.is_some());
    assert!(doc.base.parent().is_none());
    for entry in &doc.entries {
        assert_eq!(entry.base.parent(), root_id);
    }
}

#[test]
fn origins_survive_into_the_ast() {
    let mut parser = ConfigParser;
    let result = parser.parse("(name sylva)");

    let doc = doc_of(&result);
    let origin: &Origin = doc.entries[0].base.origin().expect("entry needs an origin");
    assert_eq!(origin.source_text.as_deref(), Some("(name sylva)"));
    assert!(origin.span.is_some());
}

#[test]
fn null_first_stage_root_is_tolerated() {
    let mut parser = ConfigParser;
    let result = parser.parse("   ");
    assert!(result.root.is_none());
    assert!(result.correct());
    assert!(result.time.is_some());
}

#[test]
fn malformed_forms_become_issues_not_failures() {
    let mut parser = ConfigParser;
    let result = parser.parse("(a 1) loose (b 2 3)");
    assert!(!result.correct());

    let doc = doc_of(&result);
    assert_eq!(doc.entries.len(), 1);
    assert_eq!(doc.entries[0].key, "a");
    assert_eq!(result.issues.len(), 2);
}

#[test]
fn first_stage_issues_propagate() {
    let mut parser = ConfigParser;
    let result = parser.parse("(a 1");
    assert!(result
        .issues
        .iter()
        .any(|issue| issue.message.contains("unclosed parenthesis")));
    // the recovered pair still makes it through
    let doc = doc_of(&result);
    assert_eq!(doc.entries.len(), 1);
}

#[test]
fn timing_metadata_is_recorded() {
    let mut parser = ConfigParser;
    let result = parser.parse("(a 1)");
    assert!(result.time.is_some());
}
