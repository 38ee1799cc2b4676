//! Test support: a miniature s-expression language
//!
//! A deliberately tiny grammar used by this crate's tests and by downstream
//! crates exercising the transformation engine against a real first-stage
//! tree. The lexer is logos-based; the first stage is a recursive-descent
//! parser producing [`CstNode`]s.
//!
//! [`CstNode`] implements [`AstNode`] by hand and rejects writes, which makes
//! it the in-tree example of a foreign, read-only node type: its `node_kind`
//! reports the grammar rule (`sexp.file`, `sexp.list`, `sexp.atom`) while
//! every rule shares one capability tag (`sexp.node`) for factory fallback.

use logos::Logos;
use std::any::Any;
use std::ops::Range as ByteRange;
use std::time::Instant;

use crate::ast::{
    AstNode, DataKind, DataValue, Issue, LineIndex, MappedPath, Multiplicity, NodeBase,
    NodeDescriptor, NodeRef, Origin, Property, PropertyType, PropertyValue, Span, TypedNode,
    ValueKind,
};
use crate::parsing::FirstStageResult;

/// Rule name for the whole-file node
pub const FILE_RULE: &str = "sexp.file";
/// Rule name for parenthesized lists
pub const LIST_RULE: &str = "sexp.list";
/// Rule name for bare atoms
pub const ATOM_RULE: &str = "sexp.atom";
/// Capability tag shared by every first-stage rule
pub const NODE_TAG: &str = "sexp.node";

/// Tokens of the s-expression test language
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum SexpToken {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex(r"[^()\s]+")]
    Atom,
}

/// A first-stage tree node: rule name, matched text, children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CstNode {
    pub base: NodeBase,
    pub rule: &'static str,
    pub text: String,
    pub children: Vec<CstNode>,
}

impl CstNode {
    pub fn atom(text: impl Into<String>) -> Self {
        Self {
            base: NodeBase::new(),
            rule: ATOM_RULE,
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn list(children: Vec<CstNode>) -> Self {
        Self {
            base: NodeBase::new(),
            rule: LIST_RULE,
            text: String::new(),
            children,
        }
    }

    pub fn file(children: Vec<CstNode>) -> Self {
        Self {
            base: NodeBase::new(),
            rule: FILE_RULE,
            text: String::new(),
            children,
        }
    }

    fn with_span(mut self, span: Span, source: &str) -> Self {
        let excerpt = source.get(span.bytes.clone()).unwrap_or("").to_string();
        let artifact = format!("{}@{}", self.rule, span.start);
        self.base.set_origin(
            Origin::from_span(span)
                .with_source_text(excerpt)
                .with_artifact(artifact),
        );
        self
    }
}

impl TypedNode for CstNode {
    const KIND: &'static str = "CstNode";
    const TYPE_TAGS: &'static [&'static str] = &["CstNode", NODE_TAG];
    const PROPERTIES: &'static [PropertyType] = &[
        PropertyType {
            name: "children",
            multiplicity: Multiplicity::Many,
            value: ValueKind::Node(NodeRef::of::<CstNode>()),
            mapped: MappedPath::None,
        },
        PropertyType {
            name: "text",
            multiplicity: Multiplicity::Singular,
            value: ValueKind::Data(DataKind::String),
            mapped: MappedPath::None,
        },
    ];

    fn descriptor() -> &'static NodeDescriptor {
        static DESCRIPTOR: NodeDescriptor = NodeDescriptor {
            kind: "CstNode",
            tags: &["CstNode", NODE_TAG],
            properties: CstNode::PROPERTIES,
        };
        &DESCRIPTOR
    }
}

impl AstNode for CstNode {
    fn node_kind(&self) -> &'static str {
        self.rule
    }

    fn type_tags(&self) -> &'static [&'static str] {
        match self.rule {
            FILE_RULE => &[FILE_RULE, NODE_TAG],
            LIST_RULE => &[LIST_RULE, NODE_TAG],
            ATOM_RULE => &[ATOM_RULE, NODE_TAG],
            _ => &[NODE_TAG],
        }
    }

    fn property_types(&self) -> &'static [PropertyType] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<Property<'_>> {
        match name {
            "children" => Some(Property {
                name: "children",
                multiplicity: Multiplicity::Many,
                value: PropertyValue::Nodes(
                    self.children
                        .iter()
                        .map(|child| child as &dyn AstNode)
                        .collect(),
                ),
            }),
            "text" => Some(Property {
                name: "text",
                multiplicity: Multiplicity::Singular,
                value: PropertyValue::Data(DataValue::String(self.text.clone())),
            }),
            _ => None,
        }
    }

    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn children_mut(&mut self) -> Vec<&mut dyn AstNode> {
        self.children
            .iter_mut()
            .map(|child| child as &mut dyn AstNode)
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Lex and parse source text into a first-stage tree
///
/// Unbalanced parentheses are reported as syntactic issues and recovered
/// from; an input with no forms at all yields a null root.
pub fn parse_sexp(code: &str) -> FirstStageResult<CstNode> {
    let started = Instant::now();
    let index = LineIndex::new(code);
    let mut issues = Vec::new();

    let mut lexer = SexpToken::lexer(code);
    let mut tokens: Vec<(SexpToken, ByteRange<usize>)> = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(_) => issues.push(
                Issue::lexical(format!(
                    "unrecognized input {:?}",
                    code.get(lexer.span()).unwrap_or("")
                ))
                .with_span(index.span(&lexer.span())),
            ),
        }
    }

    let mut cursor = 0;
    let forms = parse_forms(code, &index, &tokens, &mut cursor, &mut issues, false);

    let root = if forms.is_empty() {
        None
    } else {
        let span = Span::covering(
            forms
                .iter()
                .filter_map(|form| form.base.origin())
                .filter_map(|origin| origin.span.as_ref()),
        );
        let file = CstNode::file(forms);
        Some(match span {
            Some(span) => file.with_span(span, code),
            None => file,
        })
    };

    FirstStageResult::new(root, issues).with_time(started.elapsed())
}

fn parse_forms(
    code: &str,
    index: &LineIndex,
    tokens: &[(SexpToken, ByteRange<usize>)],
    cursor: &mut usize,
    issues: &mut Vec<Issue>,
    nested: bool,
) -> Vec<CstNode> {
    let mut forms = Vec::new();
    while *cursor < tokens.len() {
        let (token, bytes) = &tokens[*cursor];
        match token {
            SexpToken::Atom => {
                *cursor += 1;
                let span = index.span(bytes);
                let text = code.get(bytes.clone()).unwrap_or("").to_string();
                forms.push(CstNode::atom(text).with_span(span, code));
            }
            SexpToken::LParen => {
                let open = bytes.clone();
                *cursor += 1;
                let children = parse_forms(code, index, tokens, cursor, issues, true);
                let close = if *cursor < tokens.len() {
                    let (_, close_bytes) = &tokens[*cursor];
                    let close = close_bytes.clone();
                    *cursor += 1;
                    close
                } else {
                    issues.push(
                        Issue::syntactic("unclosed parenthesis")
                            .with_span(index.span(&open)),
                    );
                    open.end..code.len()
                };
                let span = index.span(&(open.start..close.end));
                forms.push(CstNode::list(children).with_span(span, code));
            }
            SexpToken::RParen => {
                if nested {
                    // caller consumes the closing token
                    return forms;
                }
                issues.push(
                    Issue::syntactic("unexpected closing parenthesis")
                        .with_span(index.span(bytes)),
                );
                *cursor += 1;
            }
        }
    }
    forms
}
