//! Two-stage parse driver
//!
//! Parsing runs in two stages: a grammar-specific front end produces a
//! first-stage tree ([`FirstStageResult`]), then a second stage maps it onto
//! the typed AST ([`ParsingResult`]). The driver trait orchestrates both,
//! assigns parent links in a dedicated pass, and accumulates issues across
//! stages. Grammar front ends are collaborators: this module only fixes
//! their contract.
//!
//! A first-stage root may be absent even when no issue was fatal; the driver
//! tolerates a null root and returns a rootless result with the issues.

use std::time::{Duration, Instant};

use crate::ast::{assign_parents, AstNode, Issue, IssueSeverity, NodeIdSource};

/// Output of the grammar-specific first stage
#[derive(Debug)]
pub struct FirstStageResult<R> {
    pub root: Option<R>,
    pub issues: Vec<Issue>,
    pub time: Option<Duration>,
}

impl<R> FirstStageResult<R> {
    pub fn new(root: Option<R>, issues: Vec<Issue>) -> Self {
        Self {
            root,
            issues,
            time: None,
        }
    }

    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = Some(time);
        self
    }

    /// Whether no error-severity issue was recorded
    pub fn correct(&self) -> bool {
        self.issues
            .iter()
            .all(|issue| issue.severity != IssueSeverity::Error)
    }
}

/// Output of a complete two-stage parse
#[derive(Debug)]
pub struct ParsingResult {
    pub root: Option<Box<dyn AstNode>>,
    pub issues: Vec<Issue>,
    pub time: Option<Duration>,
}

impl ParsingResult {
    /// Whether no error-severity issue was recorded
    pub fn correct(&self) -> bool {
        self.issues
            .iter()
            .all(|issue| issue.severity != IssueSeverity::Error)
    }
}

/// Orchestrates first-stage parsing, AST construction and post-processing
///
/// Implementors supply the two stage hooks; `parse` runs the whole pipeline:
/// first stage, second stage, parent assignment, post-processing, timing.
pub trait TwoStageParser {
    /// The first-stage tree type produced by the grammar front end
    type FirstStage;

    /// Run lexing and first-stage parsing
    fn parse_first_stage(&self, code: &str) -> FirstStageResult<Self::FirstStage>;

    /// Map the first-stage tree onto the typed AST
    fn build_ast(
        &mut self,
        first_stage: &Self::FirstStage,
        issues: &mut Vec<Issue>,
    ) -> Option<Box<dyn AstNode>>;

    /// Adjust the finished tree after parents are assigned
    fn post_process(&self, _root: &mut dyn AstNode, _issues: &mut Vec<Issue>) {}

    /// The complete pipeline
    fn parse(&mut self, code: &str) -> ParsingResult {
        let started = Instant::now();
        let first_stage = self.parse_first_stage(code);
        let mut issues = first_stage.issues;

        let mut root = match &first_stage.root {
            Some(tree) => self.build_ast(tree, &mut issues),
            None => None,
        };

        if let Some(root) = root.as_deref_mut() {
            let mut ids = NodeIdSource::new();
            assign_parents(root, &mut ids);
            self.post_process(root, &mut issues);
        }

        ParsingResult {
            root,
            issues,
            time: Some(started.elapsed()),
        }
    }
}
