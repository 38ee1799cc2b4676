//! Issue collection for parsing and transformation
//!
//! An [`Issue`] is a structured, recoverable problem report: severity, the
//! pipeline stage that produced it, a message, and an optional span. Issues
//! are accumulated and returned alongside (possibly partial) results; they are
//! never thrown. Fatal conditions use the error enums instead.

use serde::Serialize;
use std::fmt;

use super::range::Span;

/// Severity levels for issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Info => write!(f, "info"),
            IssueSeverity::Warning => write!(f, "warning"),
            IssueSeverity::Error => write!(f, "error"),
        }
    }
}

/// Pipeline stage an issue originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueStage {
    Lexical,
    Syntactic,
    Semantic,
    Translation,
}

impl fmt::Display for IssueStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueStage::Lexical => write!(f, "lexical"),
            IssueStage::Syntactic => write!(f, "syntactic"),
            IssueStage::Semantic => write!(f, "semantic"),
            IssueStage::Translation => write!(f, "translation"),
        }
    }
}

/// A recoverable problem report carried through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub stage: IssueStage,
    pub message: String,
    pub span: Option<Span>,
}

impl Issue {
    pub fn new(severity: IssueSeverity, stage: IssueStage, message: impl Into<String>) -> Self {
        Self {
            severity,
            stage,
            message: message.into(),
            span: None,
        }
    }

    pub fn lexical(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, IssueStage::Lexical, message)
    }

    pub fn syntactic(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, IssueStage::Syntactic, message)
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, IssueStage::Semantic, message)
    }

    pub fn translation(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, IssueStage::Translation, message)
    }

    pub fn with_severity(mut self, severity: IssueSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.stage, self.message)?;
        if let Some(span) = &self.span {
            write!(f, " at {}", span)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::range::Position;

    #[test]
    fn test_issue_constructors() {
        let issue = Issue::syntactic("unexpected token");
        assert_eq!(issue.severity, IssueSeverity::Error);
        assert_eq!(issue.stage, IssueStage::Syntactic);
        assert!(issue.span.is_none());

        let downgraded = Issue::translation("unmapped").with_severity(IssueSeverity::Info);
        assert_eq!(downgraded.severity, IssueSeverity::Info);
    }

    #[test]
    fn test_issue_display() {
        let span = Span::new(0..3, Position::new(2, 0), Position::new(2, 3));
        let issue = Issue::lexical("bad char").with_span(span);
        assert_eq!(format!("{}", issue), "error [lexical]: bad char at 2:0..2:3");
    }
}
