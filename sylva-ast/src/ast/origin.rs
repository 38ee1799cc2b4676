//! Provenance attached to nodes
//!
//! An [`Origin`] records where a node came from: the span in the original
//! text, the text excerpt itself, and a label identifying the producing
//! artifact (typically a first-stage tree fragment). Origins are plain data;
//! they never hold owning pointers back into a source tree.

use serde::Serialize;
use std::fmt;

use super::range::Span;

/// Provenance of a node: span, source excerpt, producing artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Origin {
    pub span: Option<Span>,
    pub source_text: Option<String>,
    pub artifact: Option<String>,
}

impl Origin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_span(span: Span) -> Self {
        Self {
            span: Some(span),
            source_text: None,
            artifact: None,
        }
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }

    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.span, &self.artifact) {
            (Some(span), Some(artifact)) => write!(f, "{} ({})", span, artifact),
            (Some(span), None) => write!(f, "{}", span),
            (None, Some(artifact)) => write!(f, "({})", artifact),
            (None, None) => write!(f, "<unknown origin>"),
        }
    }
}
