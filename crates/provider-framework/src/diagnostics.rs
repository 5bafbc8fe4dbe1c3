//! # Diagnostics
//!
//! User-facing problems raised by a lifecycle call. Operations never return an error type
//! to the host; they push [`Diagnostic`]s and return `None`, mirroring how the plugin
//! protocol reports failures.
//!
//! Every diagnostic records where it was raised (`#[track_caller]`) so the trace output
//! points at the mapping that complained, not at the adapter.

use serde::Serialize;
use std::fmt;
use std::panic::Location;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single user-facing message, optionally tied to an attribute path (`a.b[0].c`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(skip)]
    location: Option<&'static Location<'static>>,
}

impl Diagnostic {
    #[track_caller]
    pub fn new(severity: Severity, summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
            location: Some(Location::caller()),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Where in the provider this diagnostic was raised.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        self.location
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attr) => write!(f, "{}: {} ({})", attr, self.summary, self.detail),
            None => write!(f, "{} ({})", self.summary, self.detail),
        }
    }
}

/// Ordered collection of diagnostics for one lifecycle call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if let Some(location) = diagnostic.location {
            debug!(
                severity = ?diagnostic.severity,
                summary = %diagnostic.summary,
                at = %location,
                "Diagnostic"
            );
        }
        self.items.push(diagnostic);
    }

    #[track_caller]
    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Error, summary, detail));
    }

    #[track_caller]
    pub fn attribute_error(
        &mut self,
        attribute: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic::new(Severity::Error, summary, detail).with_attribute(attribute));
    }

    #[track_caller]
    pub fn warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Warning, summary, detail));
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
