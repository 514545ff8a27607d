// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshal / unmarshal sessions.
//!
//! A session is created from a [`BindingContext`](crate::BindingContext) for
//! one top-level call and is discarded afterwards:
//!
//! ```text
//! Idle --call--> InProgress --ok--> Completed
//!                           \--err-> Failed
//! ```
//!
//! Recoverable problems (bad lexical text, out-of-range values, unexpected
//! content) never abort the call: they become [`Diagnostic`]s, kept by the
//! session and forwarded to the caller's [`ErrorListener`].

mod marshaller;
mod unmarshaller;

pub use marshaller::{MarshalResult, Marshaller};
pub use unmarshaller::{UnmarshalResult, Unmarshaller};

use crate::error::{Error, Result};
use crate::wire::{CharacterEncoding, Location};
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// One recoverable problem found during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            severity,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match self.location {
            Some(loc) => write!(f, "{} at {}: {}", level, loc, self.message),
            None => write!(f, "{}: {}", level, self.message),
        }
    }
}

/// Receives diagnostics as they are raised.
pub trait ErrorListener: Send + Sync {
    fn on_diagnostic(&self, diagnostic: &Diagnostic);
}

/// Listener that keeps every diagnostic it receives.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: parking_lot::RwLock<Vec<Diagnostic>>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.read().clone()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.read().is_empty()
    }

    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.write())
    }
}

impl ErrorListener for DiagnosticCollector {
    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        self.diagnostics.write().push(diagnostic.clone());
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-call options.
#[derive(Clone, Default)]
pub struct XmlOptions {
    pub error_listener: Option<Arc<dyn ErrorListener>>,
    /// Output encoding for byte sinks; input hint when no BOM is present.
    pub character_encoding: Option<CharacterEncoding>,
    /// Overrides the context's `strict_resolution` for this call.
    pub strict_resolution: Option<bool>,
}

impl XmlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_listener(mut self, listener: Arc<dyn ErrorListener>) -> Self {
        self.error_listener = Some(listener);
        self
    }

    pub fn with_character_encoding(mut self, encoding: CharacterEncoding) -> Self {
        self.character_encoding = Some(encoding);
        self
    }

    pub fn with_strict_resolution(mut self, strict: bool) -> Self {
        self.strict_resolution = Some(strict);
        self
    }
}

impl fmt::Debug for XmlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlOptions")
            .field("error_listener", &self.error_listener.is_some())
            .field("character_encoding", &self.character_encoding)
            .field("strict_resolution", &self.strict_resolution)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Session plumbing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    InProgress,
    Completed,
    Failed,
}

/// Session state machine shared by both session kinds.
#[derive(Debug)]
pub(crate) struct SessionGuard {
    state: SessionState,
}

impl SessionGuard {
    pub(crate) fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn begin(&mut self) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(Error::SessionReused);
        }
        self.state = SessionState::InProgress;
        Ok(())
    }

    pub(crate) fn finish<T>(&mut self, outcome: Result<T>) -> Result<T> {
        self.state = if outcome.is_ok() {
            SessionState::Completed
        } else {
            SessionState::Failed
        };
        outcome
    }
}

/// Diagnostic sink: the session's own list plus the caller's listener.
pub(crate) struct Reporter {
    component: &'static str,
    listener: Option<Arc<dyn ErrorListener>>,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub(crate) fn new(component: &'static str, listener: Option<Arc<dyn ErrorListener>>) -> Self {
        Self {
            component,
            listener,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("[{}] {}", self.component, diagnostic);
        if let Some(listener) = &self.listener {
            listener.on_diagnostic(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_is_single_use() {
        let mut guard = SessionGuard::new();
        guard.begin().unwrap();
        assert_eq!(guard.state(), SessionState::InProgress);
        guard.finish(Ok(())).unwrap();
        assert_eq!(guard.state(), SessionState::Completed);
        assert!(matches!(guard.begin(), Err(Error::SessionReused)));
    }

    #[test]
    fn failed_session_cannot_restart() {
        let mut guard = SessionGuard::new();
        guard.begin().unwrap();
        let _ = guard.finish::<()>(Err(Error::Unsupported("test")));
        assert_eq!(guard.state(), SessionState::Failed);
        assert!(guard.begin().is_err());
    }

    #[test]
    fn reporter_forwards_and_keeps() {
        let collector = Arc::new(DiagnosticCollector::new());
        let mut reporter = Reporter::new("Test", Some(collector.clone()));
        reporter.report(Diagnostic::new(Severity::Error, "bad", None));
        assert_eq!(collector.len(), 1);
        assert_eq!(reporter.into_diagnostics().len(), 1);
        assert_eq!(collector.drain().len(), 1);
        assert!(collector.is_empty());
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(Severity::Warning, "skipped", Some(Location { line: 1, column: 4 }));
        assert_eq!(d.to_string(), "warning at 1:4: skipped");
    }
}
