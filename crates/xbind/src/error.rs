// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate error type.
//!
//! Only fatal conditions surface here. Recoverable conversion problems are
//! reported through the session's diagnostics instead (see
//! [`Diagnostic`](crate::Diagnostic)).

use crate::binding::{BindingTypeName, NativeTypeName};
use crate::qname::QName;
use crate::wire::Location;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the binding runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// No binding type is registered for the requested name.
    #[error("no binding type for {0}")]
    UnresolvedType(BindingTypeName),

    /// No default binding for a native type id.
    #[error("no default binding for native type {0}")]
    UnresolvedNative(NativeTypeName),

    /// No default binding for a schema type (e.g. named by `xsi:type`).
    #[error("no binding for schema type {0}")]
    UnresolvedSchemaType(QName),

    /// The root element has no global element binding and no `xsi:type`.
    #[error("no binding for element {0}")]
    UnresolvedElement(QName),

    /// Malformed document or event stream.
    #[error("structural error{}: {message}", .location.as_ref().map(|l| format!(" at {}", l)).unwrap_or_default())]
    Structural {
        message: String,
        location: Option<Location>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bundle could not be loaded; names the failing location.
    #[error("failed to load bundle {}: {reason}", .location.display())]
    BundleLoad { location: PathBuf, reason: String },

    #[error("unsupported character encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Write attempted on a bundle after `close()`.
    #[error("bundle is closed")]
    BundleClosed,

    /// Second top-level call on a single-use session.
    #[error("session already used")]
    SessionReused,

    /// Binding descriptor or manifest could not be (de)serialized.
    #[error("invalid descriptor: {0}")]
    Descriptor(String),
}

impl Error {
    pub(crate) fn structural(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Structural {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn bundle_load(location: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::BundleLoad {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Descriptor(e.to_string())
    }
}

/// Result alias for the binding runtime.
pub type Result<T> = std::result::Result<T, Error>;
