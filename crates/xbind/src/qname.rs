// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Qualified names and namespace resolution.
//!
//! A [`QName`] is always stored fully resolved (namespace URI + local part).
//! Prefixes only exist on the wire; the [`NamespaceResolver`] and
//! [`PrefixResolver`] traits bridge the two when a QName travels as
//! *content* (e.g. `xsi:type="xs:int"` or an `xs:QName` text node).

use crate::config::{XSD_NS, XSI_NS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace-qualified name.
///
/// Serialized in Clark notation (`{namespace}local`), which is also the
/// `Display` form. Names without a namespace print as the bare local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    namespace: String,
    local: String,
}

impl QName {
    /// Create a qualified name.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a name in no namespace.
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new("", local)
    }

    /// Create a name in the XML Schema namespace (`xs:` types).
    pub fn xsd(local: impl Into<String>) -> Self {
        Self::new(XSD_NS, local)
    }

    /// Create a name in the XML Schema instance namespace (`xsi:` attributes).
    pub fn xsi(local: impl Into<String>) -> Self {
        Self::new(XSI_NS, local)
    }

    /// Namespace URI (empty for no namespace).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Local part.
    pub fn local_part(&self) -> &str {
        &self.local
    }

    /// Parse Clark notation: `{uri}local` or `local`.
    pub fn parse_clark(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix('{') {
            let close = rest
                .find('}')
                .ok_or_else(|| format!("unterminated namespace in '{}'", text))?;
            let local = &rest[close + 1..];
            if local.is_empty() {
                return Err(format!("missing local part in '{}'", text));
            }
            Ok(Self::new(&rest[..close], local))
        } else if text.is_empty() {
            Err("empty qualified name".into())
        } else {
            Ok(Self::unqualified(text))
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

impl TryFrom<String> for QName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_clark(&value)
    }
}

impl From<QName> for String {
    fn from(q: QName) -> Self {
        q.to_string()
    }
}

/// Resolves wire prefixes to namespace URIs (read side).
pub trait NamespaceResolver {
    /// URI bound to `prefix`; the empty prefix is the default namespace.
    fn namespace_for_prefix(&self, prefix: &str) -> Option<&str>;
}

/// Allocates wire prefixes for namespace URIs (write side).
///
/// Implementations declare a new binding on the current element when the
/// namespace is not yet in scope.
pub trait PrefixResolver {
    fn prefix_for_namespace(&mut self, namespace: &str) -> String;
}

/// Resolver with no bindings at all; only unprefixed names in no namespace resolve.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNamespaces;

impl NamespaceResolver for NoNamespaces {
    fn namespace_for_prefix(&self, _prefix: &str) -> Option<&str> {
        None
    }
}

/// Split a lexical `prefix:local` name. Unprefixed names yield an empty prefix.
pub(crate) fn split_prefixed(lexical: &str) -> (&str, &str) {
    match lexical.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", lexical),
    }
}
