// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire event stream.
//!
//! The runtime converts values to and from a flat sequence of
//! [`XmlEvent`]s. Names in events are always resolved [`QName`]s; prefixes
//! only appear as explicit [`NamespaceDecl`]s (needed when QNames travel
//! as content) and are otherwise chosen by the [`XmlWriter`].
//!
//! Text I/O wraps `roxmltree` on the read side ([`EventStream::parse`]) and a
//! small streaming writer on the write side ([`EventStream::write_to`]).

mod encoding;
mod reader;
mod writer;

pub use encoding::CharacterEncoding;
pub use writer::XmlWriter;

use crate::config::XML_NS;
use crate::error::Result;
use crate::qname::{NamespaceResolver, QName};
use std::fmt;
use std::io::Write;

/// Line / column of an event in its source document (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// `xmlns:prefix="uri"` (empty prefix for the default namespace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: String,
    pub uri: String,
}

impl NamespaceDecl {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    StartElement {
        name: QName,
        attributes: Vec<Attribute>,
        namespaces: Vec<NamespaceDecl>,
    },
    Characters(String),
    EndElement {
        name: QName,
    },
}

impl XmlEvent {
    pub fn start(name: QName) -> Self {
        XmlEvent::StartElement {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    pub fn end(name: QName) -> Self {
        XmlEvent::EndElement { name }
    }

    /// Value of an attribute on a start event.
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        match self {
            XmlEvent::StartElement { attributes, .. } => attributes
                .iter()
                .find(|a| &a.name == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// EventStream
// ============================================================================

/// A complete document as a sequence of events, with optional source
/// locations (present for parsed documents).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStream {
    events: Vec<XmlEvent>,
    locations: Vec<Option<Location>>,
}

impl EventStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<XmlEvent>) -> Self {
        let locations = vec![None; events.len()];
        Self { events, locations }
    }

    /// Parse document text.
    pub fn parse(text: &str) -> Result<Self> {
        reader::parse(text)
    }

    /// Parse document bytes: BOM first, then `encoding`, then UTF-8.
    pub fn from_bytes(bytes: &[u8], encoding: Option<CharacterEncoding>) -> Result<Self> {
        let text = encoding::decode(bytes, encoding)?;
        reader::parse(&text)
    }

    pub fn push(&mut self, event: XmlEvent) {
        self.events.push(event);
        self.locations.push(None);
    }

    pub(crate) fn push_located(&mut self, event: XmlEvent, location: Option<Location>) {
        self.events.push(event);
        self.locations.push(location);
    }

    /// Move every event of `other` to the end of this stream.
    pub fn append(&mut self, other: EventStream) {
        self.events.extend(other.events);
        self.locations.extend(other.locations);
    }

    pub fn events(&self) -> &[XmlEvent] {
        &self.events
    }

    pub(crate) fn events_mut(&mut self) -> &mut Vec<XmlEvent> {
        &mut self.events
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
        self.locations.truncate(len);
    }

    pub fn location(&self, index: usize) -> Option<Location> {
        self.locations.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Name of the first start element.
    pub fn root_name(&self) -> Option<&QName> {
        self.events.iter().find_map(|e| match e {
            XmlEvent::StartElement { name, .. } => Some(name),
            _ => None,
        })
    }

    /// Serialize to text without an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut out = Vec::new();
        let mut writer = XmlWriter::new(&mut out);
        writer.write_all(&self.events)?;
        writer.finish()?;
        // The writer only emits UTF-8.
        String::from_utf8(out).map_err(|e| crate::Error::structural(e.to_string(), None))
    }

    /// Serialize with an XML declaration in the given encoding.
    pub fn write_to<W: Write>(&self, out: W, encoding: CharacterEncoding) -> Result<()> {
        let mut text = format!(
            "<?xml version=\"1.0\" encoding=\"{}\"?>",
            encoding.label()
        );
        text.push_str(&self.to_xml_string()?);
        encoding::encode_to(out, &text, encoding)
    }
}

// ============================================================================
// Namespace scope
// ============================================================================

/// Stack of in-scope namespace declarations, one frame per open element.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    frames: Vec<Vec<NamespaceDecl>>,
}

impl NamespaceScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decls: &[NamespaceDecl]) {
        self.frames.push(decls.to_vec());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Add a declaration to the innermost frame.
    pub fn declare(&mut self, decl: NamespaceDecl) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(decl);
        } else {
            self.frames.push(vec![decl]);
        }
    }

    /// Innermost prefix bound to `uri` that is not shadowed by a later
    /// declaration of the same prefix.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .flat_map(|f| f.iter().rev())
            .filter(|d| d.uri == uri)
            .map(|d| d.prefix.as_str())
            .find(|p| self.namespace_for_prefix(p) == Some(uri))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl NamespaceResolver for NamespaceScope {
    fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NS);
        }
        self.frames
            .iter()
            .rev()
            .flat_map(|f| f.iter().rev())
            .find(|d| d.prefix == prefix)
            .map(|d| d.uri.as_str())
            .filter(|uri| !uri.is_empty() || prefix.is_empty())
    }
}
