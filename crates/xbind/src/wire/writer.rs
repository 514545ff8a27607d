// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Events to document text.

use super::{Attribute, NamespaceDecl, NamespaceScope, XmlEvent};
use crate::config::GENERATED_PREFIX;
use crate::error::{Error, Result};
use crate::qname::{NamespaceResolver, QName};
use std::io::Write;

/// Streaming writer; picks prefixes for names whose namespace is not yet
/// in scope and declares them on the element being written.
pub struct XmlWriter<W: Write> {
    out: W,
    scope: NamespaceScope,
    open: Vec<QName>,
    /// A start tag is written up to its attributes but not yet closed with
    /// `>`, so an immediately following end can become `/>`.
    pending_start: bool,
    generated: usize,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            scope: NamespaceScope::new(),
            open: Vec::new(),
            pending_start: false,
            generated: 0,
        }
    }

    pub fn write_all(&mut self, events: &[XmlEvent]) -> Result<()> {
        for event in events {
            self.write_event(event)?;
        }
        Ok(())
    }

    pub fn write_event(&mut self, event: &XmlEvent) -> Result<()> {
        match event {
            XmlEvent::StartElement {
                name,
                attributes,
                namespaces,
            } => self.start(name, attributes, namespaces),
            XmlEvent::Characters(text) => {
                self.close_pending()?;
                write!(self.out, "{}", escape(text, false))?;
                Ok(())
            }
            XmlEvent::EndElement { name } => self.end(name),
        }
    }

    /// Check that every element was closed, then flush.
    pub fn finish(mut self) -> Result<()> {
        if let Some(name) = self.open.last() {
            return Err(Error::structural(format!("unclosed element {}", name), None));
        }
        self.out.flush()?;
        Ok(())
    }

    fn close_pending(&mut self) -> Result<()> {
        if self.pending_start {
            self.out.write_all(b">")?;
            self.pending_start = false;
        }
        Ok(())
    }

    fn next_prefix(&mut self) -> String {
        loop {
            self.generated += 1;
            let candidate = format!("{}{}", GENERATED_PREFIX, self.generated);
            if self.scope.namespace_for_prefix(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Prefix to use for `name`, declaring one on the current frame if
    /// needed. Attributes never use the default namespace.
    fn prefix_for(&mut self, name: &QName, is_attribute: bool, decls: &mut Vec<NamespaceDecl>) -> String {
        let ns = name.namespace();
        if ns.is_empty() {
            if !is_attribute && self.scope.namespace_for_prefix("").is_some_and(|d| !d.is_empty()) {
                let decl = NamespaceDecl::new("", "");
                self.scope.declare(decl.clone());
                decls.push(decl);
            }
            return String::new();
        }
        if !is_attribute && self.scope.namespace_for_prefix("") == Some(ns) {
            return String::new();
        }
        let existing = self
            .scope
            .prefix_for(ns)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        if let Some(prefix) = existing {
            return prefix;
        }
        let prefix = self.next_prefix();
        let decl = NamespaceDecl::new(prefix.clone(), ns);
        self.scope.declare(decl.clone());
        decls.push(decl);
        prefix
    }

    fn start(&mut self, name: &QName, attributes: &[Attribute], namespaces: &[NamespaceDecl]) -> Result<()> {
        self.close_pending()?;
        self.scope.push(namespaces);
        let mut extra = Vec::new();
        let element_prefix = self.prefix_for(name, false, &mut extra);
        let attr_prefixes: Vec<String> = attributes
            .iter()
            .map(|a| self.prefix_for(&a.name, true, &mut extra))
            .collect();

        write!(self.out, "<{}", qualified(&element_prefix, name.local_part()))?;
        for decl in namespaces.iter().chain(extra.iter()) {
            if decl.prefix.is_empty() {
                write!(self.out, " xmlns=\"{}\"", escape(&decl.uri, true))?;
            } else {
                write!(self.out, " xmlns:{}=\"{}\"", decl.prefix, escape(&decl.uri, true))?;
            }
        }
        for (attr, prefix) in attributes.iter().zip(&attr_prefixes) {
            write!(
                self.out,
                " {}=\"{}\"",
                qualified(prefix, attr.name.local_part()),
                escape(&attr.value, true)
            )?;
        }
        self.open.push(name.clone());
        self.pending_start = true;
        Ok(())
    }

    fn end(&mut self, name: &QName) -> Result<()> {
        match self.open.pop() {
            Some(open) if &open == name => {}
            Some(open) => {
                return Err(Error::structural(
                    format!("end of {} while {} is open", name, open),
                    None,
                ))
            }
            None => return Err(Error::structural(format!("unmatched end of {}", name), None)),
        }
        if self.pending_start {
            self.out.write_all(b"/>")?;
            self.pending_start = false;
        } else {
            // Same prefix the start tag resolved to: the scope frame is still live.
            let prefix = if name.namespace().is_empty() {
                String::new()
            } else if self.scope.namespace_for_prefix("") == Some(name.namespace()) {
                String::new()
            } else {
                self.scope.prefix_for(name.namespace()).unwrap_or("").to_string()
            };
            write!(self.out, "</{}>", qualified(&prefix, name.local_part()))?;
        }
        self.scope.pop();
        Ok(())
    }
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\t' if attribute => out.push_str("&#9;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(events: &[XmlEvent]) -> String {
        let mut out = Vec::new();
        let mut w = XmlWriter::new(&mut out);
        w.write_all(events).unwrap();
        w.finish().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn generates_prefixes() {
        let root = QName::new("urn:a", "root");
        let child = QName::new("urn:b", "child");
        let text = write(&[
            XmlEvent::start(root.clone()),
            XmlEvent::start(child.clone()),
            XmlEvent::end(child),
            XmlEvent::end(root),
        ]);
        assert_eq!(text, r#"<ns1:root xmlns:ns1="urn:a"><ns2:child xmlns:ns2="urn:b"/></ns1:root>"#);
    }

    #[test]
    fn honours_explicit_declarations() {
        let root = QName::new("urn:a", "root");
        let text = write(&[
            XmlEvent::StartElement {
                name: root.clone(),
                attributes: vec![Attribute::new(QName::unqualified("k"), "a\"b")],
                namespaces: vec![NamespaceDecl::new("", "urn:a")],
            },
            XmlEvent::Characters("1 < 2".into()),
            XmlEvent::end(root),
        ]);
        assert_eq!(text, r#"<root xmlns="urn:a" k="a&quot;b">1 &lt; 2</root>"#);
    }

    #[test]
    fn unqualified_child_undeclares_default() {
        let root = QName::new("urn:a", "root");
        let child = QName::unqualified("c");
        let text = write(&[
            XmlEvent::StartElement {
                name: root.clone(),
                attributes: Vec::new(),
                namespaces: vec![NamespaceDecl::new("", "urn:a")],
            },
            XmlEvent::start(child.clone()),
            XmlEvent::end(child),
            XmlEvent::end(root),
        ]);
        assert_eq!(text, r#"<root xmlns="urn:a"><c xmlns=""/></root>"#);
    }

    #[test]
    fn mismatched_end_is_structural() {
        let mut out = Vec::new();
        let mut w = XmlWriter::new(&mut out);
        w.write_event(&XmlEvent::start(QName::unqualified("a"))).unwrap();
        assert!(matches!(
            w.write_event(&XmlEvent::end(QName::unqualified("b"))),
            Err(Error::Structural { .. })
        ));
    }
}
