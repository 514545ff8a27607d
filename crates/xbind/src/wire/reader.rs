// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Document text to events, via `roxmltree`.

use super::{Attribute, EventStream, Location, NamespaceDecl, XmlEvent};
use crate::error::{Error, Result};
use crate::qname::QName;
use roxmltree::{Document, Node};

fn location(doc: &Document, node: &Node) -> Location {
    let pos = doc.text_pos_at(node.range().start);
    Location {
        line: pos.row,
        column: pos.col,
    }
}

/// Declarations introduced by `node` (in scope here but not on the parent).
fn declared_namespaces(node: &Node) -> Vec<NamespaceDecl> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| NamespaceDecl::new(ns.name().unwrap_or(""), ns.uri()))
        .collect()
}

fn element_name(node: &Node) -> QName {
    let tag = node.tag_name();
    QName::new(tag.namespace().unwrap_or(""), tag.name())
}

/// Emits `node` and its subtree in document order.
fn push_element(doc: &Document, node: Node, stream: &mut EventStream) {
    let name = element_name(&node);
    let attributes = node
        .attributes()
        .map(|a| Attribute::new(QName::new(a.namespace().unwrap_or(""), a.name()), a.value()))
        .collect();
    let event = XmlEvent::StartElement {
        name: name.clone(),
        attributes,
        namespaces: declared_namespaces(&node),
    };
    stream.push_located(event, Some(location(doc, &node)));

    for child in node.children() {
        if child.is_element() {
            push_element(doc, child, stream);
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            stream.push_located(
                XmlEvent::Characters(text.to_string()),
                Some(location(doc, &child)),
            );
        }
    }

    stream.push_located(XmlEvent::EndElement { name }, None);
}

pub(crate) fn parse(text: &str) -> Result<EventStream> {
    let doc = Document::parse(text).map_err(|e| {
        let pos = e.pos();
        Error::structural(
            format!("failed to parse XML: {}", e),
            Some(Location {
                line: pos.row,
                column: pos.col,
            }),
        )
    })?;

    let mut stream = EventStream::new();
    push_element(&doc, doc.root_element(), &mut stream);
    log::debug!("[EventStream] parsed {} events", stream.len());
    Ok(stream)
}
