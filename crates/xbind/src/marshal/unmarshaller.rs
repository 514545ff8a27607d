// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire events to native values.

use super::{Diagnostic, Reporter, SessionGuard, SessionState, Severity, XmlOptions};
use crate::binding::{BindingKind, BindingLoader, BindingType, BindingTypeName, NativeTypeName};
use crate::codec::resolve_qname;
use crate::context::{BindingContext, ContextInner};
use crate::error::{Error, Result};
use crate::qname::QName;
use crate::runtime::RuntimeBindingTypeTable;
use crate::value::Value;
use crate::wire::{Attribute, EventStream, Location, NamespaceScope, XmlEvent};
use std::io::Read;
use std::sync::Arc;

// ============================================================================
// Unmarshaller
// ============================================================================

/// Single-use unmarshal session.
pub struct Unmarshaller {
    context: BindingContext,
    guard: SessionGuard,
    diagnostics: Vec<Diagnostic>,
}

impl Unmarshaller {
    pub(crate) fn new(context: BindingContext) -> Self {
        Self {
            context,
            guard: SessionGuard::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.guard.state()
    }

    /// Diagnostics raised by the call, also after it failed.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Unmarshal a document. The root type comes from an `xsi:type` marker,
    /// else the root element's binding, else the context's default root.
    pub fn unmarshal(&mut self, source: &EventStream, options: &XmlOptions) -> Result<Value> {
        self.guard.begin()?;
        self.execute(source, options, |r| r.read_element(None))
    }

    /// Unmarshal a document whose root is declared as
    /// `(native_type, schema_type)`. An `xsi:type` marker naming an admitted
    /// narrower type still wins.
    pub fn unmarshal_type(
        &mut self,
        source: &EventStream,
        schema_type: &QName,
        native_type: &NativeTypeName,
        options: &XmlOptions,
    ) -> Result<Value> {
        self.guard.begin()?;
        let declared = BindingTypeName::new(native_type.clone(), schema_type.clone());
        self.execute(source, options, |r| {
            let bt = r
                .loader()
                .binding_type(&declared)
                .ok_or_else(|| Error::UnresolvedType(declared.clone()))?;
            r.read_element(Some(&bt))
        })
    }

    /// Unmarshal a byte stream: BOM first, then the options' encoding,
    /// then UTF-8.
    pub fn unmarshal_bytes<R: Read>(&mut self, mut input: R, options: &XmlOptions) -> Result<Value> {
        self.guard.begin()?;
        let mut bytes = Vec::new();
        let parsed = input
            .read_to_end(&mut bytes)
            .map_err(Error::from)
            .and_then(|_| EventStream::from_bytes(&bytes, options.character_encoding));
        match parsed {
            Ok(stream) => self.execute(&stream, options, |r| r.read_element(None)),
            Err(e) => self.guard.finish(Err(e)),
        }
    }

    /// Unmarshal document text.
    pub fn unmarshal_str(&mut self, text: &str, options: &XmlOptions) -> Result<Value> {
        self.guard.begin()?;
        match EventStream::parse(text) {
            Ok(stream) => self.execute(&stream, options, |r| r.read_element(None)),
            Err(e) => self.guard.finish(Err(e)),
        }
    }

    fn execute<F>(&mut self, source: &EventStream, options: &XmlOptions, f: F) -> Result<Value>
    where
        F: FnOnce(&mut UnmarshalResult<'_>) -> Result<Value>,
    {
        let inner = self.context.inner.clone();
        let mut result = UnmarshalResult::new(&inner, source, options);
        let outcome = f(&mut result);
        self.diagnostics = result.reporter.into_diagnostics();
        if let Err(e) = &outcome {
            log::debug!("[Unmarshaller] failed: {}", e);
        }
        self.guard.finish(outcome)
    }
}

// ============================================================================
// UnmarshalResult
// ============================================================================

/// Input side of an unmarshal session, handed to converters.
///
/// Positioned inside the element being converted; converters read its
/// attributes and content through the helpers below.
pub struct UnmarshalResult<'a> {
    ctx: &'a ContextInner,
    events: &'a [XmlEvent],
    source: &'a EventStream,
    pos: usize,
    scope: NamespaceScope,
    elements: Vec<usize>,
    strict: bool,
    reporter: Reporter,
}

impl<'a> UnmarshalResult<'a> {
    fn new(ctx: &'a ContextInner, source: &'a EventStream, options: &XmlOptions) -> Self {
        Self {
            ctx,
            events: source.events(),
            source,
            pos: 0,
            scope: NamespaceScope::new(),
            elements: Vec::new(),
            strict: options
                .strict_resolution
                .unwrap_or(ctx.config.strict_resolution),
            reporter: Reporter::new("Unmarshaller", options.error_listener.clone()),
        }
    }

    pub fn loader(&self) -> &'a dyn BindingLoader {
        &self.ctx.loader
    }

    pub fn table(&self) -> &'a RuntimeBindingTypeTable {
        &self.ctx.table
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    /// In-scope namespace bindings of the current element.
    pub fn namespaces(&self) -> &NamespaceScope {
        &self.scope
    }

    /// Attributes of the current element.
    pub fn attributes(&self) -> &'a [Attribute] {
        let events = self.events;
        match self.elements.last().map(|&i| &events[i]) {
            Some(XmlEvent::StartElement { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, name: &QName) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Location of the current element, if the source was parsed.
    pub fn location(&self) -> Option<Location> {
        self.elements
            .last()
            .and_then(|&i| self.source.location(i))
            .or_else(|| self.source.location(self.pos))
    }

    pub fn report(&mut self, severity: Severity, message: impl Into<String>) {
        let location = self.location();
        self.reporter.report(Diagnostic::new(severity, message, location));
    }

    /// Report a missing binding type; fatal under strict resolution.
    pub fn unresolved(&mut self, name: &BindingTypeName) -> Result<()> {
        if self.strict {
            return Err(Error::UnresolvedType(name.clone()));
        }
        self.report(Severity::Error, format!("no binding type for {}", name));
        Ok(())
    }

    /// Text content of the current element. Child elements are skipped with
    /// a warning.
    pub fn collect_text(&mut self) -> String {
        let events = self.events;
        let mut text = String::new();
        let mut warned = false;
        while let Some(event) = events.get(self.pos) {
            match event {
                XmlEvent::Characters(t) => {
                    text.push_str(t);
                    self.pos += 1;
                }
                XmlEvent::StartElement { name, .. } => {
                    if !warned {
                        self.report(
                            Severity::Warning,
                            format!("unexpected element {} in simple content", name),
                        );
                        warned = true;
                    }
                    self.skip_element();
                }
                XmlEvent::EndElement { .. } => break,
            }
        }
        text
    }

    /// Name of the next child element, without consuming it. `None` at the
    /// end of the current element. Stray text is skipped.
    pub fn peek_child(&mut self) -> Option<QName> {
        let events = self.events;
        while let Some(event) = events.get(self.pos) {
            match event {
                XmlEvent::Characters(t) => {
                    if !t.trim().is_empty() {
                        self.report(Severity::Warning, format!("unexpected text '{}'", t.trim()));
                    }
                    self.pos += 1;
                }
                XmlEvent::StartElement { name, .. } => return Some(name.clone()),
                XmlEvent::EndElement { .. } => return None,
            }
        }
        None
    }

    /// Consume the next child element entirely.
    pub fn skip_element(&mut self) {
        if !matches!(self.events.get(self.pos), Some(XmlEvent::StartElement { .. })) {
            return;
        }
        let mut depth = 0usize;
        while let Some(event) = self.events.get(self.pos) {
            self.pos += 1;
            match event {
                XmlEvent::StartElement { .. } => depth += 1,
                XmlEvent::EndElement { .. } => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                XmlEvent::Characters(_) => {}
            }
        }
    }

    /// Unmarshal the next child element as `declared`.
    pub fn unmarshal_element(&mut self, declared: &BindingTypeName) -> Result<Value> {
        match self.ctx.loader.binding_type(declared) {
            Some(bt) => self.read_element(Some(&bt)),
            None => {
                self.unresolved(declared)?;
                self.skip_element();
                Ok(Value::Null)
            }
        }
    }

    /// Unmarshal the next child element as an already resolved type.
    pub fn unmarshal_resolved(&mut self, declared: &Arc<BindingType>) -> Result<Value> {
        self.read_element(Some(declared))
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn read_element(&mut self, declared: Option<&Arc<BindingType>>) -> Result<Value> {
        let events = self.events;
        while let Some(XmlEvent::Characters(_)) = events.get(self.pos) {
            self.pos += 1;
        }
        let Some(XmlEvent::StartElement { name, namespaces, .. }) = events.get(self.pos) else {
            return Err(Error::structural(
                "expected a start element",
                self.source.location(self.pos),
            ));
        };
        self.elements.push(self.pos);
        self.scope.push(namespaces);
        self.pos += 1;
        let outcome = self.read_content(declared, name);
        self.scope.pop();
        self.elements.pop();
        outcome
    }

    fn read_content(&mut self, declared: Option<&Arc<BindingType>>, element: &QName) -> Result<Value> {
        if let Some(nil) = self.attribute(&QName::xsi("nil")) {
            if matches!(nil.trim(), "true" | "1") {
                self.finish_element()?;
                return Ok(Value::Null);
            }
        }
        let Some(effective) = self.effective_type(declared, element)? else {
            self.finish_element()?;
            return Ok(Value::Null);
        };
        let Some(unmarshaller) = self.table().unmarshaller(&effective.name) else {
            if declared.is_none() {
                return Err(Error::UnresolvedType(effective.name.clone()));
            }
            self.unresolved(&effective.name)?;
            self.finish_element()?;
            return Ok(Value::Null);
        };
        let value = unmarshaller.unmarshal(self)?;
        self.finish_element()?;
        Ok(value)
    }

    /// Skip leftover content of the current element and consume its end.
    fn finish_element(&mut self) -> Result<()> {
        let events = self.events;
        while let Some(event) = events.get(self.pos) {
            match event {
                XmlEvent::Characters(_) => self.pos += 1,
                XmlEvent::StartElement { name, .. } => {
                    self.report(Severity::Warning, format!("unexpected element {} skipped", name));
                    self.skip_element();
                }
                XmlEvent::EndElement { .. } => {
                    self.pos += 1;
                    return Ok(());
                }
            }
        }
        Err(Error::structural("unexpected end of document", self.location()))
    }

    /// Type to read the current element with. `None` when it cannot be
    /// resolved and the problem was reported as a diagnostic.
    fn effective_type(
        &mut self,
        declared: Option<&Arc<BindingType>>,
        element: &QName,
    ) -> Result<Option<Arc<BindingType>>> {
        let loader = self.loader();
        let mut chosen = None;

        if let Some(lexical) = self.attribute(&QName::xsi("type")) {
            match resolve_qname(lexical, &self.scope) {
                Ok(schema) => {
                    let found = loader
                        .type_for_schema(&schema)
                        .and_then(|n| loader.binding_type(&n));
                    match (found, declared) {
                        (Some(found), None) => chosen = Some(found),
                        (Some(found), Some(d)) if d.name == found.name || d.admits(&found, loader) => {
                            chosen = Some(found)
                        }
                        (Some(found), Some(d)) => self.report(
                            Severity::Warning,
                            format!("xsi:type {} is not allowed for {}; ignored", found.name, d.name),
                        ),
                        (None, declared) => {
                            if self.strict {
                                return Err(Error::UnresolvedSchemaType(schema));
                            }
                            let fallback = if declared.is_some() {
                                "; using the declared type"
                            } else {
                                ""
                            };
                            self.report(
                                Severity::Warning,
                                format!("unknown xsi:type {}{}", schema, fallback),
                            );
                        }
                    }
                }
                Err(e) => self.report(Severity::Error, format!("invalid xsi:type: {}", e)),
            }
        }

        let chosen = match (chosen, declared) {
            (Some(t), _) => t,
            (None, Some(d)) => d.clone(),
            (None, None) => self.root_type(element)?,
        };

        // Polymorphic types without a marker read as their base.
        if let BindingKind::Polymorphic { base: Some(base), .. } = &chosen.kind {
            match loader.binding_type(base) {
                Some(b) => return Ok(Some(b)),
                None => {
                    self.unresolved(base)?;
                    return Ok(None);
                }
            }
        }
        Ok(Some(chosen))
    }

    fn root_type(&self, element: &QName) -> Result<Arc<BindingType>> {
        let loader = self.loader();
        if let Some(name) = loader.type_for_element(element) {
            return loader
                .binding_type(&name)
                .ok_or(Error::UnresolvedType(name));
        }
        match &self.ctx.config.default_root {
            Some(name) => loader
                .binding_type(name)
                .ok_or_else(|| Error::UnresolvedType(name.clone())),
            None => Err(Error::UnresolvedElement(element.clone())),
        }
    }
}
