// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native values to wire events.

use super::{Diagnostic, Reporter, SessionGuard, SessionState, Severity, XmlOptions};
use crate::binding::{BindingKind, BindingLoader, BindingType, BindingTypeName, NativeTypeName};
use crate::config::{GENERATED_PREFIX, XSD_NS, XSD_PREFIX, XSI_NS, XSI_PREFIX};
use crate::context::{BindingContext, ContextInner};
use crate::error::{Error, Result};
use crate::qname::{NamespaceResolver, PrefixResolver, QName};
use crate::runtime::RuntimeBindingTypeTable;
use crate::value::Value;
use crate::wire::{Attribute, EventStream, NamespaceDecl, NamespaceScope, XmlEvent};
use std::io::Write;
use std::sync::Arc;

// ============================================================================
// Marshaller
// ============================================================================

/// Single-use marshal session.
pub struct Marshaller {
    context: BindingContext,
    guard: SessionGuard,
    diagnostics: Vec<Diagnostic>,
}

impl Marshaller {
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

    /// Marshal `value` as `element`, declared as `(native_type, schema_type)`.
    pub fn marshal_type(
        &mut self,
        value: &Value,
        element: &QName,
        schema_type: &QName,
        native_type: &NativeTypeName,
        options: &XmlOptions,
    ) -> Result<EventStream> {
        self.guard.begin()?;
        let declared = BindingTypeName::new(native_type.clone(), schema_type.clone());
        self.execute(options, |r| r.marshal_root(element, value, &declared))
    }

    /// [`marshal_type`](Self::marshal_type), written as text to `writer` in
    /// the options' encoding (UTF-8 by default).
    pub fn marshal_type_to_writer<W: Write>(
        &mut self,
        writer: W,
        value: &Value,
        element: &QName,
        schema_type: &QName,
        native_type: &NativeTypeName,
        options: &XmlOptions,
    ) -> Result<()> {
        let stream = self.marshal_type(value, element, schema_type, native_type, options)?;
        let written = stream.write_to(writer, options.character_encoding.unwrap_or_default());
        self.guard.finish(written)
    }

    /// Marshal a document rooted at the value's default binding and global
    /// element, appending the events to `sink`.
    ///
    /// Without a global element for the value's type, the root is named
    /// after the schema type and carries an `xsi:type` marker.
    pub fn marshal(&mut self, sink: &mut EventStream, value: &Value, options: &XmlOptions) -> Result<()> {
        self.guard.begin()?;
        let stream = self.execute(options, |r| r.marshal_detected(value))?;
        sink.append(stream);
        Ok(())
    }

    /// [`marshal`](Self::marshal), written as text to `out` in the options'
    /// encoding (UTF-8 by default).
    pub fn marshal_to_bytes<W: Write>(&mut self, out: W, value: &Value, options: &XmlOptions) -> Result<()> {
        self.guard.begin()?;
        let stream = self.execute(options, |r| r.marshal_detected(value))?;
        let written = stream.write_to(out, options.character_encoding.unwrap_or_default());
        self.guard.finish(written)
    }

    fn execute<F>(&mut self, options: &XmlOptions, f: F) -> Result<EventStream>
    where
        F: FnOnce(&mut MarshalResult<'_>) -> Result<()>,
    {
        let inner = self.context.inner.clone();
        let mut result = MarshalResult::new(&inner, options);
        let outcome = f(&mut result);
        let (stream, diagnostics) = result.into_parts();
        self.diagnostics = diagnostics;
        if let Err(e) = &outcome {
            log::debug!("[Marshaller] failed: {}", e);
        }
        self.guard.finish(outcome.map(|_| stream))
    }
}

// ============================================================================
// MarshalResult
// ============================================================================

/// Output side of a marshal session, handed to converters.
pub struct MarshalResult<'a> {
    ctx: &'a ContextInner,
    strict: bool,
    reporter: Reporter,
    stream: EventStream,
    open: Vec<usize>,
    scope: NamespaceScope,
    generated: usize,
}

impl<'a> MarshalResult<'a> {
    fn new(ctx: &'a ContextInner, options: &XmlOptions) -> Self {
        Self {
            ctx,
            strict: options
                .strict_resolution
                .unwrap_or(ctx.config.strict_resolution),
            reporter: Reporter::new("Marshaller", options.error_listener.clone()),
            stream: EventStream::new(),
            open: Vec::new(),
            scope: NamespaceScope::new(),
            generated: 0,
        }
    }

    fn into_parts(self) -> (EventStream, Vec<Diagnostic>) {
        (self.stream, self.reporter.into_diagnostics())
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

    pub fn report(&mut self, severity: Severity, message: impl Into<String>) {
        self.reporter.report(Diagnostic::new(severity, message, None));
    }

    /// Report a missing binding type; fatal under strict resolution.
    pub fn unresolved(&mut self, name: &BindingTypeName) -> Result<()> {
        if self.strict {
            return Err(Error::UnresolvedType(name.clone()));
        }
        self.report(Severity::Error, format!("no binding type for {}", name));
        Ok(())
    }

    /// Append text to the open element.
    pub fn characters(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.stream.push(XmlEvent::Characters(text));
        }
    }

    /// Add an attribute to the open element.
    pub fn add_attribute(&mut self, name: QName, value: impl Into<String>) {
        if name.namespace() == XSI_NS {
            self.prefix_for_namespace(XSI_NS);
        }
        if let Some(XmlEvent::StartElement { attributes, .. }) = self.current_start() {
            attributes.push(Attribute::new(name, value));
        }
    }

    /// Marshal one child element with an unresolved declared type.
    pub fn marshal_element(
        &mut self,
        name: &QName,
        value: &Value,
        declared: &BindingTypeName,
        nillable: bool,
    ) -> Result<()> {
        match self.ctx.loader.binding_type(declared) {
            Some(bt) => self.marshal_node(name, value, &bt, nillable, false, false),
            None => self.unresolved(declared),
        }
    }

    /// Marshal one child element of a known declared type.
    pub fn marshal_resolved(
        &mut self,
        name: &QName,
        value: &Value,
        declared: &Arc<BindingType>,
        nillable: bool,
    ) -> Result<()> {
        self.marshal_node(name, value, declared, nillable, false, false)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn marshal_root(&mut self, element: &QName, value: &Value, declared: &BindingTypeName) -> Result<()> {
        let bt = self
            .ctx
            .loader
            .binding_type(declared)
            .ok_or_else(|| Error::UnresolvedType(declared.clone()))?;
        self.marshal_node(element, value, &bt, true, true, false)
    }

    fn marshal_detected(&mut self, value: &Value) -> Result<()> {
        let native = self.ctx.identify(value).ok_or_else(|| {
            Error::structural("cannot detect the native type of a null or list value", None)
        })?;
        let type_name = self
            .ctx
            .loader
            .type_for_native(&native)
            .ok_or_else(|| Error::UnresolvedNative(native.clone()))?;
        let bt = self
            .ctx
            .loader
            .binding_type(&type_name)
            .ok_or_else(|| Error::UnresolvedType(type_name.clone()))?;
        match self.ctx.loader.element_for_native(&native) {
            Some(element) => self.marshal_node(&element, value, &bt, true, true, false),
            None => {
                let element = type_name.schema.clone();
                self.marshal_node(&element, value, &bt, true, true, true)
            }
        }
    }

    /// Type to marshal `value` with, and whether it needs an `xsi:type` marker.
    ///
    /// `Err` carries the runtime type when `value` is a structure that does
    /// not narrow the declared structure.
    fn effective_type(
        &self,
        value: &Value,
        declared: &Arc<BindingType>,
    ) -> std::result::Result<(Arc<BindingType>, bool), Arc<BindingType>> {
        let loader: &dyn BindingLoader = &self.ctx.loader;
        let base = match &declared.kind {
            BindingKind::Polymorphic { base: Some(base), .. } => loader.binding_type(base),
            _ => None,
        };
        let runtime = self.ctx.identify(value);
        let differs = runtime.as_ref().is_some_and(|r| *r != declared.name.native);
        if declared.is_polymorphic() || differs {
            let found = runtime
                .and_then(|r| loader.type_for_native(&r))
                .and_then(|n| loader.binding_type(&n));
            if let Some(found) = found {
                let is_base = base.as_ref().is_some_and(|b| b.name == found.name);
                if !is_base && found.name != declared.name {
                    if declared.admits(&found, loader) {
                        return Ok((found, true));
                    }
                    if matches!(declared.kind, BindingKind::ByName { .. }) {
                        return Err(found);
                    }
                }
            }
        }
        Ok(match base {
            Some(base) => (base, false),
            None => (declared.clone(), false),
        })
    }

    fn marshal_node(
        &mut self,
        name: &QName,
        value: &Value,
        declared: &Arc<BindingType>,
        nillable: bool,
        root: bool,
        force_marker: bool,
    ) -> Result<()> {
        if value.is_null() {
            if nillable || root {
                self.start(name.clone());
                self.add_attribute(QName::xsi("nil"), "true");
                self.end();
            }
            return Ok(());
        }

        let (effective, marker) = match self.effective_type(value, declared) {
            Ok(chosen) => chosen,
            Err(found) => {
                let message = format!("{}: {} does not narrow {}", name, found.name, declared.name);
                if root {
                    return Err(Error::structural(message, None));
                }
                self.report(Severity::Error, message);
                return Ok(());
            }
        };
        let Some(marshaller) = self.ctx.table.marshaller(&effective.name) else {
            if root {
                return Err(Error::UnresolvedType(effective.name.clone()));
            }
            return self.unresolved(&effective.name);
        };

        let mark = self.stream.len();
        self.start(name.clone());
        if marker || force_marker {
            let type_text = self.lexical_qname(&effective.name.schema);
            self.add_attribute(QName::xsi("type"), type_text);
        }
        if marshaller.is_simple() {
            match marshaller.print(value, self) {
                Ok(text) => self.characters(text),
                Err(e) => {
                    self.report(Severity::Error, format!("{}: {}", name, e));
                    if !root {
                        self.rollback(mark);
                        return Ok(());
                    }
                }
            }
        } else {
            marshaller.marshal_content(value, self)?;
        }
        self.end();
        Ok(())
    }

    fn lexical_qname(&mut self, name: &QName) -> String {
        let prefix = self.prefix_for_namespace(name.namespace());
        if prefix.is_empty() {
            name.local_part().to_string()
        } else {
            format!("{}:{}", prefix, name.local_part())
        }
    }

    fn current_start(&mut self) -> Option<&mut XmlEvent> {
        let index = *self.open.last()?;
        self.stream.events_mut().get_mut(index)
    }

    /// Opens `name`, declaring its namespace here unless already in scope so
    /// later `xsi:type` values and the writer agree on one prefix.
    fn start(&mut self, name: QName) {
        self.open.push(self.stream.len());
        self.scope.push(&[]);
        let namespace = name.namespace().to_string();
        self.stream.push(XmlEvent::start(name));
        self.prefix_for_namespace(&namespace);
    }

    fn end(&mut self) {
        let Some(index) = self.open.pop() else {
            return;
        };
        let name = match &self.stream.events()[index] {
            XmlEvent::StartElement { name, .. } => name.clone(),
            _ => return,
        };
        self.scope.pop();
        self.stream.push(XmlEvent::end(name));
    }

    /// Drop the element started at `mark` and everything after it.
    fn rollback(&mut self, mark: usize) {
        self.stream.truncate(mark);
        self.open.pop();
        self.scope.pop();
    }

    fn declare(&mut self, prefix: &str, uri: &str) {
        let decl = NamespaceDecl::new(prefix, uri);
        if let Some(XmlEvent::StartElement { namespaces, .. }) = self.current_start() {
            namespaces.push(decl.clone());
        }
        self.scope.declare(decl);
    }
}

impl PrefixResolver for MarshalResult<'_> {
    fn prefix_for_namespace(&mut self, namespace: &str) -> String {
        if namespace.is_empty() {
            return String::new();
        }
        if let Some(prefix) = self.scope.prefix_for(namespace).filter(|p| !p.is_empty()) {
            return prefix.to_string();
        }
        let preferred = match namespace {
            XSD_NS => Some(XSD_PREFIX),
            XSI_NS => Some(XSI_PREFIX),
            _ => None,
        }
        .filter(|p| self.scope.namespace_for_prefix(p).is_none());
        let prefix = match preferred {
            Some(p) => p.to_string(),
            None => loop {
                self.generated += 1;
                let candidate = format!("{}{}", GENERATED_PREFIX, self.generated);
                if self.scope.namespace_for_prefix(&candidate).is_none() {
                    break candidate;
                }
            },
        };
        self.declare(&prefix, namespace);
        prefix
    }
}
