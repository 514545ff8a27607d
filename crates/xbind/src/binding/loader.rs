// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding loader trait and precedence chain.

use super::{BindingType, BindingTypeName, NativeTypeName};
use crate::qname::QName;
use std::fmt;
use std::sync::Arc;

/// Resolves binding types and default mappings over one binding source.
///
/// Loaders are immutable after construction and shared across threads.
pub trait BindingLoader: Send + Sync + fmt::Debug {
    /// Binding type registered under `name`.
    fn binding_type(&self, name: &BindingTypeName) -> Option<Arc<BindingType>>;

    /// Default binding for a native type id.
    fn type_for_native(&self, native: &NativeTypeName) -> Option<BindingTypeName>;

    /// Default binding for a schema type.
    fn type_for_schema(&self, schema: &QName) -> Option<BindingTypeName>;

    /// Binding of a global element.
    fn type_for_element(&self, element: &QName) -> Option<BindingTypeName>;

    /// Global element for a native type id.
    fn element_for_native(&self, native: &NativeTypeName) -> Option<QName>;
}

/// Ordered chain of loaders. Every lookup returns the answer of the first
/// loader that has one; definitions are never merged.
#[derive(Debug, Clone, Default)]
pub struct CompositeBindingLoader {
    loaders: Vec<Arc<dyn BindingLoader>>,
}

impl CompositeBindingLoader {
    pub fn new(loaders: Vec<Arc<dyn BindingLoader>>) -> Self {
        Self { loaders }
    }

    /// Loader that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl BindingLoader for CompositeBindingLoader {
    fn binding_type(&self, name: &BindingTypeName) -> Option<Arc<BindingType>> {
        self.loaders.iter().find_map(|l| l.binding_type(name))
    }

    fn type_for_native(&self, native: &NativeTypeName) -> Option<BindingTypeName> {
        self.loaders.iter().find_map(|l| l.type_for_native(native))
    }

    fn type_for_schema(&self, schema: &QName) -> Option<BindingTypeName> {
        self.loaders.iter().find_map(|l| l.type_for_schema(schema))
    }

    fn type_for_element(&self, element: &QName) -> Option<BindingTypeName> {
        self.loaders.iter().find_map(|l| l.type_for_element(element))
    }

    fn element_for_native(&self, native: &NativeTypeName) -> Option<QName> {
        self.loaders.iter().find_map(|l| l.element_for_native(native))
    }
}
