// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in bindings for the XML Schema primitives.

use super::{BindingEntry, BindingFile, BindingLoader, BindingType, BindingTypeName, FileBindingLoader, NativeTypeName};
use crate::codec::BUILTIN_PAIRS;
use crate::qname::QName;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

static BUILTIN_LOADER: OnceLock<Arc<FileBindingLoader>> = OnceLock::new();

/// Native id of the open polymorphic root (`xs:anyType`).
pub const ANY_NATIVE: &str = "Value";

/// Binding name of `xs:anyType`.
pub fn any_type_name() -> BindingTypeName {
    BindingTypeName::xsd(ANY_NATIVE, "anyType")
}

/// Descriptor holding one binding type per built-in pair, plus `xs:anyType`.
///
/// The first pair naming a native id (or a schema type) is flagged as its
/// default mapping.
pub fn builtin_binding_file() -> BindingFile {
    let mut file = BindingFile::new();
    let mut seen_native = HashSet::new();
    let mut seen_schema = HashSet::new();
    for (space, repr) in BUILTIN_PAIRS {
        let name = BindingTypeName::new(repr.type_name(), space.qname());
        let mut entry = BindingEntry::new(BindingType::builtin(name, *space));
        entry.native_default = seen_native.insert(repr.type_name());
        entry.schema_default = seen_schema.insert(space.xsd_name());
        file.add_entry(entry);
    }
    file.add_entry(
        BindingEntry::new(BindingType::polymorphic(any_type_name(), None, Vec::new()))
            .native_default()
            .schema_default(),
    );
    file
}

/// Process-wide loader for the built-in bindings.
///
/// Cheap to construct: every instance shares one index, built on first use.
#[derive(Debug, Clone)]
pub struct BuiltinBindingLoader {
    inner: Arc<FileBindingLoader>,
}

impl BuiltinBindingLoader {
    pub fn new() -> Self {
        let inner = BUILTIN_LOADER
            .get_or_init(|| {
                let file = builtin_binding_file();
                log::debug!(
                    "[BuiltinBindingLoader] indexed {} built-in binding types",
                    file.bindings.len()
                );
                Arc::new(FileBindingLoader::new(&file))
            })
            .clone();
        Self { inner }
    }
}

impl Default for BuiltinBindingLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingLoader for BuiltinBindingLoader {
    fn binding_type(&self, name: &BindingTypeName) -> Option<Arc<BindingType>> {
        self.inner.binding_type(name)
    }

    fn type_for_native(&self, native: &NativeTypeName) -> Option<BindingTypeName> {
        self.inner.type_for_native(native)
    }

    fn type_for_schema(&self, schema: &QName) -> Option<BindingTypeName> {
        self.inner.type_for_schema(schema)
    }

    fn type_for_element(&self, element: &QName) -> Option<BindingTypeName> {
        self.inner.type_for_element(element)
    }

    fn element_for_native(&self, native: &NativeTypeName) -> Option<QName> {
        self.inner.element_for_native(native)
    }
}
