// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding descriptors (`binding-config.json`) and the loader over one.

use super::{BindingLoader, BindingType, BindingTypeName, NativeTypeName};
use crate::error::{Error, Result};
use crate::qname::QName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// One binding type in a descriptor, with its default-mapping flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingEntry {
    #[serde(flatten)]
    pub binding_type: BindingType,
    /// This type is the default binding for its native id.
    #[serde(default)]
    pub native_default: bool,
    /// This type is the default binding for its schema type.
    #[serde(default)]
    pub schema_default: bool,
}

impl BindingEntry {
    pub fn new(binding_type: BindingType) -> Self {
        Self {
            binding_type,
            native_default: false,
            schema_default: false,
        }
    }

    pub fn native_default(mut self) -> Self {
        self.native_default = true;
        self
    }

    pub fn schema_default(mut self) -> Self {
        self.schema_default = true;
        self
    }
}

/// Global element bound to a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementBinding {
    pub element: QName,
    #[serde(rename = "type")]
    pub type_name: BindingTypeName,
}

/// A binding descriptor: binding types plus global element bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingFile {
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
    #[serde(default)]
    pub elements: Vec<ElementBinding>,
}

impl BindingFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binding_type(&mut self, binding_type: BindingType) {
        self.bindings.push(BindingEntry::new(binding_type));
    }

    pub fn add_entry(&mut self, entry: BindingEntry) {
        self.bindings.push(entry);
    }

    /// Bind a global element to a type.
    pub fn add_element(&mut self, element: QName, type_name: BindingTypeName) {
        self.elements.push(ElementBinding { element, type_name });
    }

    pub fn binding_types(&self) -> impl Iterator<Item = &BindingType> {
        self.bindings.iter().map(|e| &e.binding_type)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a descriptor file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            Error::Descriptor(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            Error::Descriptor(format!("failed to deserialize {}: {}", path.display(), e))
        })
    }

    /// Write a descriptor file, replacing any existing one.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|e| {
            Error::Descriptor(format!("failed to write {}: {}", path.display(), e))
        })
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Indexed, immutable view over one [`BindingFile`].
///
/// Within one descriptor the first entry wins. Default mappings prefer
/// flagged entries and otherwise fall back to the first entry with a
/// matching native id / schema type.
#[derive(Debug, Default)]
pub struct FileBindingLoader {
    types: HashMap<BindingTypeName, Arc<BindingType>>,
    native_defaults: HashMap<NativeTypeName, BindingTypeName>,
    schema_defaults: HashMap<QName, BindingTypeName>,
    elements: HashMap<QName, BindingTypeName>,
    element_for_native: HashMap<NativeTypeName, QName>,
}

impl FileBindingLoader {
    pub fn new(file: &BindingFile) -> Self {
        let mut loader = FileBindingLoader::default();

        for entry in &file.bindings {
            let bt = &entry.binding_type;
            loader
                .types
                .entry(bt.name.clone())
                .or_insert_with(|| Arc::new(bt.clone()));
            if entry.native_default {
                loader
                    .native_defaults
                    .entry(bt.name.native.clone())
                    .or_insert_with(|| bt.name.clone());
            }
            if entry.schema_default {
                loader
                    .schema_defaults
                    .entry(bt.name.schema.clone())
                    .or_insert_with(|| bt.name.clone());
            }
        }
        for bt in file.binding_types() {
            loader
                .native_defaults
                .entry(bt.name.native.clone())
                .or_insert_with(|| bt.name.clone());
            loader
                .schema_defaults
                .entry(bt.name.schema.clone())
                .or_insert_with(|| bt.name.clone());
        }

        for binding in &file.elements {
            loader
                .elements
                .entry(binding.element.clone())
                .or_insert_with(|| binding.type_name.clone());
            loader
                .element_for_native
                .entry(binding.type_name.native.clone())
                .or_insert_with(|| binding.element.clone());
        }
        loader
    }

    /// Number of distinct binding types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl BindingLoader for FileBindingLoader {
    fn binding_type(&self, name: &BindingTypeName) -> Option<Arc<BindingType>> {
        self.types.get(name).cloned()
    }

    fn type_for_native(&self, native: &NativeTypeName) -> Option<BindingTypeName> {
        self.native_defaults.get(native).cloned()
    }

    fn type_for_schema(&self, schema: &QName) -> Option<BindingTypeName> {
        self.schema_defaults.get(schema).cloned()
    }

    fn type_for_element(&self, element: &QName) -> Option<BindingTypeName> {
        self.elements.get(element).cloned()
    }

    fn element_for_native(&self, native: &NativeTypeName) -> Option<QName> {
        self.element_for_native.get(native).cloned()
    }
}
