// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding bundles.
//!
//! A bundle is the unit of binding metadata a context is built from: one
//! binding descriptor, the schema documents it was compiled from, and an
//! optional manifest of compiled types whose converters the host registers
//! on the factory.
//!
//! On disk a bundle is a directory:
//!
//! ```text
//! <bundle>/
//!   binding-config.json   binding descriptor (exactly one)
//!   manifest.json         compiled type ids (optional)
//!   schemas/*.xsd         schema documents (optional)
//! ```
//!
//! [`SealedBundle`] is the read-only form; [`MemoryBundle`] is the writer
//! used by tooling that produces bundles.

mod memory;
mod sealed;

pub use memory::{BundleWriter, MemoryBundle};
pub use sealed::SealedBundle;

use crate::binding::{BindingFile, NativeTypeName};
use crate::config::XSD_NS;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Read-only view of a bundle.
pub trait Bundle: Send + Sync + fmt::Debug {
    /// Where the bundle was loaded from; `None` for in-memory bundles.
    fn location(&self) -> Option<&Path>;

    fn binding_descriptor(&self) -> &BindingFile;

    fn schema_documents(&self) -> &[SchemaDocument];

    /// Native type ids whose converters are supplied by the host.
    fn compiled_types(&self) -> &[NativeTypeName];
}

// ---------------------------------------------------------------------------
// Schema documents
// ---------------------------------------------------------------------------

/// A schema document carried by a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    path: PathBuf,
    target_namespace: Option<String>,
    text: String,
}

impl SchemaDocument {
    /// Check `text` is a well-formed schema document (`xs:schema` root).
    ///
    /// `path` is relative to the bundle's `schemas/` directory.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let text = text.into();
        check_relative(&path)?;

        let doc = roxmltree::Document::parse(&text).map_err(|e| {
            Error::Descriptor(format!("failed to parse schema {}: {}", path.display(), e))
        })?;
        let root = doc.root_element();
        if root.tag_name().namespace() != Some(XSD_NS) || root.tag_name().name() != "schema" {
            return Err(Error::Descriptor(format!(
                "{} is not a schema document (root element <{}>)",
                path.display(),
                root.tag_name().name()
            )));
        }
        let target_namespace = root.attribute("targetNamespace").map(str::to_string);

        Ok(Self {
            path,
            target_namespace,
            text,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Schema paths must stay inside `schemas/`.
fn check_relative(path: &Path) -> Result<()> {
    let inside = path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if inside {
        Ok(())
    } else {
        Err(Error::Descriptor(format!(
            "schema path {} must be relative to the bundle",
            path.display()
        )))
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// `manifest.json`: compiled types shipped with the bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    #[serde(default)]
    pub compiled_types: Vec<NativeTypeName>,
}

impl BundleManifest {
    pub fn is_empty(&self) -> bool {
        self.compiled_types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:test"/>"#;

    #[test]
    fn schema_document_records_target_namespace() {
        let doc = SchemaDocument::parse("test.xsd", SCHEMA).unwrap();
        assert_eq!(doc.target_namespace(), Some("urn:test"));
        assert_eq!(doc.path(), Path::new("test.xsd"));
    }

    #[test]
    fn schema_document_requires_schema_root() {
        let err = SchemaDocument::parse("bad.xsd", "<root/>").unwrap_err();
        assert!(err.to_string().contains("not a schema document"));
        assert!(SchemaDocument::parse("broken.xsd", "<xs:schema").is_err());
    }

    #[test]
    fn schema_path_must_stay_inside_bundle() {
        assert!(SchemaDocument::parse("../escape.xsd", SCHEMA).is_err());
        assert!(SchemaDocument::parse("/abs.xsd", SCHEMA).is_err());
        assert!(SchemaDocument::parse("nested/ok.xsd", SCHEMA).is_ok());
    }
}
