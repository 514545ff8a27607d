// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Bundle, BundleManifest, SchemaDocument, SealedBundle};
use crate::binding::{BindingFile, NativeTypeName};
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Write side of a bundle, used while producing one.
pub trait BundleWriter {
    /// Replace the binding descriptor.
    fn set_binding_descriptor(&mut self, descriptor: BindingFile) -> Result<()>;

    /// Add a schema document under `path` (relative to `schemas/`).
    fn add_schema_document(&mut self, document: &str, path: &Path) -> Result<()>;

    fn add_compiled_type(&mut self, native: NativeTypeName) -> Result<()>;

    /// Sink for generated native source of `native`.
    fn native_source_output(&mut self, native: &NativeTypeName) -> Result<Box<dyn Write>>;

    /// No writes are accepted afterwards.
    fn close(&mut self);
}

/// Bundle held in memory.
///
/// Usable as a [`Bundle`] directly, or turned into a [`SealedBundle`] for
/// persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    descriptor: BindingFile,
    schemas: Vec<SchemaDocument>,
    manifest: BundleManifest,
    closed: bool,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn seal(self) -> SealedBundle {
        SealedBundle::from_parts(self.descriptor, self.schemas, self.manifest)
    }

    fn writable(&self) -> Result<()> {
        if self.closed {
            Err(Error::BundleClosed)
        } else {
            Ok(())
        }
    }
}

impl BundleWriter for MemoryBundle {
    fn set_binding_descriptor(&mut self, descriptor: BindingFile) -> Result<()> {
        self.writable()?;
        self.descriptor = descriptor;
        Ok(())
    }

    fn add_schema_document(&mut self, document: &str, path: &Path) -> Result<()> {
        self.writable()?;
        let doc = SchemaDocument::parse(path, document)?;
        self.schemas.retain(|d| d.path() != doc.path());
        self.schemas.push(doc);
        Ok(())
    }

    fn add_compiled_type(&mut self, native: NativeTypeName) -> Result<()> {
        self.writable()?;
        if !self.manifest.compiled_types.contains(&native) {
            self.manifest.compiled_types.push(native);
        }
        Ok(())
    }

    fn native_source_output(&mut self, _native: &NativeTypeName) -> Result<Box<dyn Write>> {
        Err(Error::Unsupported("native source output from an in-memory bundle"))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

impl Bundle for MemoryBundle {
    fn location(&self) -> Option<&Path> {
        None
    }

    fn binding_descriptor(&self) -> &BindingFile {
        &self.descriptor
    }

    fn schema_documents(&self) -> &[SchemaDocument] {
        &self.schemas
    }

    fn compiled_types(&self) -> &[NativeTypeName] {
        &self.manifest.compiled_types
    }
}
