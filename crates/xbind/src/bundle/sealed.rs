// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Bundle, BundleManifest, SchemaDocument};
use crate::binding::{BindingFile, NativeTypeName};
use crate::config::{BINDING_FILE_NAME, MANIFEST_FILE_NAME, SCHEMA_DIR, SCHEMA_EXTENSION};
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SealedBundle
// ---------------------------------------------------------------------------

/// Immutable bundle, loaded from disk or sealed from a [`MemoryBundle`].
///
/// [`MemoryBundle`]: super::MemoryBundle
#[derive(Debug, Clone)]
pub struct SealedBundle {
    location: Option<PathBuf>,
    descriptor: BindingFile,
    schemas: Vec<SchemaDocument>,
    manifest: BundleManifest,
}

impl SealedBundle {
    pub fn from_parts(
        descriptor: BindingFile,
        schemas: Vec<SchemaDocument>,
        manifest: BundleManifest,
    ) -> Self {
        Self {
            location: None,
            descriptor,
            schemas,
            manifest,
        }
    }

    /// Load a bundle from a directory, or from its descriptor file.
    ///
    /// Every failure is reported as [`Error::BundleLoad`] naming `location`.
    pub fn load(location: impl AsRef<Path>) -> Result<Self> {
        let location = location.as_ref();
        let (dir, descriptor_path) = if location.is_file() {
            let dir = location.parent().unwrap_or(Path::new(".")).to_path_buf();
            (dir, location.to_path_buf())
        } else {
            (location.to_path_buf(), location.join(BINDING_FILE_NAME))
        };

        if !descriptor_path.is_file() {
            return Err(Error::bundle_load(
                location,
                format!("no binding descriptor at {}", descriptor_path.display()),
            ));
        }
        let descriptor =
            BindingFile::load(&descriptor_path).map_err(|e| Error::bundle_load(location, e))?;
        let schemas = load_schemas(&dir.join(SCHEMA_DIR)).map_err(|e| Error::bundle_load(location, e))?;
        let manifest =
            load_manifest(&dir.join(MANIFEST_FILE_NAME)).map_err(|e| Error::bundle_load(location, e))?;

        log::debug!(
            "[SealedBundle] loaded {} ({} binding types, {} schemas, {} compiled types)",
            location.display(),
            descriptor.bindings.len(),
            schemas.len(),
            manifest.compiled_types.len()
        );

        Ok(Self {
            location: Some(location.to_path_buf()),
            descriptor,
            schemas,
            manifest,
        })
    }

    /// Persist the bundle as a directory, replacing existing files.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        create_dir(dir)?;
        self.descriptor.save(&dir.join(BINDING_FILE_NAME))?;

        if !self.schemas.is_empty() {
            let schema_dir = dir.join(SCHEMA_DIR);
            for doc in &self.schemas {
                let path = schema_dir.join(doc.path());
                if let Some(parent) = path.parent() {
                    create_dir(parent)?;
                }
                fs::write(&path, doc.text()).map_err(|e| io_error("failed to write", &path, e))?;
            }
        }

        if !self.manifest.is_empty() {
            let path = dir.join(MANIFEST_FILE_NAME);
            let json = serde_json::to_string_pretty(&self.manifest)?;
            fs::write(&path, json).map_err(|e| io_error("failed to write", &path, e))?;
        }
        Ok(())
    }

    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }
}

impl Bundle for SealedBundle {
    fn location(&self) -> Option<&Path> {
        self.location.as_deref()
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

// ---------------------------------------------------------------------------
// Loading helpers
// ---------------------------------------------------------------------------

/// Schema documents under `dir`, recursively, in path order.
fn load_schemas(dir: &Path) -> Result<Vec<SchemaDocument>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_schema_files(dir, &mut files)?;
    }
    files.sort();

    files
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path).map_err(|e| io_error("failed to read", &path, e))?;
            let relative = path.strip_prefix(dir).unwrap_or(&path).to_path_buf();
            SchemaDocument::parse(relative, text)
        })
        .collect()
}

fn collect_schema_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| io_error("failed to read directory", dir, e))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_schema_files(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(SCHEMA_EXTENSION) {
            out.push(path);
        }
    }
    Ok(())
}

fn load_manifest(path: &Path) -> Result<BundleManifest> {
    if !path.is_file() {
        return Ok(BundleManifest::default());
    }
    let json = fs::read_to_string(path).map_err(|e| io_error("failed to read", path, e))?;
    serde_json::from_str(&json).map_err(|e| {
        Error::Descriptor(format!("failed to deserialize {}: {}", path.display(), e))
    })
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| io_error("failed to create directory", dir, e))
}

fn io_error(action: &str, path: &Path, e: io::Error) -> Error {
    Error::Io(io::Error::new(
        e.kind(),
        format!("{} {}: {}", action, path.display(), e),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingType, BindingTypeName, Property};
    use crate::qname::QName;

    fn descriptor() -> BindingFile {
        let point = BindingTypeName::new("demo.Point", QName::new("urn:demo", "Point"));
        let mut file = BindingFile::new();
        file.add_binding_type(BindingType::by_name(
            point.clone(),
            vec![Property::element(
                "x",
                QName::new("urn:demo", "x"),
                BindingTypeName::xsd("i32", "int"),
            )],
        ));
        file.add_element(QName::new("urn:demo", "point"), point);
        file
    }

    #[test]
    fn write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let schema = SchemaDocument::parse(
            "demo.xsd",
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:demo"/>"#,
        )
        .unwrap();
        let manifest = BundleManifest {
            compiled_types: vec![NativeTypeName::new("demo.Point")],
        };
        SealedBundle::from_parts(descriptor(), vec![schema.clone()], manifest.clone())
            .write_to_dir(dir.path())
            .unwrap();

        let loaded = SealedBundle::load(dir.path()).unwrap();
        assert_eq!(loaded.location(), Some(dir.path()));
        assert_eq!(loaded.binding_descriptor(), &descriptor());
        assert_eq!(loaded.schema_documents(), &[schema]);
        assert_eq!(loaded.manifest(), &manifest);
    }

    #[test]
    fn load_from_descriptor_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BINDING_FILE_NAME);
        descriptor().save(&path).unwrap();
        let loaded = SealedBundle::load(&path).unwrap();
        assert_eq!(loaded.binding_descriptor().bindings.len(), 1);
        assert!(loaded.schema_documents().is_empty());
        assert!(loaded.compiled_types().is_empty());
    }

    #[test]
    fn load_failures_name_the_location() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nowhere");
        match SealedBundle::load(&missing) {
            Err(Error::BundleLoad { location, .. }) => assert_eq!(location, missing),
            other => panic!("unexpected: {:?}", other),
        }

        fs::write(dir.path().join(BINDING_FILE_NAME), "{ not json").unwrap();
        match SealedBundle::load(dir.path()) {
            Err(Error::BundleLoad { location, reason }) => {
                assert_eq!(location, dir.path());
                assert!(reason.contains(BINDING_FILE_NAME));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn bad_schema_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        descriptor().save(&dir.path().join(BINDING_FILE_NAME)).unwrap();
        fs::create_dir_all(dir.path().join(SCHEMA_DIR)).unwrap();
        fs::write(dir.path().join(SCHEMA_DIR).join("x.xsd"), "<notschema/>").unwrap();
        assert!(matches!(
            SealedBundle::load(dir.path()),
            Err(Error::BundleLoad { .. })
        ));
    }
}
