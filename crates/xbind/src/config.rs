// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding runtime configuration.
//!
//! - **Level 1 (Static)**: well-known namespaces and bundle file layout.
//!   Never hardcode these URIs or file names elsewhere.
//! - **Level 2 (Context)**: [`ContextConfig`], fixed when a
//!   [`BindingContext`](crate::BindingContext) is built.
//!
//! Per-call settings live in [`XmlOptions`](crate::XmlOptions).

use crate::binding::BindingTypeName;

// =======================================================================
// Namespaces
// =======================================================================

/// XML Schema namespace (built-in types live here).
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace (`xsi:type`, `xsi:nil`).
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Preferred prefix when the writer has to declare [`XSD_NS`].
pub const XSD_PREFIX: &str = "xs";

/// Preferred prefix when the writer has to declare [`XSI_NS`].
pub const XSI_PREFIX: &str = "xsi";

/// Stem for generated prefixes (`ns1`, `ns2`, ...).
pub const GENERATED_PREFIX: &str = "ns";

// =======================================================================
// Bundle layout
// =======================================================================

/// Binding descriptor file inside a bundle directory.
pub const BINDING_FILE_NAME: &str = "binding-config.json";

/// Directory holding schema documents inside a bundle directory.
pub const SCHEMA_DIR: &str = "schemas";

/// Extension of schema documents picked up from [`SCHEMA_DIR`].
pub const SCHEMA_EXTENSION: &str = "xsd";

/// Optional manifest listing compiled (host-registered) types.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Encoding used when neither a BOM nor an option says otherwise.
pub const DEFAULT_ENCODING: &str = "UTF-8";

// =======================================================================
// Context configuration
// =======================================================================

/// Settings fixed for the lifetime of a binding context.
#[derive(Debug, Clone, Default)]
pub struct ContextConfig {
    /// Fail the whole call when a child's binding type cannot be resolved,
    /// instead of reporting a diagnostic and leaving the field absent.
    /// Individual calls may override this through `XmlOptions`.
    pub strict_resolution: bool,
    /// Root type used by `Unmarshaller::unmarshal` when the root element has
    /// neither an `xsi:type` marker nor a global element binding.
    pub default_root: Option<BindingTypeName>,
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_resolution(mut self, strict: bool) -> Self {
        self.strict_resolution = strict;
        self
    }

    pub fn with_default_root(mut self, root: BindingTypeName) -> Self {
        self.default_root = Some(root);
        self
    }
}
