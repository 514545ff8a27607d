// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-typed XML data binding runtime.
//!
//! Converts native values to and from XML documents according to binding
//! metadata compiled from XML Schema.
//!
//! # Features
//!
//! - **Primitive codecs**: every XML Schema built-in primitive, with
//!   several native representations per lexical space
//! - **Binding types**: named structures, wrapped lists and polymorphic
//!   roots with `xsi:type` substitution
//! - **Bundles**: binding descriptors loaded from directories, chained with
//!   first-match precedence
//! - **Sessions**: single-use marshallers / unmarshallers that report
//!   recoverable problems as diagnostics instead of failing
//!
//! # Architecture
//!
//! ```text
//!   BindingContextFactory
//!        |  bundles (in order) + built-ins
//!        v
//!   BindingContext  (loader chain + runtime type table, shared)
//!        |
//!        +--> Marshaller   Value ---> EventStream / bytes
//!        +--> Unmarshaller EventStream / bytes ---> Value
//! ```
//!
//! # Example
//!
//! ```
//! use xbind::binding::BindingTypeName;
//! use xbind::qname::QName;
//! use xbind::{BindingContextFactory, Value, XmlOptions};
//!
//! let context = BindingContextFactory::new_instance().create_binding_context().unwrap();
//! let int = BindingTypeName::xsd("i32", "int");
//!
//! let stream = context
//!     .create_marshaller()
//!     .marshal_type(&Value::I32(42), &QName::unqualified("n"), &int.schema, &int.native, &XmlOptions::new())
//!     .unwrap();
//! assert_eq!(stream.to_xml_string().unwrap(), "<n>42</n>");
//!
//! let back = context
//!     .create_unmarshaller()
//!     .unmarshal_type(&stream, &int.schema, &int.native, &XmlOptions::new())
//!     .unwrap();
//! assert_eq!(back, Value::I32(42));
//! ```

pub mod binding;
pub mod bundle;
pub mod codec;
pub mod config;
pub mod marshal;
pub mod qname;
pub mod runtime;
pub mod wire;

mod context;
mod error;
mod value;

pub use config::ContextConfig;
pub use context::{BindingContext, BindingContextFactory, TypeIdentifier};
pub use error::{Error, Result};
pub use marshal::{
    Diagnostic, DiagnosticCollector, ErrorListener, MarshalResult, Marshaller, SessionState,
    Severity, UnmarshalResult, Unmarshaller, XmlOptions,
};
pub use value::{StructValue, Value};
pub use wire::{CharacterEncoding, EventStream, XmlEvent};
