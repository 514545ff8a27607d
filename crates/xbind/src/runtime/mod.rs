// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime binding type table and converters.
//!
//! Every binding type used by a context gets one [`ConverterPair`] in that
//! context's [`RuntimeBindingTypeTable`]. Converters work against the
//! session objects ([`MarshalResult`], [`UnmarshalResult`]), which own the
//! event stream, namespace scope and diagnostics.

mod converters;
mod table;

pub use converters::{
    converter_for, ByNameConverter, ListConverter, PolymorphicConverter, PrimitiveConverter,
};
pub use table::RuntimeBindingTypeTable;

use crate::binding::BindingLoader;
use crate::codec::ConversionError;
use crate::error::Result;
use crate::marshal::{MarshalResult, Severity, UnmarshalResult};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Native value to wire events for one binding type.
pub trait TypeMarshaller: Send + Sync + fmt::Debug {
    /// Simple types print to one text value and may be used as attributes.
    fn is_simple(&self) -> bool;

    /// Lexical text of a simple value.
    fn print(&self, value: &Value, result: &mut MarshalResult<'_>) -> std::result::Result<String, ConversionError>;

    /// Attributes and children of a complex value, written into the element
    /// currently open on `result`.
    fn marshal_content(&self, value: &Value, result: &mut MarshalResult<'_>) -> Result<()> {
        match self.print(value, result) {
            Ok(text) => result.characters(text),
            Err(e) => result.report(Severity::Error, e.message),
        }
        Ok(())
    }
}

/// Wire events to a native value for one binding type.
pub trait TypeUnmarshaller: Send + Sync + fmt::Debug {
    /// Convert the content of the current element. Called after its start
    /// event; stops before its end event.
    fn unmarshal(&self, result: &mut UnmarshalResult<'_>) -> Result<Value>;

    /// Convert an attribute value.
    fn unmarshal_attribute(
        &self,
        lexical: &str,
        result: &mut UnmarshalResult<'_>,
    ) -> std::result::Result<Value, ConversionError>;

    /// Value substituted when content cannot be converted.
    fn default_value(&self) -> Value {
        Value::Null
    }

    /// One-time setup with the owning table and loader.
    fn initialize(&self, _table: &RuntimeBindingTypeTable, _loader: &dyn BindingLoader) {}
}

/// Marshaller and unmarshaller for one binding type.
#[derive(Debug, Clone)]
pub struct ConverterPair {
    pub marshaller: Arc<dyn TypeMarshaller>,
    pub unmarshaller: Arc<dyn TypeUnmarshaller>,
}

impl ConverterPair {
    pub fn new(marshaller: Arc<dyn TypeMarshaller>, unmarshaller: Arc<dyn TypeUnmarshaller>) -> Self {
        Self {
            marshaller,
            unmarshaller,
        }
    }

    /// Pair backed by one object implementing both directions.
    pub fn shared<C>(converter: C) -> Self
    where
        C: TypeMarshaller + TypeUnmarshaller + 'static,
    {
        let converter = Arc::new(converter);
        Self {
            marshaller: converter.clone(),
            unmarshaller: converter,
        }
    }
}
