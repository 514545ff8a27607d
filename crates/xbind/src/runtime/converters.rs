// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converters for each binding kind.

use super::{ConverterPair, RuntimeBindingTypeTable, TypeMarshaller, TypeUnmarshaller};
use crate::binding::{BindingKind, BindingLoader, BindingType};
use crate::codec::{default_repr, describe, ConversionError, NativeRepr, PrimitiveCodec};
use crate::error::Result;
use crate::marshal::{MarshalResult, Severity, UnmarshalResult};
use crate::value::{StructValue, Value};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Build the converters for a binding type.
pub fn converter_for(binding: &Arc<BindingType>) -> ConverterPair {
    match &binding.kind {
        BindingKind::Builtin { lexical } => {
            let repr = NativeRepr::from_type_name(binding.name.native.as_str())
                .unwrap_or_else(|| default_repr(*lexical));
            ConverterPair::shared(PrimitiveConverter::new(PrimitiveCodec::new(*lexical, repr)))
        }
        BindingKind::ByName { .. } => ConverterPair::shared(ByNameConverter::new(binding.clone())),
        BindingKind::List { .. } => ConverterPair::shared(ListConverter::new(binding.clone())),
        BindingKind::Polymorphic { .. } => {
            ConverterPair::shared(PolymorphicConverter::new(binding.clone()))
        }
    }
}

// ============================================================================
// Primitive
// ============================================================================

/// Text content in one built-in lexical space.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveConverter {
    codec: PrimitiveCodec,
}

impl PrimitiveConverter {
    pub fn new(codec: PrimitiveCodec) -> Self {
        Self { codec }
    }
}

impl TypeMarshaller for PrimitiveConverter {
    fn is_simple(&self) -> bool {
        true
    }

    fn print(&self, value: &Value, result: &mut MarshalResult<'_>) -> std::result::Result<String, ConversionError> {
        self.codec.print(value, result)
    }
}

impl TypeUnmarshaller for PrimitiveConverter {
    fn unmarshal(&self, result: &mut UnmarshalResult<'_>) -> Result<Value> {
        let text = result.collect_text();
        let parsed = self.codec.parse(&text, result.namespaces());
        match parsed {
            Ok(value) => Ok(value),
            Err(e) => {
                result.report(Severity::Error, e.message);
                Ok(self.default_value())
            }
        }
    }

    fn unmarshal_attribute(
        &self,
        lexical: &str,
        result: &mut UnmarshalResult<'_>,
    ) -> std::result::Result<Value, ConversionError> {
        self.codec.parse(lexical, result.namespaces())
    }

    fn default_value(&self) -> Value {
        self.codec.repr().default_value()
    }
}

// ============================================================================
// By-name structure
// ============================================================================

/// Structure with named properties.
///
/// Property binding types are resolved once, on initialization or first use.
#[derive(Debug)]
pub struct ByNameConverter {
    binding: Arc<BindingType>,
    property_types: OnceLock<Vec<Option<Arc<BindingType>>>>,
}

impl ByNameConverter {
    pub fn new(binding: Arc<BindingType>) -> Self {
        Self {
            binding,
            property_types: OnceLock::new(),
        }
    }

    fn property_types(&self, loader: &dyn BindingLoader) -> &[Option<Arc<BindingType>>] {
        self.property_types.get_or_init(|| {
            self.binding
                .properties()
                .iter()
                .map(|p| loader.binding_type(&p.type_name))
                .collect()
        })
    }
}

impl TypeMarshaller for ByNameConverter {
    fn is_simple(&self) -> bool {
        false
    }

    fn print(&self, value: &Value, _result: &mut MarshalResult<'_>) -> std::result::Result<String, ConversionError> {
        Err(ConversionError::new(format!(
            "{} has no simple lexical form ({} given)",
            self.binding.name,
            describe(value)
        )))
    }

    fn marshal_content(&self, value: &Value, result: &mut MarshalResult<'_>) -> Result<()> {
        let Value::Struct(fields) = value else {
            result.report(
                Severity::Error,
                format!("expected a structure for {}, found {}", self.binding.name, describe(value)),
            );
            return Ok(());
        };
        let props = self.binding.properties();
        let types = self.property_types(result.loader());

        for (prop, bt) in props.iter().zip(types).filter(|(p, _)| p.attribute) {
            let v = fields.get(&prop.name).unwrap_or(&Value::Null);
            if v.is_null() {
                continue;
            }
            let Some(bt) = bt else {
                result.unresolved(&prop.type_name)?;
                continue;
            };
            let Some(marshaller) = result.table().marshaller(&bt.name) else {
                result.unresolved(&bt.name)?;
                continue;
            };
            if !marshaller.is_simple() {
                result.report(
                    Severity::Error,
                    format!("attribute {} has complex type {}", prop.qname, bt.name),
                );
                continue;
            }
            match marshaller.print(v, result) {
                Ok(text) => result.add_attribute(prop.qname.clone(), text),
                Err(e) => result.report(Severity::Error, format!("attribute {}: {}", prop.qname, e)),
            }
        }

        for (prop, bt) in props.iter().zip(types).filter(|(p, _)| !p.attribute) {
            let v = fields.get(&prop.name).unwrap_or(&Value::Null);
            let Some(bt) = bt else {
                if !v.is_null() {
                    result.unresolved(&prop.type_name)?;
                }
                continue;
            };
            if prop.multiple {
                match v {
                    Value::Null => {}
                    Value::List(items) => {
                        for (index, item) in items.iter().enumerate() {
                            if item.is_null() && !prop.nillable {
                                result.report(
                                    Severity::Error,
                                    format!("property {} item {} is null and not nillable; dropped", prop.name, index),
                                );
                                continue;
                            }
                            result.marshal_resolved(&prop.qname, item, bt, prop.nillable)?;
                        }
                    }
                    other => result.report(
                        Severity::Error,
                        format!("property {} expects a list, found {}", prop.name, describe(other)),
                    ),
                }
            } else if !v.is_null() || prop.nillable {
                result.marshal_resolved(&prop.qname, v, bt, prop.nillable)?;
            }
        }
        Ok(())
    }
}

impl TypeUnmarshaller for ByNameConverter {
    fn unmarshal(&self, result: &mut UnmarshalResult<'_>) -> Result<Value> {
        let props = self.binding.properties();
        let types = self.property_types(result.loader());
        let mut out = StructValue::new(self.binding.name.native.clone());

        for (prop, bt) in props.iter().zip(types).filter(|(p, _)| p.attribute) {
            let lexical = match result.attribute(&prop.qname) {
                Some(text) => text.to_string(),
                None => match &prop.default {
                    Some(default) => default.clone(),
                    None => continue,
                },
            };
            let Some(bt) = bt else {
                result.unresolved(&prop.type_name)?;
                continue;
            };
            let Some(unmarshaller) = result.table().unmarshaller(&bt.name) else {
                result.unresolved(&bt.name)?;
                continue;
            };
            match unmarshaller.unmarshal_attribute(&lexical, result) {
                Ok(v) => out.set(prop.name.clone(), v),
                Err(e) => {
                    result.report(Severity::Error, format!("attribute {}: {}", prop.qname, e));
                    out.set(prop.name.clone(), unmarshaller.default_value());
                }
            }
        }

        let mut repeated: HashMap<usize, Vec<Value>> = props
            .iter()
            .enumerate()
            .filter(|(_, p)| p.multiple && !p.attribute)
            .map(|(i, _)| (i, Vec::new()))
            .collect();

        while let Some(child) = result.peek_child() {
            let found = props
                .iter()
                .enumerate()
                .find(|(_, p)| !p.attribute && p.qname == child);
            let Some((index, prop)) = found else {
                result.report(
                    Severity::Warning,
                    format!("unexpected element {} in {}", child, self.binding.name),
                );
                result.skip_element();
                continue;
            };
            let value = match &types[index] {
                Some(bt) => result.unmarshal_resolved(bt)?,
                None => {
                    result.unresolved(&prop.type_name)?;
                    result.skip_element();
                    continue;
                }
            };
            match repeated.get_mut(&index) {
                Some(items) => items.push(value),
                None => out.set(prop.name.clone(), value),
            }
        }

        for (index, items) in repeated {
            out.set(props[index].name.clone(), Value::List(items));
        }
        Ok(Value::Struct(out))
    }

    fn unmarshal_attribute(
        &self,
        _lexical: &str,
        _result: &mut UnmarshalResult<'_>,
    ) -> std::result::Result<Value, ConversionError> {
        Err(ConversionError::new(format!(
            "{} cannot be read from an attribute",
            self.binding.name
        )))
    }

    fn initialize(&self, _table: &RuntimeBindingTypeTable, loader: &dyn BindingLoader) {
        let unresolved = self.property_types(loader).iter().filter(|t| t.is_none()).count();
        if unresolved > 0 {
            log::warn!(
                "[ByNameConverter] {} has {} unresolved property type(s)",
                self.binding.name,
                unresolved
            );
        }
    }
}

// ============================================================================
// List
// ============================================================================

/// Wrapped list: one child element per item.
#[derive(Debug)]
pub struct ListConverter {
    binding: Arc<BindingType>,
    item_type: OnceLock<Option<Arc<BindingType>>>,
}

impl ListConverter {
    pub fn new(binding: Arc<BindingType>) -> Self {
        Self {
            binding,
            item_type: OnceLock::new(),
        }
    }

    fn item_type(&self, loader: &dyn BindingLoader) -> Option<&Arc<BindingType>> {
        self.item_type
            .get_or_init(|| match &self.binding.kind {
                BindingKind::List { item, .. } => loader.binding_type(item),
                _ => None,
            })
            .as_ref()
    }
}

impl TypeMarshaller for ListConverter {
    fn is_simple(&self) -> bool {
        false
    }

    fn print(&self, value: &Value, _result: &mut MarshalResult<'_>) -> std::result::Result<String, ConversionError> {
        Err(ConversionError::new(format!(
            "{} has no simple lexical form ({} given)",
            self.binding.name,
            describe(value)
        )))
    }

    fn marshal_content(&self, value: &Value, result: &mut MarshalResult<'_>) -> Result<()> {
        let BindingKind::List { item, item_element } = &self.binding.kind else {
            return Ok(());
        };
        let Value::List(items) = value else {
            result.report(
                Severity::Error,
                format!("expected a list for {}, found {}", self.binding.name, describe(value)),
            );
            return Ok(());
        };
        let Some(item_type) = self.item_type(result.loader()) else {
            if !items.is_empty() {
                result.unresolved(item)?;
            }
            return Ok(());
        };
        for v in items {
            result.marshal_resolved(item_element, v, item_type, true)?;
        }
        Ok(())
    }
}

impl TypeUnmarshaller for ListConverter {
    fn unmarshal(&self, result: &mut UnmarshalResult<'_>) -> Result<Value> {
        let BindingKind::List { item, item_element } = &self.binding.kind else {
            return Ok(Value::Null);
        };
        let item_type = self.item_type(result.loader()).cloned();
        let mut items = Vec::new();
        while let Some(child) = result.peek_child() {
            if &child != item_element {
                result.report(
                    Severity::Warning,
                    format!("unexpected element {} in list {}", child, self.binding.name),
                );
                result.skip_element();
                continue;
            }
            match &item_type {
                Some(bt) => items.push(result.unmarshal_resolved(bt)?),
                None => {
                    result.unresolved(item)?;
                    result.skip_element();
                }
            }
        }
        Ok(Value::List(items))
    }

    fn unmarshal_attribute(
        &self,
        _lexical: &str,
        _result: &mut UnmarshalResult<'_>,
    ) -> std::result::Result<Value, ConversionError> {
        Err(ConversionError::new(format!(
            "{} cannot be read from an attribute",
            self.binding.name
        )))
    }

    fn default_value(&self) -> Value {
        Value::List(Vec::new())
    }

    fn initialize(&self, _table: &RuntimeBindingTypeTable, loader: &dyn BindingLoader) {
        if self.item_type(loader).is_none() {
            log::warn!("[ListConverter] {} has an unresolved item type", self.binding.name);
        }
    }
}

// ============================================================================
// Polymorphic
// ============================================================================

/// Fallback for polymorphic types with no usable base.
///
/// Sessions substitute the runtime type (or the base) before reaching this
/// converter, so marshalling here means the value's type is unknown.
/// Content without a type marker is read as plain text.
#[derive(Debug)]
pub struct PolymorphicConverter {
    binding: Arc<BindingType>,
}

impl PolymorphicConverter {
    pub fn new(binding: Arc<BindingType>) -> Self {
        Self { binding }
    }
}

impl TypeMarshaller for PolymorphicConverter {
    fn is_simple(&self) -> bool {
        true
    }

    fn print(&self, value: &Value, _result: &mut MarshalResult<'_>) -> std::result::Result<String, ConversionError> {
        Err(ConversionError::new(format!(
            "no binding for a value of type {} under {}",
            describe(value),
            self.binding.name
        )))
    }
}

impl TypeUnmarshaller for PolymorphicConverter {
    fn unmarshal(&self, result: &mut UnmarshalResult<'_>) -> Result<Value> {
        Ok(Value::String(result.collect_text()))
    }

    fn unmarshal_attribute(
        &self,
        lexical: &str,
        _result: &mut UnmarshalResult<'_>,
    ) -> std::result::Result<Value, ConversionError> {
        Ok(Value::String(lexical.to_string()))
    }
}
