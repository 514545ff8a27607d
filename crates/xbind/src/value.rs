// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native value model.
//!
//! [`Value`] is what the marshaller consumes and the unmarshaller produces.
//! Every non-null value knows its native type id ([`Value::native_type`]),
//! which is how the runtime detects when a value is narrower than the type
//! it was declared as.

use crate::binding::NativeTypeName;
use crate::codec::temporal::{XmlDate, XmlDateTime, XmlDuration, XmlTime};
use crate::qname::QName;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::collections::HashMap;

/// A native value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent or nil.
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    BigInt(BigInt),
    Decimal(BigDecimal),
    F32(f32),
    F64(f64),
    String(String),
    QName(QName),
    DateTime(XmlDateTime),
    Date(XmlDate),
    Time(XmlTime),
    Duration(XmlDuration),
    /// Ordered items of a list type or a repeated property.
    List(Vec<Value>),
    /// Instance of a by-name structure.
    Struct(StructValue),
}

impl Value {
    /// Native type id of this value, `None` for `Null` and `List`.
    pub fn native_type(&self) -> Option<NativeTypeName> {
        let id = match self {
            Value::Null | Value::List(_) => return None,
            Value::Struct(s) => return Some(s.type_name.clone()),
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::BigInt(_) => "BigInt",
            Value::Decimal(_) => "BigDecimal",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "String",
            Value::QName(_) => "QName",
            Value::DateTime(_) => "DateTime",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::Duration(_) => "Duration",
        };
        Some(NativeTypeName::new(id))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any fixed-width integer that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(i64::from(*v)),
            Value::I16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            Value::U8(v) => Some(i64::from(*v)),
            Value::U16(v) => Some(i64::from(*v)),
            Value::U32(v) => Some(i64::from(*v)),
            Value::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(f64::from(*v)),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    BigInt => BigInt,
    BigDecimal => Decimal,
    f32 => F32,
    f64 => F64,
    String => String,
    QName => QName,
    XmlDateTime => DateTime,
    XmlDate => Date,
    XmlTime => Time,
    XmlDuration => Duration,
    StructValue => Struct,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ----------------------------------------------------------------------------
// Structures
// ----------------------------------------------------------------------------

/// Instance of a by-name structure: a native type id plus named fields.
///
/// Equality treats a missing field and an explicit `Null` as the same.
#[derive(Debug, Clone)]
pub struct StructValue {
    type_name: NativeTypeName,
    fields: HashMap<String, Value>,
}

impl StructValue {
    pub fn new(type_name: impl Into<NativeTypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: HashMap::new(),
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Field value, `None` when never set.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn type_name(&self) -> &NativeTypeName {
        &self.type_name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        if self.type_name != other.type_name {
            return false;
        }
        let same = |a: &HashMap<String, Value>, b: &HashMap<String, Value>| {
            a.iter()
                .all(|(k, v)| b.get(k).map_or(v.is_null(), |w| w == v))
        };
        same(&self.fields, &other.fields) && same(&other.fields, &self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_type_ids() {
        assert_eq!(Value::I32(1).native_type().unwrap().as_str(), "i32");
        assert_eq!(
            Value::BigInt(BigInt::from(5)).native_type().unwrap().as_str(),
            "BigInt"
        );
        assert!(Value::Null.native_type().is_none());
        let s = StructValue::new("com.mytest.MyClass");
        assert_eq!(
            Value::Struct(s).native_type().unwrap().as_str(),
            "com.mytest.MyClass"
        );
    }

    #[test]
    fn missing_field_equals_null() {
        let a = StructValue::new("T").with("x", 1i32);
        let b = StructValue::new("T").with("x", 1i32).with("y", Value::Null);
        assert_eq!(a, b);
        let c = StructValue::new("T").with("x", 2i32);
        assert_ne!(a, c);
        assert_ne!(a, StructValue::new("U").with("x", 1i32));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::String("a".into()));
    }

    #[test]
    fn integer_accessor_widens() {
        assert_eq!(Value::U16(7).as_i64(), Some(7));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
        assert_eq!(Value::String("7".into()).as_i64(), None);
    }
}
