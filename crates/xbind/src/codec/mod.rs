// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive codec table.
//!
//! Stateless lexical <-> native conversions for the XML Schema built-in
//! primitives. A [`PrimitiveCodec`] pairs one [`LexicalSpace`] (what the text
//! looks like) with one [`NativeRepr`] (which [`Value`] variant holds it), so
//! several native representations can share the lexical logic of one schema
//! primitive.
//!
//! # Example
//!
//! ```
//! use xbind::codec::{LexicalSpace, NativeRepr, PrimitiveCodec};
//! use xbind::qname::NoNamespaces;
//! use xbind::Value;
//!
//! let codec = PrimitiveCodec::new(LexicalSpace::Int, NativeRepr::I32);
//! assert_eq!(codec.parse("55434535", &NoNamespaces).unwrap(), Value::I32(55434535));
//! ```

mod numeric;
pub mod temporal;
mod text;

use crate::qname::{NamespaceResolver, PrefixResolver, QName};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use temporal::{XmlDate, XmlDateTime, XmlDuration, XmlTime};
pub(crate) use text::resolve_qname;

/// Recoverable conversion failure (bad lexical form, out of range, wrong
/// value shape). Sessions turn these into diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConversionError {
    pub message: String,
}

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Lexical spaces
// ============================================================================

macro_rules! lexical_spaces {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Built-in XML Schema primitive lexical spaces.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum LexicalSpace {
            $($variant,)*
        }

        impl LexicalSpace {
            /// Every lexical space, in declaration order.
            pub const ALL: &'static [LexicalSpace] = &[$(LexicalSpace::$variant,)*];

            /// Local name of the schema type (`int`, `dateTime`, ...).
            pub fn xsd_name(self) -> &'static str {
                match self {
                    $(LexicalSpace::$variant => $name,)*
                }
            }

            pub fn from_xsd_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(LexicalSpace::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

lexical_spaces! {
    Boolean => "boolean",
    Byte => "byte",
    Short => "short",
    Int => "int",
    Long => "long",
    UnsignedByte => "unsignedByte",
    UnsignedShort => "unsignedShort",
    UnsignedInt => "unsignedInt",
    UnsignedLong => "unsignedLong",
    Integer => "integer",
    NonPositiveInteger => "nonPositiveInteger",
    NegativeInteger => "negativeInteger",
    NonNegativeInteger => "nonNegativeInteger",
    PositiveInteger => "positiveInteger",
    Decimal => "decimal",
    Float => "float",
    Double => "double",
    String => "string",
    NormalizedString => "normalizedString",
    Token => "token",
    Language => "language",
    Name => "Name",
    NcName => "NCName",
    NmToken => "NMTOKEN",
    Id => "ID",
    IdRef => "IDREF",
    Entity => "ENTITY",
    AnyUri => "anyURI",
    DateTime => "dateTime",
    Date => "date",
    Time => "time",
    Duration => "duration",
    QName => "QName",
}

impl LexicalSpace {
    /// Schema type name in the XML Schema namespace.
    pub fn qname(self) -> QName {
        QName::xsd(self.xsd_name())
    }

    /// Inclusive integer bounds, `None` for non-integer spaces.
    pub(crate) fn integer_bounds(self) -> Option<(Option<i128>, Option<i128>)> {
        use LexicalSpace::*;
        let bounds = match self {
            Byte => (Some(i8::MIN as i128), Some(i8::MAX as i128)),
            Short => (Some(i16::MIN as i128), Some(i16::MAX as i128)),
            Int => (Some(i32::MIN as i128), Some(i32::MAX as i128)),
            Long => (Some(i64::MIN as i128), Some(i64::MAX as i128)),
            UnsignedByte => (Some(0), Some(u8::MAX as i128)),
            UnsignedShort => (Some(0), Some(u16::MAX as i128)),
            UnsignedInt => (Some(0), Some(u32::MAX as i128)),
            UnsignedLong => (Some(0), Some(u64::MAX as i128)),
            Integer => (None, None),
            NonPositiveInteger => (None, Some(0)),
            NegativeInteger => (None, Some(-1)),
            NonNegativeInteger => (Some(0), None),
            PositiveInteger => (Some(1), None),
            _ => return None,
        };
        Some(bounds)
    }
}

impl fmt::Display for LexicalSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xs:{}", self.xsd_name())
    }
}

impl TryFrom<String> for LexicalSpace {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_xsd_name(&value).ok_or_else(|| format!("unknown built-in type '{}'", value))
    }
}

impl From<LexicalSpace> for String {
    fn from(space: LexicalSpace) -> Self {
        space.xsd_name().to_string()
    }
}

// ============================================================================
// Native representations
// ============================================================================

/// Native representation of a primitive, one per [`Value`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeRepr {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    BigInt,
    BigDecimal,
    F32,
    F64,
    String,
    QName,
    DateTime,
    Date,
    Time,
    Duration,
}

impl NativeRepr {
    /// Native type id, as reported by [`Value::native_type`].
    pub fn type_name(self) -> &'static str {
        match self {
            NativeRepr::Bool => "bool",
            NativeRepr::I8 => "i8",
            NativeRepr::I16 => "i16",
            NativeRepr::I32 => "i32",
            NativeRepr::I64 => "i64",
            NativeRepr::U8 => "u8",
            NativeRepr::U16 => "u16",
            NativeRepr::U32 => "u32",
            NativeRepr::U64 => "u64",
            NativeRepr::BigInt => "BigInt",
            NativeRepr::BigDecimal => "BigDecimal",
            NativeRepr::F32 => "f32",
            NativeRepr::F64 => "f64",
            NativeRepr::String => "String",
            NativeRepr::QName => "QName",
            NativeRepr::DateTime => "DateTime",
            NativeRepr::Date => "Date",
            NativeRepr::Time => "Time",
            NativeRepr::Duration => "Duration",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        BUILTIN_PAIRS
            .iter()
            .map(|(_, repr)| *repr)
            .find(|repr| repr.type_name() == name)
    }

    /// Value substituted when a lexical form cannot be converted.
    ///
    /// Scalars fall back to zero / `false`; heap-backed representations to `Null`.
    pub fn default_value(self) -> Value {
        match self {
            NativeRepr::Bool => Value::Bool(false),
            NativeRepr::I8 => Value::I8(0),
            NativeRepr::I16 => Value::I16(0),
            NativeRepr::I32 => Value::I32(0),
            NativeRepr::I64 => Value::I64(0),
            NativeRepr::U8 => Value::U8(0),
            NativeRepr::U16 => Value::U16(0),
            NativeRepr::U32 => Value::U32(0),
            NativeRepr::U64 => Value::U64(0),
            NativeRepr::F32 => Value::F32(0.0),
            NativeRepr::F64 => Value::F64(0.0),
            _ => Value::Null,
        }
    }
}

/// Built-in (lexical space, native representation) pairs.
///
/// Order matters: the first pair naming a native representation gives its
/// default schema type, the first pair naming a lexical space gives its
/// default native representation.
pub const BUILTIN_PAIRS: &[(LexicalSpace, NativeRepr)] = &[
    (LexicalSpace::Boolean, NativeRepr::Bool),
    (LexicalSpace::Byte, NativeRepr::I8),
    (LexicalSpace::Short, NativeRepr::I16),
    (LexicalSpace::UnsignedByte, NativeRepr::U8),
    (LexicalSpace::UnsignedByte, NativeRepr::I16),
    (LexicalSpace::Int, NativeRepr::I32),
    (LexicalSpace::UnsignedShort, NativeRepr::U16),
    (LexicalSpace::UnsignedShort, NativeRepr::I32),
    (LexicalSpace::Long, NativeRepr::I64),
    (LexicalSpace::Integer, NativeRepr::BigInt),
    (LexicalSpace::Integer, NativeRepr::I64),
    (LexicalSpace::NonPositiveInteger, NativeRepr::BigInt),
    (LexicalSpace::NegativeInteger, NativeRepr::BigInt),
    (LexicalSpace::NonNegativeInteger, NativeRepr::BigInt),
    (LexicalSpace::PositiveInteger, NativeRepr::BigInt),
    (LexicalSpace::UnsignedInt, NativeRepr::U32),
    (LexicalSpace::UnsignedInt, NativeRepr::I64),
    (LexicalSpace::UnsignedLong, NativeRepr::U64),
    (LexicalSpace::UnsignedLong, NativeRepr::BigInt),
    (LexicalSpace::Decimal, NativeRepr::BigDecimal),
    (LexicalSpace::Float, NativeRepr::F32),
    (LexicalSpace::Double, NativeRepr::F64),
    (LexicalSpace::String, NativeRepr::String),
    (LexicalSpace::NormalizedString, NativeRepr::String),
    (LexicalSpace::Token, NativeRepr::String),
    (LexicalSpace::Language, NativeRepr::String),
    (LexicalSpace::Name, NativeRepr::String),
    (LexicalSpace::NcName, NativeRepr::String),
    (LexicalSpace::NmToken, NativeRepr::String),
    (LexicalSpace::Id, NativeRepr::String),
    (LexicalSpace::IdRef, NativeRepr::String),
    (LexicalSpace::Entity, NativeRepr::String),
    (LexicalSpace::AnyUri, NativeRepr::String),
    (LexicalSpace::DateTime, NativeRepr::DateTime),
    (LexicalSpace::Date, NativeRepr::Date),
    (LexicalSpace::Time, NativeRepr::Time),
    (LexicalSpace::Duration, NativeRepr::Duration),
    (LexicalSpace::QName, NativeRepr::QName),
];

/// Default native representation of a lexical space.
pub fn default_repr(space: LexicalSpace) -> NativeRepr {
    BUILTIN_PAIRS
        .iter()
        .find(|(s, _)| *s == space)
        .map(|(_, repr)| *repr)
        .unwrap_or(NativeRepr::String)
}

// ============================================================================
// Codec
// ============================================================================

/// One lexical space bound to one native representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveCodec {
    space: LexicalSpace,
    repr: NativeRepr,
}

impl PrimitiveCodec {
    pub fn new(space: LexicalSpace, repr: NativeRepr) -> Self {
        Self { space, repr }
    }

    pub fn space(&self) -> LexicalSpace {
        self.space
    }

    pub fn repr(&self) -> NativeRepr {
        self.repr
    }

    /// Native value to lexical text.
    ///
    /// `prefixes` is only consulted for `xs:QName`, which needs a prefix
    /// bound on the element being written.
    pub fn print(
        &self,
        value: &Value,
        prefixes: &mut dyn PrefixResolver,
    ) -> Result<String, ConversionError> {
        use LexicalSpace::*;
        match self.space {
            Boolean => numeric::print_bool(value),
            Decimal => numeric::print_decimal(value),
            Float | Double => numeric::print_float(self.space, value),
            String | NormalizedString | Token | Language | Name | NcName | NmToken | Id
            | IdRef | Entity | AnyUri => text::print_string(self.space, value),
            DateTime | Date | Time | Duration => temporal::print(self.space, value),
            QName => text::print_qname(value, prefixes),
            _ => numeric::print_integer(self.space, self.repr, value),
        }
    }

    /// Lexical text to native value.
    pub fn parse(
        &self,
        lexical: &str,
        namespaces: &dyn NamespaceResolver,
    ) -> Result<Value, ConversionError> {
        use LexicalSpace::*;
        match self.space {
            Boolean => numeric::parse_bool(lexical),
            Decimal => numeric::parse_decimal(lexical),
            Float | Double => numeric::parse_float(self.repr, lexical),
            String | NormalizedString | Token | Language | Name | NcName | NmToken | Id
            | IdRef | Entity | AnyUri => text::parse_string(self.space, lexical),
            DateTime | Date | Time | Duration => temporal::parse(self.space, lexical),
            QName => text::parse_qname(lexical, namespaces),
            _ => numeric::parse_integer(self.space, self.repr, lexical),
        }
    }
}

/// Describe a value for conversion error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value.native_type() {
        Some(native) => native.to_string(),
        None if value.is_null() => "null".to_string(),
        None => "list".to_string(),
    }
}
