// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Boolean, integer, decimal and floating point lexical spaces.

use super::{describe, ConversionError, LexicalSpace, NativeRepr};
use crate::value::Value;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use std::str::FromStr;

// ----------------------------------------------------------------------------
// boolean
// ----------------------------------------------------------------------------

pub(super) fn print_bool(value: &Value) -> Result<String, ConversionError> {
    match value {
        Value::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
        other => Err(wrong_shape("boolean", other)),
    }
}

pub(super) fn parse_bool(lexical: &str) -> Result<Value, ConversionError> {
    match lexical.trim() {
        "true" | "1" => Ok(Value::Bool(true)),
        "false" | "0" => Ok(Value::Bool(false)),
        other => Err(ConversionError::new(format!(
            "invalid boolean '{}'",
            other
        ))),
    }
}

// ----------------------------------------------------------------------------
// integer family
// ----------------------------------------------------------------------------

fn as_bigint(value: &Value) -> Option<BigInt> {
    match value {
        Value::I8(v) => Some(BigInt::from(*v)),
        Value::I16(v) => Some(BigInt::from(*v)),
        Value::I32(v) => Some(BigInt::from(*v)),
        Value::I64(v) => Some(BigInt::from(*v)),
        Value::U8(v) => Some(BigInt::from(*v)),
        Value::U16(v) => Some(BigInt::from(*v)),
        Value::U32(v) => Some(BigInt::from(*v)),
        Value::U64(v) => Some(BigInt::from(*v)),
        Value::BigInt(v) => Some(v.clone()),
        _ => None,
    }
}

fn check_bounds(space: LexicalSpace, n: &BigInt) -> Result<(), ConversionError> {
    let (min, max) = space.integer_bounds().unwrap_or((None, None));
    let below = min.is_some_and(|m| *n < BigInt::from(m));
    let above = max.is_some_and(|m| *n > BigInt::from(m));
    if below || above {
        return Err(ConversionError::new(format!(
            "{} is out of range for {}",
            n, space
        )));
    }
    Ok(())
}

fn narrow(repr: NativeRepr, n: &BigInt) -> Option<Value> {
    Some(match repr {
        NativeRepr::I8 => Value::I8(n.to_i8()?),
        NativeRepr::I16 => Value::I16(n.to_i16()?),
        NativeRepr::I32 => Value::I32(n.to_i32()?),
        NativeRepr::I64 => Value::I64(n.to_i64()?),
        NativeRepr::U8 => Value::U8(n.to_u8()?),
        NativeRepr::U16 => Value::U16(n.to_u16()?),
        NativeRepr::U32 => Value::U32(n.to_u32()?),
        NativeRepr::U64 => Value::U64(n.to_u64()?),
        NativeRepr::BigInt => Value::BigInt(n.clone()),
        _ => return None,
    })
}

pub(super) fn print_integer(
    space: LexicalSpace,
    repr: NativeRepr,
    value: &Value,
) -> Result<String, ConversionError> {
    let n = as_bigint(value).ok_or_else(|| wrong_shape(space.xsd_name(), value))?;
    check_bounds(space, &n)?;
    if narrow(repr, &n).is_none() {
        return Err(ConversionError::new(format!(
            "{} does not fit in {}",
            n,
            repr.type_name()
        )));
    }
    Ok(n.to_string())
}

fn is_integer_lexical(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

pub(super) fn parse_integer(
    space: LexicalSpace,
    repr: NativeRepr,
    lexical: &str,
) -> Result<Value, ConversionError> {
    let text = lexical.trim();
    if !is_integer_lexical(text) {
        return Err(ConversionError::new(format!(
            "invalid {} '{}'",
            space, text
        )));
    }
    let n = BigInt::from_str(text)
        .map_err(|e| ConversionError::new(format!("invalid {} '{}': {}", space, text, e)))?;
    check_bounds(space, &n)?;
    narrow(repr, &n).ok_or_else(|| {
        ConversionError::new(format!("{} does not fit in {}", n, repr.type_name()))
    })
}

// ----------------------------------------------------------------------------
// decimal
// ----------------------------------------------------------------------------

fn is_decimal_lexical(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (int, frac) = body.split_once('.').unwrap_or((body, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    (!int.is_empty() || !frac.is_empty()) && digits(int) && digits(frac)
}

/// Plain decimal notation, trailing fractional zeros removed.
pub(crate) fn format_decimal(value: &BigDecimal) -> String {
    let (digits, scale) = value.normalized().as_bigint_and_exponent();
    let negative = digits.sign() == Sign::Minus;
    let magnitude = digits.magnitude().to_string();
    let mut out = String::with_capacity(magnitude.len() + 3);
    if negative {
        out.push('-');
    }
    if scale <= 0 {
        out.push_str(&magnitude);
        if magnitude != "0" {
            out.extend(std::iter::repeat('0').take(scale.unsigned_abs() as usize));
        }
    } else {
        let scale = scale as usize;
        if magnitude.len() > scale {
            let (int, frac) = magnitude.split_at(magnitude.len() - scale);
            out.push_str(int);
            out.push('.');
            out.push_str(frac);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take(scale - magnitude.len()));
            out.push_str(&magnitude);
        }
    }
    out
}

pub(super) fn print_decimal(value: &Value) -> Result<String, ConversionError> {
    match value {
        Value::Decimal(d) => Ok(format_decimal(d)),
        other => match as_bigint(other) {
            Some(n) => Ok(n.to_string()),
            None => Err(wrong_shape("decimal", other)),
        },
    }
}

pub(super) fn parse_decimal(lexical: &str) -> Result<Value, ConversionError> {
    let text = lexical.trim();
    if !is_decimal_lexical(text) {
        return Err(ConversionError::new(format!("invalid decimal '{}'", text)));
    }
    BigDecimal::from_str(text)
        .map(Value::Decimal)
        .map_err(|e| ConversionError::new(format!("invalid decimal '{}': {}", text, e)))
}

// ----------------------------------------------------------------------------
// float / double
// ----------------------------------------------------------------------------

fn format_float(v: f64, display: impl FnOnce() -> String) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        let inf = if v > 0.0 { "INF" } else { "-INF" };
        inf.to_string()
    } else {
        display()
    }
}

pub(super) fn print_float(space: LexicalSpace, value: &Value) -> Result<String, ConversionError> {
    match (space, value) {
        (_, Value::F32(v)) => Ok(format_float(f64::from(*v), || v.to_string())),
        (LexicalSpace::Double, Value::F64(v)) => Ok(format_float(*v, || v.to_string())),
        (_, other) => Err(wrong_shape(space.xsd_name(), other)),
    }
}

pub(super) fn parse_float(repr: NativeRepr, lexical: &str) -> Result<Value, ConversionError> {
    let text = lexical.trim();
    let special = match text {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    };
    let valid = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if special.is_none() && !valid {
        return Err(ConversionError::new(format!("invalid floating point '{}'", text)));
    }
    let invalid = |e: std::num::ParseFloatError| {
        ConversionError::new(format!("invalid floating point '{}': {}", text, e))
    };
    match repr {
        NativeRepr::F32 => {
            let v = match special {
                Some(s) => s as f32,
                None => text.parse::<f32>().map_err(invalid)?,
            };
            Ok(Value::F32(v))
        }
        _ => {
            let v = match special {
                Some(s) => s,
                None => text.parse::<f64>().map_err(invalid)?,
            };
            Ok(Value::F64(v))
        }
    }
}

pub(super) fn wrong_shape(expected: &str, value: &Value) -> ConversionError {
    ConversionError::new(format!(
        "expected a value for xs:{}, found {}",
        expected,
        describe(value)
    ))
}
