// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! dateTime, date, time and duration.
//!
//! XML Schema temporal values carry an *optional* timezone, which `chrono`
//! types cannot express directly, so each value keeps its local part plus
//! an `Option<FixedOffset>`.

use super::numeric::wrong_shape;
use super::{ConversionError, LexicalSpace};
use crate::value::Value;
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

fn invalid(kind: &str, text: &str) -> ConversionError {
    ConversionError::new(format!("invalid {} '{}'", kind, text))
}

/// Split a trailing `Z` / `+hh:mm` / `-hh:mm` timezone off `text`.
fn split_zone(text: &str, kind: &str) -> Result<(String, Option<FixedOffset>), ConversionError> {
    if let Some(body) = text.strip_suffix('Z') {
        return Ok((body.to_string(), FixedOffset::east_opt(0)));
    }
    if text.len() > 6 && text.is_char_boundary(text.len() - 6) {
        let (body, zone) = text.split_at(text.len() - 6);
        let bytes = zone.as_bytes();
        if matches!(bytes[0], b'+' | b'-') && bytes[3] == b':' {
            let hours: i32 = zone[1..3].parse().map_err(|_| invalid(kind, text))?;
            let minutes: i32 = zone[4..6].parse().map_err(|_| invalid(kind, text))?;
            if hours > 14 || minutes > 59 || (hours == 14 && minutes != 0) {
                return Err(invalid(kind, text));
            }
            let secs = (hours * 3600 + minutes * 60) * if bytes[0] == b'-' { -1 } else { 1 };
            let offset = FixedOffset::east_opt(secs).ok_or_else(|| invalid(kind, text))?;
            return Ok((body.to_string(), Some(offset)));
        }
    }
    Ok((text.to_string(), None))
}

fn write_zone(f: &mut fmt::Formatter<'_>, offset: Option<FixedOffset>) -> fmt::Result {
    match offset {
        None => Ok(()),
        Some(o) if o.local_minus_utc() == 0 => f.write_str("Z"),
        Some(o) => {
            let secs = o.local_minus_utc();
            let sign = if secs < 0 { '-' } else { '+' };
            let secs = secs.abs();
            write!(f, "{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
        }
    }
}

/// Fractional seconds without trailing zeros (`.5`, `.123`), empty when whole.
///
/// A leap-second carry (`nanos >= 1e9`) is not part of the fraction.
fn write_fraction(f: &mut fmt::Formatter<'_>, nanos: u32) -> fmt::Result {
    let nanos = nanos % NANOS_PER_SEC;
    if nanos == 0 {
        return Ok(());
    }
    let digits = format!("{:09}", nanos);
    write!(f, ".{}", digits.trim_end_matches('0'))
}

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// chrono encodes a leap second as `nanos >= 1e9`; the schema grammar has
/// no second 60.
fn is_leap(nanos: u32) -> bool {
    nanos >= NANOS_PER_SEC
}

/// `[-]YYYY-MM-DD`, the year four digits or more without leading zeros past four.
fn parse_date_part(body: &str, kind: &str, text: &str) -> Result<NaiveDate, ConversionError> {
    let err = || invalid(kind, text);
    let (negative, rest) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let mut parts = rest.split('-');
    let (Some(year), Some(month), Some(day), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(err());
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(year) || year.len() < 4 || (year.len() > 4 && year.starts_with('0')) {
        return Err(err());
    }
    if month.len() != 2 || day.len() != 2 || !digits(month) || !digits(day) {
        return Err(err());
    }
    let year: i32 = year.parse().map_err(|_| err())?;
    let year = if negative { -year } else { year };
    let month: u32 = month.parse().map_err(|_| err())?;
    let day: u32 = day.parse().map_err(|_| err())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err)
}

fn parse_time_part(body: &str, kind: &str, text: &str) -> Result<NaiveTime, ConversionError> {
    let time = NaiveTime::parse_from_str(body, "%H:%M:%S%.f").map_err(|_| invalid(kind, text))?;
    if is_leap(time.nanosecond()) {
        return Err(invalid(kind, text));
    }
    Ok(time)
}

fn write_date(f: &mut fmt::Formatter<'_>, date: NaiveDate) -> fmt::Result {
    let year = date.year();
    if year < 0 {
        f.write_str("-")?;
    }
    write!(f, "{:04}-{:02}-{:02}", year.unsigned_abs(), date.month(), date.day())
}

/// Reject chrono leniencies the schema grammar does not allow.
fn check_shape(body: &str, kind: &str, text: &str) -> Result<(), ConversionError> {
    if body.starts_with('+') || body.contains(' ') || body.ends_with('.') {
        return Err(invalid(kind, text));
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// dateTime
// ----------------------------------------------------------------------------

/// `xs:dateTime` value.
///
/// Equality compares instants when both sides carry a timezone, and local
/// fields otherwise.
#[derive(Debug, Clone, Copy)]
pub struct XmlDateTime {
    pub local: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl XmlDateTime {
    pub fn new(local: NaiveDateTime, offset: Option<FixedOffset>) -> Self {
        Self { local, offset }
    }

    /// UTC dateTime (`...Z`).
    pub fn utc(local: NaiveDateTime) -> Self {
        Self::new(local, FixedOffset::east_opt(0))
    }
}

impl PartialEq for XmlDateTime {
    fn eq(&self, other: &Self) -> bool {
        match (self.offset, other.offset) {
            (Some(a), Some(b)) => self.local - a == other.local - b,
            (None, None) => self.local == other.local,
            _ => false,
        }
    }
}

impl FromStr for XmlDateTime {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (body, offset) = split_zone(text, "dateTime")?;
        check_shape(&body, "dateTime", text)?;
        let (date, time) = body.split_once('T').ok_or_else(|| invalid("dateTime", text))?;
        let date = parse_date_part(date, "dateTime", text)?;
        let time = parse_time_part(time, "dateTime", text)?;
        Ok(Self {
            local: NaiveDateTime::new(date, time),
            offset,
        })
    }
}

impl fmt::Display for XmlDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_date(f, self.local.date())?;
        write!(f, "T{}", self.local.format("%H:%M:%S"))?;
        write_fraction(f, self.local.nanosecond())?;
        write_zone(f, self.offset)
    }
}

// ----------------------------------------------------------------------------
// date
// ----------------------------------------------------------------------------

/// `xs:date` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XmlDate {
    pub date: NaiveDate,
    pub offset: Option<FixedOffset>,
}

impl XmlDate {
    pub fn new(date: NaiveDate, offset: Option<FixedOffset>) -> Self {
        Self { date, offset }
    }
}

impl FromStr for XmlDate {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (body, offset) = split_zone(text, "date")?;
        check_shape(&body, "date", text)?;
        let date = parse_date_part(&body, "date", text)?;
        Ok(Self { date, offset })
    }
}

impl fmt::Display for XmlDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_date(f, self.date)?;
        write_zone(f, self.offset)
    }
}

// ----------------------------------------------------------------------------
// time
// ----------------------------------------------------------------------------

/// `xs:time` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XmlTime {
    pub time: NaiveTime,
    pub offset: Option<FixedOffset>,
}

impl XmlTime {
    pub fn new(time: NaiveTime, offset: Option<FixedOffset>) -> Self {
        Self { time, offset }
    }
}

impl FromStr for XmlTime {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (body, offset) = split_zone(text, "time")?;
        check_shape(&body, "time", text)?;
        let time = parse_time_part(&body, "time", text)?;
        Ok(Self { time, offset })
    }
}

impl fmt::Display for XmlTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M:%S"))?;
        write_fraction(f, self.time.nanosecond())?;
        write_zone(f, self.offset)
    }
}

// ----------------------------------------------------------------------------
// duration
// ----------------------------------------------------------------------------

/// `xs:duration` value (`PnYnMnDTnHnMnS`), kept field by field since months
/// and days have no fixed length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XmlDuration {
    pub negative: bool,
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub nanos: u32,
}

impl FromStr for XmlDuration {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let err = || invalid("duration", text);
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let rest = rest.strip_prefix('P').ok_or_else(err)?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((_, t)) if t.is_empty() => return Err(err()),
            Some((d, t)) => (d, Some(t)),
            None => (rest, None),
        };

        let mut out = XmlDuration {
            negative,
            ..Default::default()
        };
        let mut seen_any = false;

        // Date designators must appear in Y, M, D order.
        let mut cursor = date_part;
        for (designator, slot) in [('Y', &mut out.years), ('M', &mut out.months), ('D', &mut out.days)] {
            if let Some(idx) = cursor.find(designator) {
                *slot = parse_component(&cursor[..idx]).ok_or_else(err)?;
                cursor = &cursor[idx + 1..];
                seen_any = true;
            }
        }
        if !cursor.is_empty() {
            return Err(err());
        }

        if let Some(time_part) = time_part {
            let mut cursor = time_part;
            for (designator, slot) in [('H', &mut out.hours), ('M', &mut out.minutes)] {
                if let Some(idx) = cursor.find(designator) {
                    *slot = parse_component(&cursor[..idx]).ok_or_else(err)?;
                    cursor = &cursor[idx + 1..];
                    seen_any = true;
                }
            }
            if let Some(secs) = cursor.strip_suffix('S') {
                let (whole, frac) = secs.split_once('.').unwrap_or((secs, ""));
                out.seconds = parse_component(whole).ok_or_else(err)?;
                if secs.contains('.') {
                    if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(err());
                    }
                    out.nanos = format!("{:0<9}", frac).parse().map_err(|_| err())?;
                }
                seen_any = true;
            } else if !cursor.is_empty() {
                return Err(err());
            }
        }

        if !seen_any {
            return Err(err());
        }
        Ok(out)
    }
}

fn parse_component(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for XmlDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.years > 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        let has_time = self.hours > 0 || self.minutes > 0 || self.seconds > 0 || self.nanos > 0;
        let nonzero = has_time || self.years > 0 || self.months > 0 || self.days > 0;
        if has_time || !nonzero {
            f.write_str("T")?;
        }
        if self.hours > 0 {
            write!(f, "{}H", self.hours)?;
        }
        if self.minutes > 0 {
            write!(f, "{}M", self.minutes)?;
        }
        if self.seconds > 0 || self.nanos > 0 || !nonzero {
            write!(f, "{}", self.seconds)?;
            write_fraction(f, self.nanos)?;
            f.write_str("S")?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Codec entry points
// ----------------------------------------------------------------------------

pub(super) fn print(space: LexicalSpace, value: &Value) -> Result<String, ConversionError> {
    match (space, value) {
        (LexicalSpace::DateTime, Value::DateTime(v)) if is_leap(v.local.nanosecond()) => {
            Err(ConversionError::new(format!("leap second in dateTime {}", v.local)))
        }
        (LexicalSpace::Time, Value::Time(v)) if is_leap(v.time.nanosecond()) => {
            Err(ConversionError::new(format!("leap second in time {}", v.time)))
        }
        (LexicalSpace::DateTime, Value::DateTime(v)) => Ok(v.to_string()),
        (LexicalSpace::Date, Value::Date(v)) => Ok(v.to_string()),
        (LexicalSpace::Time, Value::Time(v)) => Ok(v.to_string()),
        (LexicalSpace::Duration, Value::Duration(v)) => Ok(v.to_string()),
        (_, other) => Err(wrong_shape(space.xsd_name(), other)),
    }
}

pub(super) fn parse(space: LexicalSpace, lexical: &str) -> Result<Value, ConversionError> {
    match space {
        LexicalSpace::DateTime => lexical.parse().map(Value::DateTime),
        LexicalSpace::Date => lexical.parse().map(Value::Date),
        LexicalSpace::Time => lexical.parse().map(Value::Time),
        _ => lexical.parse().map(Value::Duration),
    }
}
