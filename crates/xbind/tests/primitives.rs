// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in primitives through full marshal / unmarshal sessions.

use num_bigint::BigInt;
use std::str::FromStr;
use std::sync::Arc;
use xbind::binding::BindingTypeName;
use xbind::codec::{LexicalSpace, PrimitiveCodec, BUILTIN_PAIRS};
use xbind::qname::{NoNamespaces, QName};
use xbind::{
    BindingContext, BindingContextFactory, DiagnosticCollector, EventStream, Severity, Value,
    XmlOptions,
};

fn builtins() -> BindingContext {
    BindingContextFactory::new_instance()
        .create_binding_context()
        .unwrap()
}

/// Marshal `value` as `<v>`, serialize, parse back and unmarshal.
fn through_text(ctx: &BindingContext, name: &BindingTypeName, value: &Value) -> (String, Value) {
    let element = QName::unqualified("v");
    let stream = ctx
        .create_marshaller()
        .marshal_type(value, &element, &name.schema, &name.native, &XmlOptions::new())
        .unwrap();
    let text = stream.to_xml_string().unwrap();
    let parsed = EventStream::parse(&text).unwrap();

    let mut unmarshaller = ctx.create_unmarshaller();
    let back = unmarshaller
        .unmarshal_type(&parsed, &name.schema, &name.native, &XmlOptions::new())
        .unwrap();
    assert!(unmarshaller.diagnostics().is_empty(), "{:?}", unmarshaller.diagnostics());
    (text, back)
}

fn sample(space: LexicalSpace) -> &'static str {
    match space {
        LexicalSpace::Boolean => "true",
        LexicalSpace::Byte => "-128",
        LexicalSpace::Short => "-32768",
        LexicalSpace::Int => "55434535",
        LexicalSpace::Long => "-9223372036854775808",
        LexicalSpace::UnsignedByte => "255",
        LexicalSpace::UnsignedShort => "65535",
        LexicalSpace::UnsignedInt => "4294967295",
        LexicalSpace::UnsignedLong => "18446744073709551615",
        LexicalSpace::Integer => "-9000000000",
        LexicalSpace::NonPositiveInteger => "0",
        LexicalSpace::NegativeInteger => "-55434535443332323245555555",
        LexicalSpace::NonNegativeInteger => "18446744073709551616",
        LexicalSpace::PositiveInteger => "1",
        LexicalSpace::Decimal => "-123.45",
        LexicalSpace::Float => "1.5",
        LexicalSpace::Double => "-0.0025",
        LexicalSpace::String => " keeps  spacing ",
        LexicalSpace::NormalizedString => "one two",
        LexicalSpace::Token => "one two",
        LexicalSpace::Language => "en-US",
        LexicalSpace::Name => "x:y",
        LexicalSpace::NcName => "local",
        LexicalSpace::NmToken => "12-ab",
        LexicalSpace::Id => "id1",
        LexicalSpace::IdRef => "id1",
        LexicalSpace::Entity => "ent",
        LexicalSpace::AnyUri => "http://example.com/a?b=c",
        LexicalSpace::DateTime => "2024-05-01T12:30:00.25+02:00",
        LexicalSpace::Date => "2024-05-01Z",
        LexicalSpace::Time => "12:30:00.5",
        LexicalSpace::Duration => "-P1Y2M3DT4H5M6.5S",
        LexicalSpace::QName => "local",
    }
}

#[test]
fn every_builtin_pair_roundtrips() {
    let ctx = builtins();
    for (space, repr) in BUILTIN_PAIRS {
        let value = PrimitiveCodec::new(*space, *repr)
            .parse(sample(*space), &NoNamespaces)
            .unwrap_or_else(|e| panic!("{} as {}: {}", space, repr.type_name(), e));
        let name = BindingTypeName::new(repr.type_name(), space.qname());
        let (text, back) = through_text(&ctx, &name, &value);
        assert_eq!(back, value, "{} as {} via {}", space, repr.type_name(), text);
    }
}

#[test]
fn int_lexical_form() {
    let ctx = builtins();
    let int = BindingTypeName::xsd("i32", "int");
    let (text, back) = through_text(&ctx, &int, &Value::I32(55434535));
    assert_eq!(text, "<v>55434535</v>");
    assert_eq!(back, Value::I32(55434535));
}

#[test]
fn negative_integer_keeps_full_precision() {
    let ctx = builtins();
    let name = BindingTypeName::xsd("BigInt", "negativeInteger");
    let big = BigInt::from_str("-55434535443332323245555555").unwrap();
    let (text, back) = through_text(&ctx, &name, &Value::BigInt(big.clone()));
    assert_eq!(text, "<v>-55434535443332323245555555</v>");
    assert_eq!(back, Value::BigInt(big));
}

#[test]
fn qname_content_declares_its_prefix() {
    let ctx = builtins();
    let name = BindingTypeName::xsd("QName", "QName");
    let value = Value::QName(QName::new("urn:other", "thing"));
    let (text, back) = through_text(&ctx, &name, &value);
    assert!(text.contains("xmlns:ns1=\"urn:other\""), "{}", text);
    assert!(text.contains(">ns1:thing<"), "{}", text);
    assert_eq!(back, value);
}

#[test]
fn float_specials() {
    let ctx = builtins();
    let name = BindingTypeName::xsd("f64", "double");
    let (text, back) = through_text(&ctx, &name, &Value::F64(f64::NEG_INFINITY));
    assert_eq!(text, "<v>-INF</v>");
    assert_eq!(back, Value::F64(f64::NEG_INFINITY));
}

#[test]
fn random_longs_roundtrip() {
    let ctx = builtins();
    let long = BindingTypeName::xsd("i64", "long");
    let unsigned = BindingTypeName::xsd("u32", "unsignedInt");
    for _ in 0..200 {
        let v = Value::I64(fastrand::i64(..));
        assert_eq!(through_text(&ctx, &long, &v).1, v);
        let u = Value::U32(fastrand::u32(..));
        assert_eq!(through_text(&ctx, &unsigned, &u).1, u);
    }
}

#[test]
fn malformed_text_yields_default_and_one_diagnostic() {
    let ctx = builtins();
    let int = BindingTypeName::xsd("i32", "int");
    let collector = Arc::new(DiagnosticCollector::new());
    let options = XmlOptions::new().with_error_listener(collector.clone());

    let source = EventStream::parse("<v>\n abc</v>").unwrap();
    let mut unmarshaller = ctx.create_unmarshaller();
    let value = unmarshaller
        .unmarshal_type(&source, &int.schema, &int.native, &options)
        .unwrap();

    assert_eq!(value, Value::I32(0));
    assert_eq!(unmarshaller.diagnostics().len(), 1);
    let diagnostics = collector.drain();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].location.map(|l| l.line), Some(1));
}

#[test]
fn out_of_range_is_reported() {
    let ctx = builtins();
    let byte = BindingTypeName::xsd("i8", "byte");
    let source = EventStream::parse("<v>300</v>").unwrap();
    let mut unmarshaller = ctx.create_unmarshaller();
    let value = unmarshaller
        .unmarshal_type(&source, &byte.schema, &byte.native, &XmlOptions::new())
        .unwrap();
    assert_eq!(value, Value::I8(0));
    assert_eq!(unmarshaller.diagnostics().len(), 1);
}

#[test]
fn unsigned_byte_read_into_wider_native() {
    let ctx = builtins();
    let name = BindingTypeName::xsd("i16", "unsignedByte");
    let (text, back) = through_text(&ctx, &name, &Value::I16(200));
    assert_eq!(text, "<v>200</v>");
    assert_eq!(back, Value::I16(200));
}
