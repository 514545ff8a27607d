// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host-registered converters, list types and closed polymorphic sets.

mod common;

use common::{q, NS};
use std::sync::Arc;
use xbind::binding::{BindingFile, BindingType, BindingTypeName, Property};
use xbind::bundle::{Bundle, BundleWriter, MemoryBundle};
use xbind::codec::{ConversionError, LexicalSpace};
use xbind::qname::QName;
use xbind::runtime::{ConverterPair, TypeMarshaller, TypeUnmarshaller};
use xbind::{
    BindingContext, BindingContextFactory, EventStream, MarshalResult, StructValue,
    UnmarshalResult, Value, XmlOptions,
};

/// Upper-case names natively, lower-case on the wire.
#[derive(Debug)]
struct ColorConverter;

impl TypeMarshaller for ColorConverter {
    fn is_simple(&self) -> bool {
        true
    }

    fn print(&self, value: &Value, _result: &mut MarshalResult<'_>) -> Result<String, ConversionError> {
        value
            .as_str()
            .map(str::to_lowercase)
            .ok_or_else(|| ConversionError::new("color must be a string"))
    }
}

impl TypeUnmarshaller for ColorConverter {
    fn unmarshal(&self, result: &mut UnmarshalResult<'_>) -> xbind::Result<Value> {
        Ok(Value::String(result.collect_text().trim().to_uppercase()))
    }

    fn unmarshal_attribute(
        &self,
        lexical: &str,
        _result: &mut UnmarshalResult<'_>,
    ) -> Result<Value, ConversionError> {
        Ok(Value::String(lexical.trim().to_uppercase()))
    }
}

fn color() -> BindingTypeName {
    BindingTypeName::new("demo.Color", q("Color"))
}

fn palette() -> BindingTypeName {
    BindingTypeName::new("demo.Palette", q("Palette"))
}

fn shape() -> BindingTypeName {
    BindingTypeName::new("demo.Shape", q("Shape"))
}

fn circle() -> BindingTypeName {
    BindingTypeName::new("demo.Circle", q("Circle"))
}

fn square() -> BindingTypeName {
    BindingTypeName::new("demo.Square", q("Square"))
}

fn bundle() -> Arc<dyn Bundle> {
    let colors = BindingTypeName::new("demo.Colors", q("Colors"));
    let mut file = BindingFile::new();
    file.add_binding_type(BindingType::builtin(color(), LexicalSpace::Token));
    file.add_binding_type(BindingType::list(colors.clone(), color(), q("c")));
    file.add_binding_type(BindingType::polymorphic(shape(), None, vec![circle()]));
    file.add_binding_type(BindingType::by_name(
        circle(),
        vec![Property::attribute("r", QName::unqualified("r"), BindingTypeName::xsd("f64", "double"))],
    ));
    file.add_binding_type(BindingType::by_name(square(), Vec::new()));
    file.add_binding_type(BindingType::by_name(
        palette(),
        vec![
            Property::attribute("main", QName::unqualified("main"), color()),
            Property::element("colors", q("colors"), colors),
            Property::element("shape", q("shape"), shape()),
        ],
    ));
    file.add_element(q("palette"), palette());

    let mut bundle = MemoryBundle::new();
    bundle.set_binding_descriptor(file).unwrap();
    bundle.add_compiled_type("demo.Color".into()).unwrap();
    Arc::new(bundle)
}

fn context() -> BindingContext {
    BindingContextFactory::new_instance()
        .register_converter(color(), ConverterPair::shared(ColorConverter))
        .create_binding_context_from_bundles(vec![bundle()])
        .unwrap()
}

fn palette_value(shape: StructValue) -> Value {
    Value::Struct(
        StructValue::new("demo.Palette")
            .with("main", "RED")
            .with("colors", Value::List(vec!["GREEN".into(), "BLUE".into()]))
            .with("shape", shape),
    )
}

#[test]
fn host_converter_replaces_generated_one() {
    let ctx = context();
    let value = palette_value(StructValue::new("demo.Circle").with("r", 1.5f64));
    let mut sink = EventStream::new();
    ctx.create_marshaller()
        .marshal(&mut sink, &value, &XmlOptions::new())
        .unwrap();
    let text = sink.to_xml_string().unwrap();
    assert!(text.contains("main=\"red\""), "{}", text);
    assert!(text.contains(">green<"), "{}", text);

    let mut unmarshaller = ctx.create_unmarshaller();
    let back = unmarshaller.unmarshal_str(&text, &XmlOptions::new()).unwrap();
    assert!(unmarshaller.diagnostics().is_empty(), "{:?}", unmarshaller.diagnostics());
    assert_eq!(back, value);
}

#[test]
fn registration_stays_in_its_context() {
    let registered = context();
    let plain = BindingContextFactory::new_instance()
        .create_binding_context_from_bundles(vec![bundle()])
        .unwrap();
    let mine = registered.type_table().marshaller(&color()).unwrap();
    let theirs = plain.type_table().marshaller(&color()).unwrap();
    assert!(!Arc::ptr_eq(&mine, &theirs));
    assert_eq!(
        format!("{:?}", mine),
        "ColorConverter",
        "registered context uses the host converter"
    );
    assert!(BindingContextFactory::new_instance()
        .create_binding_context()
        .unwrap()
        .type_table()
        .marshaller(&color())
        .is_none());
}

#[test]
fn closed_set_member_gets_marker() {
    let ctx = context();
    let value = palette_value(StructValue::new("demo.Circle").with("r", 2.0f64));
    let mut sink = EventStream::new();
    ctx.create_marshaller()
        .marshal(&mut sink, &value, &XmlOptions::new())
        .unwrap();
    let text = sink.to_xml_string().unwrap();
    assert!(text.contains(":Circle\""), "{}", text);

    let back = ctx
        .create_unmarshaller()
        .unmarshal(&sink, &XmlOptions::new())
        .unwrap();
    let shape = back.as_struct().unwrap().get("shape").unwrap().as_struct().unwrap();
    assert_eq!(shape.type_name().as_str(), "demo.Circle");
    assert_eq!(shape.get("r"), Some(&Value::F64(2.0)));
}

#[test]
fn type_outside_closed_set_is_dropped_with_diagnostic() {
    let ctx = context();
    let value = palette_value(StructValue::new("demo.Square"));
    let mut marshaller = ctx.create_marshaller();
    let mut sink = EventStream::new();
    marshaller.marshal(&mut sink, &value, &XmlOptions::new()).unwrap();
    assert_eq!(marshaller.diagnostics().len(), 1);
    assert!(!sink.to_xml_string().unwrap().contains("shape"));
}

#[test]
fn list_items_are_wrapped() {
    let ctx = context();
    let text = format!(
        r#"<palette xmlns="{}"><colors><c>teal</c><x/><c> navy </c></colors></palette>"#,
        NS
    );
    let mut unmarshaller = ctx.create_unmarshaller();
    let value = unmarshaller.unmarshal_str(&text, &XmlOptions::new()).unwrap();
    assert_eq!(unmarshaller.diagnostics().len(), 1, "unexpected <x/> is reported");
    assert_eq!(
        value.as_struct().unwrap().get("colors"),
        Some(&Value::List(vec!["TEAL".into(), "NAVY".into()]))
    );
}
