// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures: a small `urn:mytest` binding with a base class, a
//! narrower subclass and a container referring to the base.

#![allow(dead_code)]

use std::sync::Arc;
use xbind::binding::{BindingFile, BindingType, BindingTypeName, Property};
use xbind::bundle::{Bundle, BundleWriter, MemoryBundle};
use xbind::qname::QName;
use xbind::{BindingContext, BindingContextFactory, StructValue, Value};

pub const NS: &str = "urn:mytest";

pub fn q(local: &str) -> QName {
    QName::new(NS, local)
}

pub fn my_class_name() -> BindingTypeName {
    BindingTypeName::new("com.mytest.MyClass", q("MyClass"))
}

pub fn my_sub_class_name() -> BindingTypeName {
    BindingTypeName::new("com.mytest.MySubClass", q("MySubClass"))
}

pub fn your_class_name() -> BindingTypeName {
    BindingTypeName::new("com.mytest.YourClass", q("YourClass"))
}

fn my_class_properties() -> Vec<Property> {
    vec![
        Property::attribute("id", QName::unqualified("id"), BindingTypeName::xsd("i32", "int"))
            .with_default("7"),
        Property::element("name", q("name"), BindingTypeName::xsd("String", "string")),
        Property::element("count", q("count"), BindingTypeName::xsd("i32", "int")),
        Property::element("tags", q("tag"), BindingTypeName::xsd("String", "string")).multiple(),
        Property::element("note", q("note"), BindingTypeName::xsd("String", "string")).nillable(),
    ]
}

/// Descriptor for MyClass / MySubClass / YourClass with global elements
/// `myClass` and `yourClass`.
pub fn descriptor() -> BindingFile {
    let mut file = BindingFile::new();
    file.add_binding_type(BindingType::by_name(my_class_name(), my_class_properties()));

    let mut sub = my_class_properties();
    sub.push(Property::element("extra", q("extra"), BindingTypeName::xsd("bool", "boolean")));
    file.add_binding_type(BindingType::derived(my_sub_class_name(), my_class_name(), sub));

    file.add_binding_type(BindingType::by_name(
        your_class_name(),
        vec![
            Property::element("my", q("my"), my_class_name()),
            Property::element("label", q("label"), BindingTypeName::xsd("String", "string")),
        ],
    ));

    file.add_element(q("myClass"), my_class_name());
    file.add_element(q("yourClass"), your_class_name());
    file
}

pub fn bundle() -> Arc<dyn Bundle> {
    let mut bundle = MemoryBundle::new();
    bundle
        .set_binding_descriptor(descriptor())
        .expect("fresh bundle accepts a descriptor");
    bundle.close();
    Arc::new(bundle)
}

pub fn context() -> BindingContext {
    BindingContextFactory::new_instance()
        .create_binding_context_from_bundles(vec![bundle()])
        .expect("context over the test bundle")
}

pub fn my_class(name: &str, count: i32) -> StructValue {
    StructValue::new("com.mytest.MyClass")
        .with("id", 1i32)
        .with("name", name)
        .with("count", count)
        .with("tags", Value::List(vec!["a".into(), "b".into()]))
}

pub fn my_sub_class(name: &str, count: i32, extra: bool) -> StructValue {
    StructValue::new("com.mytest.MySubClass")
        .with("id", 2i32)
        .with("name", name)
        .with("count", count)
        .with("tags", Value::List(Vec::new()))
        .with("extra", extra)
}

pub fn your_class(my: StructValue, label: &str) -> Value {
    Value::Struct(
        StructValue::new("com.mytest.YourClass")
            .with("my", Value::Struct(my))
            .with("label", label),
    )
}
