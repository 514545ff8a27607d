// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshal / unmarshal round-trip benchmark.
//!
//! Measures one session per call over a shared context:
//! - marshal of a nested structure with a substituted subtype
//! - text serialization and parsing
//! - unmarshal back to a value

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use xbind::binding::{BindingFile, BindingType, BindingTypeName, Property};
use xbind::bundle::{Bundle, BundleWriter, MemoryBundle};
use xbind::qname::QName;
use xbind::{BindingContext, BindingContextFactory, EventStream, StructValue, Value, XmlOptions};

const NS: &str = "urn:bench";

fn context() -> BindingContext {
    let item = BindingTypeName::new("bench.Item", QName::new(NS, "Item"));
    let order = BindingTypeName::new("bench.Order", QName::new(NS, "Order"));
    let mut file = BindingFile::new();
    file.add_binding_type(BindingType::by_name(
        item.clone(),
        vec![
            Property::attribute("sku", QName::unqualified("sku"), BindingTypeName::xsd("String", "token")),
            Property::element("qty", QName::new(NS, "qty"), BindingTypeName::xsd("u32", "unsignedInt")),
            Property::element("price", QName::new(NS, "price"), BindingTypeName::xsd("BigDecimal", "decimal")),
        ],
    ));
    file.add_binding_type(BindingType::by_name(
        order.clone(),
        vec![
            Property::element("id", QName::new(NS, "id"), BindingTypeName::xsd("i64", "long")),
            Property::element("items", QName::new(NS, "item"), item).multiple(),
        ],
    ));
    file.add_element(QName::new(NS, "order"), order);

    let mut bundle = MemoryBundle::new();
    bundle.set_binding_descriptor(file).expect("open bundle");
    let bundle: Arc<dyn Bundle> = Arc::new(bundle);
    BindingContextFactory::new_instance()
        .create_binding_context_from_bundles(vec![bundle])
        .expect("bench context")
}

fn order(items: usize) -> Value {
    let items = (0..items)
        .map(|i| {
            Value::Struct(
                StructValue::new("bench.Item")
                    .with("sku", format!("SKU-{}", i))
                    .with("qty", i as u32)
                    .with("price", "19.99".parse::<bigdecimal::BigDecimal>().expect("decimal")),
            )
        })
        .collect();
    Value::Struct(
        StructValue::new("bench.Order")
            .with("id", 42i64)
            .with("items", Value::List(items)),
    )
}

fn bench_marshal(c: &mut Criterion) {
    let ctx = context();
    let value = order(32);
    c.bench_function("marshal_order_32_items", |b| {
        b.iter(|| {
            let mut sink = EventStream::new();
            ctx.create_marshaller()
                .marshal(&mut sink, black_box(&value), &XmlOptions::new())
                .expect("marshal");
            black_box(sink.to_xml_string().expect("text"))
        });
    });
}

fn bench_unmarshal(c: &mut Criterion) {
    let ctx = context();
    let mut sink = EventStream::new();
    ctx.create_marshaller()
        .marshal(&mut sink, &order(32), &XmlOptions::new())
        .expect("marshal");
    let text = sink.to_xml_string().expect("text");
    c.bench_function("unmarshal_order_32_items", |b| {
        b.iter(|| {
            ctx.create_unmarshaller()
                .unmarshal_str(black_box(&text), &XmlOptions::new())
                .expect("unmarshal")
        });
    });
}

criterion_group!(benches, bench_marshal, bench_unmarshal);
criterion_main!(benches);
