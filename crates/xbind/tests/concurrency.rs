// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One shared context, many threads, one session per call.

mod common;

use common::{context, my_class, my_sub_class, your_class};
use std::thread;
use xbind::{EventStream, Value, XmlOptions};

const THREADS: usize = 8;
const ROUND_TRIPS: usize = 50;

#[test]
fn shared_context_across_threads() {
    let ctx = context();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let ctx = ctx.clone();
            thread::spawn(move || {
                let mut rng = fastrand::Rng::with_seed(t as u64);
                for i in 0..ROUND_TRIPS {
                    let count = rng.i32(..);
                    let name = format!("t{}-{}", t, i);
                    let value = if rng.bool() {
                        your_class(my_sub_class(&name, count, rng.bool()), "sub")
                    } else {
                        your_class(my_class(&name, count), "base")
                    };

                    let mut sink = EventStream::new();
                    ctx.create_marshaller()
                        .marshal(&mut sink, &value, &XmlOptions::new())
                        .unwrap();
                    let text = sink.to_xml_string().unwrap();

                    let mut unmarshaller = ctx.create_unmarshaller();
                    let back: Value = unmarshaller.unmarshal_str(&text, &XmlOptions::new()).unwrap();
                    assert!(unmarshaller.diagnostics().is_empty());
                    assert_eq!(back, value, "thread {} iteration {}", t, i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn context_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<xbind::BindingContext>();
}
