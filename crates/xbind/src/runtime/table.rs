// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime binding type table: built-ins shared process-wide, plus a
//! per-table overlay.

use super::{converter_for, ConverterPair, TypeMarshaller, TypeUnmarshaller};
use crate::binding::{builtin_binding_file, BindingLoader, BindingTypeName};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static BUILTIN_CONVERTERS: OnceLock<HashMap<BindingTypeName, ConverterPair>> = OnceLock::new();

fn builtin_converters() -> &'static HashMap<BindingTypeName, ConverterPair> {
    BUILTIN_CONVERTERS.get_or_init(|| {
        builtin_binding_file()
            .bindings
            .into_iter()
            .map(|entry| {
                let bt = Arc::new(entry.binding_type);
                (bt.name.clone(), converter_for(&bt))
            })
            .collect()
    })
}

#[derive(Debug, Default, Clone)]
struct Slot {
    marshaller: Option<Arc<dyn TypeMarshaller>>,
    unmarshaller: Option<Arc<dyn TypeUnmarshaller>>,
}

/// BindingTypeName -> converters.
///
/// A new table sees every built-in binding type. Registrations go to this
/// table's overlay only; other tables (including ones created later) are
/// unaffected.
#[derive(Debug, Default)]
pub struct RuntimeBindingTypeTable {
    overlay: HashMap<BindingTypeName, Slot>,
}

impl RuntimeBindingTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marshaller(&self, name: &BindingTypeName) -> Option<Arc<dyn TypeMarshaller>> {
        self.overlay
            .get(name)
            .and_then(|slot| slot.marshaller.clone())
            .or_else(|| builtin_converters().get(name).map(|p| p.marshaller.clone()))
    }

    pub fn unmarshaller(&self, name: &BindingTypeName) -> Option<Arc<dyn TypeUnmarshaller>> {
        self.overlay
            .get(name)
            .and_then(|slot| slot.unmarshaller.clone())
            .or_else(|| builtin_converters().get(name).map(|p| p.unmarshaller.clone()))
    }

    /// Whether this table's overlay has an entry for `name`.
    pub fn has_local(&self, name: &BindingTypeName) -> bool {
        self.overlay.contains_key(name)
    }

    pub fn is_builtin(name: &BindingTypeName) -> bool {
        builtin_converters().contains_key(name)
    }

    pub fn put_marshaller(&mut self, name: BindingTypeName, marshaller: Arc<dyn TypeMarshaller>) {
        self.overlay.entry(name).or_default().marshaller = Some(marshaller);
    }

    pub fn put_unmarshaller(&mut self, name: BindingTypeName, unmarshaller: Arc<dyn TypeUnmarshaller>) {
        self.overlay.entry(name).or_default().unmarshaller = Some(unmarshaller);
    }

    pub fn put_pair(&mut self, name: BindingTypeName, pair: ConverterPair) {
        let slot = self.overlay.entry(name).or_default();
        slot.marshaller = Some(pair.marshaller);
        slot.unmarshaller = Some(pair.unmarshaller);
    }

    /// Run each unmarshaller's one-time initialization. Safe to call again.
    pub fn initialize_all(&self, loader: &dyn BindingLoader) {
        for converter in self
            .overlay
            .values()
            .filter_map(|slot| slot.unmarshaller.as_ref())
        {
            converter.initialize(self, loader);
        }
        for pair in builtin_converters().values() {
            pair.unmarshaller.initialize(self, loader);
        }
        log::debug!(
            "[RuntimeBindingTypeTable] initialized {} local and {} built-in converters",
            self.overlay.len(),
            builtin_converters().len()
        );
    }

    /// Number of entries in this table's overlay.
    pub fn local_len(&self) -> usize {
        self.overlay.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingType, BuiltinBindingLoader};
    use crate::codec::LexicalSpace;
    use crate::qname::QName;

    fn custom() -> (BindingTypeName, ConverterPair) {
        let name = BindingTypeName::new("Code", QName::new("urn:t", "code"));
        let pair = converter_for(&Arc::new(BindingType::builtin(name.clone(), LexicalSpace::Token)));
        (name, pair)
    }

    #[test]
    fn new_table_has_builtins() {
        let table = RuntimeBindingTypeTable::new();
        for (native, local) in [("i32", "int"), ("BigInt", "negativeInteger"), ("Value", "anyType")] {
            let name = BindingTypeName::xsd(native, local);
            assert!(table.marshaller(&name).is_some(), "{}", name);
            assert!(table.unmarshaller(&name).is_some(), "{}", name);
        }
        assert!(table.marshaller(&BindingTypeName::xsd("u8", "int")).is_none());
    }

    #[test]
    fn registrations_are_isolated() {
        let (name, pair) = custom();
        let mut first = RuntimeBindingTypeTable::new();
        let second = RuntimeBindingTypeTable::new();
        first.put_pair(name.clone(), pair);
        assert!(first.marshaller(&name).is_some());
        assert!(second.marshaller(&name).is_none());
        let third = RuntimeBindingTypeTable::new();
        assert!(third.unmarshaller(&name).is_none());
    }

    #[test]
    fn put_creates_missing_slot() {
        let (name, pair) = custom();
        let mut table = RuntimeBindingTypeTable::new();
        table.put_unmarshaller(name.clone(), pair.unmarshaller);
        assert!(table.unmarshaller(&name).is_some());
        assert!(table.marshaller(&name).is_none());
        table.put_marshaller(name.clone(), pair.marshaller);
        assert!(table.marshaller(&name).is_some());
    }

    #[test]
    fn overlay_shadows_builtin() {
        let int = BindingTypeName::xsd("i32", "int");
        let mut table = RuntimeBindingTypeTable::new();
        let (_, pair) = custom();
        let replacement = pair.marshaller.clone();
        table.put_marshaller(int.clone(), replacement.clone());
        let found = table.marshaller(&int).unwrap();
        assert!(Arc::ptr_eq(&found, &replacement));
        assert!(!Arc::ptr_eq(&RuntimeBindingTypeTable::new().marshaller(&int).unwrap(), &replacement));
    }

    #[test]
    fn initialize_all_is_idempotent() {
        let table = RuntimeBindingTypeTable::new();
        let loader = BuiltinBindingLoader::new();
        table.initialize_all(&loader);
        table.initialize_all(&loader);
        assert_eq!(table.local_len(), 0);
    }
}
