// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding context and its factory.
//!
//! A [`BindingContext`] is the immutable root of every session: a loader
//! chain (bundles in the given order, then the built-ins), one runtime type
//! table and the context configuration. It is `Send + Sync` and cheap to
//! clone; threads share it and each creates its own sessions.

use crate::binding::{
    BindingFile, BindingLoader, BindingType, BindingTypeName, BuiltinBindingLoader,
    CompositeBindingLoader, FileBindingLoader, NativeTypeName,
};
use crate::bundle::{Bundle, BundleManifest, SealedBundle};
use crate::config::ContextConfig;
use crate::error::{Error, Result};
use crate::marshal::{Marshaller, Unmarshaller};
use crate::runtime::{converter_for, ConverterPair, RuntimeBindingTypeTable};
use crate::value::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Maps a value to the native type id used to look up its binding type.
pub type TypeIdentifier = Arc<dyn Fn(&Value) -> Option<NativeTypeName> + Send + Sync>;

// ============================================================================
// Factory
// ============================================================================

/// Builds [`BindingContext`]s.
///
/// ```
/// use xbind::BindingContextFactory;
///
/// let context = BindingContextFactory::new_instance()
///     .create_binding_context()
///     .unwrap();
/// assert!(context.bundles().is_empty());
/// ```
#[derive(Clone)]
pub struct BindingContextFactory {
    config: ContextConfig,
    identifier: TypeIdentifier,
    converters: Vec<(BindingTypeName, ConverterPair)>,
}

impl BindingContextFactory {
    pub fn new_instance() -> Self {
        Self {
            config: ContextConfig::default(),
            identifier: Arc::new(Value::native_type),
            converters: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the runtime type hook (default: [`Value::native_type`]).
    pub fn with_type_identifier<F>(mut self, identifier: F) -> Self
    where
        F: Fn(&Value) -> Option<NativeTypeName> + Send + Sync + 'static,
    {
        self.identifier = Arc::new(identifier);
        self
    }

    /// Host-supplied converters for `name`, installed in every context built
    /// afterwards. Takes precedence over generated converters.
    pub fn register_converter(mut self, name: BindingTypeName, pair: ConverterPair) -> Self {
        log::debug!("[BindingContextFactory] registered converter for {}", name);
        self.converters.push((name, pair));
        self
    }

    /// Context over the built-in binding types only.
    pub fn create_binding_context(&self) -> Result<BindingContext> {
        self.build(Vec::new())
    }

    /// Context over one bundle directory (or descriptor file).
    pub fn create_binding_context_from(&self, location: impl AsRef<Path>) -> Result<BindingContext> {
        self.create_binding_context_from_locations(&[location])
    }

    /// Context over several bundles; earlier bundles take precedence.
    pub fn create_binding_context_from_locations<P: AsRef<Path>>(
        &self,
        locations: &[P],
    ) -> Result<BindingContext> {
        let bundles = locations
            .iter()
            .map(|l| SealedBundle::load(l).map(|b| Arc::new(b) as Arc<dyn Bundle>))
            .collect::<Result<Vec<_>>>()?;
        self.build(bundles)
    }

    pub fn create_binding_context_from_bundles(
        &self,
        bundles: Vec<Arc<dyn Bundle>>,
    ) -> Result<BindingContext> {
        self.build(bundles)
    }

    /// Context over a single binding descriptor file.
    pub fn create_binding_context_from_config(
        &self,
        descriptor: impl AsRef<Path>,
    ) -> Result<BindingContext> {
        let path = descriptor.as_ref();
        let file = BindingFile::load(path).map_err(|e| Error::bundle_load(path, e))?;
        let bundle: Arc<dyn Bundle> =
            Arc::new(SealedBundle::from_parts(file, Vec::new(), BundleManifest::default()));
        self.build(vec![bundle])
    }

    fn build(&self, bundles: Vec<Arc<dyn Bundle>>) -> Result<BindingContext> {
        let mut loaders: Vec<Arc<dyn BindingLoader>> = bundles
            .iter()
            .map(|b| Arc::new(FileBindingLoader::new(b.binding_descriptor())) as Arc<dyn BindingLoader>)
            .collect();
        loaders.push(Arc::new(BuiltinBindingLoader::new()));
        let loader = CompositeBindingLoader::new(loaders);

        let mut table = RuntimeBindingTypeTable::new();
        let mut seen = HashSet::new();
        for bundle in &bundles {
            for declared in bundle.binding_descriptor().binding_types() {
                if !seen.insert(declared.name.clone()) {
                    continue;
                }
                // The chain's winner may come from an earlier bundle.
                if let Some(winner) = loader.binding_type(&declared.name) {
                    table.put_pair(winner.name.clone(), converter_for(&winner));
                }
            }
        }

        for (name, pair) in &self.converters {
            table.put_pair(name.clone(), pair.clone());
        }

        for bundle in &bundles {
            for native in bundle.compiled_types() {
                let registered = self.converters.iter().any(|(n, _)| &n.native == native);
                if !registered {
                    log::warn!(
                        "[BindingContextFactory] compiled type {} has no registered converter",
                        native
                    );
                }
            }
        }

        table.initialize_all(&loader);

        log::debug!(
            "[BindingContextFactory] context ready: {} bundle(s), {} local binding type(s)",
            bundles.len(),
            table.local_len()
        );

        Ok(BindingContext {
            inner: Arc::new(ContextInner {
                bundles,
                loader,
                table,
                config: self.config.clone(),
                identifier: self.identifier.clone(),
            }),
        })
    }
}

impl Default for BindingContextFactory {
    fn default() -> Self {
        Self::new_instance()
    }
}

impl fmt::Debug for BindingContextFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContextFactory")
            .field("config", &self.config)
            .field("converters", &self.converters.len())
            .finish()
    }
}

// ============================================================================
// Context
// ============================================================================

pub(crate) struct ContextInner {
    pub(crate) bundles: Vec<Arc<dyn Bundle>>,
    pub(crate) loader: CompositeBindingLoader,
    pub(crate) table: RuntimeBindingTypeTable,
    pub(crate) config: ContextConfig,
    identifier: TypeIdentifier,
}

impl ContextInner {
    pub(crate) fn identify(&self, value: &Value) -> Option<NativeTypeName> {
        (self.identifier)(value)
    }
}

/// Immutable binding metadata shared by every session created from it.
#[derive(Clone)]
pub struct BindingContext {
    pub(crate) inner: Arc<ContextInner>,
}

impl BindingContext {
    pub fn create_marshaller(&self) -> Marshaller {
        Marshaller::new(self.clone())
    }

    pub fn create_unmarshaller(&self) -> Unmarshaller {
        Unmarshaller::new(self.clone())
    }

    pub fn loader(&self) -> &dyn BindingLoader {
        &self.inner.loader
    }

    pub fn type_table(&self) -> &RuntimeBindingTypeTable {
        &self.inner.table
    }

    pub fn bundles(&self) -> &[Arc<dyn Bundle>] {
        &self.inner.bundles
    }

    pub fn config(&self) -> &ContextConfig {
        &self.inner.config
    }

    pub fn binding_type(&self, name: &BindingTypeName) -> Option<Arc<BindingType>> {
        self.inner.loader.binding_type(name)
    }

    /// Native type id of `value` as seen by this context's type hook.
    pub fn identify(&self, value: &Value) -> Option<NativeTypeName> {
        self.inner.identify(value)
    }
}

impl fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContext")
            .field("bundles", &self.inner.bundles)
            .field("loaders", &self.inner.loader.len())
            .field("local_types", &self.inner.table.local_len())
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Property;
    use crate::bundle::{BundleWriter, MemoryBundle};
    use crate::qname::QName;

    fn point_bundle(x_type: &str) -> Arc<dyn Bundle> {
        let point = BindingTypeName::new("demo.Point", QName::new("urn:demo", "Point"));
        let mut file = BindingFile::new();
        file.add_binding_type(BindingType::by_name(
            point.clone(),
            vec![Property::element("x", QName::unqualified("x"), BindingTypeName::xsd(x_type, "int"))],
        ));
        let mut bundle = MemoryBundle::new();
        bundle.set_binding_descriptor(file).unwrap();
        Arc::new(bundle)
    }

    #[test]
    fn builtins_only() {
        let ctx = BindingContextFactory::new_instance().create_binding_context().unwrap();
        assert!(ctx.binding_type(&BindingTypeName::xsd("i32", "int")).is_some());
        assert_eq!(ctx.type_table().local_len(), 0);
    }

    #[test]
    fn bundle_types_get_converters() {
        let ctx = BindingContextFactory::new_instance()
            .create_binding_context_from_bundles(vec![point_bundle("i32")])
            .unwrap();
        let point = BindingTypeName::new("demo.Point", QName::new("urn:demo", "Point"));
        assert!(ctx.type_table().has_local(&point));
        assert!(ctx.type_table().unmarshaller(&point).is_some());
    }

    #[test]
    fn first_bundle_wins() {
        let point = BindingTypeName::new("demo.Point", QName::new("urn:demo", "Point"));
        let ctx = BindingContextFactory::new_instance()
            .create_binding_context_from_bundles(vec![point_bundle("i32"), point_bundle("i64")])
            .unwrap();
        let bt = ctx.binding_type(&point).unwrap();
        assert_eq!(bt.properties()[0].type_name.native.as_str(), "i32");
    }

    #[test]
    fn custom_type_identifier() {
        let ctx = BindingContextFactory::new_instance()
            .with_type_identifier(|_| Some(NativeTypeName::new("always")))
            .create_binding_context()
            .unwrap();
        assert_eq!(ctx.identify(&Value::I32(1)).unwrap().as_str(), "always");
    }

    #[test]
    fn missing_descriptor_names_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match BindingContextFactory::new_instance().create_binding_context_from_config(&path) {
            Err(Error::BundleLoad { location, .. }) => assert_eq!(location, path),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
