// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding type model.
//!
//! A binding pairs a native type id with a schema type name
//! ([`BindingTypeName`]) and describes how values of that pair are laid out
//! on the wire ([`BindingKind`]). Binding types are immutable once built and
//! are shared as `Arc<BindingType>`.
//!
//! ## Resolution
//!
//! [`BindingLoader`] answers lookups over one binding source;
//! [`CompositeBindingLoader`] chains several with first-definition-wins
//! precedence, and the [`BuiltinBindingLoader`] covers the XML Schema
//! primitives.

mod builtin;
mod file;
mod loader;

pub use builtin::{any_type_name, builtin_binding_file, BuiltinBindingLoader, ANY_NATIVE};
pub use file::{BindingEntry, BindingFile, ElementBinding, FileBindingLoader};
pub use loader::{BindingLoader, CompositeBindingLoader};

use crate::codec::LexicalSpace;
use crate::qname::QName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest `base` chain followed before giving up (guards against cycles).
const MAX_BASE_DEPTH: usize = 64;

// ============================================================================
// Names
// ============================================================================

/// Native type identifier (`i32`, `BigInt`, `com.mytest.MyClass`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeTypeName(String);

impl NativeTypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NativeTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NativeTypeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NativeTypeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Lookup key of every binding: (native type id, schema type name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BindingTypeName {
    pub native: NativeTypeName,
    pub schema: QName,
}

impl BindingTypeName {
    pub fn new(native: impl Into<NativeTypeName>, schema: QName) -> Self {
        Self {
            native: native.into(),
            schema,
        }
    }

    /// Built-in pairing of a native id with an `xs:` type.
    pub fn xsd(native: impl Into<NativeTypeName>, local: &str) -> Self {
        Self::new(native, QName::xsd(local))
    }
}

impl fmt::Display for BindingTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.native, self.schema)
    }
}

// ============================================================================
// Binding types
// ============================================================================

/// A complete binding: its name plus its structural kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingType {
    #[serde(flatten)]
    pub name: BindingTypeName,
    #[serde(flatten)]
    pub kind: BindingKind,
}

/// Structural kind of a binding type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BindingKind {
    /// Primitive text in one of the built-in lexical spaces.
    Builtin { lexical: LexicalSpace },
    /// Structure with named properties, in wire order. `base` names the
    /// structure this one narrows, if any.
    ByName {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<BindingTypeName>,
        properties: Vec<Property>,
    },
    /// Wrapped list: one child element per item.
    List {
        item: BindingTypeName,
        item_element: QName,
    },
    /// Type whose instances may be narrower types, discovered at runtime.
    /// An empty `subtypes` list leaves the set open.
    Polymorphic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<BindingTypeName>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        subtypes: Vec<BindingTypeName>,
    },
}

impl BindingType {
    pub fn builtin(name: BindingTypeName, lexical: LexicalSpace) -> Self {
        Self {
            name,
            kind: BindingKind::Builtin { lexical },
        }
    }

    pub fn by_name(name: BindingTypeName, properties: Vec<Property>) -> Self {
        Self {
            name,
            kind: BindingKind::ByName {
                base: None,
                properties,
            },
        }
    }

    /// Structure narrowing `base`: it may stand in wherever `base` is declared.
    pub fn derived(name: BindingTypeName, base: BindingTypeName, properties: Vec<Property>) -> Self {
        Self {
            name,
            kind: BindingKind::ByName {
                base: Some(base),
                properties,
            },
        }
    }

    pub fn list(name: BindingTypeName, item: BindingTypeName, item_element: QName) -> Self {
        Self {
            name,
            kind: BindingKind::List { item, item_element },
        }
    }

    pub fn polymorphic(
        name: BindingTypeName,
        base: Option<BindingTypeName>,
        subtypes: Vec<BindingTypeName>,
    ) -> Self {
        Self {
            name,
            kind: BindingKind::Polymorphic { base, subtypes },
        }
    }

    pub fn is_polymorphic(&self) -> bool {
        matches!(self.kind, BindingKind::Polymorphic { .. })
    }

    /// Structure this one narrows.
    pub fn base(&self) -> Option<&BindingTypeName> {
        match &self.kind {
            BindingKind::ByName { base, .. } => base.as_ref(),
            _ => None,
        }
    }

    /// Whether `candidate` may stand in for this type at runtime.
    ///
    /// Open polymorphic types accept anything; closed ones their listed
    /// subtypes and structures derived from them. A structure accepts
    /// itself and structures whose `base` chain, resolved through
    /// `loader`, reaches it.
    pub fn admits(&self, candidate: &BindingType, loader: &dyn BindingLoader) -> bool {
        match &self.kind {
            BindingKind::Polymorphic { subtypes, .. } => {
                subtypes.is_empty() || subtypes.iter().any(|s| candidate.derives_from(s, loader))
            }
            BindingKind::ByName { .. } => candidate.derives_from(&self.name, loader),
            _ => candidate.name == self.name,
        }
    }

    /// Whether this type is `ancestor` or narrows it through `base` links.
    pub fn derives_from(&self, ancestor: &BindingTypeName, loader: &dyn BindingLoader) -> bool {
        if self.name == *ancestor {
            return true;
        }
        let mut next = self.base().cloned();
        let mut hops = 0;
        while let Some(name) = next {
            if name == *ancestor {
                return true;
            }
            hops += 1;
            if hops > MAX_BASE_DEPTH {
                log::warn!("[BindingType] base chain of {} exceeds {} links", self.name, MAX_BASE_DEPTH);
                return false;
            }
            next = loader.binding_type(&name).and_then(|bt| bt.base().cloned());
        }
        false
    }

    /// Properties of a by-name structure.
    pub fn properties(&self) -> &[Property] {
        match &self.kind {
            BindingKind::ByName { properties, .. } => properties,
            _ => &[],
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

/// One property of a by-name structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Field name in the native [`StructValue`](crate::StructValue).
    pub name: String,
    /// Element or attribute name on the wire.
    pub qname: QName,
    #[serde(rename = "type")]
    pub type_name: BindingTypeName,
    #[serde(default, skip_serializing_if = "is_false")]
    pub attribute: bool,
    /// Repeated element; the field holds a `Value::List`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nillable: bool,
    /// Lexical default applied when an attribute is absent on input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Property {
    /// Element property.
    pub fn element(name: impl Into<String>, qname: QName, type_name: BindingTypeName) -> Self {
        Self {
            name: name.into(),
            qname,
            type_name,
            attribute: false,
            multiple: false,
            nillable: false,
            default: None,
        }
    }

    /// Attribute property.
    pub fn attribute(name: impl Into<String>, qname: QName, type_name: BindingTypeName) -> Self {
        Self {
            attribute: true,
            ..Self::element(name, qname, type_name)
        }
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn nillable(mut self) -> Self {
        self.nillable = true;
        self
    }

    pub fn with_default(mut self, lexical: impl Into<String>) -> Self {
        self.default = Some(lexical.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn my_class() -> BindingType {
        BindingType::by_name(
            BindingTypeName::new("com.mytest.MyClass", QName::new("java:com.mytest", "MyClass")),
            vec![
                Property::element("my_elt", QName::unqualified("myelt"), BindingTypeName::xsd("i32", "int")),
                Property::attribute("attrib", QName::unqualified("attrib"), BindingTypeName::xsd("String", "string"))
                    .with_default("none"),
            ],
        )
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(my_class()).unwrap();
        assert_eq!(json["kind"], "by-name");
        assert_eq!(json["native"], "com.mytest.MyClass");
        assert_eq!(json["schema"], "{java:com.mytest}MyClass");
        assert_eq!(json["properties"][1]["attribute"], true);
        assert!(json["properties"][0].get("attribute").is_none());
    }

    #[test]
    fn json_roundtrip() {
        let original = my_class();
        let text = serde_json::to_string(&original).unwrap();
        let back: BindingType = serde_json::from_str(&text).unwrap();
        assert_eq!(back, original);

        let poly = BindingType::polymorphic(
            BindingTypeName::xsd("Value", "anyType"),
            None,
            Vec::new(),
        );
        let back: BindingType = serde_json::from_str(&serde_json::to_string(&poly).unwrap()).unwrap();
        assert_eq!(back, poly);
    }

    fn name(local: &str) -> BindingTypeName {
        BindingTypeName::new(format!("com.mytest.{}", local), QName::new("java:com.mytest", local))
    }

    /// MyClass <- MySubClass <- MyLeaf, Unrelated on its own.
    fn hierarchy() -> FileBindingLoader {
        let mut file = BindingFile::new();
        file.add_binding_type(my_class());
        file.add_binding_type(BindingType::derived(name("MySubClass"), name("MyClass"), Vec::new()));
        file.add_binding_type(BindingType::derived(name("MyLeaf"), name("MySubClass"), Vec::new()));
        file.add_binding_type(BindingType::by_name(name("Unrelated"), Vec::new()));
        FileBindingLoader::new(&file)
    }

    #[test]
    fn admits() {
        let loader = hierarchy();
        let open = BindingType::polymorphic(BindingTypeName::xsd("Value", "anyType"), None, Vec::new());
        let int = BindingType::builtin(BindingTypeName::xsd("i32", "int"), LexicalSpace::Int);
        assert!(open.admits(&int, &loader));
        let closed = BindingType::polymorphic(
            BindingTypeName::xsd("Number", "decimal"),
            None,
            vec![BindingTypeName::xsd("i64", "long")],
        );
        assert!(!closed.admits(&int, &loader));
        assert!(!int.admits(&open, &loader));
        assert!(my_class().admits(&my_class(), &loader));
    }

    #[test]
    fn structures_admit_only_their_descendants() {
        let loader = hierarchy();
        let base = loader.binding_type(&name("MyClass")).unwrap();
        let sub = loader.binding_type(&name("MySubClass")).unwrap();
        let leaf = loader.binding_type(&name("MyLeaf")).unwrap();
        let unrelated = loader.binding_type(&name("Unrelated")).unwrap();

        assert!(base.admits(&sub, &loader));
        assert!(base.admits(&leaf, &loader));
        assert!(sub.admits(&leaf, &loader));
        assert!(!sub.admits(&base, &loader));
        assert!(!base.admits(&unrelated, &loader));
        assert!(!unrelated.admits(&base, &loader));

        let closed = BindingType::polymorphic(name("Shape"), None, vec![name("MySubClass")]);
        assert!(closed.admits(&leaf, &loader));
        assert!(!closed.admits(&base, &loader));
    }

    #[test]
    fn base_cycle_terminates() {
        let mut file = BindingFile::new();
        file.add_binding_type(BindingType::derived(name("A"), name("B"), Vec::new()));
        file.add_binding_type(BindingType::derived(name("B"), name("A"), Vec::new()));
        let loader = FileBindingLoader::new(&file);
        let a = loader.binding_type(&name("A")).unwrap();
        assert!(!a.derives_from(&name("C"), &loader));
    }

    #[test]
    fn base_is_serialized_only_when_set() {
        let json = serde_json::to_value(my_class()).unwrap();
        assert!(json.get("base").is_none());
        let sub = BindingType::derived(name("MySubClass"), name("MyClass"), Vec::new());
        let back: BindingType = serde_json::from_str(&serde_json::to_string(&sub).unwrap()).unwrap();
        assert_eq!(back.base(), Some(&name("MyClass")));
    }

    #[test]
    fn display() {
        assert_eq!(
            BindingTypeName::xsd("i32", "int").to_string(),
            "i32<->{http://www.w3.org/2001/XMLSchema}int"
        );
    }
}
