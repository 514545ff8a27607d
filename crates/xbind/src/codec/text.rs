// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String family, anyURI and QName lexical spaces.

use super::numeric::wrong_shape;
use super::{ConversionError, LexicalSpace};
use crate::qname::{split_prefixed, NamespaceResolver, PrefixResolver, QName};
use crate::value::Value;

/// Whitespace facet of a lexical space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Whitespace {
    Preserve,
    /// Tab, CR and LF become spaces.
    Replace,
    /// Replace, then squeeze runs of spaces and trim.
    Collapse,
}

impl Whitespace {
    pub(crate) fn of(space: LexicalSpace) -> Self {
        match space {
            LexicalSpace::String => Whitespace::Preserve,
            LexicalSpace::NormalizedString => Whitespace::Replace,
            _ => Whitespace::Collapse,
        }
    }

    pub(crate) fn apply(self, text: &str) -> String {
        match self {
            Whitespace::Preserve => text.to_string(),
            Whitespace::Replace => text
                .chars()
                .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
                .collect(),
            Whitespace::Collapse => text
                .split(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r'))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

// ----------------------------------------------------------------------------
// Name productions (ASCII-complete, permissive above U+007F)
// ----------------------------------------------------------------------------

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_name_char(c: char) -> bool {
    is_name_start(c)
        || c.is_ascii_digit()
        || c == '-'
        || c == '.'
        || c == '\u{B7}'
        || (!c.is_ascii() && c.is_alphanumeric())
}

pub(crate) fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_char)
}

pub(crate) fn is_ncname(text: &str) -> bool {
    is_name(text) && !text.contains(':')
}

fn is_nmtoken(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_name_char)
}

fn is_language(text: &str) -> bool {
    let mut parts = text.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| (1..=8).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| (1..=8).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphanumeric()))
}

fn check(space: LexicalSpace, text: &str) -> Result<(), ConversionError> {
    let ok = match space {
        LexicalSpace::Language => is_language(text),
        LexicalSpace::Name => is_name(text),
        LexicalSpace::NcName | LexicalSpace::Id | LexicalSpace::IdRef | LexicalSpace::Entity => {
            is_ncname(text)
        }
        LexicalSpace::NmToken => is_nmtoken(text),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(ConversionError::new(format!("'{}' is not a valid {}", text, space)))
    }
}

// ----------------------------------------------------------------------------
// string family
// ----------------------------------------------------------------------------

pub(super) fn print_string(space: LexicalSpace, value: &Value) -> Result<String, ConversionError> {
    let text = value
        .as_str()
        .ok_or_else(|| wrong_shape(space.xsd_name(), value))?;
    let text = Whitespace::of(space).apply(text);
    check(space, &text)?;
    Ok(text)
}

pub(super) fn parse_string(space: LexicalSpace, lexical: &str) -> Result<Value, ConversionError> {
    let text = Whitespace::of(space).apply(lexical);
    check(space, &text)?;
    Ok(Value::String(text))
}

// ----------------------------------------------------------------------------
// QName
// ----------------------------------------------------------------------------

pub(super) fn print_qname(
    value: &Value,
    prefixes: &mut dyn PrefixResolver,
) -> Result<String, ConversionError> {
    let Value::QName(q) = value else {
        return Err(wrong_shape("QName", value));
    };
    if !is_ncname(q.local_part()) {
        return Err(ConversionError::new(format!(
            "'{}' is not a valid QName local part",
            q.local_part()
        )));
    }
    if q.namespace().is_empty() {
        return Ok(q.local_part().to_string());
    }
    let prefix = prefixes.prefix_for_namespace(q.namespace());
    if prefix.is_empty() {
        Ok(q.local_part().to_string())
    } else {
        Ok(format!("{}:{}", prefix, q.local_part()))
    }
}

/// Resolve a prefixed lexical name against the in-scope namespaces.
pub(crate) fn resolve_qname(
    lexical: &str,
    namespaces: &dyn NamespaceResolver,
) -> Result<QName, ConversionError> {
    let text = lexical.trim();
    let (prefix, local) = split_prefixed(text);
    if !is_ncname(local) || (!prefix.is_empty() && !is_ncname(prefix)) {
        return Err(ConversionError::new(format!("invalid QName '{}'", text)));
    }
    match namespaces.namespace_for_prefix(prefix) {
        Some(ns) => Ok(QName::new(ns, local)),
        None if prefix.is_empty() => Ok(QName::unqualified(local)),
        None => Err(ConversionError::new(format!(
            "undeclared prefix '{}' in QName '{}'",
            prefix, text
        ))),
    }
}

pub(super) fn parse_qname(
    lexical: &str,
    namespaces: &dyn NamespaceResolver,
) -> Result<Value, ConversionError> {
    resolve_qname(lexical, namespaces).map(Value::QName)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Scope(HashMap<String, String>);

    impl NamespaceResolver for Scope {
        fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
            self.0.get(prefix).map(String::as_str)
        }
    }

    struct Declare(Vec<String>);

    impl PrefixResolver for Declare {
        fn prefix_for_namespace(&mut self, namespace: &str) -> String {
            self.0.push(namespace.to_string());
            format!("ns{}", self.0.len())
        }
    }

    #[test]
    fn whitespace_facets() {
        assert_eq!(Whitespace::Preserve.apply(" a\tb "), " a\tb ");
        assert_eq!(Whitespace::Replace.apply(" a\tb\n"), " a b ");
        assert_eq!(Whitespace::Collapse.apply("  a \t\n b  "), "a b");
    }

    #[test]
    fn token_is_collapsed_on_parse() {
        assert_eq!(
            parse_string(LexicalSpace::Token, "  hello   world ").unwrap(),
            Value::String("hello world".into())
        );
        assert_eq!(
            parse_string(LexicalSpace::String, "  hello ").unwrap(),
            Value::String("  hello ".into())
        );
    }

    #[test]
    fn name_checks() {
        assert!(parse_string(LexicalSpace::NcName, "abc-1").is_ok());
        assert!(parse_string(LexicalSpace::NcName, "a:b").is_err());
        assert!(parse_string(LexicalSpace::Name, "a:b").is_ok());
        assert!(parse_string(LexicalSpace::Name, "1abc").is_err());
        assert!(parse_string(LexicalSpace::NmToken, "1abc").is_ok());
        assert!(parse_string(LexicalSpace::Language, "en-US").is_ok());
        assert!(parse_string(LexicalSpace::Language, "english-language").is_ok());
        assert!(parse_string(LexicalSpace::Language, "englishlanguage").is_err());
        assert!(parse_string(LexicalSpace::Language, "en_US").is_err());
        assert!(print_string(LexicalSpace::Id, &Value::String("has space".into())).is_err());
    }

    #[test]
    fn qname_resolution() {
        let mut map = HashMap::new();
        map.insert("t".to_string(), "urn:test".to_string());
        let scope = Scope(map);
        assert_eq!(
            parse_qname("t:Thing", &scope).unwrap(),
            Value::QName(QName::new("urn:test", "Thing"))
        );
        assert_eq!(
            parse_qname("Thing", &scope).unwrap(),
            Value::QName(QName::unqualified("Thing"))
        );
        assert!(parse_qname("u:Thing", &scope).is_err());
    }

    #[test]
    fn qname_printing_declares_prefix() {
        let mut declare = Declare(Vec::new());
        let text = print_qname(&Value::QName(QName::new("urn:a", "x")), &mut declare).unwrap();
        assert_eq!(text, "ns1:x");
        assert_eq!(declare.0, vec!["urn:a".to_string()]);
        let text = print_qname(&Value::QName(QName::unqualified("y")), &mut declare).unwrap();
        assert_eq!(text, "y");
    }
}
