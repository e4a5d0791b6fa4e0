// src/core/est/classifier.rs
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EstMetricsError, Result};
use super::node::EstNode;

/// Literal subtype of a `Value` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Bool,
    String,
    Num,
}

impl LiteralKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiteralKind::Bool => "bool-literal",
            LiteralKind::String => "string-literal",
            LiteralKind::Num => "num-literal",
        }
    }

    /// Classify a `Value` payload. Booleans are checked first so they can
    /// never be counted as numbers.
    pub fn of(payload: &Value) -> Result<Self> {
        if payload.is_boolean() {
            Ok(LiteralKind::Bool)
        } else if payload.is_string() {
            Ok(LiteralKind::String)
        } else if payload.is_number() {
            Ok(LiteralKind::Num)
        } else {
            Err(EstMetricsError::UnresolvedKind {
                payload: payload.to_string(),
            })
        }
    }
}

/// Syntactic kind of one node: an operator name or a literal subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind<'a> {
    Literal(LiteralKind),
    Operator(&'a str),
}

impl<'a> Kind<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Kind::Literal(literal) => literal.as_str(),
            Kind::Operator(key) => *key,
        }
    }
}

impl fmt::Display for Kind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a node. `Value` nodes resolve to their literal subtype; every
/// other node's kind is its discriminant key.
pub fn kind_of<'a>(node: &EstNode<'a>) -> Result<Kind<'a>> {
    if node.key() == "Value" {
        LiteralKind::of(node.payload()).map(Kind::Literal)
    } else {
        Ok(Kind::Operator(node.key()))
    }
}

/// Mapping from kind labels to coarser category labels.
///
/// Kinds without an entry are their own category, so the default (empty)
/// table is the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    by_kind: HashMap<String, String>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from category groups (category label -> member kinds).
    /// A kind may belong to at most one category.
    pub fn from_groups<I, K>(groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, K)>,
        K: IntoIterator<Item = String>,
    {
        let mut by_kind = HashMap::new();

        for (category, kinds) in groups {
            for kind in kinds {
                if let Some(previous) = by_kind.insert(kind.clone(), category.clone()) {
                    if previous != category {
                        return Err(EstMetricsError::Config(format!(
                            "kind `{}` is listed under both `{}` and `{}`",
                            kind, previous, category
                        )));
                    }
                }
            }
        }

        Ok(Self { by_kind })
    }

    pub fn category_of<'s>(&'s self, kind: &'s str) -> &'s str {
        self.by_kind.get(kind).map(String::as_str).unwrap_or(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind(raw: &Value) -> Result<String> {
        let node = EstNode::new(raw)?;
        kind_of(&node).map(|k| k.to_string())
    }

    #[test]
    fn test_literal_kinds() {
        assert_eq!(kind(&json!({"Value": true})).unwrap(), "bool-literal");
        assert_eq!(kind(&json!({"Value": "alice"})).unwrap(), "string-literal");
        assert_eq!(kind(&json!({"Value": 5})).unwrap(), "num-literal");
        assert_eq!(kind(&json!({"Value": -2.5})).unwrap(), "num-literal");
    }

    #[test]
    fn test_operator_kind_is_key() {
        let raw = json!({"&&": {"left": {"Value": true}, "right": {"Value": false}}});
        assert_eq!(kind(&raw).unwrap(), "&&");
        assert_eq!(kind(&json!({"Var": "principal"})).unwrap(), "Var");
    }

    #[test]
    fn test_conjunction_children_are_bool_literals() {
        let raw = json!({"&&": {"left": {"Value": true}, "right": {"Value": false}}});
        let root = EstNode::new(&raw).unwrap();
        let children = super::super::children_of(&root).unwrap();
        assert_eq!(children.len(), 2);
        for child in &children {
            assert_eq!(kind_of(child).unwrap(), Kind::Literal(LiteralKind::Bool));
        }
    }

    #[test]
    fn test_unresolved_payloads_fail() {
        for payload in [json!(null), json!({"__entity": {"type": "User", "id": "a"}}), json!([1])] {
            let raw = json!({ "Value": payload });
            assert!(matches!(kind(&raw), Err(EstMetricsError::UnresolvedKind { .. })));
        }
    }

    #[test]
    fn test_default_category_table_is_identity() {
        let table = CategoryTable::new();
        assert!(table.is_empty());
        assert_eq!(table.category_of("&&"), "&&");
        assert_eq!(table.category_of("num-literal"), "num-literal");
    }

    #[test]
    fn test_category_groups() {
        let table = CategoryTable::from_groups(vec![
            ("Unary Ops".to_string(), vec!["!".to_string(), "neg".to_string()]),
            ("Literals".to_string(), vec!["bool-literal".to_string()]),
        ])
        .unwrap();
        assert_eq!(table.category_of("neg"), "Unary Ops");
        assert_eq!(table.category_of("bool-literal"), "Literals");
        assert_eq!(table.category_of("||"), "||");
    }

    #[test]
    fn test_kind_in_two_categories_rejected() {
        let result = CategoryTable::from_groups(vec![
            ("A".to_string(), vec!["!".to_string()]),
            ("B".to_string(), vec!["!".to_string()]),
        ]);
        assert!(matches!(result, Err(EstMetricsError::Config(_))));
    }
}
