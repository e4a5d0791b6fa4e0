// src/core/est/node.rs
use serde_json::Value;

use crate::error::{EstMetricsError, Result};

/// Structural shape of an EST node, decided by its discriminant key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `Value`, `Var`, `Slot`, `Unknown`
    Leaf,
    /// One child under `arg`
    Unary,
    /// Two children under `left` and `right`
    Binary,
    /// One child under `left`; the right-hand side is a literal tag
    LhsOnly,
    /// `if`, `then`, `else`
    Conditional,
    /// `Set`: an array of children
    Collection,
    /// `Record`: field name to child
    Record,
    /// Extension function call: an array of arguments
    Call,
}

const LEAF_KEYS: &[&str] = &["Value", "Var", "Slot", "Unknown"];
const UNARY_KEYS: &[&str] = &["!", "neg", "isEmpty"];
const BINARY_KEYS: &[&str] = &[
    "==", "!=", "in", "<", "<=", ">", ">=", "&&", "||", "+", "-", "*",
    "contains", "containsAll", "containsAny", "getTag", "hasTag",
];
const LHS_ONLY_KEYS: &[&str] = &["like", ".", "has", "is"];

impl Shape {
    /// Classify a discriminant key. Unknown keys are calls, but only when
    /// the payload is an argument array.
    pub fn of(key: &str, payload: &Value) -> Result<Self> {
        let shape = if LEAF_KEYS.contains(&key) {
            Shape::Leaf
        } else if UNARY_KEYS.contains(&key) {
            Shape::Unary
        } else if BINARY_KEYS.contains(&key) {
            Shape::Binary
        } else if LHS_ONLY_KEYS.contains(&key) {
            Shape::LhsOnly
        } else {
            match key {
                "if-then-else" => Shape::Conditional,
                "Set" => Shape::Collection,
                "Record" => Shape::Record,
                _ if payload.is_array() => Shape::Call,
                _ => {
                    return Err(EstMetricsError::MalformedNode(format!(
                        "unknown discriminant `{}` with a non-array payload",
                        key
                    )))
                }
            }
        };
        Ok(shape)
    }
}

/// Return the single key of an EST node mapping
pub fn discriminant_key(node: &Value) -> Result<&str> {
    let map = node.as_object().ok_or_else(|| {
        EstMetricsError::MalformedNode(format!("expected a mapping, found {}", json_type(node)))
    })?;

    let mut keys = map.keys();
    match (keys.next(), keys.next()) {
        (Some(key), None) => Ok(key.as_str()),
        (None, _) => Err(EstMetricsError::MalformedNode(
            "node mapping has no discriminant key".to_string(),
        )),
        (Some(_), Some(_)) => Err(EstMetricsError::MalformedNode(format!(
            "node mapping has {} keys, expected exactly one",
            map.len()
        ))),
    }
}

/// Validated, borrowed view over one EST node
#[derive(Debug, Clone, Copy)]
pub struct EstNode<'a> {
    raw: &'a Value,
    key: &'a str,
    payload: &'a Value,
    shape: Shape,
}

impl<'a> EstNode<'a> {
    pub fn new(raw: &'a Value) -> Result<Self> {
        let key = discriminant_key(raw)?;
        // discriminant_key has already proven the mapping holds `key`
        let payload = &raw[key];
        let shape = Shape::of(key, payload)?;

        Ok(Self {
            raw,
            key,
            payload,
            shape,
        })
    }

    /// The node exactly as it was deserialized
    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn payload(&self) -> &'a Value {
        self.payload
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Look up a required structural field (`left`, `arg`, `if`, ...)
    pub(crate) fn field(&self, name: &str) -> Result<&'a Value> {
        self.payload
            .as_object()
            .and_then(|fields| fields.get(name))
            .ok_or_else(|| {
                EstMetricsError::MalformedNode(format!(
                    "`{}` node is missing field `{}`",
                    self.key, name
                ))
            })
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
