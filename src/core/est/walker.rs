// src/core/est/walker.rs
use serde_json::Value;

use crate::error::{EstMetricsError, Result};
use super::node::{json_type, EstNode, Shape};

/// Immediate children of a node, in field order.
///
/// This is the edge set used for graph construction. `null` entries of
/// sets, records and call arguments are dropped.
pub fn children_of<'a>(node: &EstNode<'a>) -> Result<Vec<EstNode<'a>>> {
    match node.shape() {
        Shape::Leaf => Ok(Vec::new()),
        Shape::Unary => fields(node, &["arg"]),
        Shape::Binary => fields(node, &["left", "right"]),
        Shape::LhsOnly => fields(node, &["left"]),
        Shape::Conditional => fields(node, &["if", "then", "else"]),
        Shape::Collection | Shape::Call => {
            let items = node.payload().as_array().ok_or_else(|| wrong_payload(node, "an array"))?;
            non_null(items.iter())
        }
        Shape::Record => {
            let entries = node.payload().as_object().ok_or_else(|| wrong_payload(node, "a mapping"))?;
            non_null(entries.values())
        }
    }
}

/// Every subexpression of `node`, descendants first and `node` itself last.
///
/// Walks with an explicit stack so deep trees cannot exhaust the call stack.
pub fn subexpressions_of<'a>(node: &EstNode<'a>) -> Result<Vec<EstNode<'a>>> {
    let mut ordered = Vec::new();
    let mut stack = vec![(*node, false)];

    while let Some((current, expanded)) = stack.pop() {
        if expanded {
            ordered.push(current);
            continue;
        }

        stack.push((current, true));
        let children = children_of(&current)?;
        stack.extend(children.into_iter().rev().map(|child| (child, false)));
    }

    Ok(ordered)
}

fn fields<'a>(node: &EstNode<'a>, names: &[&str]) -> Result<Vec<EstNode<'a>>> {
    names
        .iter()
        .map(|name| node.field(name).and_then(EstNode::new))
        .collect()
}

fn non_null<'a, I>(items: I) -> Result<Vec<EstNode<'a>>>
where
    I: Iterator<Item = &'a Value>,
{
    items
        .filter(|item| !item.is_null())
        .map(EstNode::new)
        .collect()
}

fn wrong_payload(node: &EstNode<'_>, expected: &str) -> EstMetricsError {
    EstMetricsError::MalformedNode(format!(
        "`{}` payload must be {}, found {}",
        node.key(),
        expected,
        json_type(node.payload())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raws<'a>(nodes: &[EstNode<'a>]) -> Vec<&'a Value> {
        nodes.iter().map(|n| n.raw()).collect()
    }

    #[test]
    fn test_leaves_have_no_children() {
        for raw in [
            json!({"Value": true}),
            json!({"Var": "principal"}),
            json!({"Slot": "?principal"}),
            json!({"Unknown": {"name": "x"}}),
        ] {
            let node = EstNode::new(&raw).unwrap();
            assert!(children_of(&node).unwrap().is_empty());
            assert_eq!(subexpressions_of(&node).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_binary_children_in_order() {
        let raw = json!({"&&": {"left": {"Value": true}, "right": {"Value": false}}});
        let node = EstNode::new(&raw).unwrap();
        let children = children_of(&node).unwrap();
        assert_eq!(raws(&children), vec![&json!({"Value": true}), &json!({"Value": false})]);
    }

    #[test]
    fn test_lhs_only_ignores_rhs_tag() {
        let raw = json!({"has": {"left": {"Var": "resource"}, "attr": "owner"}});
        let node = EstNode::new(&raw).unwrap();
        let children = children_of(&node).unwrap();
        assert_eq!(raws(&children), vec![&json!({"Var": "resource"})]);
    }

    #[test]
    fn test_conditional_children() {
        let raw = json!({"if-then-else": {
            "if": {"Value": true},
            "then": {"Value": 1},
            "else": {"Var": "context"}
        }});
        let node = EstNode::new(&raw).unwrap();
        let keys: Vec<_> = children_of(&node).unwrap().iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["Value", "Value", "Var"]);
    }

    #[test]
    fn test_set_and_call_filter_nulls() {
        let raw = json!({"Set": [{"Value": 1}, null, {"Value": 2}]});
        let node = EstNode::new(&raw).unwrap();
        assert_eq!(children_of(&node).unwrap().len(), 2);

        let raw = json!({"ip": [null, {"Value": "10.0.0.1"}]});
        let node = EstNode::new(&raw).unwrap();
        assert_eq!(children_of(&node).unwrap().len(), 1);
    }

    #[test]
    fn test_record_children_order_independent() {
        let raw = json!({"Record": {"a": {"Value": 1}, "b": {"Value": 2}, "c": null}});
        let node = EstNode::new(&raw).unwrap();
        let children = children_of(&node).unwrap();
        let mut payloads: Vec<i64> = children
            .iter()
            .map(|c| c.payload().as_i64().unwrap())
            .collect();
        payloads.sort();
        assert_eq!(payloads, vec![1, 2]);
        assert_eq!(subexpressions_of(&node).unwrap().len(), 3);
    }

    #[test]
    fn test_subexpressions_post_order() {
        let raw = json!({"||": {
            "left": {"!": {"arg": {"Value": true}}},
            "right": {"Var": "principal"}
        }});
        let node = EstNode::new(&raw).unwrap();
        let keys: Vec<_> = subexpressions_of(&node).unwrap().iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["Value", "!", "Var", "||"]);
    }

    #[test]
    fn test_missing_structural_field_fails() {
        let raw = json!({"!": {}});
        let node = EstNode::new(&raw).unwrap();
        assert!(matches!(children_of(&node), Err(EstMetricsError::MalformedNode(_))));
    }

    #[test]
    fn test_set_with_object_payload_fails() {
        let raw = json!({"Set": {"a": {"Value": 1}}});
        let node = EstNode::new(&raw).unwrap();
        assert!(matches!(children_of(&node), Err(EstMetricsError::MalformedNode(_))));
    }

    #[test]
    fn test_deep_tree_does_not_overflow() {
        let mut raw = json!({"Value": 0});
        for _ in 0..50_000 {
            let mut arg = serde_json::Map::new();
            arg.insert("arg".to_string(), raw);
            let mut negation = serde_json::Map::new();
            negation.insert("!".to_string(), Value::Object(arg));
            raw = Value::Object(negation);
        }
        let node = EstNode::new(&raw).unwrap();
        assert_eq!(subexpressions_of(&node).unwrap().len(), 50_001);
        // serde_json drops nested values recursively; leak to keep the test about the walker
        std::mem::forget(raw);
    }
}
