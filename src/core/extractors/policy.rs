use serde_json::Value;

use crate::error::{EstMetricsError, Result};
use super::{ExpressionExtractor, TargetKind};

/// Extractor for policy targets: the `body` of every policy condition
pub struct PolicyExtractor;

impl ExpressionExtractor for PolicyExtractor {
    fn extract<'a>(&self, representation: &'a Value) -> Result<Vec<&'a Value>> {
        let conditions = representation
            .get("policy")
            .and_then(|policy| policy.get("conditions"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                EstMetricsError::Corpus("representation has no `policy.conditions` array".to_string())
            })?;

        conditions
            .iter()
            .map(|condition| {
                condition.get("body").ok_or_else(|| {
                    EstMetricsError::Corpus("policy condition has no `body`".to_string())
                })
            })
            .collect()
    }

    fn target_kind(&self) -> TargetKind {
        TargetKind::Policy
    }
}
