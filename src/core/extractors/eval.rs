use serde_json::Value;

use crate::error::{EstMetricsError, Result};
use super::{ExpressionExtractor, TargetKind};

/// Extractor for evaluation targets: one top-level `expression`
pub struct EvalExtractor;

impl ExpressionExtractor for EvalExtractor {
    fn extract<'a>(&self, representation: &'a Value) -> Result<Vec<&'a Value>> {
        representation
            .get("expression")
            .map(|expr| vec![expr])
            .ok_or_else(|| EstMetricsError::Corpus("representation has no `expression`".to_string()))
    }

    fn target_kind(&self) -> TargetKind {
        TargetKind::Eval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_expression() {
        let representation = json!({
            "entities": [],
            "request": {},
            "expression": {"Value": true}
        });
        let exprs = EvalExtractor.extract(&representation).unwrap();
        assert_eq!(exprs, vec![&json!({"Value": true})]);
    }

    #[test]
    fn test_missing_expression() {
        let representation = json!({"policy": {}});
        let result = EvalExtractor.extract(&representation);
        assert!(matches!(result, Err(EstMetricsError::Corpus(_))));
    }
}
