use async_trait::async_trait;

use warden_core::{EngineRule, RuleEngine, RuleEngineError, RuleId};

/// Engine that rejects everything, for exercising error paths.
pub struct FailingRuleEngine;

#[async_trait]
impl RuleEngine for FailingRuleEngine {
    async fn list_rules(&self) -> Result<Vec<EngineRule>, RuleEngineError> {
        Err(RuleEngineError::Storage {
            message: "moteur indisponible".to_string(),
        })
    }

    async fn apply(
        &self,
        _add: Vec<EngineRule>,
        _remove: Vec<RuleId>,
    ) -> Result<(), RuleEngineError> {
        Err(RuleEngineError::Rejected {
            message: "moteur indisponible".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_fails() {
        let engine = FailingRuleEngine;

        assert!(engine.list_rules().await.is_err());
        assert!(engine.apply(Vec::new(), Vec::new()).await.is_err());
    }
}
