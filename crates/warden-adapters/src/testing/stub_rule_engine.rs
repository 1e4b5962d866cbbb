use std::sync::Mutex;

use async_trait::async_trait;

use warden_core::{EngineRule, RuleEngine, RuleEngineError, RuleId};

/// In-memory engine for tests. Can be primed with rules (e.g. leftovers from
/// a simulated unclean shutdown) and scripted to reject the next adds with a
/// duplicate-id error to exercise the fallback allocator.
pub struct StubRuleEngine {
    rules: Mutex<Vec<EngineRule>>,
    duplicate_rejections: Mutex<u32>,
}

impl StubRuleEngine {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            duplicate_rejections: Mutex::new(0),
        }
    }

    pub fn with_rules(rules: Vec<EngineRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
            duplicate_rejections: Mutex::new(0),
        }
    }

    /// Reject the next `count` calls to `apply` that add rules, as if every
    /// proposed id were already taken.
    pub fn reject_next_adds_as_duplicates(&self, count: u32) {
        *self.duplicate_rejections.lock().unwrap() = count;
    }

    pub fn rules(&self) -> Vec<EngineRule> {
        self.rules.lock().unwrap().clone()
    }
}

impl Default for StubRuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleEngine for StubRuleEngine {
    async fn list_rules(&self) -> Result<Vec<EngineRule>, RuleEngineError> {
        Ok(self.rules())
    }

    async fn apply(
        &self,
        add: Vec<EngineRule>,
        remove: Vec<RuleId>,
    ) -> Result<(), RuleEngineError> {
        let mut rules = self.rules.lock().unwrap();
        rules.retain(|rule| !remove.contains(&rule.id));

        if !add.is_empty() {
            let mut rejections = self.duplicate_rejections.lock().unwrap();
            if *rejections > 0 {
                *rejections -= 1;
                return Err(RuleEngineError::DuplicateId { id: add[0].id });
            }
        }

        for rule in add {
            if rules.iter().any(|existing| existing.id == rule.id) {
                return Err(RuleEngineError::DuplicateId { id: rule.id });
            }
            rules.push(rule);
        }

        Ok(())
    }
}
