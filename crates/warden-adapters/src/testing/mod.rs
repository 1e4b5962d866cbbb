mod failing_rule_engine;
mod stub_rule_engine;

pub use failing_rule_engine::FailingRuleEngine;
pub use stub_rule_engine::StubRuleEngine;
