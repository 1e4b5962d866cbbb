mod rule_engine;
mod state_store;

pub use rule_engine::{EngineRule, RuleEngine, RuleEngineError};
pub use state_store::{StateStore, StateStoreError};
