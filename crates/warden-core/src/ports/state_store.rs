use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::domain::{FocusStats, RuleId, TimerSession};

#[derive(Error, Debug)]
pub enum StateStoreError {
    #[error("erreur de persistence: {message}")]
    Storage { message: String },
}

/// Key-value persistence gateway shared by every component.
///
/// Keys are written independently (no multi-key transaction is guaranteed by
/// the contract), except for the timer session whose dependent fields an
/// implementation should batch into a single write. Concurrent writers race
/// with last-writer-wins semantics; callers reconcile by re-reading.
pub trait StateStore: Send + Sync {
    fn load_blocked_sites(&self) -> Result<BTreeSet<String>, StateStoreError>;

    fn save_blocked_sites(&self, sites: &BTreeSet<String>) -> Result<(), StateStoreError>;

    fn load_rule_ids(&self) -> Result<HashMap<String, RuleId>, StateStoreError>;

    fn save_rule_ids(&self, rule_ids: &HashMap<String, RuleId>) -> Result<(), StateStoreError>;

    fn load_session(&self) -> Result<Option<TimerSession>, StateStoreError>;

    fn save_session(&self, session: &TimerSession) -> Result<(), StateStoreError>;

    fn load_stats(&self) -> Result<FocusStats, StateStoreError>;

    fn save_stats(&self, stats: &FocusStats) -> Result<(), StateStoreError>;

    fn load_focus_mode(&self) -> Result<bool, StateStoreError>;

    fn save_focus_mode(&self, active: bool) -> Result<(), StateStoreError>;
}
