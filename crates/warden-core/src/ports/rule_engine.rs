use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RuleId;

/// One dynamic rule as the blocking engine sees it: redirect any main-frame
/// navigation whose URL matches `url_filter` to the local blocked page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRule {
    pub id: RuleId,
    pub priority: u32,
    pub url_filter: String,
}

impl EngineRule {
    pub fn for_domain(id: RuleId, domain: &str) -> Self {
        Self {
            id,
            priority: 1,
            url_filter: format!("*{}*", domain),
        }
    }

    /// The domain embedded in the `*domain*` filter.
    pub fn domain(&self) -> &str {
        self.url_filter.trim_matches('*')
    }
}

#[derive(Error, Debug)]
pub enum RuleEngineError {
    #[error("identifiant de règle déjà utilisé: {id}")]
    DuplicateId { id: RuleId },

    #[error("règle rejetée par le moteur: {message}")]
    Rejected { message: String },

    #[error("erreur d'accès au moteur de règles: {message}")]
    Storage { message: String },
}

impl RuleEngineError {
    pub fn is_duplicate_id(&self) -> bool {
        matches!(self, RuleEngineError::DuplicateId { .. })
    }
}

/// Host-provided declarative blocking engine.
#[async_trait]
pub trait RuleEngine: Send + Sync {
    /// Every dynamic rule currently registered, whoever created it.
    async fn list_rules(&self) -> Result<Vec<EngineRule>, RuleEngineError>;

    /// Atomically remove `remove` then add `add`. Fails with
    /// [`RuleEngineError::DuplicateId`] if an added id is already taken.
    async fn apply(
        &self,
        add: Vec<EngineRule>,
        remove: Vec<RuleId>,
    ) -> Result<(), RuleEngineError>;
}
