use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use warden_core::{
    fallback_rule_id, normalize_domain, primary_rule_id, EngineRule, InvalidDomainError,
    RuleEngine, RuleEngineError, RuleId, StateStore, StateStoreError,
};

#[derive(Error, Debug)]
pub enum BlockerError {
    #[error(transparent)]
    InvalidDomain(#[from] InvalidDomainError),

    #[error(transparent)]
    Engine(#[from] RuleEngineError),

    #[error(transparent)]
    Store(#[from] StateStoreError),

    #[error("le gestionnaire de blocage ne répond pas")]
    Unavailable,
}

pub enum BlockerMessage {
    AddSite {
        domain: String,
        reply: oneshot::Sender<Result<(), BlockerError>>,
    },
    RemoveSite {
        domain: String,
        reply: oneshot::Sender<Result<(), BlockerError>>,
    },
    Activate {
        reply: Option<oneshot::Sender<Result<(), BlockerError>>>,
    },
    Deactivate {
        reply: Option<oneshot::Sender<Result<(), BlockerError>>>,
    },
    Suspend,
    GetSnapshot {
        reply: oneshot::Sender<BlockingSnapshot>,
    },
}

#[derive(Debug, Clone)]
pub struct BlockingSnapshot {
    pub active: bool,
    pub sites: Vec<String>,
}

#[derive(Clone)]
pub struct BlockerHandle {
    sender: mpsc::Sender<BlockerMessage>,
}

impl BlockerHandle {
    pub async fn add_site(&self, domain: String) -> Result<(), BlockerError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(BlockerMessage::AddSite { domain, reply })
            .await
            .map_err(|_| BlockerError::Unavailable)?;
        receiver.await.map_err(|_| BlockerError::Unavailable)?
    }

    pub async fn remove_site(&self, domain: String) -> Result<(), BlockerError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(BlockerMessage::RemoveSite { domain, reply })
            .await
            .map_err(|_| BlockerError::Unavailable)?;
        receiver.await.map_err(|_| BlockerError::Unavailable)?
    }

    pub async fn activate(&self) -> Result<(), BlockerError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(BlockerMessage::Activate { reply: Some(reply) })
            .await
            .map_err(|_| BlockerError::Unavailable)?;
        receiver.await.map_err(|_| BlockerError::Unavailable)?
    }

    pub async fn deactivate(&self) -> Result<(), BlockerError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(BlockerMessage::Deactivate { reply: Some(reply) })
            .await
            .map_err(|_| BlockerError::Unavailable)?;
        receiver.await.map_err(|_| BlockerError::Unavailable)?
    }

    pub async fn snapshot(&self) -> Option<BlockingSnapshot> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(BlockerMessage::GetSnapshot { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    /// Fire-and-forget: the timer never waits on rule changes.
    pub fn notify_focus_entered(&self) {
        self.post(BlockerMessage::Activate { reply: None });
    }

    pub fn notify_break_entered(&self, block_during_break: bool) {
        if !block_during_break {
            self.post(BlockerMessage::Suspend);
        }
    }

    pub fn notify_idle_entered(&self) {
        self.post(BlockerMessage::Deactivate { reply: None });
    }

    fn post(&self, message: BlockerMessage) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if sender.send(message).await.is_err() {
                error!("failed to queue blocker message");
            }
        });
    }
}

/// Owns the rule store and every live engine rule.
///
/// The timer and the server only talk to it through [`BlockerHandle`], so
/// rule mutations are serialized by the actor mailbox.
pub struct BlockerActor {
    receiver: mpsc::Receiver<BlockerMessage>,
    store: Arc<dyn StateStore>,
    engine: Arc<dyn RuleEngine>,
    rule_ids: HashMap<String, RuleId>,
    focus_active: bool,
}

impl BlockerActor {
    pub fn new(store: Arc<dyn StateStore>, engine: Arc<dyn RuleEngine>) -> (Self, BlockerHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let actor = Self {
            receiver,
            store,
            engine,
            rule_ids: HashMap::new(),
            focus_active: false,
        };

        let handle = BlockerHandle { sender };

        (actor, handle)
    }

    /// Startup sequence, run to completion before the server accepts
    /// requests: drop every dynamic rule left in the engine (orphans from an
    /// unclean shutdown included), then restore blocking if focus mode was
    /// active when the process died.
    pub async fn startup(&mut self) -> Result<(), BlockerError> {
        self.cleanup_all().await?;

        self.focus_active = self.store.load_focus_mode()?;
        if self.focus_active {
            let sites = self.store.load_blocked_sites()?;
            info!(count = sites.len(), "focus mode was active, restoring rules");
            self.reconcile(&sites).await;
        }

        Ok(())
    }

    pub async fn run(mut self) {
        info!("blocker actor started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                BlockerMessage::AddSite { domain, reply } => {
                    let result = self.handle_add_site(&domain).await;
                    let _ = reply.send(result);
                }
                BlockerMessage::RemoveSite { domain, reply } => {
                    let result = self.handle_remove_site(&domain).await;
                    let _ = reply.send(result);
                }
                BlockerMessage::Activate { reply } => {
                    let result = self.handle_activate().await;
                    if let Err(ref error) = result {
                        error!(%error, "focus mode activation failed");
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                BlockerMessage::Deactivate { reply } => {
                    let result = self.handle_deactivate().await;
                    if let Err(ref error) = result {
                        error!(%error, "focus mode deactivation failed");
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                BlockerMessage::Suspend => {
                    if let Err(error) = self.handle_suspend().await {
                        error!(%error, "failed to suspend rules for break");
                    }
                }
                BlockerMessage::GetSnapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
            }
        }

        debug!("blocker actor stopped");
    }

    fn snapshot(&self) -> BlockingSnapshot {
        let sites = self
            .store
            .load_blocked_sites()
            .map(|sites| sites.into_iter().collect())
            .unwrap_or_default();
        BlockingSnapshot {
            active: self.focus_active,
            sites,
        }
    }

    async fn handle_add_site(&mut self, input: &str) -> Result<(), BlockerError> {
        let domain = normalize_domain(input)?;

        let mut sites = self.store.load_blocked_sites()?;
        if sites.insert(domain.clone()) {
            self.store.save_blocked_sites(&sites)?;
            info!(%domain, "site added to block list");
        }

        if self.focus_active {
            self.add_live_rule(&domain).await?;
        }

        Ok(())
    }

    async fn handle_remove_site(&mut self, input: &str) -> Result<(), BlockerError> {
        let domain = normalize_domain(input)?;

        let mut sites = self.store.load_blocked_sites()?;
        if sites.remove(&domain) {
            self.store.save_blocked_sites(&sites)?;
            info!(%domain, "site removed from block list");
        }

        self.remove_live_rule(&domain).await
    }

    async fn handle_activate(&mut self) -> Result<(), BlockerError> {
        self.focus_active = true;
        self.store.save_focus_mode(true)?;

        let sites = self.store.load_blocked_sites()?;
        let mut first_failure = None;
        for domain in &sites {
            if let Err(error) = self.add_live_rule(domain).await {
                error!(%error, %domain, "failed to add blocking rule");
                first_failure.get_or_insert(error);
            }
        }

        info!(count = sites.len(), "focus mode activated");
        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn handle_deactivate(&mut self) -> Result<(), BlockerError> {
        self.focus_active = false;
        self.store.save_focus_mode(false)?;
        self.cleanup_all().await?;
        info!("focus mode deactivated");
        Ok(())
    }

    /// Break-time suspension: live rules go away, the block list and the
    /// focus flag stay. Rules come back on the next focus entry.
    async fn handle_suspend(&mut self) -> Result<(), BlockerError> {
        let ids: Vec<RuleId> = self.rule_ids.values().copied().collect();
        if !ids.is_empty() {
            self.engine.apply(Vec::new(), ids).await?;
        }
        self.rule_ids.clear();
        self.store.save_rule_ids(&self.rule_ids)?;
        debug!("rules suspended for break");
        Ok(())
    }

    /// Remove every dynamic rule in the engine, ours or not, and clear the
    /// rule store.
    async fn cleanup_all(&mut self) -> Result<(), BlockerError> {
        let leftover = self.engine.list_rules().await?;
        if !leftover.is_empty() {
            info!(count = leftover.len(), "cleaning up dynamic rules");
            let ids: Vec<RuleId> = leftover.iter().map(|rule| rule.id).collect();
            self.engine.apply(Vec::new(), ids).await?;
        }

        self.rule_ids.clear();
        self.store.save_rule_ids(&self.rule_ids)?;
        Ok(())
    }

    async fn reconcile(&mut self, sites: &BTreeSet<String>) {
        for domain in sites {
            if let Err(error) = self.add_live_rule(domain).await {
                error!(%error, %domain, "failed to restore blocking rule");
            }
        }
    }

    async fn add_live_rule(&mut self, domain: &str) -> Result<RuleId, BlockerError> {
        if let Some(id) = self.rule_ids.get(domain) {
            return Ok(*id);
        }

        let id = primary_rule_id(domain, unix_millis());
        let id = match self
            .engine
            .apply(vec![EngineRule::for_domain(id, domain)], Vec::new())
            .await
        {
            Ok(()) => id,
            Err(error) if error.is_duplicate_id() => {
                warn!(domain, id, "rule id collision, retrying with alternative generation");
                let retry_id = fallback_rule_id(unix_millis(), rand::random(), domain.len());
                self.engine
                    .apply(vec![EngineRule::for_domain(retry_id, domain)], Vec::new())
                    .await?;
                retry_id
            }
            Err(error) => return Err(error.into()),
        };

        self.rule_ids.insert(domain.to_string(), id);
        self.store.save_rule_ids(&self.rule_ids)?;
        debug!(domain, id, "blocking rule added");
        Ok(id)
    }

    async fn remove_live_rule(&mut self, domain: &str) -> Result<(), BlockerError> {
        let Some(id) = self.rule_ids.remove(domain) else {
            return Ok(());
        };

        if let Err(error) = self.engine.apply(Vec::new(), vec![id]).await {
            self.rule_ids.insert(domain.to_string(), id);
            return Err(error.into());
        }

        self.store.save_rule_ids(&self.rule_ids)?;
        debug!(domain, id, "blocking rule removed");
        Ok(())
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_adapters::{SqliteStateStore, StubRuleEngine};

    fn setup() -> (BlockerActor, BlockerHandle, Arc<SqliteStateStore>, Arc<StubRuleEngine>) {
        let store = Arc::new(SqliteStateStore::in_memory().unwrap());
        let engine = Arc::new(StubRuleEngine::new());
        let (actor, handle) = BlockerActor::new(store.clone(), engine.clone());
        (actor, handle, store, engine)
    }

    #[tokio::test]
    async fn add_site_persists_without_a_live_rule_when_inactive() {
        let (actor, handle, store, engine) = setup();
        tokio::spawn(actor.run());

        handle.add_site("facebook.com".to_string()).await.unwrap();

        assert!(store.load_blocked_sites().unwrap().contains("facebook.com"));
        assert!(engine.rules().is_empty());
    }

    #[tokio::test]
    async fn invalid_domain_is_rejected_without_mutation() {
        let (actor, handle, store, _engine) = setup();
        tokio::spawn(actor.run());

        let result = handle.add_site("not a domain".to_string()).await;

        assert!(matches!(result, Err(BlockerError::InvalidDomain(_))));
        assert!(store.load_blocked_sites().unwrap().is_empty());
    }

    #[tokio::test]
    async fn activation_creates_one_rule_per_site() {
        let (actor, handle, store, engine) = setup();
        tokio::spawn(actor.run());

        handle.add_site("facebook.com".to_string()).await.unwrap();
        handle.add_site("reddit.com".to_string()).await.unwrap();
        handle.activate().await.unwrap();

        let rules = engine.rules();
        assert_eq!(rules.len(), 2);
        let domains: Vec<&str> = rules.iter().map(|r| r.domain()).collect();
        assert!(domains.contains(&"facebook.com"));
        assert!(domains.contains(&"reddit.com"));
        assert_eq!(store.load_rule_ids().unwrap().len(), 2);
        assert!(store.load_focus_mode().unwrap());
    }

    #[tokio::test]
    async fn add_then_remove_leaves_no_trace() {
        let (actor, handle, store, engine) = setup();
        tokio::spawn(actor.run());

        handle.activate().await.unwrap();
        handle.add_site("facebook.com".to_string()).await.unwrap();
        assert_eq!(engine.rules().len(), 1);

        handle.remove_site("facebook.com".to_string()).await.unwrap();

        assert!(engine.rules().is_empty());
        assert!(store.load_blocked_sites().unwrap().is_empty());
        assert!(store.load_rule_ids().unwrap().is_empty());
    }

    #[tokio::test]
    async fn removing_an_unknown_site_is_a_no_op() {
        let (actor, handle, _store, _engine) = setup();
        tokio::spawn(actor.run());

        handle.remove_site("youtube.com".to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_id_rejection_triggers_the_fallback_allocator() {
        let (actor, handle, store, engine) = setup();
        engine.reject_next_adds_as_duplicates(1);
        tokio::spawn(actor.run());

        handle.activate().await.unwrap();
        handle.add_site("facebook.com".to_string()).await.unwrap();

        assert_eq!(engine.rules().len(), 1);
        assert_eq!(store.load_rule_ids().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn two_rejections_surface_as_a_failure() {
        let (actor, handle, _store, engine) = setup();
        engine.reject_next_adds_as_duplicates(2);
        tokio::spawn(actor.run());

        handle.activate().await.unwrap();
        let result = handle.add_site("facebook.com".to_string()).await;

        assert!(matches!(
            result,
            Err(BlockerError::Engine(RuleEngineError::DuplicateId { .. }))
        ));
        assert!(engine.rules().is_empty());
    }

    #[tokio::test]
    async fn startup_removes_orphan_rules_then_reconciles() {
        let store = Arc::new(SqliteStateStore::in_memory().unwrap());
        let sites: BTreeSet<String> =
            ["facebook.com".to_string(), "youtube.com".to_string()].into();
        store.save_blocked_sites(&sites).unwrap();
        store.save_focus_mode(true).unwrap();

        // a rule surviving an unclean shutdown, unknown to the rule store
        let engine = Arc::new(StubRuleEngine::with_rules(vec![EngineRule::for_domain(
            777,
            "stale.example",
        )]));

        let (mut actor, _handle) = BlockerActor::new(store.clone(), engine.clone());
        actor.startup().await.unwrap();

        let rules = engine.rules();
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|rule| rule.id != 777));
        let domains: Vec<&str> = rules.iter().map(|r| r.domain()).collect();
        assert!(domains.contains(&"facebook.com"));
        assert!(domains.contains(&"youtube.com"));
    }

    #[tokio::test]
    async fn startup_without_focus_mode_leaves_engine_empty() {
        let store = Arc::new(SqliteStateStore::in_memory().unwrap());
        let sites: BTreeSet<String> = ["facebook.com".to_string()].into();
        store.save_blocked_sites(&sites).unwrap();

        let engine = Arc::new(StubRuleEngine::with_rules(vec![EngineRule::for_domain(
            777,
            "stale.example",
        )]));

        let (mut actor, _handle) = BlockerActor::new(store.clone(), engine.clone());
        actor.startup().await.unwrap();

        assert!(engine.rules().is_empty());
    }

    #[tokio::test]
    async fn deactivate_clears_every_engine_rule() {
        let (actor, handle, store, engine) = setup();
        tokio::spawn(actor.run());

        handle.add_site("facebook.com".to_string()).await.unwrap();
        handle.activate().await.unwrap();
        handle.deactivate().await.unwrap();

        assert!(engine.rules().is_empty());
        assert!(!store.load_focus_mode().unwrap());
        // the block list itself is untouched
        assert_eq!(store.load_blocked_sites().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn suspend_keeps_flag_and_sites_but_drops_rules() {
        let (actor, handle, store, engine) = setup();
        tokio::spawn(actor.run());

        handle.add_site("facebook.com".to_string()).await.unwrap();
        handle.activate().await.unwrap();
        handle.notify_break_entered(false);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(engine.rules().is_empty());
        assert!(store.load_focus_mode().unwrap());
        assert_eq!(store.load_blocked_sites().unwrap().len(), 1);

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.active);
        assert_eq!(snapshot.sites, vec!["facebook.com".to_string()]);
    }
}
