mod actors;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use actors::{BlockerActor, NotifierActor, TimerActor};
use anyhow::{Context, Result};
use server::Server;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use warden_adapters::{HostsRuleEngine, SqliteStateStore};
use warden_core::{Config, RuleEngine, StateStore, TimerSession, Translator};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("warden_daemon=debug".parse()?),
        )
        .init();

    info!("warden daemon starting");

    let config = Config::load().unwrap_or_else(|error| {
        warn!(%error, "failed to load config, using defaults");
        Config::default()
    });
    let settings = config.timer_settings();
    let translator = Translator::new(config.general.language);

    let (shutdown_sender, shutdown_receiver) = broadcast::channel::<()>(1);
    let sigint_shutdown_sender = shutdown_sender.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("SIGINT received, initiating shutdown");
        sigint_shutdown_sender.send(()).ok();
    });

    let store = create_state_store().context("impossible d'ouvrir le stockage d'état")?;
    let engine = create_rule_engine();

    let (notifier_actor, notifier_handle) = NotifierActor::new(
        config.notifications.urgency.clone(),
        config.notifications.sound_enabled,
        translator,
    );
    tokio::spawn(notifier_actor.run());

    // Startup gate: stale rules are swept and persisted blocking restored
    // before the server accepts a single request.
    let (mut blocker_actor, blocker_handle) = BlockerActor::new(store.clone(), engine);
    if let Err(error) = blocker_actor.startup().await {
        warn!(%error, "rule cleanup at startup failed, continuing");
    }
    tokio::spawn(blocker_actor.run());

    let session = load_persisted_session(store.as_ref(), settings.focus_seconds, settings.break_seconds);
    let (timer_actor, timer_handle) = TimerActor::new(
        session,
        settings,
        Some(store),
        Some(blocker_handle.clone()),
        Some(notifier_handle),
    );
    tokio::spawn(timer_actor.run());

    let server = Server::new(timer_handle, blocker_handle)?;
    server.run(shutdown_receiver).await?;

    info!("warden daemon stopped");
    std::process::exit(0);
}

fn create_state_store() -> Result<Arc<dyn StateStore>> {
    let data_dir = dirs::data_dir()
        .context("impossible de déterminer le répertoire de données")?
        .join("warden");

    std::fs::create_dir_all(&data_dir).context("impossible de créer le répertoire de données")?;

    let database_path = data_dir.join("state.db");
    let store = SqliteStateStore::new(&database_path)
        .map_err(|error| anyhow::anyhow!("{}", error))?;

    info!(?database_path, "state persistence enabled");
    Ok(Arc::new(store))
}

fn create_rule_engine() -> Arc<dyn RuleEngine> {
    let path = std::env::var("WARDEN_HOSTS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/etc/hosts"));

    info!(path = %path.display(), "hosts-file rule engine selected");
    Arc::new(HostsRuleEngine::new(&path))
}

/// A session that survived a restart picks up exactly where its last
/// persisted second left it.
fn load_persisted_session(
    store: &dyn StateStore,
    default_focus_seconds: u64,
    default_break_seconds: u64,
) -> TimerSession {
    match store.load_session() {
        Ok(Some(session)) => {
            info!(phase = %session.phase, remaining = session.current_seconds, "resuming persisted session");
            session
        }
        Ok(None) => TimerSession::new(default_focus_seconds, default_break_seconds),
        Err(error) => {
            warn!(%error, "failed to load persisted session, starting idle");
            TimerSession::new(default_focus_seconds, default_break_seconds)
        }
    }
}
