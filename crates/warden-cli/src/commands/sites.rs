use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use warden_adapters::SqliteStateStore;
use warden_core::{normalize_domain, Config, StateStore, Translator, DEFAULT_SITES};
use warden_protocol::{Request, Response};

use crate::client::{ClientError, DaemonClient};
use crate::daemon_launcher;

#[derive(Subcommand, Debug, Clone)]
pub enum SitesAction {
    /// Add a domain to the blocked list
    Add { domain: String },
    /// Remove a domain from the blocked list
    Remove { domain: String },
    /// Show the blocked list
    List,
    /// Add the classic distraction sites in one go
    Defaults,
    /// Write the blocked list to a JSON file
    Export { path: PathBuf },
    /// Merge domains from a JSON file into the blocked list
    Import { path: PathBuf },
}

pub async fn execute(action: SitesAction) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let translator = Translator::new(config.general.language);

    match action {
        SitesAction::Add { domain } => add(&translator, &domain).await,
        SitesAction::Remove { domain } => remove(&translator, &domain).await,
        SitesAction::List => list(&translator),
        SitesAction::Defaults => defaults(&translator).await,
        SitesAction::Export { path } => export(&translator, &path),
        SitesAction::Import { path } => import(&translator, &path).await,
    }
}

async fn add(translator: &Translator, input: &str) -> Result<()> {
    let Ok(domain) = normalize_domain(input) else {
        bail!("{}", translator.format("command.sites_invalid", &[("input", input)]));
    };

    let store = open_store()?;
    if store.load_blocked_sites()?.contains(&domain) {
        println!(
            "{}",
            translator.format("command.sites_already", &[("domain", &domain)])
        );
        return Ok(());
    }

    request_blocking_change(Request::AddBlockingRule {
        domain: domain.clone(),
    })
    .await?;

    println!(
        "{}",
        translator.format("command.sites_added", &[("domain", &domain)])
    );
    Ok(())
}

async fn remove(translator: &Translator, input: &str) -> Result<()> {
    let Ok(domain) = normalize_domain(input) else {
        bail!("{}", translator.format("command.sites_invalid", &[("input", input)]));
    };

    let store = open_store()?;
    if !store.load_blocked_sites()?.contains(&domain) {
        println!(
            "{}",
            translator.format("command.sites_missing", &[("domain", &domain)])
        );
        return Ok(());
    }

    request_blocking_change(Request::RemoveBlockingRule {
        domain: domain.clone(),
    })
    .await?;

    println!(
        "{}",
        translator.format("command.sites_removed", &[("domain", &domain)])
    );
    Ok(())
}

fn list(translator: &Translator) -> Result<()> {
    let store = open_store()?;
    let sites = store.load_blocked_sites()?;

    if sites.is_empty() {
        println!("{}", translator.get("command.sites_empty"));
        return Ok(());
    }

    println!("\n{}\n", translator.get("command.sites_header"));
    for (index, site) in sites.iter().enumerate() {
        let prefix = if index == sites.len() - 1 {
            "└──"
        } else {
            "├──"
        };
        println!("{} {}", prefix, site);
    }
    println!();

    Ok(())
}

async fn defaults(translator: &Translator) -> Result<()> {
    let store = open_store()?;
    let existing = store.load_blocked_sites()?;

    let mut added = 0;
    for domain in DEFAULT_SITES {
        if existing.contains(domain) {
            continue;
        }
        request_blocking_change(Request::AddBlockingRule {
            domain: domain.to_string(),
        })
        .await?;
        added += 1;
    }

    println!(
        "{}",
        translator.format("command.sites_defaults_added", &[("count", &added.to_string())])
    );
    Ok(())
}

fn export(translator: &Translator, path: &PathBuf) -> Result<()> {
    let store = open_store()?;
    let sites: Vec<String> = store.load_blocked_sites()?.into_iter().collect();

    let payload = serde_json::to_string_pretty(&sites)?;
    std::fs::write(path, payload)
        .with_context(|| format!("impossible d'écrire {}", path.display()))?;

    println!(
        "{}",
        translator.format(
            "command.sites_exported",
            &[("count", &sites.len().to_string()), ("path", &path.display().to_string())]
        )
    );
    Ok(())
}

async fn import(translator: &Translator, path: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("impossible de lire {}", path.display()))?;
    let entries: Vec<String> =
        serde_json::from_str(&content).context("format attendu: tableau JSON de domaines")?;

    let store = open_store()?;
    let existing = store.load_blocked_sites()?;

    let mut imported = 0;
    let mut skipped = 0;
    for entry in entries {
        match normalize_domain(&entry) {
            Ok(domain) if !existing.contains(&domain) => {
                request_blocking_change(Request::AddBlockingRule { domain }).await?;
                imported += 1;
            }
            Ok(_) => skipped += 1,
            Err(_) => skipped += 1,
        }
    }

    if imported == 0 {
        println!(
            "{}",
            translator.format(
                "command.sites_import_none",
                &[("path", &path.display().to_string())]
            )
        );
    } else {
        println!(
            "{}",
            translator.format(
                "command.sites_imported",
                &[
                    ("count", &imported.to_string()),
                    ("skipped", &skipped.to_string())
                ]
            )
        );
    }
    Ok(())
}

/// Mutations go through the daemon so live rules stay in step with the list;
/// it is launched on demand.
async fn request_blocking_change(request: Request) -> Result<Response> {
    let client = DaemonClient::new();

    let response = match client.send(request.clone()).await {
        Err(ClientError::DaemonNotRunning) => {
            daemon_launcher::ensure_daemon_running().await?;
            client.send(request).await?
        }
        other => other?,
    };

    match response {
        Response::Ok => Ok(Response::Ok),
        Response::Error { message } => bail!("{}", message),
        other => Ok(other),
    }
}

fn open_store() -> Result<SqliteStateStore> {
    let data_dir = dirs::data_dir()
        .context("impossible de déterminer le répertoire de données")?
        .join("warden");

    std::fs::create_dir_all(&data_dir)
        .context("impossible de créer le répertoire de données")?;

    SqliteStateStore::new(&data_dir.join("state.db"))
        .map_err(|error| anyhow::anyhow!("erreur d'accès au stockage: {}", error))
}
