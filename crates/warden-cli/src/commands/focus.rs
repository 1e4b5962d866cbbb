use crate::client::{ClientError, DaemonClient};
use crate::daemon_launcher;
use anyhow::{bail, Result};
use clap::Subcommand;
use warden_core::{Config, Translator};
use warden_protocol::{Request, Response};

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum FocusAction {
    /// Enable blocking for every listed site
    On,
    /// Remove every live blocking rule
    Off,
}

pub async fn execute(action: FocusAction) -> Result<()> {
    let translator = get_translator();
    let client = DaemonClient::new();

    let request = match action {
        FocusAction::On => Request::ActivateFocusMode,
        FocusAction::Off => Request::DeactivateFocusMode,
    };

    let response = match client.send(request.clone()).await {
        Err(ClientError::DaemonNotRunning) => {
            daemon_launcher::ensure_daemon_running().await?;
            client.send(request).await
        }
        other => other,
    };

    match response {
        Ok(Response::Ok) => match action {
            FocusAction::On => {
                let count = blocked_site_count(&client).await;
                println!(
                    "{}",
                    translator.format("command.focus_on", &[("count", &count.to_string())])
                );
            }
            FocusAction::Off => {
                println!("{}", translator.get("command.focus_off"));
            }
        },
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("{}", translator.get("error.unexpected_response")),
        Err(ClientError::Timeout) => bail!("{}", translator.get("error.connection_timeout")),
        Err(error) => bail!("{}", error),
    }

    Ok(())
}

async fn blocked_site_count(client: &DaemonClient) -> usize {
    match client.send(Request::GetBlocking).await {
        Ok(Response::Blocking { sites, .. }) => sites.len(),
        _ => 0,
    }
}

fn get_translator() -> Translator {
    Config::load()
        .map(|config| Translator::new(config.general.language))
        .unwrap_or_default()
}
