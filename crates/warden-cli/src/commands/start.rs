use crate::client::{ClientError, DaemonClient};
use crate::daemon_launcher;
use anyhow::{bail, Result};
use warden_core::{Config, Translator};
use warden_protocol::{Request, Response};

pub async fn execute(focus_minutes: Option<u64>, break_minutes: Option<u64>) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let translator = Translator::new(config.general.language);
    let client = DaemonClient::new();

    let request = Request::StartTimer {
        focus_seconds: focus_minutes.map(|minutes| minutes * 60),
        break_seconds: break_minutes.map(|minutes| minutes * 60),
    };

    let response = match client.send(request.clone()).await {
        Err(ClientError::DaemonNotRunning) => {
            daemon_launcher::ensure_daemon_running().await?;
            client.send(request).await
        }
        other => other,
    };

    match response {
        Ok(Response::Ok) => {
            let focus_display = focus_minutes.unwrap_or(config.timer.default_focus_minutes);
            let break_display = break_minutes.unwrap_or(config.timer.default_break_minutes);

            println!("{}", translator.get("command.start_success"));
            println!(
                "{}",
                translator.format(
                    "command.start_focus_line",
                    &[("minutes", &focus_display.to_string())]
                )
            );
            println!(
                "{}",
                translator.format(
                    "command.start_break_line",
                    &[("minutes", &break_display.to_string())]
                )
            );
            Ok(())
        }
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(_) => bail!("{}", translator.get("error.unexpected_response")),
        Err(ClientError::Timeout) => bail!("{}", translator.get("error.connection_timeout")),
        Err(error) => bail!("{}", error),
    }
}
