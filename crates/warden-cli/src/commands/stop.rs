use crate::client::{ClientError, DaemonClient};
use anyhow::{bail, Result};
use warden_core::{Config, Translator};
use warden_protocol::{Request, Response};

/// Stop, cancel and reset share one wire semantics: back to idle, blocking
/// off. They keep separate verbs so the CLI reads naturally.
#[derive(Debug, Clone, Copy)]
pub enum StopKind {
    Stop,
    Cancel,
    Reset,
}

impl StopKind {
    fn request(&self) -> Request {
        match self {
            StopKind::Stop => Request::StopTimer,
            StopKind::Cancel => Request::CancelTimer,
            StopKind::Reset => Request::ResetTimer,
        }
    }

    fn success_key(&self) -> &'static str {
        match self {
            StopKind::Stop => "command.stop_success",
            StopKind::Cancel => "command.cancel_success",
            StopKind::Reset => "command.reset_success",
        }
    }
}

pub async fn execute(kind: StopKind) -> Result<()> {
    let translator = get_translator();
    let client = DaemonClient::new();

    match client.send(kind.request()).await {
        Ok(Response::Ok) => {
            println!("{}", translator.get(kind.success_key()));
        }
        Ok(Response::Error { message }) => {
            bail!("{}", message);
        }
        Ok(_) => {
            bail!("{}", translator.get("error.unexpected_response"));
        }
        Err(ClientError::DaemonNotRunning) => {
            // nothing running means nothing to stop
            println!("{}", translator.get("status.daemon_down"));
        }
        Err(ClientError::Timeout) => {
            bail!("{}", translator.get("error.connection_timeout"));
        }
        Err(error) => {
            bail!("{}", error);
        }
    }

    Ok(())
}

fn get_translator() -> Translator {
    Config::load()
        .map(|config| Translator::new(config.general.language))
        .unwrap_or_default()
}
