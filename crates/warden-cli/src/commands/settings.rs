use anyhow::Result;
use clap::Subcommand;
use warden_core::{Config, Translator};
use warden_protocol::Request;

use crate::client::DaemonClient;

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum SettingsAction {
    /// Print the effective timer settings
    Show,
    /// Change one or more settings in the config file
    Set {
        #[arg(long)]
        focus_minutes: Option<u64>,
        #[arg(long)]
        break_minutes: Option<u64>,
        #[arg(long)]
        block_during_break: Option<bool>,
        #[arg(long)]
        sound: Option<bool>,
    },
}

pub async fn execute(action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => show(),
        SettingsAction::Set {
            focus_minutes,
            break_minutes,
            block_during_break,
            sound,
        } => set(focus_minutes, break_minutes, block_during_break, sound).await,
    }
}

fn show() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("default_focus_minutes = {}", config.timer.default_focus_minutes);
    println!("default_break_minutes = {}", config.timer.default_break_minutes);
    println!("block_during_break = {}", config.timer.block_during_break);
    println!("sound_enabled = {}", config.notifications.sound_enabled);
    println!("language = \"{}\"", config.general.language.code());

    Ok(())
}

async fn set(
    focus_minutes: Option<u64>,
    break_minutes: Option<u64>,
    block_during_break: Option<bool>,
    sound: Option<bool>,
) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let translator = Translator::new(config.general.language);

    if let Some(minutes) = focus_minutes {
        Config::save_value("timer", "default_focus_minutes", &minutes.to_string())?;
    }
    if let Some(minutes) = break_minutes {
        Config::save_value("timer", "default_break_minutes", &minutes.to_string())?;
    }
    if let Some(enabled) = block_during_break {
        Config::save_value("timer", "block_during_break", &enabled.to_string())?;
    }
    if let Some(enabled) = sound {
        Config::save_value("notifications", "sound_enabled", &enabled.to_string())?;
    }

    // the daemon picks the new values up on its next settings read
    let client = DaemonClient::new();
    let _ = client.send(Request::RefreshSettings).await;

    println!("{}", translator.get("command.settings_saved"));
    Ok(())
}
