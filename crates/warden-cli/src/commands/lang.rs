use anyhow::Result;
use warden_core::{Config, Language, Translator};
use warden_protocol::Request;

use crate::client::DaemonClient;

pub async fn execute(language: Option<String>) -> Result<()> {
    let config = Config::load().unwrap_or_default();

    let Some(requested) = language else {
        println!(
            "{} ({})",
            config.general.language.display_name(),
            config.general.language.code()
        );
        return Ok(());
    };

    let language: Language = requested.parse()?;
    Config::save_value("general", "language", &format!("\"{}\"", language.code()))?;

    let client = DaemonClient::new();
    let _ = client.send(Request::RefreshSettings).await;

    let translator = Translator::new(language);
    println!(
        "{}",
        translator.format("command.lang_updated", &[("language", language.display_name())])
    );
    Ok(())
}
