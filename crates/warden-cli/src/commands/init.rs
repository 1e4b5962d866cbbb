use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input};
use std::fs;
use std::path::PathBuf;
use warden_core::Config;

#[derive(Debug)]
struct InitConfig {
    default_focus_minutes: u64,
    default_break_minutes: u64,
    block_during_break: bool,
    sound_enabled: bool,
}

pub fn execute(force: bool) -> Result<()> {
    let config_path = Config::config_path();

    if config_path.exists() && !force {
        bail!(
            "La configuration existe déjà : {}\nUtilisez --force pour écraser.",
            config_path.display()
        );
    }

    if force && config_path.exists() {
        println!("⚠️  Écrasement de la configuration existante.\n");
    }

    println!("Bienvenue dans Warden ! Configurons vos sessions focus.\n");

    let config = prompt_configuration()?;
    write_config(&config_path, &config)?;

    println!("\n✅ Configuration enregistrée : {}", config_path.display());
    println!("Lancez `warden start` pour démarrer votre première session focus.");
    println!("Pensez à `warden sites defaults` pour bloquer les distractions classiques.");

    Ok(())
}

fn prompt_configuration() -> Result<InitConfig> {
    let default_focus_minutes: u64 = Input::new()
        .with_prompt("Durée par défaut des sessions focus (minutes)")
        .default(25)
        .validate_with(|input: &u64| {
            if *input >= 1 && *input <= 480 {
                Ok(())
            } else {
                Err("La durée doit être entre 1 et 480 minutes")
            }
        })
        .interact()?;

    let default_break_minutes: u64 = Input::new()
        .with_prompt("Durée par défaut des pauses (minutes)")
        .default(5)
        .validate_with(|input: &u64| {
            if *input <= 120 {
                Ok(())
            } else {
                Err("La pause ne peut pas dépasser 120 minutes")
            }
        })
        .interact()?;

    let block_during_break = Confirm::new()
        .with_prompt("Garder les sites bloqués pendant les pauses ?")
        .default(false)
        .interact()?;

    let sound_enabled = Confirm::new()
        .with_prompt("Activer les notifications sonores ?")
        .default(true)
        .interact()?;

    Ok(InitConfig {
        default_focus_minutes,
        default_break_minutes,
        block_during_break,
        sound_enabled,
    })
}

fn write_config(path: &PathBuf, config: &InitConfig) -> Result<()> {
    let content = format!(
        r#"# Warden configuration
[general]
language = "en"

[timer]
default_focus_minutes = {}
default_break_minutes = {}
block_during_break = {}

[notifications]
sound_enabled = {}
"#,
        config.default_focus_minutes,
        config.default_break_minutes,
        config.block_during_break,
        config.sound_enabled,
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Impossible de créer le répertoire de configuration")?;
    }

    fs::write(path, content).context("Impossible d'écrire la configuration")?;
    Ok(())
}
