use anyhow::{Context, Result};
use chrono::Local;
use clap::Subcommand;
use dialoguer::Confirm;
use warden_adapters::SqliteStateStore;
use warden_core::{Config, FocusStats, StateStore, Translator};

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum StatsAction {
    /// Erase all recorded statistics
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn execute(action: Option<StatsAction>, json: bool) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let translator = Translator::new(config.general.language);

    match action {
        Some(StatsAction::Reset { yes }) => reset(&translator, yes),
        None => show(&translator, json),
    }
}

fn show(translator: &Translator, json: bool) -> Result<()> {
    let store = open_store()?;
    let stats = store.load_stats().map_err(|error| anyhow::anyhow!("{}", error))?;

    let today = Local::now().date_naive();
    let today_sessions = stats.day(today).map(|day| day.sessions).unwrap_or(0);
    let total_seconds = stats.total_seconds();

    if json {
        let output = serde_json::json!({
            "total_sessions": stats.total_sessions(),
            "total_seconds": total_seconds,
            "today_sessions": today_sessions,
            "current_streak": stats.current_streak(today),
            "best_streak": stats.best_streak(today),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if stats.is_empty() {
        println!("{}", translator.get("command.stats_empty"));
        return Ok(());
    }

    println!("\n{}\n", translator.get("command.stats_header"));
    println!(
        "{}",
        translator.format(
            "command.stats_total_sessions",
            &[("count", &stats.total_sessions().to_string())]
        )
    );
    println!(
        "{}",
        translator.format(
            "command.stats_total_time",
            &[
                ("hours", &(total_seconds / 3600).to_string()),
                ("minutes", &((total_seconds % 3600) / 60).to_string())
            ]
        )
    );
    println!(
        "{}",
        translator.format(
            "command.stats_today",
            &[("count", &today_sessions.to_string())]
        )
    );
    println!(
        "{}",
        translator.format(
            "command.stats_current_streak",
            &[("days", &stats.current_streak(today).to_string())]
        )
    );
    println!(
        "{}",
        translator.format(
            "command.stats_best_streak",
            &[("days", &stats.best_streak(today).to_string())]
        )
    );
    println!();

    Ok(())
}

fn reset(translator: &Translator, skip_confirmation: bool) -> Result<()> {
    if !skip_confirmation {
        let confirmed = Confirm::new()
            .with_prompt(translator.get("command.stats_reset_confirm"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", translator.get("command.stats_reset_cancelled"));
            return Ok(());
        }
    }

    let store = open_store()?;
    store
        .save_stats(&FocusStats::new())
        .map_err(|error| anyhow::anyhow!("{}", error))?;

    println!("{}", translator.get("command.stats_reset_done"));
    Ok(())
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
