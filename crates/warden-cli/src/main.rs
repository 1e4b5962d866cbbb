mod client;
mod commands;
mod daemon_launcher;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{FocusAction, SettingsAction, SitesAction, StatsAction, StopKind};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden CLI - Pomodoro focus sessions with site blocking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a focus session
    Start {
        /// Focus duration in minutes (default from config)
        #[arg(short, long)]
        focus_minutes: Option<u64>,
        /// Break duration in minutes (default from config)
        #[arg(short, long)]
        break_minutes: Option<u64>,
    },
    /// Pause the running countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Stop the session and return to idle
    Stop,
    /// Cancel the session
    Cancel,
    /// Reset the countdown
    Reset,
    /// Show the current session and blocking state
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Turn blocking on or off outside of sessions
    Focus {
        #[command(subcommand)]
        action: FocusAction,
    },
    /// Manage the blocked-site list
    Sites {
        #[command(subcommand)]
        action: SitesAction,
    },
    /// Show or reset focus statistics
    Stats {
        #[command(subcommand)]
        action: Option<StatsAction>,
        #[arg(long)]
        json: bool,
    },
    /// Show or change timer settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Create the configuration file interactively
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Show or change the display language
    Lang { language: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            focus_minutes,
            break_minutes,
        } => commands::start(focus_minutes, break_minutes).await,
        Commands::Pause => commands::pause().await,
        Commands::Resume => commands::resume().await,
        Commands::Stop => commands::stop(StopKind::Stop).await,
        Commands::Cancel => commands::stop(StopKind::Cancel).await,
        Commands::Reset => commands::stop(StopKind::Reset).await,
        Commands::Status { json } => commands::status(json).await,
        Commands::Focus { action } => commands::focus(action).await,
        Commands::Sites { action } => commands::sites(action).await,
        Commands::Stats { action, json } => commands::stats(action, json).await,
        Commands::Settings { action } => commands::settings(action).await,
        Commands::Init { force } => commands::init(force),
        Commands::Lang { language } => commands::lang(language).await,
    }
}
