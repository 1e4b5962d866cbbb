use crate::client::{ClientError, DaemonClient};
use anyhow::Result;
use serde::Serialize;
use warden_core::{Config, Translator};
use warden_protocol::{Request, Response, TimerPhase};

#[derive(Serialize)]
struct StatusOutput {
    phase: String,
    current_seconds: u64,
    total_seconds: u64,
    break_seconds: u64,
    remaining_formatted: String,
    focus_mode_active: bool,
    blocked_sites: usize,
}

pub async fn execute(json: bool) -> Result<()> {
    let translator = get_translator();
    let client = DaemonClient::new();

    let status = match client.send(Request::GetStatus).await {
        Ok(Response::TimerStatus {
            phase,
            current_seconds,
            total_seconds,
            break_seconds,
        }) => (phase, current_seconds, total_seconds, break_seconds),
        Ok(Response::Error { message }) => {
            report_error(&message, json);
            std::process::exit(1);
        }
        Ok(_) => {
            report_error(&translator.get("error.unexpected_response"), json);
            std::process::exit(1);
        }
        Err(ClientError::DaemonNotRunning) => {
            if json {
                println!(r#"{{"error": "daemon not running", "phase": "idle"}}"#);
            } else {
                println!("{}", translator.get("status.daemon_down"));
            }
            return Ok(());
        }
        Err(error) => {
            report_error(&error.to_string(), json);
            std::process::exit(1);
        }
    };

    let (active, sites) = match client.send(Request::GetBlocking).await {
        Ok(Response::Blocking { active, sites }) => (active, sites),
        _ => (false, Vec::new()),
    };

    let (phase, current_seconds, total_seconds, break_seconds) = status;

    if json {
        let output = StatusOutput {
            phase: phase.to_string(),
            current_seconds,
            total_seconds,
            break_seconds,
            remaining_formatted: format_duration(current_seconds),
            focus_mode_active: active,
            blocked_sites: sites.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let phase_key = match phase {
        TimerPhase::Idle => "status.idle",
        TimerPhase::Focus => "status.focus",
        TimerPhase::Break => "status.break",
        TimerPhase::Paused => "status.paused",
    };
    println!("{}", translator.get(phase_key));

    if phase != TimerPhase::Idle {
        println!(
            "{}",
            translator.format(
                "status.remaining",
                &[("time", &format_duration(current_seconds))]
            )
        );
    }

    let focus_key = if active {
        "status.focus_active"
    } else {
        "status.focus_inactive"
    };
    println!("{}", translator.get(focus_key));

    Ok(())
}

fn report_error(message: &str, json: bool) {
    if json {
        println!(r#"{{"error": "{}"}}"#, message);
    } else {
        eprintln!("Erreur: {}", message);
    }
}

fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;

    if minutes > 0 {
        format!("{} min {} sec", minutes, remaining_seconds)
    } else {
        format!("{} sec", remaining_seconds)
    }
}

fn get_translator() -> Translator {
    Config::load()
        .map(|config| Translator::new(config.general.language))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_shows_minutes_and_seconds() {
        assert_eq!(format_duration(90), "1 min 30 sec");
        assert_eq!(format_duration(3600), "60 min 0 sec");
        assert_eq!(format_duration(1500), "25 min 0 sec");
    }

    #[test]
    fn format_duration_shows_only_seconds_when_under_minute() {
        assert_eq!(format_duration(45), "45 sec");
        assert_eq!(format_duration(0), "0 sec");
    }
}
