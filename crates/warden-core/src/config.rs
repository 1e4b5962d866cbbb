use crate::domain::TimerSettings;
use crate::i18n::Language;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("erreur de lecture: {source}")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("erreur de parsing TOML: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub timer: TimerConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    pub language: Language,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub default_focus_minutes: u64,
    pub default_break_minutes: u64,
    pub block_during_break: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub sound_enabled: bool,
    pub urgency: NotificationUrgency,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationUrgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_focus_minutes: 25,
            default_break_minutes: 5,
            block_during_break: false,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            urgency: NotificationUrgency::Normal,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("warden")
            .join("config.toml")
    }

    /// Settings the daemon applies to new sessions and break transitions.
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            focus_seconds: self.timer.default_focus_minutes * 60,
            break_seconds: self.timer.default_break_minutes * 60,
            block_during_break: self.timer.block_during_break,
            sound_notifications: self.notifications.sound_enabled,
        }
    }

    /// Rewrite a single `key = value` inside `[section]` of the config file,
    /// preserving everything else in place. Creates the file or the section
    /// when missing.
    pub fn save_value(section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let path = Self::config_path();
        let content = if path.exists() {
            std::fs::read_to_string(&path)?
        } else {
            String::new()
        };

        let updated = update_section_value(&content, section, key, value);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, updated)?;
        Ok(())
    }
}

fn update_section_value(content: &str, section: &str, key: &str, value: &str) -> String {
    let header = format!("[{}]", section);
    let new_line = format!("{} = {}", key, value);

    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    let mut in_section = false;
    let mut section_exists = false;
    let mut key_updated = false;

    for line in &mut lines {
        let trimmed = line.trim();

        if trimmed.starts_with('[') {
            in_section = trimmed == header;
            if in_section {
                section_exists = true;
            }
        }

        if in_section && trimmed.starts_with(key) {
            let rest = trimmed[key.len()..].trim_start();
            if rest.starts_with('=') {
                *line = new_line.clone();
                key_updated = true;
            }
        }
    }

    if !section_exists {
        if !lines.is_empty() && !lines.last().unwrap().is_empty() {
            lines.push(String::new());
        }
        lines.push(header);
        lines.push(new_line);
        return lines.join("\n");
    }

    if !key_updated {
        for (index, line) in lines.iter().enumerate() {
            if line.trim() == header {
                lines.insert(index + 1, new_line);
                break;
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = Config::default();

        assert_eq!(config.general.language, Language::En);
        assert_eq!(config.timer.default_focus_minutes, 25);
        assert_eq!(config.timer.default_break_minutes, 5);
        assert!(!config.timer.block_during_break);
        assert!(config.notifications.sound_enabled);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [timer]
            default_focus_minutes = 50
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.timer.default_focus_minutes, 50);
        assert_eq!(config.timer.default_break_minutes, 5);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [general]
            language = "fr"

            [timer]
            default_focus_minutes = 45
            default_break_minutes = 10
            block_during_break = true

            [notifications]
            sound_enabled = false
            urgency = "critical"
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.general.language, Language::Fr);
        assert_eq!(config.timer.default_focus_minutes, 45);
        assert_eq!(config.timer.default_break_minutes, 10);
        assert!(config.timer.block_during_break);
        assert!(!config.notifications.sound_enabled);
        assert!(matches!(
            config.notifications.urgency,
            NotificationUrgency::Critical
        ));
    }

    #[test]
    fn timer_settings_converts_minutes_to_seconds() {
        let config = Config::default();
        let settings = config.timer_settings();

        assert_eq!(settings.focus_seconds, 25 * 60);
        assert_eq!(settings.break_seconds, 5 * 60);
        assert!(!settings.block_during_break);
        assert!(settings.sound_notifications);
    }

    #[test]
    fn update_replaces_existing_key() {
        let content = r#"[timer]
default_focus_minutes = 25
default_break_minutes = 5
"#;

        let result = update_section_value(content, "timer", "default_focus_minutes", "50");

        assert!(result.contains("default_focus_minutes = 50"));
        assert!(result.contains("default_break_minutes = 5"));
    }

    #[test]
    fn update_creates_missing_section() {
        let content = "[general]\nlanguage = \"en\"\n";

        let result = update_section_value(content, "timer", "block_during_break", "true");

        assert!(result.contains("[timer]"));
        assert!(result.contains("block_during_break = true"));
        assert!(result.contains("language = \"en\""));
    }

    #[test]
    fn update_inserts_missing_key_into_existing_section() {
        let content = "[timer]\ndefault_focus_minutes = 25\n";

        let result = update_section_value(content, "timer", "default_break_minutes", "10");

        assert!(result.contains("default_break_minutes = 10"));
        assert!(result.contains("default_focus_minutes = 25"));
    }

    #[test]
    fn update_does_not_touch_other_sections() {
        let content = "[timer]\ndefault_focus_minutes = 25\n\n[notifications]\nsound_enabled = true\n";

        let result = update_section_value(content, "notifications", "sound_enabled", "false");

        assert!(result.contains("default_focus_minutes = 25"));
        assert!(result.contains("sound_enabled = false"));
        assert!(!result.contains("sound_enabled = true"));
    }

    #[test]
    fn update_on_empty_content_creates_section() {
        let result = update_section_value("", "timer", "default_focus_minutes", "30");

        assert!(result.contains("[timer]"));
        assert!(result.contains("default_focus_minutes = 30"));
    }
}
