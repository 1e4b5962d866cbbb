//! Warden core library
//!
//! Contains domain types and port definitions (traits) for the Warden
//! application. This crate has no knowledge of infrastructure concerns.

pub mod config;
pub mod domain;
pub mod i18n;
pub mod ports;

pub use config::{
    Config, ConfigError, GeneralConfig, NotificationConfig, NotificationUrgency, TimerConfig,
};
pub use domain::{
    fallback_rule_id, normalize_domain, primary_rule_id, DayStats, FocusStats, InvalidDomainError,
    Resumed, RuleId, TickEvent, TimerPhase, TimerSession, TimerSettings, TransitionError,
    DEFAULT_SITES, RULE_ID_SPACE, STREAK_WINDOW_DAYS,
};
pub use i18n::{Language, Translator, UnsupportedLanguageError};
pub use ports::{EngineRule, RuleEngine, RuleEngineError, StateStore, StateStoreError};
