mod rule;
mod site;
mod stats;
mod timer;

pub use rule::{fallback_rule_id, primary_rule_id, RuleId, RULE_ID_SPACE};
pub use site::{normalize_domain, InvalidDomainError, DEFAULT_SITES};
pub use stats::{DayStats, FocusStats, STREAK_WINDOW_DAYS};
pub use timer::{Resumed, TickEvent, TimerPhase, TimerSession, TimerSettings, TransitionError};
