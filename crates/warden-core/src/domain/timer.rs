use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four phases of a pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Focus,
    Break,
    Paused,
}

impl TimerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Focus => "focus",
            TimerPhase::Break => "break",
            TimerPhase::Paused => "paused",
        }
    }

    pub fn from_stored(value: &str) -> Self {
        match value {
            "focus" => TimerPhase::Focus,
            "break" => TimerPhase::Break,
            "paused" => TimerPhase::Paused,
            _ => TimerPhase::Idle,
        }
    }
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("une session est déjà en cours")]
    AlreadyRunning,

    #[error("aucun compte à rebours actif")]
    NotCounting,

    #[error("aucune session en pause")]
    NotPaused,
}

/// What a one-second tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Counted { remaining: u64 },
    FocusFinished { focus_seconds: u64 },
    BreakFinished,
}

/// Where a resume landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumed {
    Focus,
    Break,
    /// The countdown already hit zero while paused; the session went
    /// straight back to idle instead of resuming.
    Completed,
}

/// Runtime settings applied to new sessions and break transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub focus_seconds: u64,
    pub break_seconds: u64,
    pub block_during_break: bool,
    pub sound_notifications: bool,
}

/// An owned pomodoro session.
///
/// All transitions go through the methods below; callers persist the session
/// after each one. Invariant: `current_seconds <= max(total, break)`, and
/// `Idle` always carries `current_seconds == total_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    pub phase: TimerPhase,
    pub current_seconds: u64,
    pub total_seconds: u64,
    pub break_seconds: u64,
    paused_from: Option<TimerPhase>,
}

impl TimerSession {
    pub fn new(total_seconds: u64, break_seconds: u64) -> Self {
        Self {
            phase: TimerPhase::Idle,
            current_seconds: total_seconds,
            total_seconds,
            break_seconds,
            paused_from: None,
        }
    }

    /// Rebuild a session from persisted fields, e.g. after a daemon restart.
    /// The stored countdown is used as-is; elapsed real time while the
    /// process was down is not caught up.
    pub fn restore(
        phase: TimerPhase,
        current_seconds: u64,
        total_seconds: u64,
        break_seconds: u64,
        paused_from: Option<TimerPhase>,
    ) -> Self {
        let ceiling = total_seconds.max(break_seconds);
        let mut session = Self {
            phase,
            current_seconds: current_seconds.min(ceiling),
            total_seconds,
            break_seconds,
            paused_from: paused_from.filter(|p| matches!(p, TimerPhase::Focus | TimerPhase::Break)),
        };
        if session.phase == TimerPhase::Idle {
            session.current_seconds = session.total_seconds;
            session.paused_from = None;
        }
        session
    }

    pub fn paused_from(&self) -> Option<TimerPhase> {
        self.paused_from
    }

    pub fn is_counting(&self) -> bool {
        matches!(self.phase, TimerPhase::Focus | TimerPhase::Break)
    }

    /// Begin a focus session. Rejected unless idle.
    pub fn start(&mut self, total_seconds: u64, break_seconds: u64) -> Result<(), TransitionError> {
        if self.phase != TimerPhase::Idle {
            return Err(TransitionError::AlreadyRunning);
        }
        self.total_seconds = total_seconds;
        self.break_seconds = break_seconds;
        self.current_seconds = total_seconds;
        self.phase = TimerPhase::Focus;
        self.paused_from = None;
        Ok(())
    }

    /// Advance the countdown by one second. Returns `None` outside focus and
    /// break phases.
    pub fn tick(&mut self) -> Option<TickEvent> {
        match self.phase {
            TimerPhase::Focus => {
                self.current_seconds = self.current_seconds.saturating_sub(1);
                if self.current_seconds == 0 {
                    let focus_seconds = self.total_seconds;
                    self.phase = TimerPhase::Break;
                    self.current_seconds = self.break_seconds;
                    Some(TickEvent::FocusFinished { focus_seconds })
                } else {
                    Some(TickEvent::Counted {
                        remaining: self.current_seconds,
                    })
                }
            }
            TimerPhase::Break => {
                self.current_seconds = self.current_seconds.saturating_sub(1);
                if self.current_seconds == 0 {
                    self.phase = TimerPhase::Idle;
                    self.current_seconds = self.total_seconds;
                    Some(TickEvent::BreakFinished)
                } else {
                    Some(TickEvent::Counted {
                        remaining: self.current_seconds,
                    })
                }
            }
            TimerPhase::Idle | TimerPhase::Paused => None,
        }
    }

    /// Freeze the countdown. Rejected unless focus or break is running.
    pub fn pause(&mut self) -> Result<(), TransitionError> {
        if !self.is_counting() {
            return Err(TransitionError::NotCounting);
        }
        self.paused_from = Some(self.phase);
        self.phase = TimerPhase::Paused;
        Ok(())
    }

    /// Resume the interrupted countdown. A countdown that already reached
    /// zero while paused goes straight back to idle.
    pub fn resume(&mut self) -> Result<Resumed, TransitionError> {
        if self.phase != TimerPhase::Paused {
            return Err(TransitionError::NotPaused);
        }
        if self.current_seconds == 0 {
            self.reset();
            return Ok(Resumed::Completed);
        }
        let target = self.paused_from.take().unwrap_or(TimerPhase::Focus);
        self.phase = target;
        Ok(match target {
            TimerPhase::Break => Resumed::Break,
            _ => Resumed::Focus,
        })
    }

    /// Return to idle with a full countdown. Always succeeds, from any phase,
    /// any number of times.
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.current_seconds = self.total_seconds;
        self.paused_from = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(session: &TimerSession) {
        let ceiling = session.total_seconds.max(session.break_seconds);
        assert!(
            session.current_seconds <= ceiling,
            "current {} exceeds ceiling {}",
            session.current_seconds,
            ceiling
        );
        if session.phase == TimerPhase::Idle {
            assert_eq!(session.current_seconds, session.total_seconds);
        }
    }

    #[test]
    fn new_session_is_idle_with_full_countdown() {
        let session = TimerSession::new(1500, 300);
        assert_eq!(session.phase, TimerPhase::Idle);
        assert_eq!(session.current_seconds, 1500);
        assert_invariant(&session);
    }

    #[test]
    fn start_moves_to_focus() {
        let mut session = TimerSession::new(1500, 300);
        session.start(60, 10).unwrap();
        assert_eq!(session.phase, TimerPhase::Focus);
        assert_eq!(session.current_seconds, 60);
        assert_eq!(session.total_seconds, 60);
        assert_invariant(&session);
    }

    #[test]
    fn start_is_rejected_outside_idle() {
        let mut session = TimerSession::new(1500, 300);
        session.start(60, 10).unwrap();
        assert_eq!(session.start(90, 10), Err(TransitionError::AlreadyRunning));

        session.pause().unwrap();
        assert_eq!(session.start(90, 10), Err(TransitionError::AlreadyRunning));
    }

    #[test]
    fn focus_countdown_flows_into_break() {
        let mut session = TimerSession::new(1500, 300);
        session.start(3, 2).unwrap();

        assert_eq!(session.tick(), Some(TickEvent::Counted { remaining: 2 }));
        assert_eq!(session.tick(), Some(TickEvent::Counted { remaining: 1 }));
        assert_eq!(
            session.tick(),
            Some(TickEvent::FocusFinished { focus_seconds: 3 })
        );
        assert_eq!(session.phase, TimerPhase::Break);
        assert_eq!(session.current_seconds, 2);
        assert_invariant(&session);
    }

    #[test]
    fn break_countdown_returns_to_idle() {
        let mut session = TimerSession::new(1500, 300);
        session.start(1, 2).unwrap();
        session.tick();

        assert_eq!(session.tick(), Some(TickEvent::Counted { remaining: 1 }));
        assert_eq!(session.tick(), Some(TickEvent::BreakFinished));
        assert_eq!(session.phase, TimerPhase::Idle);
        assert_eq!(session.current_seconds, 1);
        assert_invariant(&session);
    }

    #[test]
    fn zero_length_break_completes_on_next_tick() {
        let mut session = TimerSession::new(1500, 300);
        session.start(1, 0).unwrap();

        assert_eq!(
            session.tick(),
            Some(TickEvent::FocusFinished { focus_seconds: 1 })
        );
        assert_eq!(session.phase, TimerPhase::Break);
        assert_eq!(session.tick(), Some(TickEvent::BreakFinished));
        assert_eq!(session.phase, TimerPhase::Idle);
    }

    #[test]
    fn tick_is_inert_while_idle_or_paused() {
        let mut session = TimerSession::new(1500, 300);
        assert_eq!(session.tick(), None);

        session.start(60, 10).unwrap();
        session.pause().unwrap();
        assert_eq!(session.tick(), None);
        assert_eq!(session.current_seconds, 60);
    }

    #[test]
    fn pause_remembers_the_interrupted_phase() {
        let mut session = TimerSession::new(1500, 300);
        session.start(2, 5).unwrap();
        session.tick();
        session.tick();
        assert_eq!(session.phase, TimerPhase::Break);

        session.pause().unwrap();
        assert_eq!(session.phase, TimerPhase::Paused);
        assert_eq!(session.resume(), Ok(Resumed::Break));
        assert_eq!(session.phase, TimerPhase::Break);
    }

    #[test]
    fn pause_is_rejected_outside_a_countdown() {
        let mut session = TimerSession::new(1500, 300);
        assert_eq!(session.pause(), Err(TransitionError::NotCounting));

        session.start(60, 10).unwrap();
        session.pause().unwrap();
        assert_eq!(session.pause(), Err(TransitionError::NotCounting));
    }

    #[test]
    fn resume_is_rejected_when_not_paused() {
        let mut session = TimerSession::new(1500, 300);
        assert_eq!(session.resume(), Err(TransitionError::NotPaused));

        session.start(60, 10).unwrap();
        assert_eq!(session.resume(), Err(TransitionError::NotPaused));
    }

    #[test]
    fn resume_with_exhausted_countdown_goes_idle() {
        let mut session = TimerSession::new(1500, 300);
        session.start(60, 10).unwrap();
        session.pause().unwrap();
        session.current_seconds = 0;

        assert_eq!(session.resume(), Ok(Resumed::Completed));
        assert_eq!(session.phase, TimerPhase::Idle);
        assert_eq!(session.current_seconds, 60);
        assert_invariant(&session);
    }

    #[test]
    fn reset_is_idempotent_from_every_phase() {
        let mut session = TimerSession::new(1500, 300);

        for _ in 0..3 {
            session.reset();
            assert_eq!(session.phase, TimerPhase::Idle);
            assert_eq!(session.current_seconds, 1500);
        }

        session.start(60, 10).unwrap();
        session.tick();
        session.reset();
        assert_eq!(session.phase, TimerPhase::Idle);
        assert_eq!(session.current_seconds, 60);

        session.start(60, 10).unwrap();
        session.pause().unwrap();
        session.reset();
        session.reset();
        assert_eq!(session.phase, TimerPhase::Idle);
        assert_eq!(session.paused_from(), None);
        assert_invariant(&session);
    }

    #[test]
    fn full_cycle_keeps_the_invariant() {
        let mut session = TimerSession::new(1500, 300);
        session.start(1500, 300).unwrap();

        let mut focus_finished = 0;
        let mut break_finished = 0;
        for _ in 0..1800 {
            match session.tick() {
                Some(TickEvent::FocusFinished { focus_seconds }) => {
                    assert_eq!(focus_seconds, 1500);
                    focus_finished += 1;
                }
                Some(TickEvent::BreakFinished) => break_finished += 1,
                _ => {}
            }
            assert_invariant(&session);
        }

        assert_eq!(focus_finished, 1);
        assert_eq!(break_finished, 1);
        assert_eq!(session.phase, TimerPhase::Idle);
        assert_eq!(session.current_seconds, 1500);
    }

    #[test]
    fn restore_clamps_and_normalizes() {
        let restored = TimerSession::restore(TimerPhase::Focus, 9000, 1500, 300, None);
        assert_eq!(restored.current_seconds, 1500);

        let idle = TimerSession::restore(TimerPhase::Idle, 42, 1500, 300, Some(TimerPhase::Focus));
        assert_eq!(idle.current_seconds, 1500);
        assert_eq!(idle.paused_from(), None);

        let paused =
            TimerSession::restore(TimerPhase::Paused, 120, 1500, 300, Some(TimerPhase::Break));
        assert_eq!(paused.paused_from(), Some(TimerPhase::Break));
    }

    #[test]
    fn phase_roundtrip_through_stored_form() {
        for phase in [
            TimerPhase::Idle,
            TimerPhase::Focus,
            TimerPhase::Break,
            TimerPhase::Paused,
        ] {
            assert_eq!(TimerPhase::from_stored(phase.as_str()), phase);
        }
        assert_eq!(TimerPhase::from_stored("garbage"), TimerPhase::Idle);
    }
}
