use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use warden_core::{
    Config, Resumed, StateStore, TickEvent, TimerPhase, TimerSession, TimerSettings,
    TransitionError, Translator,
};

use super::{BlockerHandle, NotifierHandle};

pub enum TimerMessage {
    Start {
        focus_seconds: Option<u64>,
        break_seconds: Option<u64>,
        reply: oneshot::Sender<Result<(), TransitionError>>,
    },
    Pause {
        reply: oneshot::Sender<Result<(), TransitionError>>,
    },
    Resume {
        reply: oneshot::Sender<Result<(), TransitionError>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    RefreshSettings {
        reply: oneshot::Sender<()>,
    },
    GetStatus {
        reply: oneshot::Sender<TimerStatus>,
    },
}

#[derive(Debug, Clone)]
pub struct TimerStatus {
    pub phase: TimerPhase,
    pub current_seconds: u64,
    pub total_seconds: u64,
    pub break_seconds: u64,
}

#[derive(Clone)]
pub struct TimerHandle {
    sender: mpsc::Sender<TimerMessage>,
}

impl TimerHandle {
    pub async fn start(
        &self,
        focus_seconds: Option<u64>,
        break_seconds: Option<u64>,
    ) -> Option<Result<(), TransitionError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TimerMessage::Start {
                focus_seconds,
                break_seconds,
                reply,
            })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn pause(&self) -> Option<Result<(), TransitionError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TimerMessage::Pause { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn resume(&self) -> Option<Result<(), TransitionError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TimerMessage::Resume { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    /// Stop, cancel and reset all funnel here: back to idle, always.
    pub async fn reset(&self) -> Option<()> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TimerMessage::Reset { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn refresh_settings(&self) -> Option<()> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TimerMessage::RefreshSettings { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn get_status(&self) -> Option<TimerStatus> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TimerMessage::GetStatus { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }
}

/// Drives the pomodoro state machine on a one-second tick and bridges its
/// transitions to blocking, notifications and persistence.
pub struct TimerActor {
    receiver: mpsc::Receiver<TimerMessage>,
    session: TimerSession,
    settings: TimerSettings,
    store: Option<Arc<dyn StateStore>>,
    blocker: Option<BlockerHandle>,
    notifier: Option<NotifierHandle>,
}

impl TimerActor {
    pub fn new(
        session: TimerSession,
        settings: TimerSettings,
        store: Option<Arc<dyn StateStore>>,
        blocker: Option<BlockerHandle>,
        notifier: Option<NotifierHandle>,
    ) -> (Self, TimerHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let actor = Self {
            receiver,
            session,
            settings,
            store,
            blocker,
            notifier,
        };

        let handle = TimerHandle { sender };

        (actor, handle)
    }

    pub async fn run(mut self) {
        let mut tick_interval = tokio::time::interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                Some(message) = self.receiver.recv() => {
                    match message {
                        TimerMessage::Start { focus_seconds, break_seconds, reply } => {
                            let _ = reply.send(self.handle_start(focus_seconds, break_seconds));
                        }
                        TimerMessage::Pause { reply } => {
                            let _ = reply.send(self.handle_pause());
                        }
                        TimerMessage::Resume { reply } => {
                            let _ = reply.send(self.handle_resume());
                        }
                        TimerMessage::Reset { reply } => {
                            self.handle_reset();
                            let _ = reply.send(());
                        }
                        TimerMessage::RefreshSettings { reply } => {
                            self.handle_refresh_settings();
                            let _ = reply.send(());
                        }
                        TimerMessage::GetStatus { reply } => {
                            let _ = reply.send(self.current_status());
                        }
                    }
                }
                _ = tick_interval.tick() => {
                    self.handle_tick();
                }
                else => break,
            }
        }

        debug!("timer actor stopped");
    }

    fn handle_start(
        &mut self,
        focus_seconds: Option<u64>,
        break_seconds: Option<u64>,
    ) -> Result<(), TransitionError> {
        let total = focus_seconds.unwrap_or(self.settings.focus_seconds);
        let pause = break_seconds.unwrap_or(self.settings.break_seconds);

        self.session.start(total, pause)?;
        info!(total, pause, "session started");
        self.persist_session();

        if let Some(ref blocker) = self.blocker {
            blocker.notify_focus_entered();
        }
        if let Some(ref notifier) = self.notifier {
            notifier.send_session_start(total / 60);
        }

        Ok(())
    }

    fn handle_pause(&mut self) -> Result<(), TransitionError> {
        self.session.pause()?;
        info!("session paused");
        self.persist_session();

        if let Some(ref notifier) = self.notifier {
            notifier.send_session_paused();
        }

        Ok(())
    }

    fn handle_resume(&mut self) -> Result<(), TransitionError> {
        let resumed = self.session.resume()?;
        self.persist_session();

        match resumed {
            Resumed::Completed => {
                // paused past the end of the countdown: straight back to idle
                info!("resume found a finished countdown, back to idle");
                if let Some(ref blocker) = self.blocker {
                    blocker.notify_idle_entered();
                }
            }
            Resumed::Focus | Resumed::Break => {
                info!(phase = %self.session.phase, "session resumed");
                if let Some(ref notifier) = self.notifier {
                    notifier.send_session_resumed();
                }
            }
        }

        Ok(())
    }

    fn handle_reset(&mut self) {
        let was_idle = self.session.phase == TimerPhase::Idle;
        self.session.reset();
        self.persist_session();

        if let Some(ref blocker) = self.blocker {
            blocker.notify_idle_entered();
        }

        if !was_idle {
            info!("session stopped");
        }
    }

    fn handle_refresh_settings(&mut self) {
        let config = Config::load().unwrap_or_default();
        self.settings = config.timer_settings();
        debug!(settings = ?self.settings, "settings refreshed");

        if let Some(ref notifier) = self.notifier {
            notifier.update_settings(self.settings.sound_notifications);
        }
    }

    fn handle_tick(&mut self) {
        let Some(event) = self.session.tick() else {
            return;
        };

        self.persist_session();

        match event {
            TickEvent::Counted { .. } => {}
            TickEvent::FocusFinished { focus_seconds } => {
                info!(focus_seconds, "focus complete, break starting");
                self.record_completed_session(focus_seconds);

                if let Some(ref blocker) = self.blocker {
                    blocker.notify_break_entered(self.settings.block_during_break);
                }
                if self.settings.sound_notifications {
                    if let Some(ref notifier) = self.notifier {
                        notifier.send_focus_complete(focus_seconds / 60);
                    }
                }
            }
            TickEvent::BreakFinished => {
                info!("break complete, back to idle");

                if let Some(ref blocker) = self.blocker {
                    blocker.notify_idle_entered();
                }
                if self.settings.sound_notifications {
                    if let Some(ref notifier) = self.notifier {
                        notifier.send_break_complete();
                    }
                }
            }
        }
    }

    fn persist_session(&self) {
        if let Some(ref store) = self.store {
            if let Err(error) = store.save_session(&self.session) {
                error!(%error, "failed to persist timer session");
                self.notify_persistence_error();
            }
        }
    }

    fn record_completed_session(&self, focus_seconds: u64) {
        let Some(ref store) = self.store else {
            return;
        };

        let today = Local::now().date_naive();
        let result = store.load_stats().and_then(|mut stats| {
            stats.record_session(today, focus_seconds);
            store.save_stats(&stats)
        });

        if let Err(error) = result {
            error!(%error, "failed to record completed session");
            self.notify_persistence_error();
        }
    }

    fn notify_persistence_error(&self) {
        if let Some(ref notifier) = self.notifier {
            let translator = Self::translator();
            notifier.send_alert(
                translator.get("notify.persistence_error_title"),
                translator.get("notify.persistence_error_body"),
            );
        }
    }

    fn translator() -> Translator {
        Config::load()
            .map(|config| Translator::new(config.general.language))
            .unwrap_or_default()
    }

    fn current_status(&self) -> TimerStatus {
        TimerStatus {
            phase: self.session.phase,
            current_seconds: self.session.current_seconds,
            total_seconds: self.session.total_seconds,
            break_seconds: self.session.break_seconds,
        }
    }
}
