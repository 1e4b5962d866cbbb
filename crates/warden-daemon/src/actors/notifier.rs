use notify_rust::{Notification, Urgency};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use warden_core::{NotificationUrgency, Translator};

pub enum NotifierMessage {
    SessionStart { duration_minutes: u64 },
    FocusComplete { focus_minutes: u64 },
    BreakComplete,
    SessionPaused,
    SessionResumed,
    Alert { title: String, body: String },
    UpdateSettings { sound_enabled: bool },
}

#[derive(Clone)]
pub struct NotifierHandle {
    sender: mpsc::Sender<NotifierMessage>,
}

impl NotifierHandle {
    pub fn send_session_start(&self, duration_minutes: u64) {
        self.post(NotifierMessage::SessionStart { duration_minutes });
    }

    pub fn send_focus_complete(&self, focus_minutes: u64) {
        self.post(NotifierMessage::FocusComplete { focus_minutes });
    }

    pub fn send_break_complete(&self) {
        self.post(NotifierMessage::BreakComplete);
    }

    pub fn send_session_paused(&self) {
        self.post(NotifierMessage::SessionPaused);
    }

    pub fn send_session_resumed(&self) {
        self.post(NotifierMessage::SessionResumed);
    }

    pub fn send_alert(&self, title: String, body: String) {
        self.post(NotifierMessage::Alert { title, body });
    }

    pub fn update_settings(&self, sound_enabled: bool) {
        self.post(NotifierMessage::UpdateSettings { sound_enabled });
    }

    fn post(&self, message: NotifierMessage) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if let Err(error) = sender.send(message).await {
                error!(%error, "failed to queue notification message");
            }
        });
    }
}

pub struct NotifierActor {
    receiver: mpsc::Receiver<NotifierMessage>,
    urgency: Urgency,
    sound_enabled: bool,
    translator: Translator,
}

impl NotifierActor {
    pub fn new(
        urgency: NotificationUrgency,
        sound_enabled: bool,
        translator: Translator,
    ) -> (Self, NotifierHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let urgency = match urgency {
            NotificationUrgency::Low => Urgency::Low,
            NotificationUrgency::Normal => Urgency::Normal,
            NotificationUrgency::Critical => Urgency::Critical,
        };

        let actor = Self {
            receiver,
            urgency,
            sound_enabled,
            translator,
        };

        let handle = NotifierHandle { sender };

        (actor, handle)
    }

    pub async fn run(mut self) {
        info!("notifier actor started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                NotifierMessage::SessionStart { duration_minutes } => {
                    let minutes = duration_minutes.to_string();
                    self.show(
                        &self.translator.get("notify.session_start_title"),
                        &self
                            .translator
                            .format("notify.session_start_body", &[("minutes", &minutes)]),
                    );
                }
                NotifierMessage::FocusComplete { focus_minutes } => {
                    let minutes = focus_minutes.to_string();
                    self.show(
                        &self.translator.get("notify.focus_complete_title"),
                        &self
                            .translator
                            .format("notify.focus_complete_body", &[("minutes", &minutes)]),
                    );
                }
                NotifierMessage::BreakComplete => {
                    self.show(
                        &self.translator.get("notify.break_complete_title"),
                        &self.translator.get("notify.break_complete_body"),
                    );
                }
                NotifierMessage::SessionPaused => {
                    self.show(
                        &self.translator.get("notify.paused_title"),
                        &self.translator.get("notify.paused_body"),
                    );
                }
                NotifierMessage::SessionResumed => {
                    self.show(
                        &self.translator.get("notify.resumed_title"),
                        &self.translator.get("notify.resumed_body"),
                    );
                }
                NotifierMessage::Alert { title, body } => {
                    self.show(&title, &body);
                }
                NotifierMessage::UpdateSettings { sound_enabled } => {
                    debug!(sound_enabled, "notifier settings updated");
                    self.sound_enabled = sound_enabled;
                }
            }
        }

        debug!("notifier actor stopped");
    }

    fn show(&self, summary: &str, body: &str) {
        match self.build_notification(summary, body).show() {
            Ok(_) => debug!(summary, "notification sent"),
            Err(error) => warn!(%error, summary, "failed to show notification"),
        }
    }

    fn build_notification(&self, summary: &str, body: &str) -> Notification {
        let mut notification = Notification::new();
        notification
            .summary(summary)
            .body(body)
            .urgency(self.urgency)
            .appname("Warden");

        if self.sound_enabled {
            notification.sound_name("message-new-instant");
        }

        notification
    }
}
