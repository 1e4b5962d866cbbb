//! Warden protocol definitions for CLI-daemon communication
//!
//! This crate defines the IPC protocol between UI surfaces (the CLI today)
//! and the daemon. All types are serializable with bincode for efficient
//! binary communication.

use serde::{Deserialize, Serialize};

pub use warden_core::TimerPhase;

/// Requests sent from a UI surface to the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Add a blocked site and, while focus mode is on, a live blocking rule
    AddBlockingRule { domain: String },
    /// Remove a blocked site and its live rule, if any
    RemoveBlockingRule { domain: String },
    /// Turn blocking on for every persisted blocked site
    ActivateFocusMode,
    /// Remove every live blocking rule
    DeactivateFocusMode,
    /// Start a focus countdown
    StartTimer {
        /// Focus duration in seconds (None = default from settings)
        focus_seconds: Option<u64>,
        /// Break duration in seconds (None = default from settings)
        break_seconds: Option<u64>,
    },
    /// Freeze the running countdown
    PauseTimer,
    /// Resume a paused countdown
    ResumeTimer,
    /// Stop the session and return to idle
    StopTimer,
    /// Cancel the session and return to idle
    CancelTimer,
    /// Reset the countdown and return to idle
    ResetTimer,
    /// Re-read settings from the config file
    RefreshSettings,
    /// Current timer snapshot
    GetStatus,
    /// Current blocking snapshot
    GetBlocking,
    /// Liveness check
    Ping,
}

/// Responses sent from the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Timer snapshot
    TimerStatus {
        phase: TimerPhase,
        /// Seconds left on the running countdown
        current_seconds: u64,
        /// Focus duration of the session
        total_seconds: u64,
        /// Break duration of the session
        break_seconds: u64,
    },
    /// Blocking snapshot
    Blocking {
        active: bool,
        sites: Vec<String>,
    },
    /// Generic success acknowledgment
    Ok,
    /// Error response with message
    Error { message: String },
    /// Pong response to ping
    Pong,
}
