mod blocker;
mod notifier;
mod timer;

pub use blocker::{BlockerActor, BlockerError, BlockerHandle, BlockingSnapshot};
pub use notifier::{NotifierActor, NotifierHandle};
pub use timer::{TimerActor, TimerHandle, TimerStatus};
