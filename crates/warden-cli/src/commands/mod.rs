mod focus;
mod init;
mod lang;
mod pause;
mod resume;
mod settings;
mod sites;
mod start;
mod stats;
mod status;
mod stop;

pub use focus::execute as focus;
pub use init::execute as init;
pub use lang::execute as lang;
pub use pause::execute as pause;
pub use resume::execute as resume;
pub use settings::{execute as settings, SettingsAction};
pub use sites::{execute as sites, SitesAction};
pub use start::execute as start;
pub use stats::{execute as stats, StatsAction};
pub use status::execute as status;
pub use stop::{execute as stop, StopKind};
pub use focus::FocusAction;
