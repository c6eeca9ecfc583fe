pub mod config;
pub mod opener;
pub mod scheduler;
pub mod session;

pub use config::AppConfig;
pub use opener::{Opener, RecordingOpener};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use session::{preferred_category, Session};

pub mod prelude {
    pub use super::{AppConfig, Opener, Scheduler, Session};
    pub use nr_core::{Event, Page, Result, Surface};
}
