//! Browser and server bundle builds.
//!
//! ```text
//! BuildTarget::schedule ──> BuildRun::result ──┐
//!                                              ├─ join ─> ScheduledBuilds
//! BuildTarget::schedule ──> BuildRun::result ──┘
//!                           BuildRun::stop (always)
//! ```
//!
//! - `target`    - traits a build backend implements, and build options
//! - `command`   - backend running a configured external command
//! - `scheduler` - runs both builds concurrently and merges their results

mod command;
mod scheduler;
mod target;

pub use command::CommandBuild;
pub use scheduler::{ScheduledBuilds, schedule_builds};
pub use target::{BuildOptions, BuildRun, BuildTarget, TargetKind};
