//! Core types - pure abstractions shared across the codebase.

mod outcome;
mod state;

pub use outcome::{BuildResult, PrerenderOutcome, RenderSummary};
pub use state::{is_shutdown, setup_shutdown_handler};
