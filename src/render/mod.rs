//! Route rendering through external worker processes.
//!
//! ```text
//! for each browser output dir (sequential):
//!   index.html ─┐
//!   main.js ────┼─> partition routes ─> worker × N ─> reports ─> log + summary
//!   out dir ────┘                          (join all before next dir)
//! ```
//!
//! - `dispatcher` - per-output-directory batches
//! - `worker`     - one worker process and its report stream
//! - `report`     - the JSON line a worker prints per route

mod dispatcher;
mod report;
mod worker;


pub use dispatcher::{RenderOptions, Rendered, render_all};
pub use report::format_bytes;

use std::path::PathBuf;
use thiserror::Error;

/// Problems that stop rendering before any worker starts.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("server bundle not found at {}", .0.display())]
    MissingServerBundle(PathBuf),

    #[error("server build reported no base output path")]
    NoServerOutput,

    #[error("browser build reported no base output path")]
    NoBrowserOutput,

    #[error("interrupted before every output directory was rendered ({skipped} skipped)")]
    Interrupted { skipped: usize },

    #[error("output directory {} is not inside {}", .output.display(), .base.display())]
    OutsideBase { output: PathBuf, base: PathBuf },
}
