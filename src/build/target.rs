//! Build backend traits.

use crate::core::BuildResult;
use anyhow::Result;
use std::fmt;

/// Which bundle a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Browser,
    Server,
}

impl TargetKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options a build is scheduled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub target: TargetKind,
    pub watch: bool,
    /// Only meaningful for browser builds.
    pub service_worker: Option<bool>,
}

impl BuildOptions {
    /// One-shot browser build without service worker augmentation.
    pub const fn browser() -> Self {
        Self {
            target: TargetKind::Browser,
            watch: false,
            service_worker: Some(false),
        }
    }

    /// One-shot server build.
    pub const fn server() -> Self {
        Self {
            target: TargetKind::Server,
            watch: false,
            service_worker: None,
        }
    }
}

/// Something that can start a build.
pub trait BuildTarget {
    type Run: BuildRun;

    /// Start a build. `Err` means nothing was started and there is nothing to stop.
    fn schedule(&self, options: &BuildOptions) -> Result<Self::Run>;
}

/// A started build.
pub trait BuildRun {
    /// Wait for the build to finish.
    ///
    /// `Ok` with `success == false` is a build that ran and failed;
    /// `Err` means the result could not be obtained at all.
    async fn result(&mut self) -> Result<BuildResult>;

    /// Release the build's resources. Must be safe to call whether or not
    /// `result` resolved, and more than once.
    async fn stop(&mut self);
}
