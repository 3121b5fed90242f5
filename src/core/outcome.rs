//! Build and prerender result types.

use crate::utils::plural_count;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// BuildResult
// =============================================================================

/// Outcome of one external build, as printed by the build command.
///
/// ```json
/// {"success":true,"baseOutputPath":"dist/browser","outputPaths":["dist/browser/en","dist/browser/fr"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Root of everything the build wrote. Defined only when outputs exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_output_path: Option<PathBuf>,

    /// One directory per locale/variant.
    pub output_paths: Vec<PathBuf>,

    /// Single-output form used by older builders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl BuildResult {
    /// A failed result carrying `error`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Non-empty error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Directories to render into, in build order.
    ///
    /// Falls back to `output_path`, then `base_output_path` when the build
    /// reports no per-locale outputs.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        if !self.output_paths.is_empty() {
            return self.output_paths.clone();
        }
        self.output_path
            .iter()
            .chain(self.base_output_path.iter())
            .take(1)
            .cloned()
            .collect()
    }

    /// Make every relative path absolute against `root`.
    pub fn resolve_against(mut self, root: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { root.join(p) } else { p };
        self.base_output_path = self.base_output_path.map(resolve);
        self.output_path = self.output_path.map(resolve);
        self.output_paths = self.output_paths.into_iter().map(resolve).collect();
        self
    }
}

// =============================================================================
// RenderSummary
// =============================================================================

/// Per-route render tally across every output directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub rendered: usize,
    pub failed: usize,
    pub bytes: u64,
}

impl RenderSummary {
    pub fn record_success(&mut self, bytes: u64) {
        self.rendered += 1;
        self.bytes += bytes;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn merge(&mut self, other: RenderSummary) {
        self.rendered += other.rendered;
        self.failed += other.failed;
        self.bytes += other.bytes;
    }

    pub const fn total(&self) -> usize {
        self.rendered + self.failed
    }
}

// =============================================================================
// PrerenderOutcome
// =============================================================================

/// Aggregate result of a whole prerender run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerenderOutcome {
    pub success: bool,
    pub error: Option<String>,
    /// Browser build description; the prerendered tree lives under it.
    pub browser: Option<BuildResult>,
    pub summary: RenderSummary,
}

impl PrerenderOutcome {
    /// Failure before any rendering took place.
    pub fn failure(error: Option<String>) -> Self {
        Self {
            success: false,
            error,
            ..Self::default()
        }
    }

    /// Outcome after rendering.
    ///
    /// Route failures turn the run into a partial failure unless
    /// `allow_failures` is set, in which case only the builds decide.
    pub fn rendered(browser: BuildResult, summary: RenderSummary, allow_failures: bool) -> Self {
        let partial = summary.failed > 0 && !allow_failures;
        let error = partial.then(|| {
            format!(
                "{} of {} failed to render",
                plural_count(summary.failed, "route"),
                summary.total()
            )
        });
        Self {
            success: !partial,
            error,
            browser: Some(browser),
            summary,
        }
    }
}
