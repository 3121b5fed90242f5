//! `[render]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [render]
//! command = ["node", "dist/prerender-worker.js"]
//! workers = 4                 # Default: available cores - 1, capped at route count
//! index = "index.html"        # Template read from every browser output directory
//! timeout = 120               # Seconds per worker (default: no timeout)
//! allow_failures = false      # Keep success when some routes fail to render
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Render worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSectionConfig {
    /// Worker program and leading arguments.
    /// Index contents, server bundle, output dir and routes are appended.
    pub command: Vec<String>,

    /// Worker process count override.
    pub workers: Option<usize>,

    /// Index document filename inside each browser output directory.
    pub index: String,

    /// Per-worker timeout in seconds.
    ///
    /// Only the worker process itself is killed. Processes it started (a
    /// wrapper like `sh worker.sh` or `npx ...` and its children) are left
    /// running; point `command` at the renderer directly when using this.
    pub timeout: Option<u64>,

    /// Report success even when individual routes fail to render.
    pub allow_failures: bool,
}

impl Default for RenderSectionConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            workers: None,
            index: "index.html".into(),
            timeout: None,
            allow_failures: false,
        }
    }
}

impl RenderSectionConfig {
    pub const COMMAND: FieldPath = FieldPath::new("render.command");
    pub const WORKERS: FieldPath = FieldPath::new("render.workers");
    pub const INDEX: FieldPath = FieldPath::new("render.index");
    pub const TIMEOUT: FieldPath = FieldPath::new("render.timeout");

    /// Timeout as a duration, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.command.is_empty() {
            diag.error_with_hint(
                Self::COMMAND,
                "render worker command is required",
                "e.g. command = [\"node\", \"dist/prerender-worker.js\"]",
            );
        }
        if self.workers == Some(0) {
            diag.error(Self::WORKERS, "must be at least 1");
        }
        if self.index.trim().is_empty() {
            diag.error(Self::INDEX, "index filename must not be empty");
        }
        if self.timeout == Some(0) {
            diag.error_with_hint(
                Self::TIMEOUT,
                "must be at least 1 second",
                "remove `render.timeout` to wait indefinitely",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_render_section() {
        let config = test_parse_config(
            "[render]\ncommand = [\"node\", \"worker.js\"]\nworkers = 3\ntimeout = 30\nallow_failures = true",
        );
        assert_eq!(config.render.command, vec!["node", "worker.js"]);
        assert_eq!(config.render.workers, Some(3));
        assert_eq!(config.render.timeout(), Some(Duration::from_secs(30)));
        assert!(config.render.allow_failures);
        assert_eq!(config.render.index, "index.html");
    }

    #[test]
    fn test_render_validation() {
        let config = test_parse_config("[render]\nworkers = 0\ntimeout = 0\nindex = \"\"");
        let mut diag = ConfigDiagnostics::new();
        config.render.validate(&mut diag);
        // command, workers, index, timeout
        assert_eq!(diag.len(), 4);
    }
}
