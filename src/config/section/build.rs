//! `[build]` section configuration.
//!
//! Commands producing the browser and server bundles.
//!
//! # Example
//!
//! ```toml
//! [build]
//! browser = ["ng", "run", "app:build:production"]
//! server = ["ng", "run", "app:server:production"]
//! ```
//!
//! Each command must print its result as a JSON object on the last line of
//! stdout, e.g. `{"success":true,"baseOutputPath":"dist/browser","outputPaths":["dist/browser"]}`.
//! `$PRERENDER_*` variables in arguments are substituted before running.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Build target commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Command and arguments producing the browser bundle.
    pub browser: Vec<String>,

    /// Command and arguments producing the server bundle.
    pub server: Vec<String>,
}

impl BuildSectionConfig {
    pub const BROWSER: FieldPath = FieldPath::new("build.browser");
    pub const SERVER: FieldPath = FieldPath::new("build.server");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.browser.is_empty() {
            diag.error_with_hint(
                Self::BROWSER,
                "browser build command is required",
                "set `build.browser` or pass `--browser-target`",
            );
        }
        if self.server.is_empty() {
            diag.error_with_hint(
                Self::SERVER,
                "server build command is required",
                "set `build.server` or pass `--server-target`",
            );
        }
    }
}
