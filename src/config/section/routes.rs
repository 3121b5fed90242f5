//! `[routes]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [routes]
//! list = ["/", "/about"]      # Explicit routes
//! file = "routes.txt"         # One route per line, relative to project root
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where routes to prerender come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesSectionConfig {
    /// Explicitly configured routes, rendered before file-sourced ones.
    pub list: Vec<String>,

    /// File enumerating routes.
    pub file: Option<PathBuf>,
}
