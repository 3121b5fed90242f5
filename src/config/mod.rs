//! Configuration management for `prerender.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build], [routes], [render]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config discovery, command splitting
//! └── mod.rs         # PrerenderConfig (this file)
//! ```
//!
//! Precedence: CLI flags override the config file, which overrides defaults.
//! A missing config file is not an error; validation then reports whatever
//! the CLI did not supply.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, split_command};

pub use section::{BuildSectionConfig, RenderSectionConfig, RoutesSectionConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, PrerenderArgs},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing prerender.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrerenderConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file, or cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build target commands
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Route sources
    #[serde(default)]
    pub routes: RoutesSectionConfig,

    /// Render worker settings
    #[serde(default)]
    pub render: RenderSectionConfig,
}

impl PrerenderConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = path;
                config
            }
            None => {
                crate::debug!("config"; "{} not found, using CLI options only", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_args(cli.args());
        config.normalize_paths();

        // `routes` only inspects route sources
        if cli.is_build() {
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply CLI overrides.
    fn apply_args(&mut self, args: &PrerenderArgs) {
        crate::logger::set_verbose(args.verbose);

        if let Some(cmd) = &args.browser_target {
            self.build.browser = split_command(cmd);
        }
        if let Some(cmd) = &args.server_target {
            self.build.server = split_command(cmd);
        }
        if let Some(file) = &args.routes_file {
            self.routes.file = Some(file.clone());
        }
        self.routes.list.extend(args.routes.iter().cloned());
        if args.workers.is_some() {
            self.render.workers = args.workers;
        }
    }

    /// Resolve the routes file against the project root, with tilde expansion.
    fn normalize_paths(&mut self) {
        if let Some(file) = self.routes.file.take() {
            let expanded = shellexpand::tilde(&file.to_string_lossy()).into_owned();
            let path = PathBuf::from(expanded);
            self.routes.file = Some(if path.is_relative() {
                self.root.join(path)
            } else {
                path
            });
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.render.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PrerenderConfig {
    let (parsed, ignored) = PrerenderConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PrerenderArgs {
        PrerenderArgs::default()
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(PrerenderConfig::from_str("[build\nbrowser = []").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[render]\ncommand = [\"node\"]\nthreads = 4";
        let (config, ignored) = PrerenderConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.render.command, vec!["node"]);
        assert!(ignored.iter().any(|f| f.contains("threads")));
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = test_parse_config(
            "[build]\nbrowser = [\"old\"]\n[routes]\nlist = [\"/\"]\n[render]\nworkers = 2",
        );
        let args = PrerenderArgs {
            browser_target: Some("ng run app:build".into()),
            routes: vec!["/about".into()],
            workers: Some(5),
            ..args()
        };
        config.apply_args(&args);

        assert_eq!(config.build.browser, vec!["ng", "run", "app:build"]);
        assert_eq!(config.routes.list, vec!["/", "/about"]);
        assert_eq!(config.render.workers, Some(5));
    }

    #[test]
    fn test_cli_absent_keeps_config() {
        let mut config = test_parse_config("[routes]\nfile = \"routes.txt\"\n[render]\nworkers = 2");
        config.apply_args(&args());
        assert_eq!(config.routes.file, Some(PathBuf::from("routes.txt")));
        assert_eq!(config.render.workers, Some(2));
    }

    #[test]
    fn test_routes_file_resolved_against_root() {
        let mut config = test_parse_config("[routes]\nfile = \"config/routes.txt\"");
        config.root = PathBuf::from("/project");
        config.normalize_paths();
        assert_eq!(
            config.routes.file,
            Some(PathBuf::from("/project/config/routes.txt"))
        );
    }

    #[test]
    fn test_validate_complete_config() {
        let config = test_parse_config(
            "[build]\nbrowser = [\"b\"]\nserver = [\"s\"]\n[render]\ncommand = [\"w\"]",
        );
        assert!(config.validate().is_ok());
        assert!(PrerenderConfig::default().validate().is_err());
    }
}
