//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Prerender routes to static HTML
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: prerender.toml)
    #[arg(short = 'C', long, default_value = "prerender.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build browser and server bundles, then prerender every route
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: PrerenderArgs,
    },

    /// Print the resolved routes and how they would be split across workers
    #[command(visible_alias = "r")]
    Routes {
        #[command(flatten)]
        args: PrerenderArgs,
    },
}

/// Shared arguments for Build and Routes commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PrerenderArgs {
    /// Command producing the browser bundle (overrides `build.browser`)
    ///
    /// Example: --browser-target "ng run app:build:production"
    #[arg(long, value_name = "CMD")]
    pub browser_target: Option<String>,

    /// Command producing the server bundle (overrides `build.server`)
    #[arg(long, value_name = "CMD")]
    pub server_target: Option<String>,

    /// File listing one route per line (relative to project root)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub routes_file: Option<PathBuf>,

    /// Route to prerender, may be repeated (added to `routes.list`)
    #[arg(short, long = "route", value_name = "ROUTE")]
    pub routes: Vec<String>,

    /// Number of render worker processes (default: available cores - 1)
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// Arguments shared by every subcommand.
    pub fn args(&self) -> &PrerenderArgs {
        match &self.command {
            Commands::Build { args } | Commands::Routes { args } => args,
        }
    }

    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
}
