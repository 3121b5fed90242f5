//! prerender - build browser and server bundles, then render routes to static HTML.

#![allow(dead_code)]

mod build;
mod cli;
mod config;
mod core;
mod logger;
mod prerender;
mod render;
mod route;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PrerenderConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PrerenderConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(cli::build::build(&config))
        }
        Commands::Routes { .. } => cli::routes::list_routes(&config),
    }
}
