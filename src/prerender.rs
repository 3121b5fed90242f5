//! Top-level prerender run.
//!
//! ```text
//! resolve routes ─> schedule builds ─> worker count ─> render_all ─> outcome
//!   (empty: error)   (failed: outcome, nothing rendered)
//! ```

use crate::build::{BuildTarget, CommandBuild, schedule_builds};
use crate::config::PrerenderConfig;
use crate::core::PrerenderOutcome;
use crate::render::{RenderOptions, Rendered, render_all};
use crate::route::{resolve_routes, worker_count};
use crate::utils::plural_count;
use crate::{debug, log};
use anyhow::Result;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrerenderError {
    #[error("no routes to prerender (set `routes.list`, `routes.file` or pass --route)")]
    NoRoutes,
}

/// Build both bundles with the configured commands and prerender every route.
pub async fn prerender(config: &PrerenderConfig) -> Result<PrerenderOutcome> {
    let root = config.get_root();
    let browser = CommandBuild::new(config.build.browser.clone(), root);
    let server = CommandBuild::new(config.build.server.clone(), root);
    run(config, &browser, &server).await
}

/// Prerender with the given build backends.
///
/// `Err` is reserved for problems that make rendering impossible (no
/// routes, unreadable template, missing server bundle). Build failures and
/// per-route failures come back as an unsuccessful [`PrerenderOutcome`].
pub async fn run<B, S>(config: &PrerenderConfig, browser: &B, server: &S) -> Result<PrerenderOutcome>
where
    B: BuildTarget,
    S: BuildTarget,
{
    let routes = resolve_routes(
        config.get_root(),
        config.routes.file.as_deref(),
        &config.routes.list,
    )?;
    if routes.is_empty() {
        return Err(PrerenderError::NoRoutes.into());
    }
    debug!("prerender"; "{} resolved", plural_count(routes.len(), "route"));

    log!("build"; "browser and server");
    let builds = schedule_builds(browser, server).await;
    if !builds.success {
        return Ok(PrerenderOutcome::failure(builds.error));
    }
    let (Some(browser_build), Some(server_build)) = (builds.browser, builds.server) else {
        return Ok(PrerenderOutcome::failure(builds.error));
    };

    let workers = worker_count(available_parallelism(), routes.len(), config.render.workers);
    let options = RenderOptions::new(&config.render, workers);
    let Rendered { browser, summary } =
        render_all(browser_build, &server_build, &routes, &options).await?;

    Ok(PrerenderOutcome::rendered(
        browser,
        summary,
        config.render.allow_failures,
    ))
}

/// Processing units on this machine, at least 1.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
