//! Render dispatch.

use super::RenderError;
use super::report::{WorkerReport, format_bytes};
use super::worker::{RenderWorker, WorkerInput};
use crate::config::RenderSectionConfig;
use crate::core::{BuildResult, RenderSummary, is_shutdown};
use crate::logger::ProgressLine;
use crate::route::partition;
use crate::utils::plural_count;
use crate::{debug, log};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

const CHANNEL_BUFFER: usize = 64;

/// File the server build writes into each output directory.
const SERVER_ENTRY: &str = "main.js";

/// How to run render workers.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub command: Vec<String>,
    pub workers: usize,
    pub index: String,
    pub timeout: Option<Duration>,
}

impl RenderOptions {
    pub fn new(config: &RenderSectionConfig, workers: usize) -> Self {
        Self {
            command: config.command.clone(),
            workers,
            index: config.index.clone(),
            timeout: config.timeout(),
        }
    }
}

/// The browser build, untouched, with what rendering into it produced.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub browser: BuildResult,
    pub summary: RenderSummary,
}

/// Server bundle for a browser output directory.
///
/// `<server base>/<output relative to browser base>/main.js`, so
/// `/dist/browser/en` pairs with `/dist/server/en/main.js`.
pub fn server_bundle_path(
    browser: &BuildResult,
    server: &BuildResult,
    output: &Path,
) -> Result<PathBuf, RenderError> {
    let browser_base = browser
        .base_output_path
        .as_deref()
        .ok_or(RenderError::NoBrowserOutput)?;
    let server_base = server
        .base_output_path
        .as_deref()
        .ok_or(RenderError::NoServerOutput)?;
    let relative = output
        .strip_prefix(browser_base)
        .map_err(|_| RenderError::OutsideBase {
            output: output.to_path_buf(),
            base: browser_base.to_path_buf(),
        })?;
    Ok(server_base.join(relative).join(SERVER_ENTRY))
}

/// Render `routes` into every browser output directory, one directory at a
/// time.
///
/// Per-route failures are logged and counted; an unreadable index template,
/// a missing server bundle or a shutdown request aborts the whole run.
pub async fn render_all(
    browser: BuildResult,
    server: &BuildResult,
    routes: &[String],
    options: &RenderOptions,
) -> Result<Rendered> {
    render_dirs(browser, server, routes, options, is_shutdown).await
}

/// [`render_all`] with the shutdown check supplied by the caller.
pub(super) async fn render_dirs(
    browser: BuildResult,
    server: &BuildResult,
    routes: &[String],
    options: &RenderOptions,
    interrupted: impl Fn() -> bool,
) -> Result<Rendered> {
    let mut summary = RenderSummary::default();
    let outputs = browser.output_dirs();

    for (done, output) in outputs.iter().cloned().enumerate() {
        if interrupted() {
            let skipped = outputs.len() - done;
            log!("render"; "shutdown requested, skipping {}", plural_count(skipped, "output dir"));
            return Err(RenderError::Interrupted { skipped }.into());
        }

        let index_path = output.join(&options.index);
        let index = tokio::fs::read_to_string(&index_path)
            .await
            .with_context(|| format!("Failed to read index template {}", index_path.display()))?;

        let bundle = server_bundle_path(&browser, server, &output)?;
        if !tokio::fs::try_exists(&bundle).await.unwrap_or(false) {
            return Err(RenderError::MissingServerBundle(bundle).into());
        }

        let input = WorkerInput {
            command: options.command.clone(),
            index,
            bundle,
            output_dir: output,
            timeout: options.timeout,
        };
        summary.merge(render_output(&input, routes, options.workers).await);
    }

    Ok(Rendered { browser, summary })
}

/// One output directory: fan out, log reports as they arrive, join.
async fn render_output(input: &WorkerInput, routes: &[String], workers: usize) -> RenderSummary {
    let groups: Vec<_> = partition(routes, workers)
        .into_iter()
        .filter(|g| !g.is_empty())
        .collect();

    log!(
        "render";
        "{} across {} into {}",
        plural_count(routes.len(), "route"),
        plural_count(groups.len(), "worker"),
        input.output_dir.display()
    );
    debug!("render"; "server bundle {}", input.bundle.display());

    let (tx, mut rx) = mpsc::channel::<WorkerReport>(CHANNEL_BUFFER);
    let handles: Vec<_> = groups
        .iter()
        .enumerate()
        .map(|(id, group)| tokio::spawn(RenderWorker::spawn(id, input, group).run(tx.clone())))
        .collect();
    drop(tx);

    let progress = ProgressLine::new("routes", routes.len());
    let mut summary = RenderSummary::default();
    while let Some(report) = rx.recv().await {
        log_report(&report, &mut summary);
        progress.inc();
    }
    progress.finish();

    for handle in handles {
        if let Err(e) = handle.await {
            debug!("render"; "worker task failed: {}", e);
        }
    }

    summary
}

fn log_report(report: &WorkerReport, summary: &mut RenderSummary) {
    let path = report.output_index_path.display();
    if report.success {
        let bytes = report.bytes.unwrap_or(0);
        summary.record_success(bytes);
        log!("render"; "{} ({})", path, format_bytes(bytes));
    } else {
        summary.record_failure();
        log!("error"; "{}\n{}", report.message(), path);
    }
}
