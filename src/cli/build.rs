//! `prerender build`: build both bundles, then render every route.

use crate::config::PrerenderConfig;
use crate::core::PrerenderOutcome;
use crate::log;
use crate::prerender::prerender;
use crate::render::format_bytes;
use crate::utils::plural_count;
use anyhow::{Result, bail};
use std::time::Instant;

/// Run a full prerender and report how it went.
///
/// Fails when the outcome is unsuccessful so the process exits non-zero.
pub async fn build(config: &PrerenderConfig) -> Result<()> {
    let start = Instant::now();
    let outcome = prerender(config).await?;
    report(&outcome, start);

    if !outcome.success {
        bail!(
            "{}",
            outcome.error.as_deref().unwrap_or("prerender failed")
        );
    }
    Ok(())
}

fn report(outcome: &PrerenderOutcome, start: Instant) {
    let summary = &outcome.summary;
    if summary.total() == 0 {
        return;
    }

    let elapsed = start.elapsed().as_secs_f64();
    if summary.failed == 0 {
        log!(
            "done";
            "{} rendered ({}) in {:.1}s",
            plural_count(summary.rendered, "route"),
            format_bytes(summary.bytes),
            elapsed
        );
    } else {
        log!(
            "done";
            "{} rendered, {} failed in {:.1}s",
            plural_count(summary.rendered, "route"),
            summary.failed,
            elapsed
        );
    }

    if let Some(dir) = outcome
        .browser
        .as_ref()
        .and_then(|b| b.base_output_path.as_ref())
    {
        log!("done"; "output in {}", dir.display());
    }
}
