//! `prerender routes`: show what a build would render, without building.

use crate::config::PrerenderConfig;
use crate::log;
use crate::prerender::{PrerenderError, available_parallelism};
use crate::route::{partition, resolve_routes, worker_count};
use crate::utils::plural_count;
use anyhow::Result;

pub fn list_routes(config: &PrerenderConfig) -> Result<()> {
    let routes = resolve_routes(
        config.get_root(),
        config.routes.file.as_deref(),
        &config.routes.list,
    )?;
    if routes.is_empty() {
        return Err(PrerenderError::NoRoutes.into());
    }

    for route in &routes {
        println!("{route}");
    }

    let workers = worker_count(available_parallelism(), routes.len(), config.render.workers);
    let sizes: Vec<String> = partition(&routes, workers)
        .iter()
        .map(|group| group.len().to_string())
        .collect();

    log!(
        "routes";
        "{} across {}: [{}]",
        plural_count(routes.len(), "route"),
        plural_count(workers, "worker"),
        sizes.join(", ")
    );
    Ok(())
}
