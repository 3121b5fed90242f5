//! Route collection.
//!
//! ```text
//! routes.txt
//! ─────────────
//! # marketing
//! /
//! /about
//!
//! /blog/first-post
//! ```
//!
//! Explicit routes come first, then file routes in file order. Lines are
//! trimmed; blank lines and `#` comments are skipped. Duplicates keep their
//! first position.

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;

/// Collect the routes to prerender.
///
/// A relative `file` is resolved against `root`. An unreadable routes file
/// is an error; an empty result is not (the caller decides).
pub fn resolve_routes(root: &Path, file: Option<&Path>, list: &[String]) -> Result<Vec<String>> {
    let mut routes: Vec<String> = list.iter().map(|r| normalize(r)).collect();

    if let Some(file) = file {
        let path = root.join(file);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read routes file {}", path.display()))?;
        routes.extend(parse_routes_file(&content));
    }

    let mut seen = FxHashSet::default();
    routes.retain(|route| seen.insert(route.clone()));
    Ok(routes)
}

fn parse_routes_file(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
}

/// An empty route means the site root.
fn normalize(route: &str) -> String {
    let route = route.trim();
    if route.is_empty() { "/".into() } else { route.into() }
}
