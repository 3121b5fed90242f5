//! Route partitioning.

/// Split `routes` into `n` contiguous groups whose sizes differ by at most one.
///
/// The first `len % n` groups take the extra route, so 10 routes over 3
/// groups gives `[4, 3, 3]`. When `n > len` the trailing groups are empty.
/// `n == 0` is treated as 1.
pub fn partition(routes: &[String], n: usize) -> Vec<&[String]> {
    let n = n.max(1);
    let base = routes.len() / n;
    let extra = routes.len() % n;

    let mut groups = Vec::with_capacity(n);
    let mut rest = routes;
    for i in 0..n {
        let size = base + usize::from(i < extra);
        let (group, tail) = rest.split_at(size);
        groups.push(group);
        rest = tail;
    }
    groups
}

/// Number of worker processes to start.
///
/// One core is left to the orchestrator unless `requested` overrides it.
/// Never more workers than routes, never fewer than one.
pub fn worker_count(available: usize, routes: usize, requested: Option<usize>) -> usize {
    requested
        .unwrap_or_else(|| available.saturating_sub(1))
        .min(routes)
        .max(1)
}
