//! Routes to prerender and how they are split across workers.
//!
//! - `source`    - collect routes from the config list and routes file
//! - `partition` - contiguous balanced groups, worker-count policy

mod partition;
mod source;

pub use partition::{partition, worker_count};
pub use source::resolve_routes;
