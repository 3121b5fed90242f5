//! Shared helpers: process spawning and count formatting.

pub mod exec;
mod plural;

pub use plural::plural_count;
