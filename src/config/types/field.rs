//! Dotted config field path.

use owo_colors::OwoColorize;
use std::fmt;

/// A dotted path to a config field, e.g. `render.workers`.
///
/// Sections declare these as associated consts so diagnostics and CLI
/// override messages agree on naming:
///
/// ```ignore
/// diag.error(RenderSectionConfig::WORKERS, "must be at least 1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSectionConfig;

    #[test]
    fn test_display_wraps_in_backticks() {
        owo_colors::set_override(false);
        assert_eq!(FieldPath::new("render.workers").to_string(), "`render.workers`");
        assert_eq!(RenderSectionConfig::WORKERS.as_str(), "render.workers");
    }
}
