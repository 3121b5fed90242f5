//! Per-route worker reports.
//!
//! A worker prints one JSON object per route it finishes:
//!
//! ```json
//! {"success":true,"outputIndexPath":"/dist/browser/en/about/index.html","bytes":5120,"route":"/about"}
//! {"success":false,"outputIndexPath":"/dist/browser/en/x/index.html","error":{"message":"boom"},"route":"/x"}
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerReport {
    pub route: String,
    pub output_index_path: PathBuf,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportError {
    pub message: String,
}

impl WorkerReport {
    /// Parse one stdout line. Anything that is not a report yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('{') {
            return None;
        }
        serde_json::from_str(line).ok()
    }

    /// Failure for a route the worker never reported.
    pub fn unreported(route: &str, output_dir: &Path, message: impl Into<String>) -> Self {
        Self {
            route: route.to_string(),
            output_index_path: index_path(output_dir, route),
            success: false,
            bytes: None,
            error: Some(ReportError {
                message: message.into(),
            }),
        }
    }

    /// Error message of a failed report.
    pub fn message(&self) -> &str {
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or("unknown render error")
    }
}

/// Where a route's document is expected: `<output>/<route>/index.html`.
fn index_path(output_dir: &Path, route: &str) -> PathBuf {
    output_dir
        .join(route.trim_matches('/'))
        .join("index.html")
}

/// Human-readable byte size: `512 B`, `4.0 KB`, `1.5 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}
