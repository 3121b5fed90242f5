//! One render worker process.
//!
//! A worker is started with `[index contents, server bundle, output dir,
//! routes...]` appended to the configured command. It prints a
//! [`WorkerReport`] line per route and exits. Every assigned route yields
//! exactly one report on the channel: routes the process never reported
//! (crash, timeout, failed spawn) are sent as failures once it is reaped.

use super::report::WorkerReport;
use crate::utils::exec::{Cmd, clean_output, strip_ansi};
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

/// Arguments shared by every worker of one output directory.
#[derive(Debug, Clone)]
pub struct WorkerInput {
    pub command: Vec<String>,
    pub index: String,
    pub bundle: PathBuf,
    pub output_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl WorkerInput {
    fn command_for(&self, routes: &[String]) -> Cmd {
        Cmd::from_slice(&self.command)
            .arg(&self.index)
            .arg(&self.bundle)
            .arg(&self.output_dir)
            .args(routes)
    }
}

/// A spawned (or failed-to-spawn) worker and the routes it owns.
pub struct RenderWorker {
    id: usize,
    routes: Vec<String>,
    output_dir: PathBuf,
    timeout: Option<Duration>,
    child: Result<Child>,
}

impl RenderWorker {
    /// Start a worker for `routes`. Spawn errors surface as failed reports
    /// from [`RenderWorker::run`].
    pub fn spawn(id: usize, input: &WorkerInput, routes: &[String]) -> Self {
        let child = input.command_for(routes).spawn();
        if let Err(e) = &child {
            crate::debug!("render"; "worker {} failed to start: {:#}", id, e);
        }
        Self {
            id,
            routes: routes.to_vec(),
            output_dir: input.output_dir.clone(),
            timeout: input.timeout,
            child,
        }
    }

    /// Forward reports until the process exits, then reap it.
    pub async fn run(self, tx: mpsc::Sender<WorkerReport>) {
        let mut pending = Pending::new(&self.routes);

        let mut child = match self.child {
            Ok(child) => child,
            Err(e) => {
                let message = format!("worker failed to start: {e:#}");
                for route in pending.drain() {
                    send(&tx, WorkerReport::unreported(&route, &self.output_dir, &message)).await;
                }
                return;
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let id = self.id;
        let io = async {
            tokio::join!(forward_reports(id, stdout, &mut pending, &tx), read_all(stderr)).1
        };

        let (stderr, timed_out) = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, io).await {
                Ok(stderr) => (stderr, false),
                Err(_) => (Vec::new(), true),
            },
            None => (io.await, false),
        };

        // kills the direct child only, not processes it spawned
        if timed_out && let Err(e) = child.start_kill() {
            crate::debug!("render"; "failed to kill worker {}: {}", id, e);
        }
        let status = child.wait().await;

        if pending.is_empty() {
            return;
        }
        let message = match (&status, self.timeout) {
            (_, Some(limit)) if timed_out => {
                format!("worker timed out after {}s", limit.as_secs())
            }
            (Ok(status), _) => exit_message(*status, &clean_output(&stderr)),
            (Err(e), _) => format!("failed to wait for worker: {e}"),
        };
        for route in pending.drain() {
            send(&tx, WorkerReport::unreported(&route, &self.output_dir, &message)).await;
        }
    }
}

async fn forward_reports<R: AsyncRead + Unpin>(
    id: usize,
    stdout: Option<R>,
    pending: &mut Pending,
    tx: &mpsc::Sender<WorkerReport>,
) {
    let Some(stdout) = stdout else { return };
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match WorkerReport::parse(&line) {
                Some(report) if pending.take(&report.route) => send(tx, report).await,
                Some(report) => {
                    crate::debug!("render"; "worker {} reported unassigned route {}", id, report.route);
                }
                None if !line.trim().is_empty() => {
                    crate::debug!("render"; "worker {}: {}", id, strip_ansi(&line));
                }
                None => {}
            },
            Ok(None) => break,
            Err(e) => {
                crate::debug!("render"; "worker {} stdout: {}", id, e);
                break;
            }
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await.ok();
    }
    buf
}

async fn send(tx: &mpsc::Sender<WorkerReport>, report: WorkerReport) {
    // Receiver gone means the dispatcher stopped listening; nothing to do.
    tx.send(report).await.ok();
}

fn exit_message(status: ExitStatus, stderr: &str) -> String {
    let head = if status.success() {
        "worker exited without reporting this route".to_string()
    } else {
        format!("worker failed with {status}")
    };
    if stderr.is_empty() {
        head
    } else {
        format!("{head}\n{stderr}")
    }
}

// ============================================================================
// Pending routes
// ============================================================================

/// Routes assigned to a worker and not yet reported, counted so duplicate
/// routes need one report each.
struct Pending {
    order: Vec<String>,
    counts: FxHashMap<String, usize>,
}

impl Pending {
    fn new(routes: &[String]) -> Self {
        let mut counts = FxHashMap::default();
        for route in routes {
            *counts.entry(route.clone()).or_insert(0) += 1;
        }
        Self {
            order: routes.to_vec(),
            counts,
        }
    }

    /// Mark one occurrence of `route` as reported.
    fn take(&mut self, route: &str) -> bool {
        match self.counts.get_mut(route) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    fn is_empty(&self) -> bool {
        self.counts.values().all(|&n| n == 0)
    }

    /// Remaining routes in assignment order, one per unreported occurrence.
    fn drain(&mut self) -> Vec<String> {
        let mut left = Vec::new();
        for route in self.order.iter().rev() {
            if let Some(n) = self.counts.get_mut(route)
                && *n > 0
            {
                *n -= 1;
                left.push(route.clone());
            }
        }
        left.reverse();
        left
    }
}
