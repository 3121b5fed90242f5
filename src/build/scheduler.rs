//! Concurrent browser + server builds.

use super::target::{BuildOptions, BuildRun, BuildTarget};
use crate::core::BuildResult;

/// Both builds' results, merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduledBuilds {
    pub success: bool,
    pub error: Option<String>,
    pub browser: Option<BuildResult>,
    pub server: Option<BuildResult>,
}

impl ScheduledBuilds {
    /// Merge two finished builds.
    ///
    /// Success requires both builds to succeed and the browser build to name
    /// its base output path; the browser's error wins over the server's.
    fn combine(browser: BuildResult, server: BuildResult) -> Self {
        let has_output = browser.base_output_path.is_some();
        let success = browser.success && server.success && has_output;

        let error = browser
            .error_message()
            .or_else(|| server.error_message())
            .map(String::from)
            .or_else(|| {
                (browser.success && server.success && !has_output)
                    .then(|| "browser build reported no base output path".to_string())
            });

        Self {
            success,
            error,
            browser: Some(browser),
            server: Some(server),
        }
    }

    /// At least one build errored; keep whichever result did arrive.
    fn unfinished(browser: anyhow::Result<BuildResult>, server: anyhow::Result<BuildResult>) -> Self {
        let error = browser
            .as_ref()
            .err()
            .or(server.as_ref().err())
            .map(|e| format!("{e:#}"));
        Self {
            success: false,
            error,
            browser: browser.ok(),
            server: server.ok(),
        }
    }

    fn errored(error: &anyhow::Error) -> Self {
        Self {
            success: false,
            error: Some(format!("{error:#}")),
            browser: None,
            server: None,
        }
    }
}

/// Run browser and server builds concurrently and wait for both.
///
/// Never fails: a build that cannot be scheduled or awaited becomes a failed
/// [`ScheduledBuilds`] with that error's message. Every build that was
/// scheduled is stopped exactly once before returning.
pub async fn schedule_builds<B, S>(browser: &B, server: &S) -> ScheduledBuilds
where
    B: BuildTarget,
    S: BuildTarget,
{
    let mut browser_run = browser.schedule(&BuildOptions::browser());
    let mut server_run = server.schedule(&BuildOptions::server());

    let builds = match (&mut browser_run, &mut server_run) {
        (Ok(b), Ok(s)) => match tokio::join!(b.result(), s.result()) {
            (Ok(b), Ok(s)) => ScheduledBuilds::combine(b, s),
            (b, s) => ScheduledBuilds::unfinished(b, s),
        },
        (Err(e), _) | (_, Err(e)) => ScheduledBuilds::errored(e),
    };

    tokio::join!(stop(&mut browser_run), stop(&mut server_run));

    builds
}

async fn stop<R: BuildRun>(run: &mut anyhow::Result<R>) {
    if let Ok(run) = run {
        run.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::TargetKind;
    use anyhow::{Result, anyhow, bail};
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    enum Behavior {
        Finish(BuildResult),
        Throw(&'static str),
        Unschedulable,
    }

    struct FakeTarget {
        behavior: Behavior,
        stops: Arc<AtomicUsize>,
        options: Mutex<Option<BuildOptions>>,
    }

    impl FakeTarget {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                stops: Arc::new(AtomicUsize::new(0)),
                options: Mutex::new(None),
            }
        }

        fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    struct FakeRun {
        behavior: Behavior,
        stops: Arc<AtomicUsize>,
    }

    impl BuildTarget for FakeTarget {
        type Run = FakeRun;

        fn schedule(&self, options: &BuildOptions) -> Result<FakeRun> {
            *self.options.lock() = Some(*options);
            if let Behavior::Unschedulable = self.behavior {
                bail!("unknown target");
            }
            Ok(FakeRun {
                behavior: self.behavior.clone(),
                stops: Arc::clone(&self.stops),
            })
        }
    }

    impl BuildRun for FakeRun {
        async fn result(&mut self) -> Result<BuildResult> {
            tokio::task::yield_now().await;
            match &self.behavior {
                Behavior::Finish(result) => Ok(result.clone()),
                Behavior::Throw(msg) => Err(anyhow!(*msg)),
                Behavior::Unschedulable => unreachable!(),
            }
        }

        async fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ok(base: Option<&str>) -> Behavior {
        Behavior::Finish(BuildResult {
            success: true,
            base_output_path: base.map(PathBuf::from),
            output_paths: base.into_iter().map(PathBuf::from).collect(),
            ..BuildResult::default()
        })
    }

    fn failed(error: &str) -> Behavior {
        Behavior::Finish(BuildResult::failure(error))
    }

    #[tokio::test]
    async fn test_both_succeed() {
        let browser = FakeTarget::new(ok(Some("/dist/browser")));
        let server = FakeTarget::new(ok(Some("/dist/server")));

        let builds = schedule_builds(&browser, &server).await;

        assert!(builds.success);
        assert!(builds.error.is_none());
        assert_eq!(
            builds.server.unwrap().base_output_path,
            Some(PathBuf::from("/dist/server"))
        );
        assert_eq!((browser.stops(), server.stops()), (1, 1));
    }

    #[tokio::test]
    async fn test_build_options() {
        let browser = FakeTarget::new(ok(Some("/dist/browser")));
        let server = FakeTarget::new(ok(Some("/dist/server")));
        schedule_builds(&browser, &server).await;

        let browser_opts = (*browser.options.lock()).unwrap();
        assert_eq!(browser_opts.target, TargetKind::Browser);
        assert!(!browser_opts.watch);
        assert_eq!(browser_opts.service_worker, Some(false));

        let server_opts = (*server.options.lock()).unwrap();
        assert_eq!(server_opts.target, TargetKind::Server);
        assert!(!server_opts.watch);
        assert_eq!(server_opts.service_worker, None);
    }

    #[tokio::test]
    async fn test_browser_failure() {
        let browser = FakeTarget::new(failed("browser exploded"));
        let server = FakeTarget::new(ok(Some("/dist/server")));

        let builds = schedule_builds(&browser, &server).await;

        assert!(!builds.success);
        assert_eq!(builds.error.as_deref(), Some("browser exploded"));
        assert_eq!((browser.stops(), server.stops()), (1, 1));
    }

    #[tokio::test]
    async fn test_browser_error_takes_precedence() {
        let browser = FakeTarget::new(failed("browser"));
        let server = FakeTarget::new(failed("server"));
        let builds = schedule_builds(&browser, &server).await;
        assert_eq!(builds.error.as_deref(), Some("browser"));

        let browser = FakeTarget::new(ok(Some("/dist/browser")));
        let server = FakeTarget::new(failed("server"));
        let builds = schedule_builds(&browser, &server).await;
        assert!(!builds.success);
        assert_eq!(builds.error.as_deref(), Some("server"));
    }

    #[tokio::test]
    async fn test_missing_base_output_path_fails() {
        let browser = FakeTarget::new(ok(None));
        let server = FakeTarget::new(ok(Some("/dist/server")));

        let builds = schedule_builds(&browser, &server).await;

        assert!(!builds.success);
        assert!(builds.error.unwrap().contains("no base output path"));
        assert_eq!((browser.stops(), server.stops()), (1, 1));
    }

    #[tokio::test]
    async fn test_thrown_error_becomes_failure() {
        let browser = FakeTarget::new(ok(Some("/dist/browser")));
        let server = FakeTarget::new(Behavior::Throw("bundle crashed"));

        let builds = schedule_builds(&browser, &server).await;

        assert!(!builds.success);
        assert_eq!(builds.error.as_deref(), Some("bundle crashed"));
        assert_eq!(
            builds.browser.unwrap().base_output_path,
            Some(PathBuf::from("/dist/browser"))
        );
        assert!(builds.server.is_none());
        assert_eq!((browser.stops(), server.stops()), (1, 1));
    }

    #[tokio::test]
    async fn test_both_thrown_browser_error_wins() {
        let browser = FakeTarget::new(Behavior::Throw("browser crashed"));
        let server = FakeTarget::new(Behavior::Throw("server crashed"));

        let builds = schedule_builds(&browser, &server).await;

        assert_eq!(builds.error.as_deref(), Some("browser crashed"));
        assert!(builds.browser.is_none() && builds.server.is_none());
        assert_eq!((browser.stops(), server.stops()), (1, 1));
    }

    #[tokio::test]
    async fn test_unschedulable_target_still_stops_the_other() {
        let browser = FakeTarget::new(Behavior::Unschedulable);
        let server = FakeTarget::new(ok(Some("/dist/server")));

        let builds = schedule_builds(&browser, &server).await;

        assert!(!builds.success);
        assert_eq!(builds.error.as_deref(), Some("unknown target"));
        assert_eq!((browser.stops(), server.stops()), (0, 1));
    }
}
