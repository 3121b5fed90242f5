//! Builds backed by an external command.
//!
//! The command runs in the project root with `$PRERENDER_*` variables both
//! exported and substituted into its arguments. Its last non-empty stdout
//! line must be a JSON [`BuildResult`]; earlier lines go to the debug log.

use super::target::{BuildOptions, BuildRun, BuildTarget};
use crate::core::BuildResult;
use crate::utils::exec::{Cmd, clean_output, strip_ansi};
use anyhow::{Context, Result, anyhow};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;

// ============================================================================
// Environment Variables
// ============================================================================

/// Build `$PRERENDER_*` environment variables for a build command.
pub fn build_vars(root: &Path, options: &BuildOptions) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert("PRERENDER_ROOT".into(), root.display().to_string());
    vars.insert("PRERENDER_TARGET".into(), options.target.to_string());
    vars.insert("PRERENDER_WATCH".into(), options.watch.to_string());
    if let Some(sw) = options.service_worker {
        vars.insert("PRERENDER_SERVICE_WORKER".into(), sw.to_string());
    }
    vars
}

/// Replace `$PRERENDER_XXX` occurrences in arguments.
///
/// Longer names are substituted first so `$PRERENDER_ROOT_DIR` is not
/// clobbered by `$PRERENDER_ROOT`.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<_> = vars.keys().collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

    args.iter()
        .map(|arg| {
            keys.iter().fold(arg.clone(), |acc, key| {
                acc.replace(&format!("${key}"), &vars[key.as_str()])
            })
        })
        .collect()
}

// ============================================================================
// CommandBuild
// ============================================================================

/// A build target that runs a configured command.
#[derive(Debug, Clone)]
pub struct CommandBuild {
    command: Vec<String>,
    root: PathBuf,
}

impl CommandBuild {
    pub fn new(command: Vec<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
        }
    }
}

impl BuildTarget for CommandBuild {
    type Run = CommandRun;

    fn schedule(&self, options: &BuildOptions) -> Result<CommandRun> {
        let vars = build_vars(&self.root, options);
        let resolved = resolve_args(&self.command, &vars);
        let cmd = Cmd::from_slice(&resolved).cwd(&self.root).envs(&vars);
        let name = cmd.program_name();

        crate::log!("build"; "{} `{}` started", options.target, resolved.join(" "));
        let child = cmd
            .spawn()
            .with_context(|| format!("{} build could not start", options.target))?;

        Ok(CommandRun {
            name,
            root: self.root.clone(),
            child: Some(child),
        })
    }
}

/// A running build command.
pub struct CommandRun {
    name: String,
    root: PathBuf,
    child: Option<Child>,
}

impl BuildRun for CommandRun {
    async fn result(&mut self) -> Result<BuildResult> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| anyhow!("`{}` was already stopped", self.name))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (stdout, stderr) = tokio::join!(read_all(stdout), read_all(stderr));
        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for `{}`", self.name))?;

        let result = parse_build_output(&self.name, status, &stdout?, &stderr?)?;
        Ok(result.resolve_against(&self.root))
    }

    async fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Ok(None) = child.try_wait()
            && let Err(e) = child.start_kill()
        {
            crate::debug!("build"; "failed to kill `{}`: {}", self.name, e);
        }
        if let Err(e) = child.wait().await {
            crate::debug!("build"; "failed to reap `{}`: {}", self.name, e);
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Turn a finished build command's output into a [`BuildResult`].
///
/// - JSON result on the last stdout line: used as-is, but a non-zero exit
///   status always marks it failed.
/// - No JSON result and a failed exit: failed result carrying stderr.
/// - No JSON result and a clean exit: error, the command broke its contract.
fn parse_build_output(
    name: &str,
    status: ExitStatus,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<BuildResult> {
    let stdout = String::from_utf8_lossy(stdout);
    let mut lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    let parsed = lines
        .last()
        .and_then(|last| serde_json::from_str::<BuildResult>(last.trim()).ok());
    if parsed.is_some() {
        lines.pop();
    }
    for line in lines {
        crate::debug!(name; "{}", strip_ansi(line));
    }

    let stderr = clean_output(stderr);
    match parsed {
        Some(mut result) => {
            if !status.success() && result.success {
                result.success = false;
                result.error = Some(exit_message(name, status, &stderr));
            }
            Ok(result)
        }
        None if status.success() => Err(anyhow!(
            "`{name}` exited without printing a JSON build result"
        )),
        None => Ok(BuildResult::failure(exit_message(name, status, &stderr))),
    }
}

fn exit_message(name: &str, status: ExitStatus, stderr: &str) -> String {
    if stderr.is_empty() {
        format!("`{name}` failed with {status}")
    } else {
        format!("`{name}` failed with {status}\n{stderr}")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_vars() {
        let vars = build_vars(Path::new("/app"), &BuildOptions::browser());
        assert_eq!(vars["PRERENDER_ROOT"], "/app");
        assert_eq!(vars["PRERENDER_TARGET"], "browser");
        assert_eq!(vars["PRERENDER_WATCH"], "false");
        assert_eq!(vars["PRERENDER_SERVICE_WORKER"], "false");

        let vars = build_vars(Path::new("/app"), &BuildOptions::server());
        assert!(!vars.contains_key("PRERENDER_SERVICE_WORKER"));
    }

    #[test]
    fn test_resolve_args() {
        let vars = build_vars(Path::new("/app"), &BuildOptions::server());
        let args = vec![
            "build".into(),
            "--out=$PRERENDER_ROOT/dist/$PRERENDER_TARGET".into(),
            "--watch=$PRERENDER_WATCH".into(),
        ];
        let resolved = resolve_args(&args, &vars);
        assert_eq!(resolved[0], "build");
        assert_eq!(resolved[1], "--out=/app/dist/server");
        assert_eq!(resolved[2], "--watch=false");
    }

    #[test]
    fn test_resolve_args_prefers_longer_names() {
        let mut vars = FxHashMap::default();
        vars.insert("PRERENDER_ROOT".to_string(), "/a".to_string());
        vars.insert("PRERENDER_ROOT_DIR".to_string(), "/b".to_string());
        let resolved = resolve_args(&["$PRERENDER_ROOT_DIR:$PRERENDER_ROOT".into()], &vars);
        assert_eq!(resolved[0], "/b:/a");
    }

    #[cfg(unix)]
    mod unix {
        use super::super::*;
        use std::os::unix::process::ExitStatusExt;

        fn exit(code: i32) -> ExitStatus {
            ExitStatus::from_raw(code << 8)
        }

        #[test]
        fn test_parse_json_result() {
            let stdout = b"compiling...\n{\"success\":true,\"baseOutputPath\":\"/dist/browser\",\"outputPaths\":[\"/dist/browser\"]}\n\n";
            let result = parse_build_output("ng", exit(0), stdout, b"").unwrap();
            assert!(result.success);
            assert_eq!(result.base_output_path, Some(PathBuf::from("/dist/browser")));
        }

        #[test]
        fn test_nonzero_exit_overrides_success() {
            let stdout = b"{\"success\":true,\"baseOutputPath\":\"/dist\"}";
            let result = parse_build_output("ng", exit(2), stdout, b"boom").unwrap();
            assert!(!result.success);
            assert!(result.error.unwrap().contains("boom"));
        }

        #[test]
        fn test_failed_exit_without_json() {
            let result = parse_build_output("ng", exit(1), b"", b"\x1b[31mmodule not found\x1b[0m").unwrap();
            assert!(!result.success);
            let error = result.error.unwrap();
            assert!(error.contains("`ng` failed"));
            assert!(error.contains("module not found"));
        }

        #[test]
        fn test_clean_exit_without_json_is_error() {
            let err = parse_build_output("ng", exit(0), b"done\n", b"").unwrap_err();
            assert!(err.to_string().contains("without printing a JSON build result"));
        }

        #[tokio::test]
        async fn test_command_build_runs_and_resolves_paths() {
            let temp = tempfile::TempDir::new().unwrap();
            let build = CommandBuild::new(
                vec![
                    "sh".into(),
                    "-c".into(),
                    "echo building $PRERENDER_TARGET; echo '{\"success\":true,\"baseOutputPath\":\"dist/'$PRERENDER_TARGET'\"}'".into(),
                ],
                temp.path(),
            );
            let mut run = build.schedule(&BuildOptions::server()).unwrap();
            let result = run.result().await.unwrap();
            run.stop().await;
            run.stop().await;

            assert!(result.success);
            assert_eq!(result.base_output_path, Some(temp.path().join("dist/server")));
        }

        #[tokio::test]
        async fn test_stop_before_result_kills_build() {
            let temp = tempfile::TempDir::new().unwrap();
            let build = CommandBuild::new(vec!["sleep".into(), "30".into()], temp.path());
            let mut run = build.schedule(&BuildOptions::browser()).unwrap();
            run.stop().await;
            assert!(run.result().await.is_err());
        }
    }
}
