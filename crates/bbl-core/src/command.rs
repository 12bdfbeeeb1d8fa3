//! External process execution
//!
//! terraform, bosh and the provider CLIs are all driven through
//! `CommandRunner`. Extra environment variables are part of the
//! `Invocation`, never set on the parent process.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// A single program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Printable form for logs; environment values are left out
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human-readable exit description, e.g. `exit status 1`
    pub fn status_text(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }

    /// stdout followed by stderr, the way a terminal would have shown them
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        out.push_str(&self.stderr);
        out
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion. Only spawn failures are errors; a non-zero exit is
    /// reported through `CommandOutput`.
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;
}

/// Runs invocations as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {}", invocation.display());

        let output = cmd.output().await?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_runs_with_args() {
        let out = ProcessRunner
            .run(&Invocation::new("sh").args(["-c", "echo hello"]))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_reports_exit_status() {
        let out = ProcessRunner
            .run(&Invocation::new("sh").args(["-c", "echo oops >&2; exit 3"]))
            .await
            .unwrap();
        assert!(!out.success());
        assert_eq!(out.status_text(), "exit status 3");
        assert!(out.stderr.contains("oops"));
    }

    #[tokio::test]
    async fn test_env_is_scoped_to_child() {
        let out = ProcessRunner
            .run(
                &Invocation::new("sh")
                    .args(["-c", "echo $BBL_TEST_SCOPED"])
                    .env("BBL_TEST_SCOPED", "child-only"),
            )
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "child-only");
        assert!(std::env::var("BBL_TEST_SCOPED").is_err());
    }

    #[tokio::test]
    async fn test_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = ProcessRunner
            .run(&Invocation::new("pwd").current_dir(dir.path()))
            .await
            .unwrap();
        let expected = dir.path().canonicalize().unwrap();
        let actual = std::path::PathBuf::from(out.stdout.trim())
            .canonicalize()
            .unwrap();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let result = ProcessRunner
            .run(&Invocation::new("/nonexistent/bbl-test-binary"))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_display_and_combined() {
        let invocation = Invocation::new("terraform").args(["apply", "-auto-approve"]);
        assert_eq!(invocation.display(), "terraform apply -auto-approve");

        let out = CommandOutput {
            exit_code: None,
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        };
        assert_eq!(out.combined(), "out\nerr\n");
        assert_eq!(out.status_text(), "terminated by signal");
    }
}
