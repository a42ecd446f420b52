//! Command runner abstraction.
//!
//! The [`CommandRunner`] trait decouples reconciliation from real process
//! execution. Initializers describe the commands they need as [`CommandSpec`]
//! values; [`SystemRunner`] spawns them, while tests use a scripted runner that
//! records every call without touching the machine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::io::process::{run_command_with_timeout, run_inherited};

/// A child process invocation described as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Variables added on top of the inherited process environment.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
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

    pub fn envs(mut self, vars: &[(String, String)]) -> Self {
        self.env.extend(vars.iter().cloned());
        self
    }

    /// Value of an added environment variable, if any.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Exit status of a streamed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Output of a captured command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub success: bool,
    pub timed_out: bool,
    /// Stdout followed by stderr.
    pub text: String,
}

/// Abstraction over process execution and executable lookup.
pub trait CommandRunner {
    /// Locate `program` on `PATH`, then in `extra_dirs`.
    fn locate(&self, program: &str, extra_dirs: &[PathBuf]) -> Option<PathBuf>;

    /// Run with inherited stdio and wait for exit. Errors only if the process
    /// could not be launched or waited on; a non-zero exit is a [`RunStatus`].
    fn run_streaming(&self, spec: &CommandSpec) -> Result<RunStatus>;

    /// Run with captured output, bounded by the runner's probe limits.
    fn capture(&self, spec: &CommandSpec) -> Result<Captured>;
}

/// Runner that spawns real processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    probe_timeout: Duration,
    output_limit_bytes: usize,
}

impl SystemRunner {
    pub fn new(probe_timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            probe_timeout,
            output_limit_bytes,
        }
    }
}

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str, extra_dirs: &[PathBuf]) -> Option<PathBuf> {
        if let Ok(path) = which::which(program) {
            return Some(path);
        }
        locate_in(program, extra_dirs)
    }

    #[instrument(skip_all, fields(command = %spec))]
    fn run_streaming(&self, spec: &CommandSpec) -> Result<RunStatus> {
        let status =
            run_inherited(spec.to_command()).with_context(|| format!("run `{spec}`"))?;
        Ok(RunStatus {
            code: status.code(),
        })
    }

    #[instrument(skip_all, fields(command = %spec))]
    fn capture(&self, spec: &CommandSpec) -> Result<Captured> {
        let output =
            run_command_with_timeout(spec.to_command(), self.probe_timeout, self.output_limit_bytes)
                .with_context(|| format!("run `{spec}`"))?;
        Ok(Captured {
            success: output.status.success() && !output.timed_out,
            timed_out: output.timed_out,
            text: output.combined(),
        })
    }
}

fn locate_in(program: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let existing: Vec<&Path> = dirs.iter().map(PathBuf::as_path).filter(|d| d.is_dir()).collect();
    if existing.is_empty() {
        return None;
    }
    let search = std::env::join_paths(existing).ok()?;
    let cwd = std::env::current_dir().ok()?;
    let found = which::which_in(program, Some(search), cwd).ok();
    if let Some(path) = &found {
        debug!(program, path = %path.display(), "found outside PATH");
    }
    found
}
