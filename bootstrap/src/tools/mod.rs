//! Managed tools.
//!
//! Each tool is an [`Initializer`]: probe, install, upgrade and mirror
//! configuration for one external executable. The per-tool modules hold the
//! vendor-specific data (install pipelines, self-update arguments, config
//! paths) and delegate the mechanics to the helpers below.

pub mod bun;
pub mod platform;
pub mod uv;

use std::path::PathBuf;

use anyhow::anyhow;
use tracing::{debug, info, instrument, warn};

use crate::core::types::Probe;
use crate::error::ReconcileError;
use crate::io::environment::Environment;
use crate::io::mirror::MirrorStatus;
use crate::io::runner::{CommandRunner, CommandSpec};
use crate::tools::platform::InstallScripts;

/// One managed tool.
///
/// Implementations are stateless; everything host-specific arrives through
/// the [`CommandRunner`] and [`Environment`] arguments.
pub trait Initializer {
    /// Stable identifier used for selection and log attribution.
    fn name(&self) -> &str;

    /// Presence and version. Never fails: problems degrade to "absent" or an
    /// unknown version.
    fn detect(&self, runner: &dyn CommandRunner, env: &Environment) -> Probe;

    /// Fresh install through the vendor pipeline.
    fn install(&self, runner: &dyn CommandRunner, env: &Environment) -> Result<(), ReconcileError>;

    /// In-place self-update of an installed tool.
    fn upgrade(&self, runner: &dyn CommandRunner, env: &Environment) -> Result<(), ReconcileError>;

    /// Best-effort mirror configuration; the status is for reporting only.
    fn configure_mirror(&self, env: &Environment) -> MirrorStatus;
}

/// Executable name plus the invocations used to query and update it.
#[derive(Debug, Clone, Copy)]
pub struct BinarySpec {
    pub binary: &'static str,
    pub version_args: &'static [&'static str],
    pub upgrade_args: &'static [&'static str],
}

/// Locate `spec.binary` and read its version.
#[instrument(skip_all, fields(binary = spec.binary))]
pub fn probe(runner: &dyn CommandRunner, spec: &BinarySpec, extra_dirs: &[PathBuf]) -> Probe {
    let Some(path) = runner.locate(spec.binary, extra_dirs) else {
        debug!("not found");
        return Probe::absent();
    };
    let cmd = CommandSpec::new(&path).args(spec.version_args.iter().copied());
    let version = match runner.capture(&cmd) {
        Ok(out) if out.success => Some(out.text.trim().to_string()).filter(|v| !v.is_empty()),
        Ok(out) => {
            debug!(timed_out = out.timed_out, "version command failed");
            None
        }
        Err(err) => {
            debug!(err = %format!("{err:#}"), "version command could not run");
            None
        }
    };
    debug!(path = %path.display(), version = ?version, "probed");
    Probe::present(version)
}

/// Run the platform's install pipeline with inherited stdio.
///
/// `proxy_env` is added to the child environment; pass an empty slice for
/// tools that install fine without a proxy.
pub fn run_install(
    runner: &dyn CommandRunner,
    tool: &str,
    scripts: &InstallScripts,
    env: &Environment,
    proxy_env: &[(String, String)],
) -> Result<(), ReconcileError> {
    let cmd = scripts.command(env.platform).envs(proxy_env);
    info!(tool, command = %cmd, proxied = !proxy_env.is_empty(), "running installer");
    match runner.run_streaming(&cmd) {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            warn!(tool, %status, "installer failed");
            Err(ReconcileError::install_failed(
                tool,
                anyhow!("installer exited with {status}"),
            ))
        }
        Err(err) => Err(ReconcileError::install_failed(tool, err)),
    }
}

/// Re-locate the binary and run its self-update subcommand.
pub fn run_upgrade(
    runner: &dyn CommandRunner,
    tool: &str,
    spec: &BinarySpec,
    extra_dirs: &[PathBuf],
) -> Result<(), ReconcileError> {
    let path = runner
        .locate(spec.binary, extra_dirs)
        .ok_or_else(|| ReconcileError::NotFound {
            tool: tool.to_string(),
            binary: spec.binary.to_string(),
        })?;
    let cmd = CommandSpec::new(path).args(spec.upgrade_args.iter().copied());
    info!(tool, command = %cmd, "running self-update");
    match runner.run_streaming(&cmd) {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            warn!(tool, %status, "self-update failed");
            Err(ReconcileError::upgrade_failed(
                tool,
                anyhow!("`{} {}` exited with {status}", spec.binary, spec.upgrade_args.join(" ")),
            ))
        }
        Err(err) => Err(ReconcileError::upgrade_failed(tool, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedRunner, test_env};

    const TOOL: BinarySpec = BinarySpec {
        binary: "tool",
        version_args: &["--version"],
        upgrade_args: &["self", "update"],
    };

    const SCRIPTS: InstallScripts = InstallScripts {
        posix: "curl -fsSL https://tool.example/install | sh",
        windows: "irm https://tool.example/install.ps1 | iex",
    };

    #[test]
    fn probe_absent_runs_nothing() {
        let runner = ScriptedRunner::new();
        assert_eq!(probe(&runner, &TOOL, &[]), Probe::absent());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn probe_trims_version_output() {
        let runner = ScriptedRunner::new().with_tool("tool", &["  tool 1.2.3\n"]);
        assert_eq!(
            probe(&runner, &TOOL, &[]),
            Probe::present(Some("tool 1.2.3".to_string()))
        );
    }

    #[test]
    fn probe_failure_degrades_to_unknown_version() {
        let runner = ScriptedRunner::new().with_broken_tool("tool");
        assert_eq!(probe(&runner, &TOOL, &[]), Probe::present(None));
    }

    #[test]
    fn failing_version_command_is_unknown_version() {
        let runner = ScriptedRunner::new().version_fails("tool", false);
        assert_eq!(probe(&runner, &TOOL, &[]), Probe::present(None));
    }

    #[test]
    fn timed_out_version_command_is_unknown_version() {
        let runner = ScriptedRunner::new().version_fails("tool", true);
        assert_eq!(probe(&runner, &TOOL, &[]), Probe::present(None));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn install_failure_is_install_failed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new().fail_when("tool.example", 7);
        let err = run_install(&runner, "tool", &SCRIPTS, &test_env(temp.path()), &[]).unwrap_err();
        assert!(matches!(err, ReconcileError::InstallFailed { .. }));
        assert!(err.to_string().contains("exit status 7"));
    }

    #[test]
    fn install_launch_error_is_install_failed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new().unlaunchable_when("tool.example");
        let err = run_install(&runner, "tool", &SCRIPTS, &test_env(temp.path()), &[]).unwrap_err();
        assert!(matches!(err, ReconcileError::InstallFailed { .. }));
    }

    #[test]
    fn upgrade_of_vanished_binary_is_not_found() {
        let runner = ScriptedRunner::new();
        let err = run_upgrade(&runner, "tool", &TOOL, &[]).unwrap_err();
        assert!(matches!(err, ReconcileError::NotFound { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn upgrade_runs_self_update_on_located_path() {
        let runner = ScriptedRunner::new().with_tool("tool", &["1.0.0"]);
        run_upgrade(&runner, "tool", &TOOL, &[]).expect("upgrade");
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].to_string().ends_with("tool self update"));
    }

    #[test]
    fn failing_upgrade_is_upgrade_failed() {
        let runner = ScriptedRunner::new()
            .with_tool("tool", &["1.0.0"])
            .fail_when("self update", 1);
        let err = run_upgrade(&runner, "tool", &TOOL, &[]).unwrap_err();
        assert!(matches!(err, ReconcileError::UpgradeFailed { .. }));
    }
}
