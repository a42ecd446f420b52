//! Per-tool failure kinds.
//!
//! Every variant carries the tool name so a failure can be attributed in the
//! summary without extra bookkeeping; messages leave it out because status
//! lines already prefix it. None of these abort a run: the driver
//! records them on the tool's outcome and moves on.

use std::path::PathBuf;

use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The tool binary could not be located when a step required it.
    #[error("executable `{binary}` not found on PATH")]
    NotFound { tool: String, binary: String },

    /// The fresh-install pipeline exited non-zero or could not be launched.
    #[error("install failed: {cause}")]
    InstallFailed {
        tool: String,
        #[source]
        cause: Cause,
    },

    /// The tool's self-update command exited non-zero or could not be launched.
    #[error("upgrade failed: {cause}")]
    UpgradeFailed {
        tool: String,
        #[source]
        cause: Cause,
    },

    /// Writing the mirror configuration failed. Reported as a warning only.
    #[error("write mirror config {}: {cause}", path.display())]
    ConfigWriteFailed {
        tool: String,
        path: PathBuf,
        #[source]
        cause: Cause,
    },
}

impl ReconcileError {
    pub fn install_failed(tool: &str, cause: anyhow::Error) -> Self {
        Self::InstallFailed {
            tool: tool.to_string(),
            cause: cause.into(),
        }
    }

    pub fn upgrade_failed(tool: &str, cause: anyhow::Error) -> Self {
        Self::UpgradeFailed {
            tool: tool.to_string(),
            cause: cause.into(),
        }
    }

    pub fn config_write_failed(tool: &str, path: PathBuf, cause: anyhow::Error) -> Self {
        Self::ConfigWriteFailed {
            tool: tool.to_string(),
            path,
            cause: cause.into(),
        }
    }

    /// Name of the tool the failure belongs to.
    pub fn tool(&self) -> &str {
        match self {
            Self::NotFound { tool, .. }
            | Self::InstallFailed { tool, .. }
            | Self::UpgradeFailed { tool, .. }
            | Self::ConfigWriteFailed { tool, .. } => tool,
        }
    }
}
