//! Shared deterministic types for reconciliation.

/// Result of probing a tool on the search path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Probe {
    pub present: bool,
    /// Trimmed output of the tool's version command. `None` when the tool is
    /// absent or the version command could not be run.
    pub version: Option<String>,
}

impl Probe {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(version: Option<String>) -> Self {
        Self {
            present: true,
            version,
        }
    }
}

/// Which branch of the reconcile cycle a tool took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Upgrade,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Upgrade => "upgrade",
        }
    }
}

/// Version comparison between the probe before and after an install/upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChange {
    /// Same non-empty version before and after.
    AlreadyLatest { version: String },
    /// Versions differ (including a fresh install with a known new version).
    Changed { from: Option<String>, to: String },
    /// At least one side could not be determined.
    Unknown,
}
