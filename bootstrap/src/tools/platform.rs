//! Host platform and OS-specific install pipelines.

use crate::io::runner::CommandSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    /// Platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Wrap a shell pipeline in the platform's script host.
    pub fn shell(self, script: &str) -> CommandSpec {
        match self {
            Platform::Posix => CommandSpec::new("sh").arg("-c").arg(script),
            Platform::Windows => CommandSpec::new("powershell").args([
                "-NoProfile",
                "-ExecutionPolicy",
                "ByPass",
                "-Command",
                script,
            ]),
        }
    }
}

/// Vendor bootstrap pipelines for a fresh install, one per platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallScripts {
    /// `curl … | sh`-style pipeline run by `sh -c`.
    pub posix: &'static str,
    /// `irm … | iex`-style pipeline run by PowerShell.
    pub windows: &'static str,
}

impl InstallScripts {
    pub fn for_platform(&self, platform: Platform) -> &'static str {
        match platform {
            Platform::Posix => self.posix,
            Platform::Windows => self.windows,
        }
    }

    pub fn command(&self, platform: Platform) -> CommandSpec {
        platform.shell(self.for_platform(platform))
    }
}
