//! Host environment captured once at startup.
//!
//! Reconciliation never reads process-wide state directly: everything it
//! needs from the host is snapshotted into [`Environment`] and injected, so
//! tests can describe any host without touching the real one.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::io::config::BootstrapConfig;
use crate::tools::platform::Platform;

/// Proxy variables set for installers that need network proxying.
///
/// Installers differ in which spelling they honour, so both are exported.
const PROXY_VARS: [&str; 6] = [
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
    "all_proxy",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub platform: Platform,
    /// The current user's home (`$HOME`, `%USERPROFILE%`).
    pub home: PathBuf,
    /// Per-user config root: `$XDG_CONFIG_HOME` or `~/.config` on POSIX,
    /// `%APPDATA%` on Windows.
    pub config_home: PathBuf,
    /// Value of the mirror opt-in variable; `None` when unset or blank.
    pub mirror_opt_in: Option<String>,
    pub proxy_url: Option<String>,
}

impl Environment {
    /// Snapshot the running process's environment.
    pub fn capture(cfg: &BootstrapConfig) -> Result<Self> {
        let platform = Platform::current();
        let home = dirs::home_dir().context("cannot determine home directory")?;
        let config_home = match platform {
            Platform::Windows => dirs::config_dir().unwrap_or_else(|| home.join("AppData").join("Roaming")),
            Platform::Posix => std::env::var_os("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .filter(|p| p.is_absolute())
                .unwrap_or_else(|| home.join(".config")),
        };
        let mirror_opt_in = std::env::var(&cfg.mirror_env).ok();
        let env = Self::new(platform, home, config_home)
            .with_mirror_opt_in(mirror_opt_in)
            .with_proxy_url(cfg.proxy_url.clone());
        debug!(
            platform = ?env.platform,
            home = %env.home.display(),
            mirror_var = %cfg.mirror_env,
            mirror_enabled = env.mirror_enabled(),
            proxy = env.proxy_url.is_some(),
            "captured environment"
        );
        Ok(env)
    }

    pub fn new(platform: Platform, home: PathBuf, config_home: PathBuf) -> Self {
        Self {
            platform,
            home,
            config_home,
            mirror_opt_in: None,
            proxy_url: None,
        }
    }

    pub fn with_mirror_opt_in(mut self, value: Option<String>) -> Self {
        self.mirror_opt_in = value.filter(|v| !v.trim().is_empty());
        self
    }

    pub fn with_proxy_url(mut self, url: Option<String>) -> Self {
        self.proxy_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn mirror_enabled(&self) -> bool {
        self.mirror_opt_in.is_some()
    }

    /// Proxy variables derived from the configured proxy URL; empty when unset.
    pub fn proxy_env(&self) -> Vec<(String, String)> {
        match &self.proxy_url {
            Some(url) => PROXY_VARS
                .iter()
                .map(|key| (key.to_string(), url.clone()))
                .collect(),
            None => Vec::new(),
        }
    }
}
