//! Bootstrap configuration stored in `<config dir>/bootstrap/config.toml`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Bootstrap configuration (TOML).
///
/// Intended to be edited by humans. Missing fields default to values that work
/// without any file at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Environment variable whose non-empty value opts into mirror configuration.
    pub mirror_env: String,

    /// Proxy URL handed to installers that need one (e.g. `http://127.0.0.1:7890`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,

    /// Wall-clock limit for a single `--version` probe.
    pub probe_timeout_secs: u64,

    /// Truncate captured probe output beyond this many bytes.
    pub probe_output_limit_bytes: usize,

    pub mirrors: MirrorUrls,
}

/// Registry endpoints written into tool configs when mirrors are enabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MirrorUrls {
    /// Python package index used by `uv`.
    pub pypi: String,
    /// npm registry used by `bun`.
    pub npm: String,
}

impl Default for MirrorUrls {
    fn default() -> Self {
        Self {
            pypi: "https://mirrors.aliyun.com/pypi/simple/".to_string(),
            npm: "https://registry.npmmirror.com/".to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            mirror_env: "GOPROXY".to_string(),
            proxy_url: None,
            probe_timeout_secs: 15,
            probe_output_limit_bytes: 64 * 1024,
            mirrors: MirrorUrls::default(),
        }
    }
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<()> {
        if self.mirror_env.trim().is_empty() {
            return Err(anyhow!("mirror_env must be a non-empty variable name"));
        }
        if self.probe_timeout_secs == 0 {
            return Err(anyhow!("probe_timeout_secs must be > 0"));
        }
        if self.probe_output_limit_bytes == 0 {
            return Err(anyhow!("probe_output_limit_bytes must be > 0"));
        }
        if let Some(url) = &self.proxy_url
            && !url.contains("://")
        {
            return Err(anyhow!("proxy_url must include a scheme, got '{url}'"));
        }
        for (key, url) in [("mirrors.pypi", &self.mirrors.pypi), ("mirrors.npm", &self.mirrors.npm)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("{key} must be an http(s) URL, got '{url}'"));
            }
        }
        Ok(())
    }
}

/// Default config location, `None` when the platform has no config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bootstrap").join("config.toml"))
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BootstrapConfig::default()`.
pub fn load_config(path: &Path) -> Result<BootstrapConfig> {
    if !path.exists() {
        let cfg = BootstrapConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BootstrapConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Serialize config as pretty TOML with a trailing newline.
pub fn render_config(cfg: &BootstrapConfig) -> Result<String> {
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    if !buf.ends_with('\n') {
        buf.push('\n');
    }
    Ok(buf)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &BootstrapConfig) -> Result<()> {
    cfg.validate()?;
    let buf = render_config(cfg)?;
    write_atomic(path, &buf)
}

/// Write via a uniquely named temp file in the same directory, then rename.
///
/// The result is world-readable and owner-writable on Unix. The temp file is
/// removed if any step fails.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write temp file {}", tmp.path().display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644))
            .with_context(|| format!("set permissions on {}", tmp.path().display()))?;
    }
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
