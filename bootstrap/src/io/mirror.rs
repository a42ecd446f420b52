//! Idempotent mirror configuration for tool config files.
//!
//! A tool config counts as configured when it already contains the mirror
//! registry URL (the marker). Configured files are never rewritten, so running
//! the bootstrap repeatedly leaves them byte-identical. Files that need the
//! mirror are edited with `toml_edit` so user comments, key order and
//! formatting survive.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use toml_edit::{DocumentMut, TableLike};
use tracing::{debug, info, warn};

use crate::error::ReconcileError;
use crate::io::config::write_atomic;
use crate::io::environment::Environment;

/// What happened to a tool's mirror config. Reported, never propagated.
#[derive(Debug)]
pub enum MirrorStatus {
    /// The opt-in variable is unset; no file was touched.
    Disabled,
    AlreadyConfigured { path: PathBuf },
    Written { path: PathBuf, created: bool },
    Failed(ReconcileError),
}

/// Result of [`ensure_mirror`] for an enabled mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorWrite {
    AlreadyConfigured,
    Created,
    Updated,
}

/// Configure a tool's mirror if the environment opts in.
///
/// `apply` inserts the tool's mirror settings into the parsed config document
/// (an empty one when the file does not exist yet).
pub fn configure_mirror<F>(
    tool: &str,
    env: &Environment,
    path: PathBuf,
    marker: &str,
    apply: F,
) -> MirrorStatus
where
    F: FnOnce(&mut DocumentMut) -> Result<()>,
{
    if !env.mirror_enabled() {
        debug!(tool, "mirror opt-in unset, skipping");
        return MirrorStatus::Disabled;
    }
    match ensure_mirror(&path, marker, apply) {
        Ok(MirrorWrite::AlreadyConfigured) => {
            info!(tool, path = %path.display(), "mirror already configured");
            MirrorStatus::AlreadyConfigured { path }
        }
        Ok(write) => {
            info!(tool, path = %path.display(), ?write, "mirror configured");
            MirrorStatus::Written {
                path,
                created: write == MirrorWrite::Created,
            }
        }
        Err(err) => {
            warn!(tool, path = %path.display(), err = %format!("{err:#}"), "mirror config not written");
            MirrorStatus::Failed(ReconcileError::config_write_failed(tool, path, err))
        }
    }
}

/// Write the mirror settings into `path` unless `marker` is already present.
///
/// An existing file without the marker is parsed, merged and rewritten so
/// unrelated user settings and comments survive. An existing file that is not
/// valid TOML is left untouched and reported as an error.
pub fn ensure_mirror<F>(path: &Path, marker: &str, apply: F) -> Result<MirrorWrite>
where
    F: FnOnce(&mut DocumentMut) -> Result<()>,
{
    let existing = if path.exists() {
        Some(fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?)
    } else {
        None
    };

    if let Some(contents) = &existing
        && contents.contains(marker)
    {
        return Ok(MirrorWrite::AlreadyConfigured);
    }

    let mut doc = match &existing {
        Some(contents) => contents
            .parse::<DocumentMut>()
            .with_context(|| format!("parse existing {}", path.display()))?,
        None => DocumentMut::new(),
    };
    apply(&mut doc)?;

    let rendered = doc.to_string();
    if !rendered.contains(marker) {
        return Err(anyhow!("rendered config does not contain mirror '{marker}'"));
    }
    write_atomic(path, &rendered)?;

    Ok(if existing.is_some() {
        MirrorWrite::Updated
    } else {
        MirrorWrite::Created
    })
}

/// Get (or create) a sub-table of `doc`, failing if `key` holds a non-table.
///
/// Inline tables (`install = { ... }`) are edited in place.
pub fn table_mut<'a>(doc: &'a mut DocumentMut, key: &str) -> Result<&'a mut dyn TableLike> {
    doc.as_table_mut()
        .entry(key)
        .or_insert(toml_edit::table())
        .as_table_like_mut()
        .ok_or_else(|| anyhow!("`{key}` is not a table"))
}
