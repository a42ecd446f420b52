//! Version change classification.

use crate::core::types::VersionChange;

/// Compare pre- and post-step versions.
///
/// - both known and equal → [`VersionChange::AlreadyLatest`]
/// - both known and different → [`VersionChange::Changed`]
/// - `before` unknown but `after` known on a fresh install → [`VersionChange::Changed`]
///   with `from: None`
/// - anything else → [`VersionChange::Unknown`]
///
/// Empty strings count as unknown.
pub fn classify_change(before: Option<&str>, after: Option<&str>, fresh_install: bool) -> VersionChange {
    let before = before.map(str::trim).filter(|v| !v.is_empty());
    let after = after.map(str::trim).filter(|v| !v.is_empty());

    match (before, after) {
        (Some(b), Some(a)) if b == a => VersionChange::AlreadyLatest {
            version: a.to_string(),
        },
        (Some(b), Some(a)) => VersionChange::Changed {
            from: Some(b.to_string()),
            to: a.to_string(),
        },
        (None, Some(a)) if fresh_install => VersionChange::Changed {
            from: None,
            to: a.to_string(),
        },
        _ => VersionChange::Unknown,
    }
}
