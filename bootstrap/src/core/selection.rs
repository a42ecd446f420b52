//! Resolution of a user selection against the registered tool names.

use std::collections::BTreeSet;

/// Why a selection could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTools {
    pub unknown: Vec<String>,
    pub known: Vec<String>,
}

impl std::fmt::Display for UnknownTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown tool(s): {} (known: {})",
            self.unknown.join(", "),
            self.known.join(", ")
        )
    }
}

impl std::error::Error for UnknownTools {}

/// Resolve `selected` against `known` (registry order).
///
/// Returns the selected names in registry order with duplicates collapsed, so
/// every selected tool is processed exactly once. An empty selection resolves
/// to an empty list. Names are matched case-insensitively after trimming.
pub fn resolve_selection<S: AsRef<str>>(
    known: &[&str],
    selected: &[S],
) -> Result<Vec<String>, UnknownTools> {
    let wanted: BTreeSet<String> = selected
        .iter()
        .map(|name| name.as_ref().trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let unknown: Vec<String> = wanted
        .iter()
        .filter(|name| !known.contains(&name.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(UnknownTools {
            unknown,
            known: known.iter().map(|k| k.to_string()).collect(),
        });
    }

    Ok(known
        .iter()
        .filter(|name| wanted.contains(**name))
        .map(|name| name.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 2] = ["bun", "uv"];

    #[test]
    fn empty_selection_resolves_to_nothing() {
        let selected: Vec<String> = Vec::new();
        assert!(resolve_selection(&KNOWN, &selected).expect("resolve").is_empty());
    }

    #[test]
    fn duplicates_collapse_and_follow_registry_order() {
        let resolved = resolve_selection(&KNOWN, &["uv", "bun", "UV", " uv "]).expect("resolve");
        assert_eq!(resolved, vec!["bun", "uv"]);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = resolve_selection(&KNOWN, &["uv", "pnpm"]).unwrap_err();
        assert_eq!(err.unknown, vec!["pnpm"]);
        assert!(err.to_string().contains("known: bun, uv"));
    }
}
