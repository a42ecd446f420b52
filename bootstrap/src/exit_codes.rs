//! Stable exit codes for bootstrap CLI commands.

/// Command succeeded (including an empty selection).
pub const OK: i32 = 0;
/// Command failed before any tool was touched: bad config, unknown tool name, etc.
pub const INVALID: i32 = 1;
/// `bootstrap init` finished but at least one selected tool failed to reconcile.
pub const TOOL_FAILED: i32 = 2;
