//! Environment bootstrap for the assistant's auxiliary toolchains.
//!
//! Detects, installs, upgrades and configures a fixed set of external tools
//! (`uv`, `bun`). The architecture keeps the same separation throughout:
//!
//! - **[`core`]**: Pure, deterministic logic (selection, version comparison).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (process execution, environment
//!   capture, config files). The [`io::runner::CommandRunner`] seam lets tests
//!   script every child process.
//! - **[`tools`]**: One [`tools::Initializer`] per managed tool, assembled into
//!   a [`registry::Registry`].
//!
//! [`reconcile`] drives a selection of initializers through
//! probe → install/upgrade → re-probe → mirror configuration.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod reconcile;
pub mod registry;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;
