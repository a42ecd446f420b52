//! I/O helpers for bootstrap commands.

pub mod config;
pub mod environment;
pub mod mirror;
pub mod process;
pub mod runner;
