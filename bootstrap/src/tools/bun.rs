//! bun, the JavaScript runtime and package manager.

use std::path::PathBuf;

use anyhow::Result;
use toml_edit::DocumentMut;

use crate::core::types::Probe;
use crate::error::ReconcileError;
use crate::io::environment::Environment;
use crate::io::mirror::{MirrorStatus, configure_mirror, table_mut};
use crate::io::runner::CommandRunner;
use crate::tools::platform::InstallScripts;
use crate::tools::{BinarySpec, Initializer, probe, run_install, run_upgrade};

pub const NAME: &str = "bun";

const BINARY: BinarySpec = BinarySpec {
    binary: "bun",
    version_args: &["--version"],
    upgrade_args: &["upgrade"],
};

const SCRIPTS: InstallScripts = InstallScripts {
    posix: "curl -fsSL https://bun.sh/install | bash",
    windows: "irm https://bun.sh/install.ps1 | iex",
};

pub struct Bun {
    registry_url: String,
}

impl Bun {
    pub fn new(registry_url: String) -> Self {
        Self { registry_url }
    }

    fn install_dirs(env: &Environment) -> Vec<PathBuf> {
        vec![env.home.join(".bun").join("bin")]
    }

    /// Global `bunfig.toml`, which bun reads from the home directory.
    pub fn config_path(env: &Environment) -> PathBuf {
        env.home.join(".bunfig.toml")
    }

    fn set_registry(&self, doc: &mut DocumentMut) -> Result<()> {
        table_mut(doc, "install")?.insert("registry", toml_edit::value(self.registry_url.as_str()));
        Ok(())
    }
}

impl Initializer for Bun {
    fn name(&self) -> &str {
        NAME
    }

    fn detect(&self, runner: &dyn CommandRunner, env: &Environment) -> Probe {
        probe(runner, &BINARY, &Self::install_dirs(env))
    }

    fn install(&self, runner: &dyn CommandRunner, env: &Environment) -> Result<(), ReconcileError> {
        run_install(runner, NAME, &SCRIPTS, env, &[])
    }

    fn upgrade(&self, runner: &dyn CommandRunner, env: &Environment) -> Result<(), ReconcileError> {
        run_upgrade(runner, NAME, &BINARY, &Self::install_dirs(env))
    }

    fn configure_mirror(&self, env: &Environment) -> MirrorStatus {
        configure_mirror(NAME, env, Self::config_path(env), &self.registry_url, |doc| {
            self.set_registry(doc)
        })
    }
}
