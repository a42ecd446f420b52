//! uv, the Python package manager.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use toml_edit::{ArrayOfTables, DocumentMut, Item, Table, Value, value};

use crate::core::types::Probe;
use crate::error::ReconcileError;
use crate::io::environment::Environment;
use crate::io::mirror::{MirrorStatus, configure_mirror};
use crate::io::runner::CommandRunner;
use crate::tools::platform::InstallScripts;
use crate::tools::{BinarySpec, Initializer, probe, run_install, run_upgrade};

pub const NAME: &str = "uv";

const BINARY: BinarySpec = BinarySpec {
    binary: "uv",
    version_args: &["--version"],
    upgrade_args: &["self", "update"],
};

const SCRIPTS: InstallScripts = InstallScripts {
    posix: "curl -LsSf https://astral.sh/uv/install.sh | sh",
    windows: "irm https://astral.sh/uv/install.ps1 | iex",
};

pub struct Uv {
    index_url: String,
}

impl Uv {
    pub fn new(index_url: String) -> Self {
        Self { index_url }
    }

    /// Where the standalone installer puts the binary.
    fn install_dirs(env: &Environment) -> Vec<PathBuf> {
        vec![env.home.join(".local").join("bin"), env.home.join(".cargo").join("bin")]
    }

    /// User-level `uv.toml`.
    pub fn config_path(env: &Environment) -> PathBuf {
        env.config_home.join("uv").join("uv.toml")
    }

    /// Make the mirror the default `[[index]]`, ahead of any user indexes.
    fn set_default_index(&self, doc: &mut DocumentMut) -> Result<()> {
        let mut mirror = Table::new();
        mirror.insert("url", value(self.index_url.as_str()));
        mirror.insert("default", value(true));

        let existing: Vec<Table> = match doc.remove("index") {
            None => Vec::new(),
            Some(Item::ArrayOfTables(tables)) => tables.into_iter().collect(),
            Some(Item::Value(Value::Array(items))) => items
                .into_iter()
                .map(|item| match item {
                    Value::InlineTable(table) => Ok(table.into_table()),
                    _ => Err(anyhow!("`index` entries must be tables")),
                })
                .collect::<Result<_>>()?,
            Some(_) => return Err(anyhow!("`index` is not an array of tables")),
        };

        let mut indexes = ArrayOfTables::new();
        indexes.push(mirror);
        for mut table in existing {
            table.remove("default");
            indexes.push(table);
        }
        doc.insert("index", Item::ArrayOfTables(indexes));
        Ok(())
    }
}

impl Initializer for Uv {
    fn name(&self) -> &str {
        NAME
    }

    fn detect(&self, runner: &dyn CommandRunner, env: &Environment) -> Probe {
        probe(runner, &BINARY, &Self::install_dirs(env))
    }

    fn install(&self, runner: &dyn CommandRunner, env: &Environment) -> Result<(), ReconcileError> {
        // The astral.sh download is the one that needs a proxy on restricted networks.
        run_install(runner, NAME, &SCRIPTS, env, &env.proxy_env())
    }

    fn upgrade(&self, runner: &dyn CommandRunner, env: &Environment) -> Result<(), ReconcileError> {
        run_upgrade(runner, NAME, &BINARY, &Self::install_dirs(env))
    }

    fn configure_mirror(&self, env: &Environment) -> MirrorStatus {
        configure_mirror(NAME, env, Self::config_path(env), &self.index_url, |doc| {
            self.set_default_index(doc)
        })
    }
}
