//! Environment bootstrap CLI.
//!
//! Installs, upgrades and mirror-configures the auxiliary toolchains (`uv`,
//! `bun`) the assistant shells out to.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bootstrap::exit_codes;
use bootstrap::io::config::{BootstrapConfig, default_config_path, load_config, render_config, write_config};
use bootstrap::io::environment::Environment;
use bootstrap::io::runner::SystemRunner;
use bootstrap::logging;
use bootstrap::reconcile::Reconciler;
use bootstrap::registry::Registry;
use bootstrap::report::StdoutReporter;

#[derive(Parser)]
#[command(
    name = "bootstrap",
    version,
    about = "Install, upgrade and mirror-configure auxiliary toolchains"
)]
struct Cli {
    /// Config file (default: `<config dir>/bootstrap/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect, install or upgrade the selected tools, then configure mirrors.
    Init {
        /// Tool to set up; repeatable. Nothing is done when no tool is selected.
        #[arg(short, long = "tool", value_name = "NAME")]
        tools: Vec<String>,
        /// Select every known tool.
        #[arg(long, conflicts_with = "tools")]
        all: bool,
        /// Proxy URL for installers that need one; overrides `proxy_url`.
        #[arg(long, value_name = "URL")]
        proxy: Option<String>,
    },
    /// Show each known tool and whether it is installed.
    List,
    /// Print the effective configuration.
    Config {
        /// Write the effective configuration to the config file.
        #[arg(long)]
        write: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path().context("cannot determine config directory; pass --config")?,
    };
    let cfg = load_config(&config_path)?;
    match cli.command {
        Command::Init { tools, all, proxy } => cmd_init(cfg, tools, all, proxy),
        Command::List => cmd_list(&cfg),
        Command::Config { write } => cmd_config(&cfg, &config_path, write),
    }
}

fn cmd_init(mut cfg: BootstrapConfig, tools: Vec<String>, all: bool, proxy: Option<String>) -> Result<i32> {
    if proxy.is_some() {
        cfg.proxy_url = proxy;
        cfg.validate().context("invalid --proxy")?;
    }
    let registry = Registry::builtin(&cfg)?;
    let selected: Vec<String> = if all {
        registry.names().into_iter().map(str::to_string).collect()
    } else {
        tools
    };

    let env = Environment::capture(&cfg)?;
    let runner = system_runner(&cfg);
    let mut reporter = StdoutReporter;
    let summary = match Reconciler::new(&registry, &runner, &env).run(&selected, &mut reporter) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("{err}");
            return Ok(exit_codes::INVALID);
        }
    };

    if summary.all_succeeded() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::TOOL_FAILED)
    }
}

fn cmd_list(cfg: &BootstrapConfig) -> Result<i32> {
    let registry = Registry::builtin(cfg)?;
    let env = Environment::capture(cfg)?;
    let runner = system_runner(cfg);
    for tool in registry.iter() {
        let probe = tool.detect(&runner, &env);
        let status = match (probe.present, probe.version) {
            (false, _) => "not installed".to_string(),
            (true, Some(version)) => version,
            (true, None) => "installed (version unknown)".to_string(),
        };
        println!("{:<6} {status}", tool.name());
    }
    Ok(exit_codes::OK)
}

fn cmd_config(cfg: &BootstrapConfig, path: &Path, write: bool) -> Result<i32> {
    if write {
        write_config(path, cfg)?;
        println!("wrote {}", path.display());
    } else {
        print!("{}", render_config(cfg)?);
    }
    Ok(exit_codes::OK)
}

fn system_runner(cfg: &BootstrapConfig) -> SystemRunner {
    SystemRunner::new(
        Duration::from_secs(cfg.probe_timeout_secs),
        cfg.probe_output_limit_bytes,
    )
}
