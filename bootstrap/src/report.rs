//! Human-readable status lines.
//!
//! These lines are the bootstrap's product output; they are printed whatever
//! `RUST_LOG` says. No machine-readable format is promised.

use crate::core::types::{Action, Probe, VersionChange};
use crate::io::mirror::MirrorStatus;
use crate::reconcile::{ReconcileOutcome, RunSummary};

/// Sink for status lines.
pub trait Reporter {
    fn line(&mut self, text: &str);
}

/// Prints each line to stdout.
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }
}

/// A step in a reconciliation run worth telling the user about.
#[derive(Debug)]
pub enum Progress<'a> {
    NothingSelected,
    Detecting { tool: &'a str },
    Installing { tool: &'a str },
    Upgrading { tool: &'a str, probe: &'a Probe },
    Finished(&'a ReconcileOutcome),
    Summary(&'a RunSummary),
}

impl Progress<'_> {
    pub fn render(&self) -> Vec<String> {
        match self {
            Progress::NothingSelected => vec!["nothing selected, no tools to set up".to_string()],
            Progress::Detecting { tool } => vec![format!("[{tool}] detecting")],
            Progress::Installing { tool } => vec![format!("[{tool}] not found, installing")],
            Progress::Upgrading { tool, probe } => match &probe.version {
                Some(version) => vec![format!("[{tool}] found {version}, upgrading")],
                None => vec![format!("[{tool}] found (version unknown), upgrading")],
            },
            Progress::Finished(outcome) => render_outcome(outcome),
            Progress::Summary(summary) => vec![render_summary(summary)],
        }
    }
}

/// Send every line of `event` to `reporter`.
pub fn emit(reporter: &mut dyn Reporter, event: &Progress<'_>) {
    for line in event.render() {
        reporter.line(&line);
    }
}

fn render_outcome(outcome: &ReconcileOutcome) -> Vec<String> {
    let tool = &outcome.name;
    let mut lines = Vec::new();

    if let Some(err) = &outcome.error {
        lines.push(format!("[{tool}] {}", cause_chain(err)));
        return lines;
    }

    lines.push(match (&outcome.action, &outcome.change) {
        (_, VersionChange::AlreadyLatest { version }) => {
            format!("[{tool}] already latest ({version})")
        }
        (Action::Install, VersionChange::Changed { to, .. }) => format!("[{tool}] installed {to}"),
        (Action::Install, VersionChange::Unknown) => {
            format!("[{tool}] installed (version unknown, open a new shell to refresh PATH)")
        }
        (Action::Upgrade, VersionChange::Changed { from: Some(from), to }) => {
            format!("[{tool}] upgraded {from} -> {to}")
        }
        (Action::Upgrade, VersionChange::Changed { from: None, to }) => {
            format!("[{tool}] upgraded to {to}")
        }
        (Action::Upgrade, VersionChange::Unknown) => {
            format!("[{tool}] upgraded (version unknown)")
        }
    });

    match &outcome.mirror {
        None | Some(MirrorStatus::Disabled) => {}
        Some(MirrorStatus::AlreadyConfigured { path }) => {
            lines.push(format!("[{tool}] mirror already configured in {}", path.display()));
        }
        Some(MirrorStatus::Written { path, created }) => {
            let verb = if *created { "written to" } else { "added to" };
            lines.push(format!("[{tool}] mirror config {verb} {}", path.display()));
        }
        Some(MirrorStatus::Failed(err)) => {
            lines.push(format!("[{tool}] warning: {}", cause_chain(err)));
        }
    }
    lines
}

fn render_summary(summary: &RunSummary) -> String {
    let failed: Vec<&str> = summary.failed().map(|o| o.name.as_str()).collect();
    if failed.is_empty() {
        format!("{} tool(s) ready", summary.outcomes.len())
    } else {
        format!(
            "{} tool(s) ready, {} failed: {} (re-run to retry)",
            summary.succeeded_count(),
            failed.len(),
            failed.join(", ")
        )
    }
}

/// `err` followed by its sources, joined like anyhow's `{:#}`.
fn cause_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let next = cause.to_string();
        if !text.contains(&next) {
            text.push_str(": ");
            text.push_str(&next);
        }
        source = cause.source();
    }
    text
}
