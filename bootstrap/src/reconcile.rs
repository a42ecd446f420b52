//! Reconciliation driver.
//!
//! Runs every selected tool through
//! `Probing → {Installing | Upgrading} → re-Probing → Configuring → Done`,
//! sequentially and in registry order. A failure ends that tool's cycle
//! (without mirror configuration) and the driver moves on to the next tool.

use tracing::{info, info_span, warn};

use crate::core::selection::{UnknownTools, resolve_selection};
use crate::core::types::{Action, Probe, VersionChange};
use crate::core::version::classify_change;
use crate::error::ReconcileError;
use crate::io::environment::Environment;
use crate::io::mirror::MirrorStatus;
use crate::io::runner::CommandRunner;
use crate::registry::Registry;
use crate::report::{Progress, Reporter, emit};
use crate::tools::Initializer;

/// What happened to one tool during a run.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub name: String,
    pub action: Action,
    pub before: Probe,
    /// Probe after the install/upgrade step; `None` if the step never ran to completion.
    pub after: Option<Probe>,
    pub change: VersionChange,
    /// `None` when mirror configuration was skipped because the step failed.
    pub mirror: Option<MirrorStatus>,
    pub error: Option<ReconcileError>,
}

impl ReconcileOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn before_version(&self) -> Option<&str> {
        self.before.version.as_deref()
    }

    pub fn after_version(&self) -> Option<&str> {
        self.after.as_ref().and_then(|p| p.version.as_deref())
    }
}

/// Outcomes of one run, in processing order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<ReconcileOutcome>,
}

impl RunSummary {
    /// True when the selection was empty and nothing ran.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ReconcileOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn outcome(&self, name: &str) -> Option<&ReconcileOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Drives registered initializers against one host.
pub struct Reconciler<'a, R: CommandRunner> {
    registry: &'a Registry,
    runner: &'a R,
    env: &'a Environment,
}

impl<'a, R: CommandRunner> Reconciler<'a, R> {
    pub fn new(registry: &'a Registry, runner: &'a R, env: &'a Environment) -> Self {
        Self {
            registry,
            runner,
            env,
        }
    }

    /// Reconcile every tool named in `selected`.
    ///
    /// Fails only when the selection names an unknown tool, before anything
    /// runs. Per-tool failures are recorded in the summary instead.
    pub fn run<S: AsRef<str>>(
        &self,
        selected: &[S],
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary, UnknownTools> {
        let names = resolve_selection(&self.registry.names(), selected)?;
        let mut summary = RunSummary::default();

        if names.is_empty() {
            info!("empty selection, nothing to do");
            emit(reporter, &Progress::NothingSelected);
            return Ok(summary);
        }

        for name in &names {
            let Some(tool) = self.registry.get(name) else {
                continue;
            };
            let outcome = self.reconcile_tool(tool, reporter);
            emit(reporter, &Progress::Finished(&outcome));
            summary.outcomes.push(outcome);
        }

        emit(reporter, &Progress::Summary(&summary));
        Ok(summary)
    }

    fn reconcile_tool(&self, tool: &dyn Initializer, reporter: &mut dyn Reporter) -> ReconcileOutcome {
        let name = tool.name();
        let span = info_span!("reconcile", tool = %name);
        let _guard = span.enter();

        emit(reporter, &Progress::Detecting { tool: name });
        let before = tool.detect(self.runner, self.env);

        if before.present {
            emit(reporter, &Progress::Upgrading { tool: name, probe: &before });
            self.finish_upgrade(tool, before)
        } else {
            emit(reporter, &Progress::Installing { tool: name });
            self.finish_install(tool, before)
        }
    }

    fn finish_install(&self, tool: &dyn Initializer, before: Probe) -> ReconcileOutcome {
        let name = tool.name();
        if let Err(err) = tool.install(self.runner, self.env) {
            warn!(action = Action::Install.label(), err = %err, "failed");
            return ReconcileOutcome {
                name: name.to_string(),
                action: Action::Install,
                before,
                after: None,
                change: VersionChange::Unknown,
                mirror: None,
                error: Some(err),
            };
        }

        let after = tool.detect(self.runner, self.env);
        if !after.present {
            warn!("installed binary is not on PATH yet");
        }
        let change = classify_change(None, after.version.as_deref(), true);
        info!(change = ?change, "installed");
        let mirror = tool.configure_mirror(self.env);
        ReconcileOutcome {
            name: name.to_string(),
            action: Action::Install,
            before,
            after: Some(after),
            change,
            mirror: Some(mirror),
            error: None,
        }
    }

    fn finish_upgrade(&self, tool: &dyn Initializer, before: Probe) -> ReconcileOutcome {
        let name = tool.name();
        let result = tool.upgrade(self.runner, self.env);

        // The version is re-checked even when the self-update failed.
        let after = tool.detect(self.runner, self.env);
        let change = classify_change(before.version.as_deref(), after.version.as_deref(), false);

        if let Err(err) = result {
            warn!(action = Action::Upgrade.label(), err = %err, "failed");
            return ReconcileOutcome {
                name: name.to_string(),
                action: Action::Upgrade,
                before,
                after: Some(after),
                change,
                mirror: None,
                error: Some(err),
            };
        }

        info!(change = ?change, "upgraded");
        let mirror = tool.configure_mirror(self.env);
        ReconcileOutcome {
            name: name.to_string(),
            action: Action::Upgrade,
            before,
            after: Some(after),
            change,
            mirror: Some(mirror),
            error: None,
        }
    }
}
