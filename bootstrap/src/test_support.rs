//! Test-only helpers: a scripted command runner, a recording reporter and a
//! throwaway host environment.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::io::environment::Environment;
use crate::io::runner::{Captured, CommandRunner, CommandSpec, RunStatus};
use crate::report::Reporter;
use crate::tools::platform::Platform;

const SCRIPTED_BIN: &str = "/scripted/bin";

/// POSIX environment rooted at `root` with mirrors and proxy disabled.
pub fn test_env(root: &Path) -> Environment {
    Environment::new(Platform::Posix, root.to_path_buf(), root.join(".config"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    Streamed,
    Captured,
}

#[derive(Debug, Clone)]
struct ToolScript {
    /// Successive `--version` outputs; the last one repeats.
    versions: VecDeque<String>,
    broken: bool,
    /// Version command runs but fails; `Some(true)` when it times out.
    version_failure: Option<bool>,
    /// Remaining successful lookups; `None` means unlimited.
    locates_left: Option<usize>,
}

#[derive(Debug, Clone)]
enum Effect {
    Exit(i32),
    Unlaunchable,
    Provides { binary: String, version: String },
}

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    effect: Effect,
}

#[derive(Debug, Default)]
struct State {
    tools: BTreeMap<String, ToolScript>,
    rules: Vec<Rule>,
    calls: Vec<(CallKind, CommandSpec)>,
}

/// [`CommandRunner`] that never spawns anything.
///
/// Tools "exist" when registered with [`with_tool`](Self::with_tool) or after a
/// streamed command matching an [`installs_when`](Self::installs_when) rule
/// succeeds. Streamed commands exit 0 unless a rule says otherwise. Rules match
/// on a substring of the rendered command line; the first match wins.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    state: RefCell<State>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(self, binary: &str, versions: &[&str]) -> Self {
        self.insert_tool(binary, versions, false, None);
        self
    }

    /// Present on the search path, but its version command cannot run.
    pub fn with_broken_tool(self, binary: &str) -> Self {
        self.insert_tool(binary, &[], true, None);
        self
    }

    /// Found by the first lookup only, as if removed right after probing.
    pub fn with_vanishing_tool(self, binary: &str, version: &str) -> Self {
        self.insert_tool(binary, &[version], false, Some(1));
        self
    }

    /// Present, but `--version` exits non-zero (or times out when `timed_out`).
    pub fn version_fails(self, binary: &str, timed_out: bool) -> Self {
        self.insert_tool(binary, &[], false, None);
        if let Some(tool) = self.state.borrow_mut().tools.get_mut(binary) {
            tool.version_failure = Some(timed_out);
        }
        self
    }

    pub fn fail_when(self, needle: &str, code: i32) -> Self {
        self.push_rule(needle, Effect::Exit(code));
        self
    }

    pub fn unlaunchable_when(self, needle: &str) -> Self {
        self.push_rule(needle, Effect::Unlaunchable);
        self
    }

    pub fn installs_when(self, needle: &str, binary: &str, version: &str) -> Self {
        self.push_rule(
            needle,
            Effect::Provides {
                binary: binary.to_string(),
                version: version.to_string(),
            },
        );
        self
    }

    /// Every command run so far, streamed or captured, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(|(_, spec)| spec.clone())
            .collect()
    }

    /// Streamed commands only (installers and self-updates).
    pub fn streamed(&self) -> Vec<CommandSpec> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|(kind, _)| *kind == CallKind::Streamed)
            .map(|(_, spec)| spec.clone())
            .collect()
    }

    /// Rendered command lines of every call.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    fn insert_tool(&self, binary: &str, versions: &[&str], broken: bool, locates_left: Option<usize>) {
        self.state.borrow_mut().tools.insert(
            binary.to_string(),
            ToolScript {
                versions: versions.iter().map(|v| v.to_string()).collect(),
                broken,
                version_failure: None,
                locates_left,
            },
        );
    }

    fn push_rule(&self, needle: &str, effect: Effect) {
        self.state.borrow_mut().rules.push(Rule {
            needle: needle.to_string(),
            effect,
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn locate(&self, program: &str, _extra_dirs: &[PathBuf]) -> Option<PathBuf> {
        let mut state = self.state.borrow_mut();
        let tool = state.tools.get_mut(program)?;
        match tool.locates_left.as_mut() {
            Some(0) => return None,
            Some(left) => *left -= 1,
            None => {}
        }
        Some(PathBuf::from(SCRIPTED_BIN).join(program))
    }

    fn run_streaming(&self, spec: &CommandSpec) -> Result<RunStatus> {
        let mut state = self.state.borrow_mut();
        state.calls.push((CallKind::Streamed, spec.clone()));
        let line = spec.to_string();
        let effect = state
            .rules
            .iter()
            .find(|rule| line.contains(&rule.needle))
            .map(|rule| rule.effect.clone());
        match effect {
            None => Ok(RunStatus { code: Some(0) }),
            Some(Effect::Exit(code)) => Ok(RunStatus { code: Some(code) }),
            Some(Effect::Unlaunchable) => Err(anyhow!("spawn command: No such file or directory")),
            Some(Effect::Provides { binary, version }) => {
                state.tools.insert(
                    binary,
                    ToolScript {
                        versions: VecDeque::from([version]),
                        broken: false,
                        version_failure: None,
                        locates_left: None,
                    },
                );
                Ok(RunStatus { code: Some(0) })
            }
        }
    }

    fn capture(&self, spec: &CommandSpec) -> Result<Captured> {
        let mut state = self.state.borrow_mut();
        state.calls.push((CallKind::Captured, spec.clone()));
        let binary = spec
            .program
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("unnamed program"))?
            .to_string();
        let tool = state
            .tools
            .get_mut(&binary)
            .ok_or_else(|| anyhow!("spawn command: {binary} not found"))?;
        if tool.broken {
            return Err(anyhow!("spawn command: permission denied"));
        }
        if let Some(timed_out) = tool.version_failure {
            return Ok(Captured {
                success: false,
                timed_out,
                text: "error: unexpected argument\n".to_string(),
            });
        }
        let version = if tool.versions.len() > 1 {
            tool.versions.pop_front()
        } else {
            tool.versions.front().cloned()
        };
        Ok(Captured {
            success: true,
            timed_out: false,
            text: version.map(|v| format!("{v}\n")).unwrap_or_default(),
        })
    }
}

/// [`Reporter`] that keeps every line for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub lines: Vec<String>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines attributed to `tool` (prefixed with `[tool]`).
    pub fn lines_for(&self, tool: &str) -> Vec<&str> {
        let prefix = format!("[{tool}] ");
        self.lines
            .iter()
            .filter(|line| line.starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}
