//! End-to-end reconciliation scenarios against the built-in tools.
//!
//! Every child process is scripted; config files land in a temp home.

use std::fs;

use bootstrap::core::types::VersionChange;
use bootstrap::error::ReconcileError;
use bootstrap::io::config::BootstrapConfig;
use bootstrap::io::mirror::MirrorStatus;
use bootstrap::reconcile::Reconciler;
use bootstrap::registry::Registry;
use bootstrap::test_support::{RecordingReporter, ScriptedRunner, test_env};

const OPT_IN: &str = "https://goproxy.cn";

fn registry() -> Registry {
    Registry::builtin(&BootstrapConfig::default()).expect("registry")
}

/// uv absent, bun present at 1.0.0 with no newer release.
#[test]
fn mixed_selection_installs_one_and_upgrades_the_other() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = test_env(temp.path());
    let registry = registry();
    let runner = ScriptedRunner::new()
        .with_tool("bun", &["1.0.0"])
        .installs_when("astral.sh/uv", "uv", "uv 0.5.0");
    let mut reporter = RecordingReporter::new();

    let summary = Reconciler::new(&registry, &runner, &env)
        .run(&["uv", "bun"], &mut reporter)
        .expect("run");

    assert!(summary.all_succeeded());
    let names: Vec<&str> = summary.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["bun", "uv"]);

    let lines = runner.command_lines();
    assert!(!lines.iter().any(|l| l.contains("uv self update")));
    assert!(lines.iter().any(|l| l.ends_with("bun upgrade")));

    assert!(reporter.contains("[bun] already latest (1.0.0)"));
    assert!(reporter.contains("[uv] installed uv 0.5.0"));
    assert_eq!(reporter.lines.last().map(String::as_str), Some("2 tool(s) ready"));
}

#[test]
fn one_failure_does_not_stop_the_other_tool() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = test_env(temp.path()).with_mirror_opt_in(Some(OPT_IN.to_string()));
    let registry = registry();
    let runner = ScriptedRunner::new()
        .with_tool("bun", &["1.0.0", "1.1.0"])
        .fail_when("astral.sh/uv", 22);
    let mut reporter = RecordingReporter::new();

    let summary = Reconciler::new(&registry, &runner, &env)
        .run(&["uv", "bun"], &mut reporter)
        .expect("run");

    let uv = summary.outcome("uv").expect("uv outcome");
    assert!(matches!(uv.error, Some(ReconcileError::InstallFailed { .. })));
    assert!(uv.after.is_none());
    assert!(uv.mirror.is_none());
    assert!(!temp.path().join(".config").join("uv").join("uv.toml").exists());

    let bun = summary.outcome("bun").expect("bun outcome");
    assert!(bun.succeeded());
    assert_eq!(
        bun.change,
        VersionChange::Changed {
            from: Some("1.0.0".to_string()),
            to: "1.1.0".to_string(),
        }
    );
    assert!(matches!(bun.mirror, Some(MirrorStatus::Written { created: true, .. })));
    assert!(temp.path().join(".bunfig.toml").exists());

    assert_eq!(reporter.lines_for("uv").last().copied(), Some("[uv] install failed: installer exited with exit status 22"));
    assert!(reporter.contains("1 failed: uv"));
}

#[test]
fn mirror_config_is_written_once_then_left_alone() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = test_env(temp.path()).with_mirror_opt_in(Some(OPT_IN.to_string()));
    let registry = registry();
    let uv_config = temp.path().join(".config").join("uv").join("uv.toml");
    let bun_config = temp.path().join(".bunfig.toml");

    let runner = ScriptedRunner::new()
        .with_tool("uv", &["uv 0.5.0"])
        .with_tool("bun", &["1.1.0"]);
    let mut first = RecordingReporter::new();
    Reconciler::new(&registry, &runner, &env)
        .run(&["uv", "bun"], &mut first)
        .expect("first run");

    let uv_bytes = fs::read(&uv_config).expect("uv config");
    let bun_bytes = fs::read(&bun_config).expect("bun config");
    assert!(String::from_utf8_lossy(&uv_bytes).contains("https://mirrors.aliyun.com/pypi/simple/"));
    assert!(String::from_utf8_lossy(&bun_bytes).contains("https://registry.npmmirror.com/"));
    assert!(first.contains("[uv] mirror config written to"));

    let mut second = RecordingReporter::new();
    let summary = Reconciler::new(&registry, &runner, &env)
        .run(&["uv", "bun"], &mut second)
        .expect("second run");

    for outcome in &summary.outcomes {
        assert!(matches!(outcome.mirror, Some(MirrorStatus::AlreadyConfigured { .. })));
    }
    assert!(second.contains("[bun] mirror already configured in"));
    assert_eq!(fs::read(&uv_config).expect("uv config"), uv_bytes);
    assert_eq!(fs::read(&bun_config).expect("bun config"), bun_bytes);
}

#[test]
fn mirror_failure_is_a_warning_not_a_tool_failure() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = test_env(temp.path()).with_mirror_opt_in(Some(OPT_IN.to_string()));
    fs::write(temp.path().join(".bunfig.toml"), "not [valid").expect("write");
    let registry = registry();
    let runner = ScriptedRunner::new().with_tool("bun", &["1.1.0"]);
    let mut reporter = RecordingReporter::new();

    let summary = Reconciler::new(&registry, &runner, &env)
        .run(&["bun"], &mut reporter)
        .expect("run");

    assert!(summary.all_succeeded());
    assert!(matches!(
        summary.outcome("bun").and_then(|o| o.mirror.as_ref()),
        Some(MirrorStatus::Failed(ReconcileError::ConfigWriteFailed { .. }))
    ));
    assert!(reporter.contains("[bun] warning: write mirror config"));
}

#[test]
fn duplicate_and_mixed_case_names_run_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = test_env(temp.path());
    let registry = registry();
    let runner = ScriptedRunner::new().with_tool("uv", &["uv 0.5.0"]);
    let mut reporter = RecordingReporter::new();

    let summary = Reconciler::new(&registry, &runner, &env)
        .run(&["uv", " UV "], &mut reporter)
        .expect("run");

    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(runner.streamed().len(), 1);
}

#[test]
fn proxy_reaches_only_the_uv_installer() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = test_env(temp.path()).with_proxy_url(Some("http://127.0.0.1:7890".to_string()));
    let registry = registry();
    let runner = ScriptedRunner::new();
    let mut reporter = RecordingReporter::new();

    Reconciler::new(&registry, &runner, &env)
        .run(&["uv", "bun"], &mut reporter)
        .expect("run");

    let streamed = runner.streamed();
    assert_eq!(streamed.len(), 2);
    let bun = streamed.iter().find(|c| c.to_string().contains("bun.sh")).expect("bun installer");
    let uv = streamed.iter().find(|c| c.to_string().contains("astral.sh")).expect("uv installer");
    assert!(bun.env.is_empty());
    assert_eq!(uv.env_value("HTTP_PROXY"), Some("http://127.0.0.1:7890"));
}

#[test]
fn unset_opt_in_leaves_existing_configs_byte_identical() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = test_env(temp.path());
    let bun_config = temp.path().join(".bunfig.toml");
    let uv_config = temp.path().join(".config").join("uv").join("uv.toml");
    let bun_original = "# mine\n[install]\nregistry = \"https://npm.corp.example/\"\n";
    let uv_original = "native-tls = true\n";
    fs::write(&bun_config, bun_original).expect("write bunfig");
    fs::create_dir_all(uv_config.parent().expect("parent")).expect("mkdir");
    fs::write(&uv_config, uv_original).expect("write uv.toml");

    let registry = registry();
    let runner = ScriptedRunner::new()
        .with_tool("bun", &["1.1.0"])
        .with_tool("uv", &["uv 0.5.0"]);
    let mut reporter = RecordingReporter::new();

    let summary = Reconciler::new(&registry, &runner, &env)
        .run(&["uv", "bun"], &mut reporter)
        .expect("run");

    for outcome in &summary.outcomes {
        assert!(matches!(outcome.mirror, Some(MirrorStatus::Disabled)));
    }
    assert_eq!(fs::read_to_string(&bun_config).expect("read bunfig"), bun_original);
    assert_eq!(fs::read_to_string(&uv_config).expect("read uv.toml"), uv_original);
    assert!(!reporter.contains("mirror"));
}
