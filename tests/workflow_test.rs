// tests/workflow_test.rs
use std::fs;
use std::path::{Path, PathBuf};

use py_release::config::Config;
use py_release::git::MockRepository;
use py_release::toolchain::{FakeRunner, ToolStage};
use py_release::ui::{ScriptedAnswer, ScriptedPrompter};
use py_release::workflow::{
    DeclinedAt, ReleaseContext, ReleaseState, ReleaseWorkflow, WorkflowOptions, WorkflowOutcome,
};
use py_release::{ReleaseError, Result};
use tempfile::TempDir;

const SETUP_PY: &str = "from setuptools import setup\n\nsetup(\n    name='ysa-signal',\n    version='1.0.12',\n)\n";
const PYPROJECT: &str = "[project]\nname = \"ysa-signal\"\nversion = \"1.0.12\"\n";
const INIT_PY: &str = "__version__ = '1.0.12'\n__author__ = 'Someone'\n";

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("setup.py"), SETUP_PY).unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();
    fs::write(dir.path().join("__init__.py"), INIT_PY).unwrap();
    dir
}

fn building_runner() -> FakeRunner {
    FakeRunner::new().creates(
        "python",
        &[
            "dist/ysa_signal-1.0.13.tar.gz",
            "dist/ysa_signal-1.0.13-py3-none-any.whl",
        ],
    )
}

fn select(n: &str) -> ScriptedAnswer {
    ScriptedAnswer::Select(n.to_string())
}

fn yes() -> ScriptedAnswer {
    ScriptedAnswer::Confirm(true)
}

fn no() -> ScriptedAnswer {
    ScriptedAnswer::Confirm(false)
}

struct Run {
    result: Result<WorkflowOutcome>,
    ctx: ReleaseContext,
    prompter: ScriptedPrompter,
}

fn release(
    root: &Path,
    config: &Config,
    repo: &MockRepository,
    runner: &FakeRunner,
    answers: Vec<ScriptedAnswer>,
    options: WorkflowOptions,
) -> Run {
    let mut prompter = ScriptedPrompter::new(answers);
    let mut ctx = ReleaseContext::new(root);
    let result = ReleaseWorkflow::new(config, repo, runner, &mut prompter)
        .with_options(options)
        .run(&mut ctx);
    Run {
        result,
        ctx,
        prompter,
    }
}

fn read(root: &Path, name: &str) -> String {
    fs::read_to_string(root.join(name)).unwrap()
}

fn programs(runner: &FakeRunner) -> Vec<String> {
    runner
        .invocations()
        .iter()
        .map(|cmd| cmd.to_string())
        .collect()
}

#[test]
fn test_full_patch_release() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1"), yes(), yes(), yes(), yes()],
        WorkflowOptions::default(),
    );

    let outcome = run.result.expect("release should succeed");
    match outcome {
        WorkflowOutcome::Released(summary) => {
            assert_eq!(summary.version, "1.0.13");
            assert_eq!(summary.tag.as_deref(), Some("v1.0.13"));
            assert!(summary.committed);
            assert!(summary.pushed);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert!(read(dir.path(), "setup.py").contains("version='1.0.13'"));
    assert!(!read(dir.path(), "setup.py").contains("1.0.12"));
    assert!(read(dir.path(), "pyproject.toml").contains("version = \"1.0.13\""));
    assert!(read(dir.path(), "__init__.py").contains("__version__ = '1.0.13'"));

    assert_eq!(
        programs(&runner),
        vec![
            "pytest".to_string(),
            "python -m build".to_string(),
            "twine check dist/ysa_signal-1.0.13-py3-none-any.whl dist/ysa_signal-1.0.13.tar.gz"
                .to_string(),
            "twine upload dist/ysa_signal-1.0.13-py3-none-any.whl dist/ysa_signal-1.0.13.tar.gz"
                .to_string(),
        ]
    );

    assert_eq!(repo.commits(), vec!["Bump version to 1.0.13"]);
    assert_eq!(repo.staged().len(), 3);
    assert!(repo.staged().contains(&dir.path().join("setup.py")));
    assert_eq!(repo.tags(), vec!["v1.0.13"]);
    assert_eq!(
        repo.pushes(),
        vec![(
            "origin".to_string(),
            Some("main".to_string()),
            Some("v1.0.13".to_string())
        )]
    );

    assert_eq!(run.ctx.state(), ReleaseState::Done);
    assert_eq!(
        run.ctx.history(),
        [
            ReleaseState::Start,
            ReleaseState::GuardChecked,
            ReleaseState::VersionRead,
            ReleaseState::VersionSelected,
            ReleaseState::VersionWritten,
            ReleaseState::Tested,
            ReleaseState::Built,
            ReleaseState::Validated,
            ReleaseState::Uploaded,
            ReleaseState::Committed,
            ReleaseState::Tagged,
            ReleaseState::Pushed,
            ReleaseState::Done,
        ]
    );
    assert_eq!(run.prompter.remaining(), 0);
}

#[test]
fn test_failing_tests_stop_before_build() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner().fail("pytest", 1, "FAILED tests/test_io.py::test_load");
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1")],
        WorkflowOptions::default(),
    );

    match run.result {
        Err(ReleaseError::ToolFailed { stage, code, output, .. }) => {
            assert_eq!(stage, ToolStage::Test);
            assert_eq!(code, Some(1));
            assert!(output.contains("test_load"));
        }
        other => panic!("expected test failure, got {:?}", other),
    }

    assert!(runner.ran("pytest"));
    assert!(!runner.ran("python"));
    assert!(!runner.ran("twine"));
    assert!(!dir.path().join("dist").exists());
    assert_eq!(run.ctx.state(), ReleaseState::Aborted);

    // Descriptor edits are not rolled back.
    assert_eq!(run.ctx.written_files.len(), 3);
    assert!(read(dir.path(), "setup.py").contains("1.0.13"));
    assert!(repo.commits().is_empty());
}

#[test]
fn test_invalid_menu_choice_modifies_nothing() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("9")],
        WorkflowOptions::default(),
    );

    assert!(matches!(run.result, Err(ReleaseError::InvalidChoice(ref s)) if s == "9"));
    assert_eq!(read(dir.path(), "setup.py"), SETUP_PY);
    assert_eq!(read(dir.path(), "pyproject.toml"), PYPROJECT);
    assert_eq!(read(dir.path(), "__init__.py"), INIT_PY);
    assert!(runner.invocations().is_empty());
    assert!(!run.ctx.has_reached(ReleaseState::VersionSelected));
}

#[test]
fn test_declining_upload_keeps_artifacts() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1"), no()],
        WorkflowOptions::default(),
    );

    assert_eq!(
        run.result.unwrap(),
        WorkflowOutcome::Declined(DeclinedAt::Upload)
    );
    assert!(dir.path().join("dist/ysa_signal-1.0.13.tar.gz").is_file());
    assert!(dir
        .path()
        .join("dist/ysa_signal-1.0.13-py3-none-any.whl")
        .is_file());
    assert!(!programs(&runner).iter().any(|p| p.starts_with("twine upload")));
    assert!(repo.commits().is_empty());
    assert!(repo.tags().is_empty());
    assert_eq!(run.ctx.state(), ReleaseState::UserAborted);
}

#[test]
fn test_skip_leaves_descriptors_untouched() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        // upload, tag, push; no commit prompt since nothing was written
        vec![select("5"), yes(), yes(), yes()],
        WorkflowOptions::default(),
    );

    match run.result.unwrap() {
        WorkflowOutcome::Released(summary) => {
            assert_eq!(summary.version, "1.0.12");
            assert!(!summary.committed);
            assert_eq!(summary.tag.as_deref(), Some("v1.0.12"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(read(dir.path(), "setup.py"), SETUP_PY);
    assert_eq!(read(dir.path(), "pyproject.toml"), PYPROJECT);
    assert_eq!(read(dir.path(), "__init__.py"), INIT_PY);
    assert!(run.ctx.has_reached(ReleaseState::VersionSkipped));
    assert!(run.ctx.written_files.is_empty());
    assert!(repo.commits().is_empty());
    assert_eq!(
        repo.pushes(),
        vec![("origin".to_string(), None, Some("v1.0.12".to_string()))]
    );
}

#[test]
fn test_existing_tag_is_not_recreated() {
    let dir = project();
    let mut repo = MockRepository::new();
    repo.add_tag("v1.0.12");
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("5"), yes()],
        WorkflowOptions::default(),
    );

    match run.result.unwrap() {
        WorkflowOutcome::Released(summary) => {
            assert_eq!(summary.tag, None);
            assert!(!summary.pushed);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(repo.tags(), vec!["v1.0.12"]);
    assert!(repo.pushes().is_empty());
    assert!(run.ctx.has_reached(ReleaseState::TagSkipped));
    assert!(run.ctx.has_reached(ReleaseState::PushSkipped));
}

#[test]
fn test_dirty_tree_declined() {
    let dir = project();
    let mut repo = MockRepository::new();
    repo.add_dirty_file("setup.py");
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![no()],
        WorkflowOptions::default(),
    );

    assert_eq!(
        run.result.unwrap(),
        WorkflowOutcome::Declined(DeclinedAt::Guard)
    );
    assert_eq!(
        run.prompter.asked(),
        ["Continue with uncommitted changes?"]
    );
    assert!(runner.invocations().is_empty());
    assert_eq!(read(dir.path(), "setup.py"), SETUP_PY);
}

#[test]
fn test_dirty_tree_accepted_continues() {
    let dir = project();
    let mut repo = MockRepository::new();
    repo.add_dirty_file("notes.txt");
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![yes(), select("2"), no()],
        WorkflowOptions::default(),
    );

    assert_eq!(
        run.result.unwrap(),
        WorkflowOutcome::Declined(DeclinedAt::Upload)
    );
    assert!(read(dir.path(), "setup.py").contains("version='1.1.0'"));
}

#[test]
fn test_custom_version_is_written_as_entered() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![
            select("4"),
            ScriptedAnswer::Input("2.0.0rc1".to_string()),
            no(),
        ],
        WorkflowOptions::default(),
    );

    assert!(run.result.is_ok());
    assert_eq!(run.ctx.new_version.as_deref(), Some("2.0.0rc1"));
    assert!(read(dir.path(), "setup.py").contains("version='2.0.0rc1'"));
    assert!(read(dir.path(), "__init__.py").contains("__version__ = '2.0.0rc1'"));
}

#[test]
fn test_empty_custom_version_rejected() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("4"), ScriptedAnswer::Input("  ".to_string())],
        WorkflowOptions::default(),
    );

    assert!(matches!(run.result, Err(ReleaseError::Version(_))));
    assert_eq!(read(dir.path(), "setup.py"), SETUP_PY);
}

#[test]
fn test_missing_test_runner_is_skipped() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner().missing("pytest");
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1"), no()],
        WorkflowOptions::default(),
    );

    assert!(run.result.is_ok());
    assert!(run.ctx.has_reached(ReleaseState::TestsSkipped));
    assert!(!run.ctx.has_reached(ReleaseState::Tested));
    assert!(runner.ran("python"));
}

#[test]
fn test_descriptor_mismatch_writes_nothing() {
    let dir = project();
    fs::write(dir.path().join("__init__.py"), "__version__ = '1.0.11'\n").unwrap();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1")],
        WorkflowOptions::default(),
    );

    match run.result {
        Err(ReleaseError::Descriptor { path, reason }) => {
            assert_eq!(path, PathBuf::from("__init__.py"));
            assert!(reason.contains("1.0.11"));
        }
        other => panic!("expected descriptor error, got {:?}", other),
    }
    assert_eq!(read(dir.path(), "setup.py"), SETUP_PY);
    assert!(runner.invocations().is_empty());
}

#[test]
fn test_build_without_artifacts_fails_validation() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = FakeRunner::new();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1")],
        WorkflowOptions::default(),
    );

    assert!(matches!(run.result, Err(ReleaseError::NoArtifacts(_))));
    assert!(!runner.ran("twine"));
    assert!(run.ctx.has_reached(ReleaseState::Built));
}

#[test]
fn test_stale_dist_is_cleared_before_build() {
    let dir = project();
    fs::create_dir_all(dir.path().join("dist")).unwrap();
    fs::write(dir.path().join("dist/ysa_signal-1.0.12.tar.gz"), "old").unwrap();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1"), no()],
        WorkflowOptions::default(),
    );

    assert!(run.result.is_ok());
    assert!(!dir.path().join("dist/ysa_signal-1.0.12.tar.gz").exists());
    assert_eq!(run.ctx.artifacts.len(), 2);
}

#[test]
fn test_upload_failure_aborts() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner().fail("twine upload", 1, "403 Forbidden");

    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1"), yes()],
        WorkflowOptions::default(),
    );

    match run.result {
        Err(ReleaseError::ToolFailed { stage, output, .. }) => {
            assert_eq!(stage, ToolStage::Upload);
            assert!(output.contains("403"));
        }
        other => panic!("expected upload failure, got {:?}", other),
    }
    assert!(runner.ran("twine check"));
    assert!(runner.ran("twine upload"));
    assert!(repo.commits().is_empty());
    assert!(repo.tags().is_empty());
}

#[test]
fn test_upload_to_named_repository() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let mut config = Config::default();
    config.upload.repository = Some("testpypi".to_string());
    let run = release(
        dir.path(),
        &config,
        &repo,
        &runner,
        vec![select("1"), yes(), no(), no()],
        WorkflowOptions::default(),
    );

    assert!(run.result.is_ok());
    let upload = runner
        .invocations()
        .into_iter()
        .find(|cmd| cmd.args.first().map(String::as_str) == Some("upload"))
        .expect("upload should run");
    assert_eq!(upload.args[1..3], ["--repository", "testpypi"]);
    assert!(run.prompter.asked()[1].contains("testpypi"));
}

#[test]
fn test_push_failure_aborts() {
    let dir = project();
    let mut repo = MockRepository::new();
    repo.clear_remotes();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1"), yes(), yes(), yes(), yes()],
        WorkflowOptions::default(),
    );

    assert!(matches!(run.result, Err(ReleaseError::Git(_))));
    assert_eq!(repo.tags(), vec!["v1.0.13"]);
    assert_eq!(run.ctx.state(), ReleaseState::Aborted);
}

#[test]
fn test_declined_push_keeps_local_tag() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("3"), yes(), yes(), yes(), no()],
        WorkflowOptions::default(),
    );

    match run.result.unwrap() {
        WorkflowOutcome::Released(summary) => {
            assert_eq!(summary.version, "2.0.0");
            assert_eq!(summary.tag.as_deref(), Some("v2.0.0"));
            assert!(!summary.pushed);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(repo.pushes().is_empty());
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = project();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("2")],
        WorkflowOptions { dry_run: true },
    );

    assert_eq!(
        run.result.unwrap(),
        WorkflowOutcome::DryRun {
            current: "1.0.12".to_string(),
            new: "1.1.0".to_string(),
        }
    );
    assert_eq!(read(dir.path(), "setup.py"), SETUP_PY);
    assert!(runner.invocations().is_empty());
    assert_eq!(run.ctx.state(), ReleaseState::Done);
}

#[test]
fn test_single_source_version_layout() {
    let dir = TempDir::new().unwrap();
    let setup_py = "from setuptools import setup\nfrom ysa_signal import __version__\n\nsetup(name='ysa-signal', version=__version__)\n";
    fs::write(dir.path().join("setup.py"), setup_py).unwrap();
    fs::write(dir.path().join("__init__.py"), INIT_PY).unwrap();
    let repo = MockRepository::new();
    let runner = building_runner();
    let run = release(
        dir.path(),
        &Config::default(),
        &repo,
        &runner,
        vec![select("1"), no()],
        WorkflowOptions::default(),
    );

    assert_eq!(
        run.result.unwrap(),
        WorkflowOutcome::Declined(DeclinedAt::Upload)
    );
    assert_eq!(run.ctx.version_source, Some(PathBuf::from("__init__.py")));
    assert_eq!(run.ctx.written_files, vec![PathBuf::from("__init__.py")]);
    assert_eq!(read(dir.path(), "setup.py"), setup_py);
    assert!(read(dir.path(), "__init__.py").contains("__version__ = '1.0.13'"));
}

#[test]
fn test_dist_dir_at_project_root_never_deletes_project() {
    let dir = project();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join("important.py"), "x = 1\n").unwrap();
    let repo = MockRepository::new();
    let runner = building_runner();
    let mut config = Config::default();
    config.tools.dist_dir = PathBuf::from(".");
    assert!(config.validate().is_err());

    let run = release(
        dir.path(),
        &config,
        &repo,
        &runner,
        vec![select("5")],
        WorkflowOptions::default(),
    );

    assert!(matches!(run.result, Err(ReleaseError::Io(_))));
    assert!(dir.path().join(".git").is_dir());
    assert!(dir.path().join("important.py").is_file());
    assert_eq!(read(dir.path(), "setup.py"), SETUP_PY);
    assert!(!runner.ran("python"));
}
