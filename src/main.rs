use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use py_release::config;
use py_release::git::Git2Repository;
use py_release::toolchain::SystemRunner;
use py_release::ui::{self, TerminalPrompter};
use py_release::workflow::{
    DeclinedAt, ReleaseContext, ReleaseWorkflow, WorkflowOptions, WorkflowOutcome,
};

#[derive(clap::Parser)]
#[command(
    name = "py-release",
    version,
    about = "Bump, test, build, upload and tag a Python package release"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Stop after choosing the version, without changing anything")]
    dry_run: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv, -vvv)")]
    verbose: u8,
}

/// Log to stderr. RUST_LOG wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let root = std::env::current_dir()
        .and_then(|dir| dir.canonicalize())
        .context("cannot determine the project directory")?;

    let config = config::load_config(args.config.as_deref(), &root)?;
    let repo = Git2Repository::open(&root)?;
    let runner = SystemRunner::new();
    let mut prompter = TerminalPrompter::stdio();

    let mut ctx = ReleaseContext::new(&root);
    let outcome = ReleaseWorkflow::new(&config, &repo, &runner, &mut prompter)
        .with_options(WorkflowOptions {
            dry_run: args.dry_run,
        })
        .run(&mut ctx);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            if !ctx.written_files.is_empty() {
                let files: Vec<String> = ctx
                    .written_files
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                ui::display_status(&format!(
                    "Version files were already updated and left uncommitted: {}",
                    files.join(", ")
                ));
            }
            return Err(e.into());
        }
    };

    match outcome {
        WorkflowOutcome::Released(summary) => {
            let mut line = format!("Released {}", summary.version);
            if let Some(tag) = &summary.tag {
                line.push_str(&format!(" (tag {})", tag));
            }
            if summary.pushed {
                line.push_str(", pushed to remote");
            }
            println!();
            ui::display_success(&line);
        }
        WorkflowOutcome::DryRun { current, new } => {
            ui::display_success(&format!("Dry run complete: {} -> {}", current, new));
        }
        WorkflowOutcome::Declined(DeclinedAt::Guard) => {}
        WorkflowOutcome::Declined(DeclinedAt::Upload) => {
            ui::display_status("Release stopped before upload");
        }
    }
    Ok(())
}
