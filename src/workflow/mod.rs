//! Release workflow orchestration
//!
//! Sequences the release stages strictly in order:
//! 1. Repository guard (uncommitted changes)
//! 2. Read the current version
//! 3. Select the new version
//! 4. Write it to every descriptor
//! 5. Run the tests
//! 6. Build distributions
//! 7. Check distributions
//! 8. Upload
//! 9. Commit, tag and push
//!
//! Any failure aborts the whole release. Side effects of completed stages
//! are kept: an abort after stage 4 leaves the rewritten descriptors in the
//! working tree, uncommitted.

pub mod context;
pub mod dist;

pub use context::{ReleaseContext, ReleaseState};

use tracing::{info, warn};

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::descriptor;
use crate::domain::choice::is_semver;
use crate::domain::tag::render_template;
use crate::domain::{menu_labels, resolve_version, BumpChoice, TagPattern};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::toolchain::{run_checked, CommandRunner, ToolCommand, ToolStage};
use crate::ui::{self, Prompter};

/// Stage at which the user chose to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclinedAt {
    /// Refused to continue with uncommitted changes
    Guard,
    /// Refused to upload; artifacts stay on disk
    Upload,
}

/// What a release run that did not fail ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Artifacts were uploaded
    Released(ReleaseSummary),
    /// The user stopped the release at a prompt
    Declined(DeclinedAt),
    /// Dry run ended after version selection
    DryRun { current: String, new: String },
}

/// Result of a completed release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub version: String,
    /// Tag created by this run
    pub tag: Option<String>,
    pub committed: bool,
    pub pushed: bool,
}

/// Options that do not come from the configuration file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Stop after version selection without modifying anything
    pub dry_run: bool,
}

/// The release orchestrator, bound to its collaborators.
pub struct ReleaseWorkflow<'a, R, C, P>
where
    R: Repository,
    C: CommandRunner,
    P: Prompter,
{
    config: &'a Config,
    repo: &'a R,
    runner: &'a C,
    prompter: &'a mut P,
    options: WorkflowOptions,
}

impl<'a, R, C, P> ReleaseWorkflow<'a, R, C, P>
where
    R: Repository,
    C: CommandRunner,
    P: Prompter,
{
    pub fn new(config: &'a Config, repo: &'a R, runner: &'a C, prompter: &'a mut P) -> Self {
        ReleaseWorkflow {
            config,
            repo,
            runner,
            prompter,
            options: WorkflowOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WorkflowOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every stage against `ctx`.
    ///
    /// On error the context is marked aborted and keeps the progress made
    /// so far.
    pub fn run(&mut self, ctx: &mut ReleaseContext) -> Result<WorkflowOutcome> {
        match self.run_stages(ctx) {
            Ok(outcome) => {
                if !matches!(outcome, WorkflowOutcome::Declined(_)) {
                    ctx.advance(ReleaseState::Done);
                }
                info!(outcome = ?outcome, "release finished");
                Ok(outcome)
            }
            Err(err) => {
                warn!(state = %ctx.state(), error = %err, "release aborted");
                ctx.abort();
                Err(err)
            }
        }
    }

    fn run_stages(&mut self, ctx: &mut ReleaseContext) -> Result<WorkflowOutcome> {
        if !self.guard_repository(ctx)? {
            return Ok(WorkflowOutcome::Declined(DeclinedAt::Guard));
        }

        let current = self.read_version(ctx)?;
        let (choice, new) = self.select_version(ctx, &current)?;

        if self.options.dry_run {
            ui::display_dry_run_plan(&self.dry_run_steps(&choice, &new));
            return Ok(WorkflowOutcome::DryRun { current, new });
        }

        self.write_version(ctx, &choice, &current, &new)?;
        self.run_tests(ctx)?;
        self.build(ctx)?;
        self.validate(ctx)?;

        if !self.upload(ctx)? {
            ui::display_manual_upload_instruction(&ctx.root.join(&self.config.tools.dist_dir));
            return Ok(WorkflowOutcome::Declined(DeclinedAt::Upload));
        }

        let summary = self.commit_tag_push(ctx, &new)?;
        Ok(WorkflowOutcome::Released(summary))
    }

    /// Stage 1. Returns `false` when the user stops on a dirty tree.
    fn guard_repository(&mut self, ctx: &mut ReleaseContext) -> Result<bool> {
        ui::display_stage(1, "Checking repository");

        let dirty = self.repo.uncommitted_files()?;
        if dirty.is_empty() {
            ui::display_success("Working tree is clean");
        } else {
            ui::display_boundary_warning(&BoundaryWarning::DirtyWorkingTree { files: dirty });
            if !self.prompter.confirm("Continue with uncommitted changes?")? {
                println!("Release cancelled by user.");
                ctx.advance(ReleaseState::UserAborted);
                return Ok(false);
            }
        }

        ctx.advance(ReleaseState::GuardChecked);
        Ok(true)
    }

    /// Stage 2
    fn read_version(&mut self, ctx: &mut ReleaseContext) -> Result<String> {
        ui::display_stage(2, "Reading current version");

        let (source, version) = descriptor::read_current_version(
            &ctx.root,
            &self.config.descriptors,
            self.config.version.source.as_deref(),
        )?;
        ui::display_success(&format!(
            "Current version: {} (from {})",
            version,
            source.display()
        ));

        ctx.version_source = Some(source);
        ctx.current_version = Some(version.clone());
        ctx.advance(ReleaseState::VersionRead);
        Ok(version)
    }

    /// Stage 3
    fn select_version(
        &mut self,
        ctx: &mut ReleaseContext,
        current: &str,
    ) -> Result<(BumpChoice, String)> {
        ui::display_stage(3, "Selecting new version");

        let labels = menu_labels(current);
        let index = self.prompter.select_option("Version bump", &labels)?;
        let mut choice = BumpChoice::from_menu_index(index)?;
        if let BumpChoice::Custom(_) = choice {
            choice = BumpChoice::Custom(self.prompter.input("New version")?);
        }

        let new = resolve_version(current, &choice)?;
        if matches!(choice, BumpChoice::Custom(_)) && !is_semver(&new) {
            ui::display_boundary_warning(&BoundaryWarning::NonSemverVersion {
                version: new.clone(),
            });
        }
        ui::display_version_change(current, &new);
        info!(choice = %choice, current, new = %new, "version selected");

        ctx.choice = Some(choice.clone());
        ctx.new_version = Some(new.clone());
        ctx.advance(ReleaseState::VersionSelected);
        Ok((choice, new))
    }

    fn dry_run_steps(&self, choice: &BumpChoice, new: &str) -> Vec<String> {
        let mut steps = Vec::new();
        if choice.writes_descriptors() {
            let files: Vec<String> = self
                .config
                .descriptors
                .iter()
                .map(|d| d.path.display().to_string())
                .collect();
            steps.push(format!("write {} to {}", new, files.join(", ")));
        }
        steps.push(format!("run tests: {}", self.config.tools.test.join(" ")));
        steps.push(format!("build: {}", self.config.tools.build.join(" ")));
        steps.push(format!("check: {}", self.config.tools.check.join(" ")));
        steps.push(format!("upload: {}", self.config.tools.upload.join(" ")));
        if let Ok(pattern) = TagPattern::new(self.config.git.tag_pattern.clone()) {
            steps.push(format!(
                "commit, tag {} and push to {}",
                pattern.format(new),
                self.config.git.remote
            ));
        }
        steps
    }

    /// Stage 4
    fn write_version(
        &mut self,
        ctx: &mut ReleaseContext,
        choice: &BumpChoice,
        current: &str,
        new: &str,
    ) -> Result<()> {
        ui::display_stage(4, "Updating version");

        if !choice.writes_descriptors() {
            ui::display_status(&format!("Keeping version {}, descriptors untouched", current));
            ctx.advance(ReleaseState::VersionSkipped);
            return Ok(());
        }

        let pending =
            descriptor::plan_version_update(&ctx.root, &self.config.descriptors, current, new)?;
        let written = descriptor::apply_version_update(&ctx.root, pending)?;
        for path in &written {
            ui::display_success(&format!("Updated {}", path.display()));
        }

        ctx.written_files = written;
        ctx.advance(ReleaseState::VersionWritten);
        Ok(())
    }

    /// Stage 5
    fn run_tests(&mut self, ctx: &mut ReleaseContext) -> Result<()> {
        ui::display_stage(5, "Running tests");

        let command = ToolCommand::from_argv(&self.config.tools.test)?;
        if !self.runner.is_available(&command.program) {
            ui::display_boundary_warning(&BoundaryWarning::TestRunnerUnavailable {
                program: command.program.clone(),
            });
            ctx.advance(ReleaseState::TestsSkipped);
            return Ok(());
        }

        run_checked(self.runner, ToolStage::Test, &command, &ctx.root)?;
        ui::display_success("Tests passed");
        ctx.advance(ReleaseState::Tested);
        Ok(())
    }

    /// Stage 6
    fn build(&mut self, ctx: &mut ReleaseContext) -> Result<()> {
        ui::display_stage(6, "Building distributions");

        let removed = dist::clean_build_outputs(&ctx.root, &self.config.tools.dist_dir)?;
        if !removed.is_empty() {
            let names: Vec<String> = removed.iter().map(|p| p.display().to_string()).collect();
            ui::display_status(&format!("Removed {}", names.join(", ")));
        }

        let command = ToolCommand::from_argv(&self.config.tools.build)?;
        run_checked(self.runner, ToolStage::Build, &command, &ctx.root)?;
        ui::display_success("Build complete");
        ctx.advance(ReleaseState::Built);
        Ok(())
    }

    /// Stage 7
    fn validate(&mut self, ctx: &mut ReleaseContext) -> Result<()> {
        ui::display_stage(7, "Checking distributions");

        let dist_dir = &self.config.tools.dist_dir;
        let artifacts = dist::collect_artifacts(&ctx.root, dist_dir)?;
        if artifacts.is_empty() {
            return Err(ReleaseError::NoArtifacts(ctx.root.join(dist_dir)));
        }

        let command = ToolCommand::from_argv(&self.config.tools.check)?.with_paths(&artifacts);
        run_checked(self.runner, ToolStage::Check, &command, &ctx.root)?;
        ui::display_success(&format!("{} artifact(s) passed the check", artifacts.len()));

        ctx.artifacts = artifacts;
        ctx.advance(ReleaseState::Validated);
        Ok(())
    }

    /// Stage 8. Returns `false` when the user declines the upload.
    fn upload(&mut self, ctx: &mut ReleaseContext) -> Result<bool> {
        ui::display_stage(8, "Uploading");
        ui::display_artifacts(&ctx.root, &ctx.artifacts);

        let target = self.config.upload.repository.as_deref().unwrap_or("PyPI");
        let prompt = format!("Upload {} artifact(s) to {}?", ctx.artifacts.len(), target);
        if !self.prompter.confirm(&prompt)? {
            println!("Upload cancelled by user.");
            ctx.advance(ReleaseState::UserAborted);
            return Ok(false);
        }

        let mut command = ToolCommand::from_argv(&self.config.tools.upload)?;
        if let Some(repository) = &self.config.upload.repository {
            command = command.with_args(["--repository", repository.as_str()]);
        }
        let command = command.with_paths(&ctx.artifacts);

        run_checked(self.runner, ToolStage::Upload, &command, &ctx.root)?;
        ui::display_success(&format!("Uploaded to {}", target));
        ctx.advance(ReleaseState::Uploaded);
        Ok(true)
    }

    /// Stage 9
    fn commit_tag_push(&mut self, ctx: &mut ReleaseContext, version: &str) -> Result<ReleaseSummary> {
        ui::display_stage(9, "Committing and tagging");

        let git = &self.config.git;
        let tag = TagPattern::new(git.tag_pattern.clone())?.format(version);

        let mut committed = false;
        if !ctx.written_files.is_empty()
            && self
                .prompter
                .confirm(&format!("Commit version bump to {}?", version))?
        {
            let paths: Vec<_> = ctx.written_files.iter().map(|p| ctx.root.join(p)).collect();
            self.repo.stage_paths(&paths)?;
            let id = self.repo.commit(&render_template(&git.commit_message, version))?;
            ui::display_success(&format!("Committed {}", &id[..id.len().min(7)]));
            ctx.commit_id = Some(id);
            ctx.advance(ReleaseState::Committed);
            committed = true;
        } else {
            ctx.advance(ReleaseState::CommitSkipped);
        }

        let mut tagged = false;
        if self.repo.tag_exists(&tag)? {
            ui::display_boundary_warning(&BoundaryWarning::TagExists { tag: tag.clone() });
            ctx.advance(ReleaseState::TagSkipped);
        } else if self.prompter.confirm(&format!("Create tag {}?", tag))? {
            self.repo.create_tag(&tag)?;
            ui::display_success(&format!("Created tag {}", tag));
            ctx.tag = Some(tag.clone());
            ctx.advance(ReleaseState::Tagged);
            tagged = true;
        } else {
            ctx.advance(ReleaseState::TagSkipped);
        }

        if !committed && !tagged {
            ctx.advance(ReleaseState::PushSkipped);
            return Ok(ReleaseSummary {
                version: version.to_string(),
                tag: None,
                committed,
                pushed: false,
            });
        }

        let branch = if committed {
            let branch = self.repo.current_branch()?;
            if branch.is_none() {
                ui::display_boundary_warning(&BoundaryWarning::DetachedHead);
            }
            branch
        } else {
            None
        };
        let tag_to_push = tagged.then_some(tag.as_str());

        let what = match (&branch, tag_to_push) {
            (Some(branch), Some(tag)) => format!("{} and {}", branch, tag),
            (Some(branch), None) => branch.clone(),
            (None, Some(tag)) => tag.to_string(),
            (None, None) => String::new(),
        };

        let pushed = !what.is_empty()
            && self
                .prompter
                .confirm(&format!("Push {} to '{}'?", what, git.remote))?;
        if pushed {
            self.repo.push(&git.remote, branch.as_deref(), tag_to_push)?;
            ui::display_success(&format!("Pushed {} to {}", what, git.remote));
            ctx.pushed = true;
            ctx.advance(ReleaseState::Pushed);
        } else {
            if tagged {
                ui::display_manual_push_instruction(&tag, &git.remote);
            }
            ctx.advance(ReleaseState::PushSkipped);
        }

        Ok(ReleaseSummary {
            version: version.to_string(),
            tag: ctx.tag.clone(),
            committed,
            pushed,
        })
    }
}
