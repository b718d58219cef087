//! Pure formatting functions for UI output.
//!
//! This module contains all display logic separated from user interaction.
//! Styling goes through `console`, which drops colors when the stream is
//! not a terminal.

use std::path::{Path, PathBuf};

use console::style;

use crate::boundary::BoundaryWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a numbered stage heading.
pub fn display_stage(number: usize, title: &str) {
    println!("\n{}", style(format!("[{}/9] {}", number, title)).bold());
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the proposed version change (or that it is kept).
pub fn display_version_change(current: &str, new: &str) {
    if current == new {
        println!("\n{}", style("Version unchanged:").bold());
        println!("  {}", style(current).cyan());
    } else {
        println!("\n{}", style("Version change:").bold());
        println!("  From: {}", style(current).red());
        println!("  To:   {}", style(new).green());
    }
}

/// Render the artifact list shown before upload.
pub fn format_artifacts(root: &Path, artifacts: &[PathBuf]) -> String {
    artifacts
        .iter()
        .map(|a| format!("  - {}", a.strip_prefix(root).unwrap_or(a).display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Display the artifacts that will be uploaded.
pub fn display_artifacts(root: &Path, artifacts: &[PathBuf]) {
    println!("\n{}", style("Built artifacts:").bold());
    println!("{}", format_artifacts(root, artifacts));
}

/// Display what a dry run would do after version selection.
pub fn display_dry_run_plan(steps: &[String]) {
    display_status("Dry run, nothing will be modified:");
    for (i, step) in steps.iter().enumerate() {
        display_success(&format!("  Step {}: {}", i + 1, step));
    }
}

/// Display manual push instruction for a tag.
///
/// # Arguments
/// * `tag` - The tag that was created locally
/// * `remote` - The remote name (e.g., "origin")
pub fn display_manual_push_instruction(tag: &str, remote: &str) {
    println!(
        "\n{} To push later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} HEAD {}", remote, tag)).cyan()
    );
}

/// Display instructions for uploading artifacts that were kept on disk.
pub fn display_manual_upload_instruction(dist_dir: &Path) {
    println!(
        "\n{} Artifacts kept in {}. To upload later, run:\n  {}",
        style("→").yellow(),
        dist_dir.display(),
        style(format!("twine upload {}/*", dist_dir.display())).cyan()
    );
}
