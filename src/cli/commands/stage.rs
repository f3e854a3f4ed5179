//! Stage command implementation.
//!
//! Produces the AppDir exactly as a build would, then stops. The directory
//! fingerprint lets two runs be compared without diffing trees.

use crate::bundler::{Bundler, calculate_directory_sha256};
use crate::cli::OutputManager;
use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct StageSummary {
    app_dir: PathBuf,
    desktop_file: PathBuf,
    icon_file: PathBuf,
    source_files: usize,
    fingerprint: String,
}

/// Execute stage command
pub(super) async fn execute_stage(bundler: &Bundler, output: &OutputManager) -> Result<()> {
    output.progress(&format!(
        "Staging {}",
        bundler.settings().app_dir().display()
    ));

    let staged = bundler.stage().await?;
    let fingerprint = calculate_directory_sha256(staged.layout.root()).await?;

    output.success(&format!("Staged {}", staged.layout.root().display()));
    output.indent(&format!("Source files: {}", staged.source_files));
    output.indent(&format!("Desktop entry: {}", staged.desktop_file.display()));
    output.indent(&format!("Icon: {}", staged.icon_file.display()));
    output.indent(&format!("Fingerprint: {}", fingerprint));

    output.json(&StageSummary {
        app_dir: staged.layout.root().to_path_buf(),
        desktop_file: staged.desktop_file,
        icon_file: staged.icon_file,
        source_files: staged.source_files,
        fingerprint,
    })?;
    Ok(())
}
