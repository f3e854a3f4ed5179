//! Build command implementation.

use crate::bundler::Bundler;
use crate::cli::OutputManager;
use crate::error::Result;

/// Execute build command
pub(super) async fn execute_build(bundler: &Bundler, output: &OutputManager) -> Result<()> {
    let settings = bundler.settings();
    output.progress(&format!(
        "Building {} for {} {}",
        settings.artifact_file_name(),
        settings.app_name(),
        settings.version()
    ));

    let artifact = bundler.bundle().await?;

    output.success(&format!("Created {}", artifact.path.display()));
    output.indent(&format!("Size:   {} bytes", artifact.size));
    output.indent(&format!("SHA256: {}", artifact.checksum));
    if settings.keep_app_dir() {
        output.indent(&format!("AppDir: {}", settings.app_dir().display()));
    }
    output.json(&artifact)?;
    Ok(())
}
