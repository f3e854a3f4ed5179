//! Fetch-tools command implementation.

use crate::bundler::Bundler;
use crate::cli::OutputManager;
use crate::error::Result;

/// Execute fetch-tools command
pub(super) async fn execute_fetch_tools(bundler: &Bundler, output: &OutputManager) -> Result<()> {
    output.progress(&format!(
        "Fetching packaging tools into {}",
        bundler.settings().tools().tools_dir.display()
    ));

    let tools = bundler.tools().await?;

    output.success("Packaging tools ready");
    output.indent(&tools.linuxdeploy.display().to_string());
    output.indent(&tools.appimage_plugin.display().to_string());
    output.json(&tools)?;
    Ok(())
}
