//! Clean command implementation.

use crate::bundler::Bundler;
use crate::cli::OutputManager;
use crate::error::Result;

/// Execute clean command
pub(super) async fn execute_clean(
    bundler: &Bundler,
    output: &OutputManager,
    include_tools: bool,
) -> Result<()> {
    let removed = bundler.clean(include_tools).await?;

    if removed.is_empty() {
        output.info("Nothing to clean");
    } else {
        output.success(&format!("Removed {} path(s)", removed.len()));
        for path in &removed {
            output.indent(&path.display().to_string());
        }
    }
    output.json(&removed)?;
    Ok(())
}
