//! magic-tools-appimage - package a script-based toolkit as a portable AppImage.
//!
//! Stages an AppDir from the project sources and icon, fetches linuxdeploy and
//! its AppImage plugin, and produces `<AppName>-<Version>-<Arch>.AppImage`.

use magic_tools_appimage::cli;
use magic_tools_appimage::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new(false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.info("Recovery suggestions:");
                for suggestion in suggestions {
                    output.indent(&suggestion);
                }
            }

            process::exit(e.exit_code());
        }
    }
}
