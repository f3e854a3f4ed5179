//! Command line argument parsing and validation.
//!
//! Running with no arguments builds the AppImage from the current directory.
//! Every flag is optional; `APP`, `VERSION` and `ARCH` in the environment are
//! honoured the same way the flags are.

use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Packages Magic Tools into a portable Linux AppImage
#[derive(Parser, Debug)]
#[command(
    name = "magic_tools_appimage",
    version,
    about = "Packages Magic Tools into a portable Linux AppImage",
    long_about = "Stages <AppName>.AppDir, fetches linuxdeploy and its AppImage plugin, and
produces <AppName>-<Version>-<Arch>.AppImage in the project directory.

Usage:
  magic_tools_appimage
  APP=MyToolkit VERSION=0.1.0 magic_tools_appimage
  magic_tools_appimage stage --keep-app-dir
  magic_tools_appimage clean --tools"
)]
pub struct Args {
    /// What to do (default: build)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project directory holding the sources, icon and outputs
    #[arg(short = 'C', long, global = true, default_value = ".", value_name = "DIR")]
    pub project_dir: PathBuf,

    /// Config file (default: magic-tools-appimage.toml in the project directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Application name
    #[arg(long, global = true, env = "APP", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Application version
    #[arg(long, global = true, env = "VERSION", value_name = "VERSION")]
    pub app_version: Option<String>,

    /// Target architecture (x86_64, i686, aarch64, armhf)
    #[arg(long, global = true, env = "ARCH", value_name = "ARCH")]
    pub arch: Option<String>,

    /// Application source tree
    #[arg(long, global = true, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Square PNG icon
    #[arg(long, global = true, value_name = "FILE")]
    pub icon: Option<PathBuf>,

    /// Directory the packaging tools are cached in
    #[arg(long, global = true, value_name = "DIR")]
    pub tools_dir: Option<PathBuf>,

    /// Keep <AppName>.AppDir after a successful build
    #[arg(long, global = true)]
    pub keep_app_dir: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stage the AppDir, fetch tools and build the AppImage
    Build,
    /// Stage the AppDir only (no downloads, no packaging tool)
    Stage,
    /// Download the packaging tools into the tools directory
    FetchTools,
    /// Remove the AppDir and artifact
    Clean {
        /// Also remove the cached packaging tools
        #[arg(long)]
        tools: bool,
    },
}

impl Command {
    /// Name shown in status messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build => "build",
            Command::Stage => "stage",
            Command::FetchTools => "fetch-tools",
            Command::Clean { .. } => "clean",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Command to run, `build` when none was given.
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Build)
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        for (flag, value) in [
            ("--app-name", &self.app_name),
            ("--app-version", &self.app_version),
            ("--arch", &self.arch),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(format!("{flag} must not be empty"));
            }
        }
        Ok(())
    }

    /// Settings overrides carried by these arguments.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            app_name: self.app_name.clone(),
            version: self.app_version.clone(),
            arch: self.arch.clone(),
            source_dir: self.source_dir.clone(),
            icon: self.icon.clone(),
            tools_dir: self.tools_dir.clone(),
            keep_app_dir: self.keep_app_dir,
        }
    }
}
