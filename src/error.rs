//! Error types for magic_tools_appimage operations.
//!
//! This module defines the top-level error with actionable messages and
//! recovery suggestions. Packaging failures themselves live in
//! [`crate::bundler::Error`].

use crate::bundler;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for magic_tools_appimage operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for all magic_tools_appimage operations
#[derive(Error, Debug)]
pub enum PackagerError {
    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] bundler::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown keys
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        /// Config file path
        path: PathBuf,
        /// Parsing error
        #[source]
        source: toml::de::Error,
    },

    /// Explicitly requested config file does not exist
    #[error("Config file {path} does not exist")]
    NotFound {
        /// Config file path
        path: PathBuf,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PackagerError::Bundler(e) => match e.root() {
                bundler::Error::Fs { context, path, .. } if *context == "locating icon" => vec![
                    format!("Add a square PNG icon at {}", path.display()),
                    "Or point --icon at an existing PNG".to_string(),
                ],
                bundler::Error::Fs { context, path, .. }
                    if *context == "locating source directory" =>
                {
                    vec![
                        format!("Create the source directory {}", path.display()),
                        "Or point --source-dir at the application sources".to_string(),
                    ]
                }
                bundler::Error::HttpError(_) => vec![
                    "Check network access to github.com".to_string(),
                    "Download the tools manually into the tools directory and re-run".to_string(),
                ],
                bundler::Error::ToolFailed { .. } => vec![
                    "Read the linuxdeploy output above for the failing step".to_string(),
                    "Re-run with --keep-app-dir to inspect the staged AppDir".to_string(),
                ],
                bundler::Error::IconNotSquare { .. } => {
                    vec!["Resize the icon to a square size such as 256x256".to_string()]
                }
                bundler::Error::InvalidSetting { field, .. } => {
                    vec![format!("Fix `{field}` in the config file or on the command line")]
                }
                _ => vec!["Check the error message above for specific details".to_string()],
            },
            PackagerError::Cli(CliError::InvalidArguments { .. }) => {
                vec!["Run with --help to see the accepted flags".to_string()]
            }
            PackagerError::Config(ConfigError::ParseFailed { path, .. }) => vec![format!(
                "Compare {} against the documented config keys",
                path.display()
            )],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Process exit code for this error.
    ///
    /// A failing packaging tool passes its own exit code through; everything
    /// else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            PackagerError::Bundler(e) => match e.root() {
                bundler::Error::ToolFailed {
                    code: Some(code), ..
                } if *code != 0 => *code,
                _ => 1,
            },
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::Context as _;

    #[test]
    fn tool_exit_code_passes_through_context() {
        let err: bundler::Result<()> = Err(bundler::Error::ToolFailed {
            tool: "linuxdeploy".into(),
            code: Some(42),
        });
        let err = PackagerError::from(err.context("packaging AppImage").unwrap_err());
        assert_eq!(err.exit_code(), 42);
    }

    #[test]
    fn signal_terminated_tool_exits_with_one() {
        let err = PackagerError::from(bundler::Error::ToolFailed {
            tool: "linuxdeploy".into(),
            code: None,
        });
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_icon_suggests_icon_path() {
        let err = PackagerError::from(bundler::Error::Fs {
            context: "locating icon",
            path: "assets/MyToolkit.png".into(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "icon file not found"),
        });
        assert_eq!(err.exit_code(), 1);
        assert!(err.recovery_suggestions()[0].contains("assets/MyToolkit.png"));
    }

    #[test]
    fn invalid_arguments_point_at_help() {
        let err = PackagerError::from(CliError::InvalidArguments {
            reason: "--app-name must not be empty".into(),
        });
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("--app-name must not be empty"));
        assert!(err.recovery_suggestions()[0].contains("--help"));
    }
}
