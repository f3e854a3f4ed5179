//! Packager configuration file and precedence rules.
//!
//! Settings are resolved from, highest priority first:
//!
//! 1. Command line flags
//! 2. Environment (`APP`, `VERSION`, `ARCH`; read by clap alongside the flags)
//! 3. `magic-tools-appimage.toml` in the project directory, or `--config`
//! 4. Built-in defaults
//!
//! ```toml
//! [app]
//! name = "MagicTools"
//! version = "0.1.0"
//!
//! [paths]
//! source = "src"
//! icon = "assets/MagicTools.png"
//!
//! [launcher]
//! interpreter = "python3"
//! entry_point = "main.py"
//! ```

use crate::bundler::{
    Arch, DesktopSettings, LauncherSettings, PackageSettings, Settings, SettingsBuilder,
    ToolSettings,
};
use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the project directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "magic-tools-appimage.toml";

/// Application name used when nothing else sets one.
pub const DEFAULT_APP_NAME: &str = "MagicTools";

/// Version used when nothing else sets one.
pub const DEFAULT_VERSION: &str = "0.1.0";

/// Contents of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// `[app]`
    pub app: AppSection,
    /// `[paths]`
    pub paths: PathsSection,
    /// `[launcher]`
    pub launcher: LauncherSection,
    /// `[desktop]`
    pub desktop: DesktopSection,
    /// `[tools]`
    pub tools: ToolsSection,
    /// Keep the AppDir after a successful build.
    pub keep_app_dir: Option<bool>,
}

/// `[app]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSection {
    /// Application name
    pub name: Option<String>,
    /// Version string
    pub version: Option<String>,
    /// Target architecture
    pub arch: Option<String>,
    /// Fallback desktop entry comment
    pub description: Option<String>,
}

/// `[paths]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    /// Application source tree
    pub source: Option<PathBuf>,
    /// Square PNG icon
    pub icon: Option<PathBuf>,
    /// Tool cache directory
    pub tools: Option<PathBuf>,
}

/// `[launcher]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherSection {
    /// Interpreter command
    pub interpreter: Option<String>,
    /// Entry point inside the source tree
    pub entry_point: Option<String>,
}

/// `[desktop]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesktopSection {
    /// Menu categories
    pub categories: Option<Vec<String>>,
    /// `Comment=` value
    pub comment: Option<String>,
    /// `Terminal=` value
    pub terminal: Option<bool>,
}

/// `[tools]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    /// linuxdeploy download base URL
    pub linuxdeploy_base_url: Option<String>,
    /// AppImage plugin download base URL
    pub appimage_plugin_base_url: Option<String>,
    /// Use tools found on `PATH`
    pub prefer_system_tools: Option<bool>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--app-name` / `APP`
    pub app_name: Option<String>,
    /// `--app-version` / `VERSION`
    pub version: Option<String>,
    /// `--arch` / `ARCH`
    pub arch: Option<String>,
    /// `--source-dir`
    pub source_dir: Option<PathBuf>,
    /// `--icon`
    pub icon: Option<PathBuf>,
    /// `--tools-dir`
    pub tools_dir: Option<PathBuf>,
    /// `--keep-app-dir`
    pub keep_app_dir: bool,
}

impl PackagerConfig {
    /// Parses config text. `origin` is only used in error messages.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| {
            ConfigError::ParseFailed {
                path: origin.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Loads `explicit` if given (it must exist, relative to the current
    /// directory), otherwise
    /// [`DEFAULT_CONFIG_FILE`] from `project_dir` if present, otherwise defaults.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                let path = path.to_path_buf();
                if !path.is_file() {
                    return Err(ConfigError::NotFound { path }.into());
                }
                path
            }
            None => {
                let path = project_dir.join(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    log::debug!("No {} found, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        log::debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&text, &path)
    }

    /// Applies `overrides` on top of this config and validates the result.
    pub fn resolve(&self, project_dir: &Path, overrides: &ConfigOverrides) -> Result<Settings> {
        let app_name = overrides
            .app_name
            .clone()
            .or_else(|| self.app.name.clone())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let version = overrides
            .version
            .clone()
            .or_else(|| self.app.version.clone())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        let arch = match overrides.arch.as_deref().or(self.app.arch.as_deref()) {
            Some(arch) => arch.parse::<Arch>()?,
            None => Arch::host()?,
        };

        let launcher_defaults = LauncherSettings::default();
        let launcher = LauncherSettings {
            interpreter: self
                .launcher
                .interpreter
                .clone()
                .unwrap_or(launcher_defaults.interpreter),
            entry_point: self
                .launcher
                .entry_point
                .clone()
                .unwrap_or(launcher_defaults.entry_point),
        };

        let desktop_defaults = DesktopSettings::default();
        let desktop = DesktopSettings {
            categories: self
                .desktop
                .categories
                .clone()
                .unwrap_or(desktop_defaults.categories),
            comment: self.desktop.comment.clone(),
            terminal: self.desktop.terminal.unwrap_or(desktop_defaults.terminal),
        };

        let tool_defaults = ToolSettings::default();
        let tools = ToolSettings {
            tools_dir: overrides
                .tools_dir
                .clone()
                .or_else(|| self.paths.tools.clone())
                .unwrap_or(tool_defaults.tools_dir),
            linuxdeploy_base_url: self
                .tools
                .linuxdeploy_base_url
                .clone()
                .unwrap_or(tool_defaults.linuxdeploy_base_url),
            appimage_plugin_base_url: self
                .tools
                .appimage_plugin_base_url
                .clone()
                .unwrap_or(tool_defaults.appimage_plugin_base_url),
            prefer_system_tools: self
                .tools
                .prefer_system_tools
                .unwrap_or(tool_defaults.prefer_system_tools),
        };

        let mut builder = SettingsBuilder::new()
            .project_directory(project_dir)
            .package_settings(PackageSettings {
                app_name,
                version,
                arch,
                description: self.app.description.clone(),
            })
            .launcher_settings(launcher)
            .desktop_settings(desktop)
            .tool_settings(tools)
            .keep_app_dir(overrides.keep_app_dir || self.keep_app_dir.unwrap_or(false));

        if let Some(source) = overrides.source_dir.as_ref().or(self.paths.source.as_ref()) {
            builder = builder.source_directory(source);
        }
        if let Some(icon) = overrides.icon.as_ref().or(self.paths.icon.as_ref()) {
            builder = builder.icon_path(icon);
        }

        Ok(builder.build()?)
    }
}
