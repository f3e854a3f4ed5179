//! Packaging configuration types.
//!
//! [`Settings`] is the fully-resolved input to the AppImage pipeline. It is built
//! with [`SettingsBuilder`], which validates required fields and resolves every
//! relative path against the project directory.
//!
//! # Example
//!
//! ```no_run
//! use magic_tools_appimage::bundler::{Arch, PackageSettings, SettingsBuilder};
//!
//! # fn example() -> magic_tools_appimage::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .project_directory("/work/magic-tools")
//!     .package_settings(PackageSettings {
//!         app_name: "MyToolkit".into(),
//!         version: "0.1.0".into(),
//!         arch: Arch::X86_64,
//!         description: None,
//!     })
//!     .build()?;
//!
//! assert_eq!(settings.artifact_file_name(), "MyToolkit-0.1.0-x86_64.AppImage");
//! # Ok(())
//! # }
//! ```

use crate::bundler::error::{Error, Result};
use path_absolutize::Absolutize;
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};

/// Base URL for linuxdeploy continuous builds.
pub const LINUXDEPLOY_BASE_URL: &str =
    "https://github.com/linuxdeploy/linuxdeploy/releases/download/continuous";

/// Base URL for the linuxdeploy AppImage output plugin.
pub const APPIMAGE_PLUGIN_BASE_URL: &str =
    "https://github.com/linuxdeploy/linuxdeploy-plugin-appimage/releases/download/continuous";

static APP_NAME_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+-]*$").expect("static regex is valid")
});

/// Target CPU architecture of the produced AppImage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    X86_64,
    /// x86 / i686 (32-bit)
    I686,
    /// AArch64 / ARM64 (64-bit)
    AArch64,
    /// ARM with hard-float (32-bit)
    Armhf,
}

impl Arch {
    /// Architecture of the running host.
    pub fn host() -> Result<Self> {
        std::env::consts::ARCH.parse()
    }

    /// Spelling used by AppImage tooling and in artifact file names.
    pub fn appimage_name(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::I686 => "i686",
            Arch::AArch64 => "aarch64",
            Arch::Armhf => "armhf",
        }
    }

    /// Suffix of the linuxdeploy release assets for this architecture.
    pub fn linuxdeploy_name(&self) -> &'static str {
        match self {
            Arch::I686 => "i386",
            other => other.appimage_name(),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.appimage_name())
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(Arch::X86_64),
            "i686" | "i386" | "x86" => Ok(Arch::I686),
            "aarch64" | "arm64" => Ok(Arch::AArch64),
            "armhf" | "arm" | "armv7" => Ok(Arch::Armhf),
            other => Err(Error::ArchError(other.to_string())),
        }
    }
}

/// Application identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSettings {
    /// Application name. Used for the AppDir, desktop entry, icon and artifact names.
    pub app_name: String,
    /// Version string embedded in the artifact name.
    pub version: String,
    /// Target architecture.
    pub arch: Arch,
    /// Short description, written as the desktop entry `Comment=` when no
    /// explicit comment is configured.
    pub description: Option<String>,
}

/// How the launcher shim starts the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    /// Interpreter looked up on `PATH` at runtime.
    pub interpreter: String,
    /// Entry point relative to the staged source tree.
    pub entry_point: String,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            interpreter: "python3".into(),
            entry_point: "main.py".into(),
        }
    }
}

/// Desktop entry metadata beyond the application name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopSettings {
    /// freedesktop.org menu categories.
    pub categories: Vec<String>,
    /// Optional `Comment=` line.
    pub comment: Option<String>,
    /// Whether the application runs in a terminal.
    pub terminal: bool,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            categories: vec!["Utility".into()],
            comment: None,
            terminal: false,
        }
    }
}

/// Where packaging tools come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    /// Directory the downloaded tools are cached in. Relative to the project directory.
    pub tools_dir: PathBuf,
    /// Base URL that `linuxdeploy-<arch>.AppImage` is fetched from.
    pub linuxdeploy_base_url: String,
    /// Base URL that `linuxdeploy-plugin-appimage-<arch>.AppImage` is fetched from.
    pub appimage_plugin_base_url: String,
    /// Use a `linuxdeploy` found on `PATH` instead of downloading one.
    pub prefer_system_tools: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tools_dir: PathBuf::from("."),
            linuxdeploy_base_url: LINUXDEPLOY_BASE_URL.into(),
            appimage_plugin_base_url: APPIMAGE_PLUGIN_BASE_URL.into(),
            prefer_system_tools: false,
        }
    }
}

/// Fully-resolved packaging settings.
#[derive(Debug, Clone)]
pub struct Settings {
    project_directory: PathBuf,
    source_directory: PathBuf,
    icon_path: PathBuf,
    package: PackageSettings,
    launcher: LauncherSettings,
    desktop: DesktopSettings,
    tools: ToolSettings,
    keep_app_dir: bool,
}

impl Settings {
    /// Directory the AppDir and artifact are written to.
    pub fn project_directory(&self) -> &Path {
        &self.project_directory
    }

    /// Application source tree copied into the AppDir.
    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    /// Icon asset copied into the AppDir.
    pub fn icon_path(&self) -> &Path {
        &self.icon_path
    }

    /// Application name.
    pub fn app_name(&self) -> &str {
        &self.package.app_name
    }

    /// Version string.
    pub fn version(&self) -> &str {
        &self.package.version
    }

    /// Target architecture.
    pub fn arch(&self) -> Arch {
        self.package.arch
    }

    /// Package identity.
    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// Launcher shim settings.
    pub fn launcher(&self) -> &LauncherSettings {
        &self.launcher
    }

    /// Desktop entry settings.
    pub fn desktop(&self) -> &DesktopSettings {
        &self.desktop
    }

    /// Tool download settings, with `tools_dir` already resolved.
    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Whether the AppDir survives a successful build.
    pub fn keep_app_dir(&self) -> bool {
        self.keep_app_dir
    }

    /// `<AppName>.AppDir` inside the project directory.
    pub fn app_dir(&self) -> PathBuf {
        self.project_directory
            .join(format!("{}.AppDir", self.package.app_name))
    }

    /// `<AppName>-<Version>-<Arch>.AppImage`
    pub fn artifact_file_name(&self) -> String {
        format!(
            "{}-{}-{}.AppImage",
            self.package.app_name, self.package.version, self.package.arch
        )
    }

    /// Final artifact location inside the project directory.
    pub fn artifact_path(&self) -> PathBuf {
        self.project_directory.join(self.artifact_file_name())
    }
}

/// Builder for [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    project_directory: Option<PathBuf>,
    source_directory: Option<PathBuf>,
    icon_path: Option<PathBuf>,
    package_settings: Option<PackageSettings>,
    launcher: LauncherSettings,
    desktop: DesktopSettings,
    tools: ToolSettings,
    keep_app_dir: bool,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn project_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the source tree. Default: `src`
    pub fn source_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the icon asset. Default: `assets/<AppName>.png`
    pub fn icon_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.icon_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets package metadata.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package_settings = Some(settings);
        self
    }

    /// Sets launcher shim configuration.
    pub fn launcher_settings(mut self, settings: LauncherSettings) -> Self {
        self.launcher = settings;
        self
    }

    /// Sets desktop entry configuration.
    pub fn desktop_settings(mut self, settings: DesktopSettings) -> Self {
        self.desktop = settings;
        self
    }

    /// Sets tool download configuration.
    pub fn tool_settings(mut self, settings: ToolSettings) -> Self {
        self.tools = settings;
        self
    }

    /// Keep the AppDir after a successful build.
    pub fn keep_app_dir(mut self, keep: bool) -> Self {
        self.keep_app_dir = keep;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] if a required field is missing, the
    /// application name cannot be used as a file name, the version is malformed,
    /// or a tool base URL does not parse.
    pub fn build(self) -> Result<Settings> {
        let project_directory = self.project_directory.ok_or(Error::InvalidSetting {
            field: "project_directory",
            reason: "project directory is required".into(),
        })?;
        let project_directory = project_directory.absolutize()?.into_owned();

        let package = self.package_settings.ok_or(Error::InvalidSetting {
            field: "package_settings",
            reason: "package settings are required".into(),
        })?;
        validate_app_name(&package.app_name)?;
        validate_version(&package.version)?;
        validate_launcher(&self.launcher)?;
        validate_desktop(&self.desktop)?;

        url::Url::parse(&self.tools.linuxdeploy_base_url)?;
        url::Url::parse(&self.tools.appimage_plugin_base_url)?;

        let source_directory = self
            .source_directory
            .unwrap_or_else(|| PathBuf::from("src"));
        let icon_path = self
            .icon_path
            .unwrap_or_else(|| PathBuf::from(format!("assets/{}.png", package.app_name)));

        let mut tools = self.tools;
        tools.tools_dir = absolutize(&tools.tools_dir, &project_directory)?;

        Ok(Settings {
            source_directory: absolutize(&source_directory, &project_directory)?,
            icon_path: absolutize(&icon_path, &project_directory)?,
            project_directory,
            package,
            launcher: self.launcher,
            desktop: self.desktop,
            tools,
            keep_app_dir: self.keep_app_dir,
        })
    }
}

fn absolutize(path: &Path, base: &Path) -> Result<PathBuf> {
    Ok(path.absolutize_from(base)?.into_owned())
}

/// Rejects names that would break file names or the desktop `Exec=` key.
pub fn validate_app_name(name: &str) -> Result<()> {
    if APP_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidSetting {
            field: "app_name",
            reason: format!(
                "{name:?} must start with a letter or digit and contain only letters, digits, '.', '_', '+' or '-'"
            ),
        })
    }
}

/// Rejects empty versions and versions containing whitespace or path separators.
///
/// Non-semver versions are accepted but logged.
pub fn validate_version(version: &str) -> Result<()> {
    if version.is_empty()
        || version
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
    {
        return Err(Error::InvalidSetting {
            field: "version",
            reason: format!("{version:?} must be non-empty with no whitespace or path separators"),
        });
    }
    if semver::Version::parse(version.trim_start_matches('v')).is_err() {
        log::warn!("Version {version:?} is not a semantic version");
    }
    Ok(())
}

fn validate_launcher(launcher: &LauncherSettings) -> Result<()> {
    if launcher.interpreter.trim().is_empty() || launcher.interpreter.contains('\n') {
        return Err(Error::InvalidSetting {
            field: "interpreter",
            reason: "interpreter must be a single non-empty line".into(),
        });
    }
    // The entry point is spliced into a double-quoted shell string.
    let entry = Path::new(&launcher.entry_point);
    if launcher.entry_point.is_empty()
        || launcher
            .entry_point
            .chars()
            .any(|c| matches!(c, '"' | '$' | '`' | '\\' | '\n'))
        || entry.is_absolute()
        || entry
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(Error::InvalidSetting {
            field: "entry_point",
            reason: format!(
                "{:?} must be a relative path inside the source tree",
                launcher.entry_point
            ),
        });
    }
    Ok(())
}

fn validate_desktop(desktop: &DesktopSettings) -> Result<()> {
    if desktop.categories.iter().all(|c| c.trim().is_empty()) {
        return Err(Error::InvalidSetting {
            field: "categories",
            reason: "at least one desktop category is required".into(),
        });
    }
    if let Some(bad) = desktop.categories.iter().find(|c| c.contains([';', '\n'])) {
        return Err(Error::InvalidSetting {
            field: "categories",
            reason: format!("{bad:?} must not contain ';' or line breaks"),
        });
    }
    Ok(())
}
