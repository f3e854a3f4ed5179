//! AppImage bundler for script-based desktop applications.
//!
//! Turns a source tree and an icon into a single portable
//! `<AppName>-<Version>-<Arch>.AppImage` by staging an AppDir, fetching
//! linuxdeploy and its AppImage plugin, and running them.
//!
//! # Integration
//!
//! ```no_run
//! use magic_tools_appimage::bundler::{Arch, Bundler, PackageSettings, SettingsBuilder};
//!
//! # async fn example() -> magic_tools_appimage::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .project_directory(".")
//!     .source_directory("src")
//!     .icon_path("assets/MyToolkit.png")
//!     .package_settings(PackageSettings {
//!         app_name: "MyToolkit".into(),
//!         version: "0.1.0".into(),
//!         arch: Arch::X86_64,
//!         description: None,
//!     })
//!     .build()?;
//!
//! let artifact = Bundler::new(settings).bundle().await?;
//! assert!(artifact.path.ends_with("MyToolkit-0.1.0-x86_64.AppImage"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
mod error;
pub(crate) mod platform;
mod settings;
mod utils;

// Public re-exports
pub use builder::{Bundler, calculate_directory_sha256, calculate_sha256};
pub use error::{Context, Error, ErrorExt, Result};
pub use platform::linux::{
    appdir::{AppDirLayout, StagedAppDir},
    tools::PackagingTools,
};
pub use settings::{
    APPIMAGE_PLUGIN_BASE_URL, Arch, DesktopSettings, LINUXDEPLOY_BASE_URL, LauncherSettings,
    PackageSettings, Settings, SettingsBuilder, ToolSettings, validate_app_name,
    validate_version,
};

use serde::Serialize;
use std::path::PathBuf;

/// A finished AppImage.
///
/// # Examples
///
/// ```no_run
/// use magic_tools_appimage::bundler::{Bundler, Settings};
///
/// # async fn example(settings: Settings) -> magic_tools_appimage::bundler::Result<()> {
/// let artifact = Bundler::new(settings).bundle().await?;
/// println!("Created {}: {} bytes", artifact.path.display(), artifact.size);
/// println!("SHA256: {}", artifact.checksum);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundledArtifact {
    /// Location of `<AppName>-<Version>-<Arch>.AppImage`.
    pub path: PathBuf,

    /// Size of the artifact in bytes.
    pub size: u64,

    /// SHA-256 checksum of the artifact, hex encoded.
    pub checksum: String,
}
