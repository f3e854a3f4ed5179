//! AppDir staging.
//!
//! Builds `<AppName>.AppDir` from scratch: reset, directory layout, source
//! tree copy, launcher shims, desktop entry and icon. Nothing here touches the
//! network or runs external tools.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    platform::linux::{
        apprun::{self, ShimLocation},
        freedesktop,
    },
    settings::Settings,
    utils::fs,
};
use std::{
    io,
    path::{Path, PathBuf},
};

/// Paths inside an AppDir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirLayout {
    root: PathBuf,
}

impl AppDirLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The AppDir itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `AppRun`
    pub fn app_run(&self) -> PathBuf {
        self.root.join("AppRun")
    }

    /// `usr/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("usr/bin")
    }

    /// `usr/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("usr/lib")
    }

    /// `usr/src`, where the application source tree lands.
    pub fn src_dir(&self) -> PathBuf {
        self.root.join("usr/src")
    }

    /// `usr/share/applications`
    pub fn applications_dir(&self) -> PathBuf {
        self.root.join("usr/share/applications")
    }

    /// `usr/share/icons/hicolor`
    pub fn hicolor_dir(&self) -> PathBuf {
        self.root.join("usr/share/icons/hicolor")
    }

    /// Directories created before anything is copied in.
    pub fn directories(&self) -> [PathBuf; 5] {
        [
            self.bin_dir(),
            self.lib_dir(),
            self.src_dir(),
            self.applications_dir(),
            self.hicolor_dir(),
        ]
    }
}

/// A fully staged AppDir, ready for the packaging tool.
#[derive(Debug, Clone)]
pub struct StagedAppDir {
    /// Directory layout.
    pub layout: AppDirLayout,
    /// Generated desktop entry.
    pub desktop_file: PathBuf,
    /// Installed icon.
    pub icon_file: PathBuf,
    /// Number of source files copied.
    pub source_files: usize,
}

/// Fails unless the source directory and icon exist.
///
/// Runs before any destructive step so a misconfigured run leaves the
/// previous build untouched.
pub fn preflight(settings: &Settings) -> Result<()> {
    if !settings.source_directory().is_dir() {
        return Err(Error::Fs {
            context: "locating source directory",
            path: settings.source_directory().to_path_buf(),
            error: io::Error::new(io::ErrorKind::NotFound, "source directory not found"),
        });
    }
    if !settings.icon_path().is_file() {
        return Err(Error::Fs {
            context: "locating icon",
            path: settings.icon_path().to_path_buf(),
            error: io::Error::new(io::ErrorKind::NotFound, "icon file not found"),
        });
    }
    Ok(())
}

/// Removes the previous AppDir and artifact.
pub async fn reset(settings: &Settings) -> Result<()> {
    fs::remove_dir_all(&settings.app_dir()).await?;
    fs::remove_file(&settings.artifact_path()).await?;
    Ok(())
}

/// Assembles the AppDir. Expects [`reset`] to have run.
pub async fn stage(settings: &Settings) -> Result<StagedAppDir> {
    let layout = AppDirLayout::new(settings.app_dir());

    for dir in layout.directories() {
        tokio::fs::create_dir_all(&dir)
            .await
            .fs_context("creating AppDir structure", &dir)?;
    }

    let source_files = fs::copy_dir_contents(settings.source_directory(), &layout.src_dir()).await?;
    log::info!(
        "Copied {} source file{} from {}",
        source_files,
        if source_files == 1 { "" } else { "s" },
        settings.source_directory().display()
    );

    apprun::write_launcher(settings, ShimLocation::AppRun, &layout.app_run()).await?;
    apprun::write_launcher(
        settings,
        ShimLocation::UsrBin,
        &layout.bin_dir().join(settings.app_name()),
    )
    .await?;

    let desktop_file = freedesktop::create_desktop_file(settings, &layout.applications_dir()).await?;
    let icon_file = freedesktop::install_icon(settings, &layout.hicolor_dir()).await?;

    Ok(StagedAppDir {
        layout,
        desktop_file,
        icon_file,
        source_files,
    })
}
