//! AppImage creation - runs linuxdeploy over a staged AppDir.

use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    platform::linux::{appdir::StagedAppDir, tools::PackagingTools},
    settings::Settings,
    utils::fs,
};
use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Where linuxdeploy is told to write the image before it is moved to its final name.
pub fn intermediate_output_path(settings: &Settings) -> PathBuf {
    settings
        .project_directory()
        .join(format!(".{}.partial", settings.artifact_file_name()))
}

/// Invokes linuxdeploy and moves the produced image to
/// `<AppName>-<Version>-<Arch>.AppImage` in the project directory.
///
/// linuxdeploy runs in the project directory with the tools directory first on
/// `PATH`. `APP`, `VERSION`, `ARCH` and `OUTPUT` are exported for it and its
/// AppImage plugin.
pub async fn bundle_project(
    settings: &Settings,
    tools: &PackagingTools,
    staged: &StagedAppDir,
) -> Result<PathBuf> {
    log::info!("Building AppImage for {}", settings.app_name());

    let intermediate = intermediate_output_path(settings);
    fs::remove_file(&intermediate).await?;

    let before = snapshot_candidates(settings, tools)?;
    run_linuxdeploy(settings, tools, staged, &intermediate).await?;

    let produced = if intermediate.is_file() {
        intermediate
    } else {
        find_produced_artifact(settings, tools, &before)?
            .context("linuxdeploy finished but produced no AppImage")?
    };

    let artifact = settings.artifact_path();
    if produced != artifact {
        tokio::fs::rename(&produced, &artifact)
            .await
            .fs_context("moving AppImage into place", &artifact)?;
    }
    fs::make_executable(&artifact).await?;

    log::info!("✓ Created AppImage: {}", artifact.display());
    Ok(artifact)
}

async fn run_linuxdeploy(
    settings: &Settings,
    tools: &PackagingTools,
    staged: &StagedAppDir,
    output: &Path,
) -> Result<()> {
    let arch = settings.arch().appimage_name();
    let command = tools.linuxdeploy.display().to_string();

    let status = tokio::process::Command::new(&tools.linuxdeploy)
        .current_dir(settings.project_directory())
        .env("PATH", search_path(tools)?)
        .env("APP", settings.app_name())
        .env("VERSION", settings.version())
        .env("LINUXDEPLOY_OUTPUT_VERSION", settings.version())
        .env("ARCH", arch)
        .env("OUTPUT", output)
        .env("APPIMAGE_EXTRACT_AND_RUN", "1")
        .arg("--appdir")
        .arg(staged.layout.root())
        .arg("--icon-file")
        .arg(&staged.icon_file)
        .arg("--desktop-file")
        .arg(&staged.desktop_file)
        .arg("--custom-apprun")
        .arg(staged.layout.app_run())
        .args(["--output", "appimage"])
        .status()
        .await
        .map_err(|error| Error::CommandFailed { command, error })?;

    if !status.success() {
        return Err(Error::ToolFailed {
            tool: "linuxdeploy".into(),
            code: status.code(),
        });
    }
    Ok(())
}

fn search_path(tools: &PackagingTools) -> Result<OsString> {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let dirs = tools
        .search_dirs()
        .into_iter()
        .chain(std::env::split_paths(&inherited));
    std::env::join_paths(dirs)
        .map_err(|e| Error::GenericError(format!("tools directory cannot be put on PATH: {e}")))
}

/// Modification time and size of a candidate image.
type Stamp = (SystemTime, u64);

/// `<AppName>*.AppImage` files directly inside the project directory, minus the
/// packaging tools themselves.
fn snapshot_candidates(
    settings: &Settings,
    tools: &PackagingTools,
) -> Result<HashMap<PathBuf, Stamp>> {
    let pattern = glob::Pattern::new(&format!(
        "{}*.AppImage",
        glob::Pattern::escape(settings.app_name())
    ))?;
    let project_dir = settings.project_directory();

    let mut candidates = HashMap::new();
    let entries = std::fs::read_dir(project_dir).fs_context("listing project directory", project_dir)?;
    for entry in entries {
        let entry = entry.fs_context("listing project directory", project_dir)?;
        let path = entry.path();
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| pattern.matches(name));
        if !matches || path == tools.linuxdeploy || path == tools.appimage_plugin {
            continue;
        }
        let metadata = entry
            .metadata()
            .fs_context("reading AppImage metadata", &path)?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()
            .fs_context("reading AppImage metadata", &path)?;
        candidates.insert(path, (modified, metadata.len()));
    }
    Ok(candidates)
}

/// Newest candidate that is new or changed compared to `before`.
fn find_produced_artifact(
    settings: &Settings,
    tools: &PackagingTools,
    before: &HashMap<PathBuf, Stamp>,
) -> Result<Option<PathBuf>> {
    let newest = snapshot_candidates(settings, tools)?
        .into_iter()
        .filter(|(path, stamp)| before.get(path) != Some(stamp))
        .max_by(|(a_path, (a_time, _)), (b_path, (b_time, _))| {
            a_time.cmp(b_time).then_with(|| a_path.cmp(b_path))
        })
        .map(|(path, _)| path);

    if let Some(path) = &newest {
        log::debug!("linuxdeploy ignored OUTPUT, using {}", path.display());
    }
    Ok(newest)
}
