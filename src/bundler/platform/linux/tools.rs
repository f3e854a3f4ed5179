//! Packaging tool acquisition.
//!
//! linuxdeploy builds the AppImage; it hands the final squashfs step to
//! `linuxdeploy-plugin-appimage`, which it discovers on `PATH`. Both are
//! fetched once into the tools directory and reused on later runs.

use crate::bundler::{
    error::{Context, ErrorExt, Result},
    settings::{Arch, Settings},
    utils::{fs, http},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Resolved tool locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagingTools {
    /// `linuxdeploy` executable.
    pub linuxdeploy: PathBuf,
    /// `linuxdeploy-plugin-appimage` executable.
    pub appimage_plugin: PathBuf,
}

impl PackagingTools {
    /// Directories that must be on `PATH` for linuxdeploy to find its plugin.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for tool in [&self.appimage_plugin, &self.linuxdeploy] {
            if let Some(parent) = tool.parent()
                && !dirs.iter().any(|d| d == parent)
            {
                dirs.push(parent.to_path_buf());
            }
        }
        dirs
    }
}

/// `linuxdeploy-<arch>.AppImage`
pub fn linuxdeploy_file_name(arch: Arch) -> String {
    format!("linuxdeploy-{}.AppImage", arch.linuxdeploy_name())
}

/// `linuxdeploy-plugin-appimage-<arch>.AppImage`
pub fn appimage_plugin_file_name(arch: Arch) -> String {
    format!("linuxdeploy-plugin-appimage-{}.AppImage", arch.linuxdeploy_name())
}

/// Cached tool paths inside the tools directory, whether or not they exist yet.
pub fn cached_tool_paths(settings: &Settings) -> [PathBuf; 2] {
    let dir = &settings.tools().tools_dir;
    [
        dir.join(linuxdeploy_file_name(settings.arch())),
        dir.join(appimage_plugin_file_name(settings.arch())),
    ]
}

/// Cached tools plus any interrupted downloads of them.
pub fn cached_tool_files(settings: &Settings) -> Vec<PathBuf> {
    cached_tool_paths(settings)
        .into_iter()
        .flat_map(|path| {
            let partial = http::partial_path(&path);
            [path, partial]
        })
        .collect()
}

/// Makes sure both tools are available, downloading whichever is missing.
pub async fn ensure_tools(settings: &Settings) -> Result<PackagingTools> {
    let tools = settings.tools();

    if tools.prefer_system_tools
        && let Some(found) = system_tools()
    {
        log::info!("Using linuxdeploy from PATH: {}", found.linuxdeploy.display());
        return Ok(found);
    }

    tokio::fs::create_dir_all(&tools.tools_dir)
        .await
        .fs_context("creating tools directory", &tools.tools_dir)?;

    let arch = settings.arch();
    let linuxdeploy = ensure_tool(
        &tools.tools_dir,
        &tools.linuxdeploy_base_url,
        &linuxdeploy_file_name(arch),
    )
    .await
    .context("failed to download linuxdeploy tool")?;

    let appimage_plugin = ensure_tool(
        &tools.tools_dir,
        &tools.appimage_plugin_base_url,
        &appimage_plugin_file_name(arch),
    )
    .await
    .context("failed to download linuxdeploy AppImage plugin")?;

    Ok(PackagingTools {
        linuxdeploy,
        appimage_plugin,
    })
}

fn system_tools() -> Option<PackagingTools> {
    let linuxdeploy = which::which("linuxdeploy").ok()?;
    let appimage_plugin = which::which("linuxdeploy-plugin-appimage").ok()?;
    Some(PackagingTools {
        linuxdeploy,
        appimage_plugin,
    })
}

/// Fetches `<base_url>/<file_name>` into `tools_dir` unless it is already there.
///
/// Returns early if the tool is already cached; either way the result is marked
/// executable.
async fn ensure_tool(tools_dir: &Path, base_url: &str, file_name: &str) -> Result<PathBuf> {
    let tool_path = tools_dir.join(file_name);

    if tool_path.is_file() {
        log::debug!("{} already cached at {}", file_name, tool_path.display());
    } else {
        let url = format!("{}/{}", base_url.trim_end_matches('/'), file_name);
        let size = http::download_to_file(&url, &tool_path).await?;
        if size == 0 {
            fs::remove_file(&tool_path).await?;
            crate::bail!("downloaded {} from {} is empty", file_name, url);
        }
    }

    fs::make_executable(&tool_path).await?;
    Ok(tool_path)
}
