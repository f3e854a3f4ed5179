//! Bundle orchestration.
//!
//! [`Bundler`] runs the AppImage pipeline as a strict sequence. Each step is
//! awaited before the next starts and the first error aborts the run:
//!
//! 1. Preflight: source directory and icon exist
//! 2. Reset: previous AppDir and artifact removed
//! 3. Stage: layout, source copy, launcher shims, desktop entry, icon
//! 4. Fetch linuxdeploy and its AppImage plugin (cached)
//! 5. Run linuxdeploy and move the image to its final name
//! 6. Checksum the artifact and drop the AppDir
//!
//! # Example
//!
//! ```no_run
//! use magic_tools_appimage::bundler::{Arch, Bundler, PackageSettings, SettingsBuilder};
//!
//! # async fn example() -> magic_tools_appimage::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .project_directory(".")
//!     .package_settings(PackageSettings {
//!         app_name: "MagicTools".into(),
//!         version: "0.1.0".into(),
//!         arch: Arch::host()?,
//!         description: None,
//!     })
//!     .build()?;
//!
//! let artifact = Bundler::new(settings).bundle().await?;
//! println!("{} ({} bytes, sha256 {})", artifact.path.display(), artifact.size, artifact.checksum);
//! # Ok(())
//! # }
//! ```

use crate::bundler::{
    BundledArtifact, Result, Settings,
    error::ErrorExt,
    platform::linux::{
        appdir::{self, StagedAppDir},
        appimage,
        tools::{self, PackagingTools},
    },
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Main bundler orchestrator.
#[derive(Debug, Clone)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a bundler for `settings`.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Settings this bundler runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs preflight, reset and staging. No network access, no external tools.
    pub async fn stage(&self) -> Result<StagedAppDir> {
        appdir::preflight(&self.settings)?;
        appdir::reset(&self.settings).await?;
        appdir::stage(&self.settings).await
    }

    /// Runs the full pipeline and returns the finished artifact.
    pub async fn bundle(&self) -> Result<BundledArtifact> {
        let staged = self.stage().await?;
        let tools = tools::ensure_tools(&self.settings).await?;
        let path = appimage::bundle_project(&self.settings, &tools, &staged).await?;

        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading artifact metadata", &path)?
            .len();
        let checksum = calculate_sha256(&path).await?;

        if !self.settings.keep_app_dir() {
            fs::remove_dir_all(staged.layout.root()).await?;
            log::debug!("Removed {}", staged.layout.root().display());
        }

        Ok(BundledArtifact {
            path,
            size,
            checksum,
        })
    }

    /// Removes the AppDir and artifact, plus the cached tools and their partial
    /// downloads when `include_tools` is set. Returns the paths that existed and
    /// were removed.
    pub async fn clean(&self, include_tools: bool) -> Result<Vec<PathBuf>> {
        let mut targets = vec![
            self.settings.app_dir(),
            self.settings.artifact_path(),
            appimage::intermediate_output_path(&self.settings),
        ];
        if include_tools {
            targets.extend(tools::cached_tool_files(&self.settings));
        }

        let mut removed = Vec::new();
        for target in targets {
            let Ok(metadata) = tokio::fs::symlink_metadata(&target).await else {
                continue;
            };
            if metadata.is_dir() {
                fs::remove_dir_all(&target).await?;
            } else {
                fs::remove_file(&target).await?;
            }
            log::info!("Removed {}", target.display());
            removed.push(target);
        }
        Ok(removed)
    }

    /// Tools the next [`bundle`](Self::bundle) would use, downloading as needed.
    pub async fn tools(&self) -> Result<PackagingTools> {
        tools::ensure_tools(&self.settings).await
    }
}

/// Calculates the SHA-256 checksum of a file.
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use tokio::io::AsyncReadExt;

    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Calculates a SHA-256 fingerprint of a directory tree.
///
/// Paths are visited in sorted order and each entry contributes its relative
/// path, its kind, and its content (or symlink target), so two trees with the
/// same layout and bytes always hash the same.
pub async fn calculate_directory_sha256(dir_path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};

    let mut entries = walkdir::WalkDir::new(dir_path)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let mut hasher = Sha256::new();
    for entry in entries {
        let rel_path = entry.path().strip_prefix(dir_path)?;
        hasher.update(rel_path.to_string_lossy().as_bytes());
        hasher.update([0]);

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            let target = tokio::fs::read_link(entry.path())
                .await
                .fs_context("reading symlink", entry.path())?;
            hasher.update(b"l");
            hasher.update(target.to_string_lossy().as_bytes());
        } else if file_type.is_dir() {
            hasher.update(b"d");
        } else {
            let contents = tokio::fs::read(entry.path())
                .await
                .fs_context("reading file for hash calculation", entry.path())?;
            hasher.update(b"f");
            hasher.update(&contents);
        }
        hasher.update([0]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sha256_of_known_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            calculate_sha256(&path).await.unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn directory_fingerprint_tracks_content_and_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("tree");
        std::fs::create_dir_all(dir.join("usr/src")).unwrap();
        std::fs::write(dir.join("usr/src/main.py"), "print(1)\n").unwrap();

        let first = calculate_directory_sha256(&dir).await.unwrap();
        assert_eq!(first, calculate_directory_sha256(&dir).await.unwrap());

        std::fs::write(dir.join("usr/src/main.py"), "print(2)\n").unwrap();
        let changed = calculate_directory_sha256(&dir).await.unwrap();
        assert_ne!(first, changed);

        std::fs::create_dir(dir.join("usr/lib")).unwrap();
        assert_ne!(changed, calculate_directory_sha256(&dir).await.unwrap());
    }
}
