//! FreeDesktop.org desktop entry and icon theme integration.
//!
//! This module handles creation of `.desktop` files and placement of the
//! application icon in the hicolor theme.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::Settings,
    utils::{fs, template},
};
use serde_json::json;
use std::path::{Path, PathBuf};

const DESKTOP_ENTRY_TEMPLATE: &str = "[Desktop Entry]
Type=Application
Name={{name}}
Exec={{name}}
Icon={{name}}
{{#if comment}}Comment={{comment}}
{{/if}}Categories={{categories}}
Terminal={{terminal}}
";

/// Renders the desktop entry for `settings`.
///
/// `Name`, `Exec` and `Icon` are all the application name. The comment falls
/// back to the package description; line breaks in it are flattened because
/// desktop entry values are single-line.
pub fn render_desktop_entry(settings: &Settings) -> Result<String> {
    let desktop = settings.desktop();
    let comment = desktop
        .comment
        .as_deref()
        .or(settings.package().description.as_deref())
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let categories: String = desktop
        .categories
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| format!("{c};"))
        .collect();

    template::render(
        DESKTOP_ENTRY_TEMPLATE,
        &json!({
            "name": settings.app_name(),
            "comment": comment,
            "categories": categories,
            "terminal": desktop.terminal,
        }),
    )
}

/// Writes `<AppName>.desktop` into `applications_dir`.
pub async fn create_desktop_file(settings: &Settings, applications_dir: &Path) -> Result<PathBuf> {
    let desktop_file = applications_dir.join(format!("{}.desktop", settings.app_name()));
    let entry = render_desktop_entry(settings)?;
    fs::write_file(&desktop_file, entry).await?;
    log::debug!("Wrote desktop entry {}", desktop_file.display());
    Ok(desktop_file)
}

/// Copies the icon into `<hicolor_dir>/<W>x<H>/apps/<AppName>.png`.
///
/// The icon must be a square PNG; its dimensions pick the theme size directory.
pub async fn install_icon(settings: &Settings, hicolor_dir: &Path) -> Result<PathBuf> {
    let icon_path = settings.icon_path().to_path_buf();

    if !icon_path.is_file() {
        return Err(Error::Fs {
            context: "locating icon",
            path: icon_path,
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "icon file not found"),
        });
    }
    let is_png = icon_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if !is_png {
        return Err(Error::InvalidSetting {
            field: "icon",
            reason: format!("{} is not a PNG file", icon_path.display()),
        });
    }

    let probe = icon_path.clone();
    let (width, height) = tokio::task::spawn_blocking(move || image::image_dimensions(&probe))
        .await
        .map_err(|e| Error::GenericError(format!("Icon inspection task failed: {}", e)))??;

    if width != height {
        return Err(Error::IconNotSquare {
            path: icon_path,
            width,
            height,
        });
    }

    let apps_dir = hicolor_dir.join(format!("{width}x{height}")).join("apps");
    tokio::fs::create_dir_all(&apps_dir)
        .await
        .fs_context("creating icon size directory", &apps_dir)?;

    let dest = apps_dir.join(format!("{}.png", settings.app_name()));
    fs::copy_file(&icon_path, &dest).await?;

    log::debug!("Installed {}x{} icon to {}", width, height, dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{Arch, DesktopSettings, PackageSettings, SettingsBuilder};

    fn settings(name: &str, desktop: DesktopSettings, description: Option<&str>) -> Settings {
        SettingsBuilder::new()
            .project_directory("/work")
            .package_settings(PackageSettings {
                app_name: name.into(),
                version: "0.1.0".into(),
                arch: Arch::X86_64,
                description: description.map(str::to_owned),
            })
            .desktop_settings(desktop)
            .build()
            .unwrap()
    }

    #[test]
    fn desktop_entry_uses_app_name_for_name_exec_and_icon() {
        for name in ["MagicTools", "MyToolkit", "tool-2.0_x"] {
            let entry = render_desktop_entry(&settings(name, DesktopSettings::default(), None))
                .unwrap();
            assert!(entry.starts_with("[Desktop Entry]\n"));
            assert!(entry.contains(&format!("\nName={name}\n")));
            assert!(entry.contains(&format!("\nExec={name}\n")));
            assert!(entry.contains(&format!("\nIcon={name}\n")));
        }
    }

    #[test]
    fn desktop_entry_defaults() {
        let entry =
            render_desktop_entry(&settings("MagicTools", DesktopSettings::default(), None))
                .unwrap();
        assert_eq!(
            entry,
            "[Desktop Entry]\nType=Application\nName=MagicTools\nExec=MagicTools\n\
             Icon=MagicTools\nCategories=Utility;\nTerminal=false\n"
        );
    }

    #[test]
    fn desktop_entry_comment_falls_back_to_description() {
        let entry = render_desktop_entry(&settings(
            "MagicTools",
            DesktopSettings::default(),
            Some("Quick launcher\nwith AI chat"),
        ))
        .unwrap();
        assert!(entry.contains("\nComment=Quick launcher with AI chat\n"));
    }

    #[test]
    fn desktop_entry_joins_categories() {
        let desktop = DesktopSettings {
            categories: vec!["Utility".into(), " Development ".into(), "".into()],
            comment: Some("Launcher".into()),
            terminal: true,
        };
        let entry = render_desktop_entry(&settings("MagicTools", desktop, None)).unwrap();
        assert!(entry.contains("\nCategories=Utility;Development;\n"));
        assert!(entry.contains("\nComment=Launcher\n"));
        assert!(entry.contains("\nTerminal=true\n"));
    }
}
