//! Launcher shim generation.
//!
//! The shim is a POSIX shell script that resolves its own location at runtime,
//! derives the AppDir root from it and hands control to the interpreter with
//! the staged entry point. Two copies are written: `AppRun` at the AppDir root
//! (the AppImage entry point) and `usr/bin/<AppName>` (what `Exec=` names).

use crate::bundler::{
    error::Result,
    settings::Settings,
    utils::{fs, template},
};
use serde_json::json;
use std::path::Path;

const LAUNCHER_TEMPLATE: &str = r#"#!/bin/sh
# {{name}} launcher
HERE="$(dirname "$(readlink -f "${0}")")"
APPDIR="$(readlink -f "${HERE}/{{to_root}}")"
export PATH="${APPDIR}/usr/bin:${PATH}"
exec {{interpreter}} "${APPDIR}/usr/src/{{entry_point}}" "$@"
"#;

/// Where a shim lives relative to the AppDir root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimLocation {
    /// `AppRun` at the AppDir root.
    AppRun,
    /// `usr/bin/<AppName>`.
    UsrBin,
}

impl ShimLocation {
    fn to_root(self) -> &'static str {
        match self {
            ShimLocation::AppRun => ".",
            ShimLocation::UsrBin => "../..",
        }
    }
}

/// Renders the shim text for `location`.
pub fn render_launcher(settings: &Settings, location: ShimLocation) -> Result<String> {
    let launcher = settings.launcher();
    template::render(
        LAUNCHER_TEMPLATE,
        &json!({
            "name": settings.app_name(),
            "to_root": location.to_root(),
            "interpreter": launcher.interpreter.trim(),
            "entry_point": launcher.entry_point.trim_start_matches("./"),
        }),
    )
}

/// Writes the shim to `path` with mode `0755`.
pub async fn write_launcher(settings: &Settings, location: ShimLocation, path: &Path) -> Result<()> {
    let script = render_launcher(settings, location)?;
    fs::write_file(path, script).await?;
    fs::make_executable(path).await?;
    log::debug!("Wrote launcher shim {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{Arch, LauncherSettings, PackageSettings, SettingsBuilder};

    fn settings(launcher: LauncherSettings) -> Settings {
        SettingsBuilder::new()
            .project_directory("/work")
            .package_settings(PackageSettings {
                app_name: "MagicTools".into(),
                version: "0.1.0".into(),
                arch: Arch::X86_64,
                description: None,
            })
            .launcher_settings(launcher)
            .build()
            .unwrap()
    }

    #[test]
    fn app_run_resolves_from_its_own_directory() {
        let script = render_launcher(&settings(LauncherSettings::default()), ShimLocation::AppRun)
            .unwrap();
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains(r#"HERE="$(dirname "$(readlink -f "${0}")")""#));
        assert!(script.contains(r#"APPDIR="$(readlink -f "${HERE}/.")""#));
        assert!(script.contains(r#"exec python3 "${APPDIR}/usr/src/main.py" "$@""#));
    }

    #[test]
    fn usr_bin_shim_walks_up_two_levels() {
        let script = render_launcher(&settings(LauncherSettings::default()), ShimLocation::UsrBin)
            .unwrap();
        assert!(script.contains(r#"APPDIR="$(readlink -f "${HERE}/../..")""#));
    }

    #[test]
    fn custom_interpreter_and_entry_point() {
        let script = render_launcher(
            &settings(LauncherSettings {
                interpreter: "python3 -u".into(),
                entry_point: "./magic_tools/__main__.py".into(),
            }),
            ShimLocation::AppRun,
        )
        .unwrap();
        assert!(script.contains(r#"exec python3 -u "${APPDIR}/usr/src/magic_tools/__main__.py" "$@""#));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn written_shim_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("AppRun");
        write_launcher(&settings(LauncherSettings::default()), ShimLocation::AppRun, &path)
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
