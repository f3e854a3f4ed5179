#[cfg(all(test, unix))]
mod tests {
    use magic_tools_appimage::bundler::{
        Arch, Bundler, Error, PackageSettings, Settings, SettingsBuilder, ToolSettings,
        calculate_directory_sha256, calculate_sha256,
    };
    use std::path::{Path, PathBuf};

    const FAKE_LINUXDEPLOY: &str = r#"#!/bin/sh
echo "$@" > linuxdeploy.args
printf '%s %s %s' "$APP" "$VERSION" "$ARCH" > "$OUTPUT"
"#;

    const OUTPUT_IGNORING_LINUXDEPLOY: &str = r#"#!/bin/sh
printf image > "$APP-$ARCH.AppImage"
"#;

    const FAILING_LINUXDEPLOY: &str = "#!/bin/sh\ntouch linuxdeploy.args\nexit 3\n";

    struct Project {
        dir: tempfile::TempDir,
    }

    impl Project {
        fn new(app_name: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path();
            std::fs::create_dir_all(root.join("src/tools")).unwrap();
            std::fs::write(root.join("src/main.py"), "print('hello')\n").unwrap();
            std::fs::write(root.join("src/tools/extra.py"), "VALUE = 1\n").unwrap();
            std::fs::create_dir_all(root.join("assets")).unwrap();
            image::RgbaImage::new(32, 32)
                .save(root.join(format!("assets/{app_name}.png")))
                .unwrap();
            Self { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn seed_tools(&self, linuxdeploy: &str) {
            std::fs::write(self.root().join("linuxdeploy-x86_64.AppImage"), linuxdeploy).unwrap();
            std::fs::write(
                self.root().join("linuxdeploy-plugin-appimage-x86_64.AppImage"),
                "#!/bin/sh\nexit 0\n",
            )
            .unwrap();
        }

        fn settings(&self, app_name: &str) -> Settings {
            SettingsBuilder::new()
                .project_directory(self.root())
                .package_settings(PackageSettings {
                    app_name: app_name.into(),
                    version: "0.1.0".into(),
                    arch: Arch::X86_64,
                    description: Some("Quick launcher".into()),
                })
                .tool_settings(ToolSettings {
                    linuxdeploy_base_url: "http://127.0.0.1:9/linuxdeploy".into(),
                    appimage_plugin_base_url: "http://127.0.0.1:9/plugin".into(),
                    ..ToolSettings::default()
                })
                .build()
                .unwrap()
        }

        fn linuxdeploy_ran(&self) -> bool {
            self.root().join("linuxdeploy.args").exists()
        }
    }

    #[tokio::test]
    async fn test_build_produces_named_artifact() {
        let project = Project::new("MyToolkit");
        project.seed_tools(FAKE_LINUXDEPLOY);

        let artifact = Bundler::new(project.settings("MyToolkit"))
            .bundle()
            .await
            .unwrap();

        assert_eq!(
            artifact.path,
            project.root().join("MyToolkit-0.1.0-x86_64.AppImage")
        );
        assert!(artifact.path.is_file());
        assert_eq!(
            std::fs::read_to_string(&artifact.path).unwrap(),
            "MyToolkit 0.1.0 x86_64"
        );
        assert_eq!(artifact.size, "MyToolkit 0.1.0 x86_64".len() as u64);
        assert_eq!(artifact.checksum, calculate_sha256(&artifact.path).await.unwrap());

        assert!(!project.root().join("MyToolkit.AppDir").exists());
        assert!(!project.root().join(".MyToolkit-0.1.0-x86_64.AppImage.partial").exists());

        let args = std::fs::read_to_string(project.root().join("linuxdeploy.args")).unwrap();
        assert!(args.contains("--appdir"));
        assert!(args.contains("--output appimage"));
        assert!(args.contains("MyToolkit.desktop"));
    }

    #[tokio::test]
    async fn test_image_written_outside_output_is_found() {
        for _ in 0..5 {
            let project = Project::new("MyToolkit");
            project.seed_tools(OUTPUT_IGNORING_LINUXDEPLOY);
            std::fs::write(project.root().join("MyToolkit-old.AppImage"), "old").unwrap();

            let artifact = Bundler::new(project.settings("MyToolkit"))
                .bundle()
                .await
                .unwrap();

            assert_eq!(
                artifact.path,
                project.root().join("MyToolkit-0.1.0-x86_64.AppImage")
            );
            assert_eq!(std::fs::read_to_string(&artifact.path).unwrap(), "image");
            assert!(!project.root().join("MyToolkit-x86_64.AppImage").exists());
            assert!(project.root().join("MyToolkit-old.AppImage").exists());
        }
    }

    #[tokio::test]
    async fn test_keep_app_dir_leaves_staging_tree() {
        let project = Project::new("MagicTools");
        project.seed_tools(FAKE_LINUXDEPLOY);

        let settings = SettingsBuilder::new()
            .project_directory(project.root())
            .package_settings(project.settings("MagicTools").package().clone())
            .keep_app_dir(true)
            .build()
            .unwrap();
        Bundler::new(settings).bundle().await.unwrap();

        assert!(project.root().join("MagicTools.AppDir/AppRun").is_file());
    }

    #[tokio::test]
    async fn test_missing_icon_aborts_before_tools_run() {
        let project = Project::new("MagicTools");
        project.seed_tools(FAKE_LINUXDEPLOY);
        std::fs::remove_file(project.root().join("assets/MagicTools.png")).unwrap();

        let err = Bundler::new(project.settings("MagicTools"))
            .bundle()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("locating icon"));
        assert!(!project.linuxdeploy_ran());
        assert!(!project.root().join("MagicTools.AppDir").exists());
    }

    #[tokio::test]
    async fn test_missing_icon_keeps_previous_artifact() {
        let project = Project::new("MagicTools");
        let previous = project.root().join("MagicTools-0.1.0-x86_64.AppImage");
        std::fs::write(&previous, "previous build").unwrap();
        std::fs::remove_file(project.root().join("assets/MagicTools.png")).unwrap();

        Bundler::new(project.settings("MagicTools"))
            .stage()
            .await
            .unwrap_err();

        assert!(previous.is_file());
    }

    #[tokio::test]
    async fn test_non_square_icon_is_rejected() {
        let project = Project::new("MagicTools");
        image::RgbaImage::new(48, 32)
            .save(project.root().join("assets/MagicTools.png"))
            .unwrap();

        let err = Bundler::new(project.settings("MagicTools"))
            .stage()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::IconNotSquare {
                width: 48,
                height: 32,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_source_directory_still_builds() {
        let project = Project::new("MagicTools");
        project.seed_tools(FAKE_LINUXDEPLOY);
        std::fs::remove_dir_all(project.root().join("src")).unwrap();
        std::fs::create_dir(project.root().join("src")).unwrap();

        let bundler = Bundler::new(project.settings("MagicTools"));
        let staged = bundler.stage().await.unwrap();
        assert_eq!(staged.source_files, 0);
        assert!(staged.layout.src_dir().is_dir());

        let artifact = bundler.bundle().await.unwrap();
        assert!(artifact.path.is_file());
    }

    #[tokio::test]
    async fn test_staged_layout() {
        let project = Project::new("MagicTools");
        let staged = Bundler::new(project.settings("MagicTools"))
            .stage()
            .await
            .unwrap();

        let root = project.root().join("MagicTools.AppDir");
        for relative in [
            "AppRun",
            "usr/bin/MagicTools",
            "usr/lib",
            "usr/src/main.py",
            "usr/src/tools/extra.py",
            "usr/share/applications/MagicTools.desktop",
            "usr/share/icons/hicolor/32x32/apps/MagicTools.png",
        ] {
            assert!(root.join(relative).exists(), "missing {relative}");
        }
        assert_eq!(staged.source_files, 2);
        assert_eq!(staged.icon_file, root.join("usr/share/icons/hicolor/32x32/apps/MagicTools.png"));

        let desktop = std::fs::read_to_string(&staged.desktop_file).unwrap();
        assert!(desktop.starts_with("[Desktop Entry]\n"));
        assert!(desktop.contains("Name=MagicTools\n"));
        assert!(desktop.contains("Exec=MagicTools\n"));
        assert!(desktop.contains("Icon=MagicTools\n"));

        let app_run = std::fs::read_to_string(root.join("AppRun")).unwrap();
        assert!(app_run.contains("usr/src/main.py"));
    }

    #[tokio::test]
    async fn test_staging_is_reproducible() {
        let project = Project::new("MagicTools");
        let bundler = Bundler::new(project.settings("MagicTools"));

        let first = bundler.stage().await.unwrap();
        let first = calculate_directory_sha256(first.layout.root()).await.unwrap();
        let second = bundler.stage().await.unwrap();
        let second = calculate_directory_sha256(second.layout.root()).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_stale_app_dir_content_is_removed() {
        let project = Project::new("MagicTools");
        let stale = project.root().join("MagicTools.AppDir/usr/src/stale.py");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        Bundler::new(project.settings("MagicTools"))
            .stage()
            .await
            .unwrap();

        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_tool_failure_reports_exit_code() {
        let project = Project::new("MagicTools");
        project.seed_tools(FAILING_LINUXDEPLOY);

        let err = Bundler::new(project.settings("MagicTools"))
            .bundle()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ToolFailed { code: Some(3), .. }));
        assert!(project.linuxdeploy_ran());
        assert!(!project.root().join("MagicTools-0.1.0-x86_64.AppImage").exists());
    }

    #[tokio::test]
    async fn test_clean_removes_outputs_and_optionally_tools() {
        let project = Project::new("MagicTools");
        project.seed_tools(FAKE_LINUXDEPLOY);
        let settings = SettingsBuilder::new()
            .project_directory(project.root())
            .package_settings(project.settings("MagicTools").package().clone())
            .keep_app_dir(true)
            .build()
            .unwrap();
        let bundler = Bundler::new(settings);
        bundler.bundle().await.unwrap();

        let removed = bundler.clean(false).await.unwrap();
        assert_eq!(
            removed,
            vec![
                project.root().join("MagicTools.AppDir"),
                project.root().join("MagicTools-0.1.0-x86_64.AppImage"),
            ]
        );
        assert!(project.root().join("linuxdeploy-x86_64.AppImage").exists());

        let interrupted = project
            .root()
            .join("linuxdeploy-plugin-appimage-x86_64.AppImage.part");
        std::fs::write(&interrupted, "half a download").unwrap();

        let removed: Vec<PathBuf> = bundler.clean(true).await.unwrap();
        assert_eq!(removed.len(), 3);
        assert!(removed.contains(&interrupted));
        assert!(!project.root().join("linuxdeploy-x86_64.AppImage").exists());
        assert!(!interrupted.exists());
        assert!(bundler.clean(true).await.unwrap().is_empty());
    }
}
