//! Linux AppImage bundling.
//!
//! The pipeline is split by concern:
//!
//! - [`appdir`]: reset and staging of `<AppName>.AppDir`
//! - [`apprun`]: launcher shim scripts
//! - [`freedesktop`]: `.desktop` entry and hicolor icon
//! - [`tools`]: linuxdeploy and its AppImage plugin
//! - [`appimage`]: running linuxdeploy and naming the result
//!
//! # Build Requirements
//!
//! | Tool | Source |
//! |------|--------|
//! | `linuxdeploy` | downloaded, or `PATH` with `prefer_system_tools` |
//! | `linuxdeploy-plugin-appimage` | downloaded, or `PATH` with `prefer_system_tools` |
//!
//! # Output Location
//!
//! Everything is written to the project directory:
//! - `MagicTools.AppDir/` (staging, removed after a successful build by default)
//! - `MagicTools-0.1.0-x86_64.AppImage`

pub mod appdir;
pub mod appimage;
pub mod apprun;
pub mod freedesktop;
pub mod tools;
