//! # magic_tools_appimage
//!
//! Packages a script-based desktop toolkit into a single portable Linux
//! AppImage.
//!
//! ## Features
//!
//! - **AppDir staging**: FHS-style `usr/` tree, launcher shims, desktop entry and hicolor icon
//! - **Tool caching**: linuxdeploy and its AppImage plugin are downloaded once and reused
//! - **Layered configuration**: CLI flags, then `APP`/`VERSION`/`ARCH`, then `magic-tools-appimage.toml`
//! - **Deterministic naming**: the artifact is always `<AppName>-<Version>-<Arch>.AppImage`
//!
//! ## Usage
//!
//! ```bash
//! magic_tools_appimage                         # build with defaults
//! APP=MyToolkit VERSION=1.2.0 magic_tools_appimage build
//! magic_tools_appimage stage --json            # stage the AppDir only
//! magic_tools_appimage clean --tools           # remove outputs and cached tools
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;

pub use bundler::{BundledArtifact, Bundler, Settings, SettingsBuilder};
pub use cli::Args;
pub use config::PackagerConfig;
pub use error::{CliError, ConfigError, PackagerError, Result};
