//! Platform-specific bundling implementations.
//!
//! Only the Linux AppImage format is produced. The AppDir staging code is
//! portable, so the module is not gated on the host OS; running the packaging
//! tool itself requires Linux.

pub mod linux;
