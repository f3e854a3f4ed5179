//! Filesystem, network and template helpers shared by the packaging steps.

pub mod fs;
pub mod http;
pub mod template;
