pub mod appconfig;
pub mod catalog;
pub mod configxml;
pub mod cordova;
pub mod project;
pub mod resources;

/// Version string sent to the image service with every request.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
