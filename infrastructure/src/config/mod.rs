//! Configuration loading

pub mod file_config;
pub mod loader;

pub use file_config::{BackendConfig, FileConfig, OrchestratorConfig};
pub use loader::ConfigLoader;
