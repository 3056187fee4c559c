//! Configuration and dependency wiring for the importer.

mod dependencies;
mod import_config;

pub use dependencies::Dependencies;
pub use import_config::ImportConfig;
