//! Configuration module for audited-store
//!
//! - Data directory resolution
//! - Settings persistence with environment overrides
//! - Store connection settings and descriptor resolution

pub mod connection;
pub mod paths;
pub mod settings;

pub use connection::{ConnectionDescriptor, ConnectionSettings};
pub use paths::StorePaths;
pub use settings::Settings;
