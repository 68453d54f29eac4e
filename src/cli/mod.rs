//! CLI command handlers
//!
//! Bridges clap argument parsing with the audited repository and the audit
//! trail. Handlers print results with `println!`; diagnostics go through
//! `tracing` to stderr.

pub mod audit;
pub mod config;
pub mod demo;
pub mod store;

pub use audit::{
    handle_audit_command, handle_export_command, handle_local_audit_command, AuditArgs,
    ExportArgs, ExportFormat,
};
pub use config::handle_config_command;
pub use demo::run_demo;
pub use store::{handle_store_command, StoreCommands};
