//! audited-store - document store access with a forensic audit trail
//!
//! This library wraps create/read/update/delete operations on a single
//! document collection. Every attempt is attributed to an explicit caller and
//! recorded in an append-only audit collection; reads additionally capture
//! the store's query plan. Store and audit failures never escape a CRUD call:
//! they become safe return values plus audit entries.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths, settings and connection resolution
//! - `error`: Custom error types
//! - `models`: Documents, filters, values and caller identities
//! - `store`: Collection contract, bundled stores and connection providers
//! - `audit`: Audit entries, sinks and the local mirror
//! - `inspect`: Bounded-time query plan capture
//! - `repository`: The audited repository
//! - `export`: Audit trail export
//! - `logging`: Tracing subscriber setup
//! - `cli`: Command handlers for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use audited_store::config::{Settings, StorePaths};
//! use audited_store::store::LocalProvider;
//! use audited_store::{doc, AuditedRepository, Filter};
//!
//! let settings = Settings::default();
//! let provider = LocalProvider::in_memory(&settings);
//! let repo = AuditedRepository::from_provider(&provider, &settings, &StorePaths::new()?)?;
//!
//! repo.create("alice", doc! { "name" => "Fido", "species" => "Dog" })?;
//! let dogs = repo.read("bob", &Filter::new(doc! { "species" => "Dog" }), 0)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod inspect;
pub mod logging;
pub mod models;
pub mod repository;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::{Document, Filter, Identity, Value};
pub use repository::{AuditedRepository, IndexOutcome};
