//! Connection providers
//!
//! A [`ConnectionProvider`] hands out live handles to the primary collection
//! and the audit collection of one logical database. [`LocalProvider`] covers
//! the bundled `memory://` and `file://` stores; other descriptors need a
//! provider supplied by the embedding application.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use super::file::FileCollection;
use super::memory::MemoryCollection;
use super::Collection;
use crate::config::{ConnectionDescriptor, Settings, StorePaths};
use crate::error::{StoreError, StoreResult};

/// Supplies ready-to-use collection handles
pub trait ConnectionProvider: Send + Sync {
    /// Collection the repository performs CRUD against
    fn primary_collection(&self) -> Arc<dyn Collection>;

    /// Collection receiving audit entries, in the same database
    fn audit_collection(&self) -> Arc<dyn Collection>;
}

/// Provider for the stores bundled with this crate
pub struct LocalProvider {
    primary: Arc<dyn Collection>,
    audit: Arc<dyn Collection>,
}

impl LocalProvider {
    /// Ephemeral collections that vanish with the provider
    pub fn in_memory(settings: &Settings) -> Self {
        Self {
            primary: Arc::new(MemoryCollection::new(&settings.database, &settings.collection)),
            audit: Arc::new(MemoryCollection::new(
                &settings.database,
                &settings.audit_collection,
            )),
        }
    }

    /// Open the collections a descriptor points at
    ///
    /// `file://` with an empty path uses the data directory from `paths`.
    pub fn connect(
        descriptor: &ConnectionDescriptor,
        settings: &Settings,
        paths: &StorePaths,
    ) -> StoreResult<Self> {
        if settings.collection == settings.audit_collection {
            return Err(StoreError::Config(format!(
                "Primary and audit collection must differ (both are '{}')",
                settings.collection
            )));
        }

        let provider = match descriptor.scheme() {
            "memory" => Self::in_memory(settings),
            "file" => {
                let root = if descriptor.location().is_empty() {
                    paths.data_dir()
                } else {
                    PathBuf::from(descriptor.location())
                };
                Self {
                    primary: Arc::new(FileCollection::open(
                        &root,
                        &settings.database,
                        &settings.collection,
                    )?),
                    audit: Arc::new(FileCollection::open(
                        &root,
                        &settings.database,
                        &settings.audit_collection,
                    )?),
                }
            }
            other => {
                return Err(StoreError::Config(format!(
                    "No bundled driver for '{}' descriptors ({})",
                    other, descriptor
                )))
            }
        };

        info!(
            descriptor = %descriptor,
            database = %settings.database,
            collection = %settings.collection,
            audit_collection = %settings.audit_collection,
            "Connected to document store"
        );
        Ok(provider)
    }
}

impl ConnectionProvider for LocalProvider {
    fn primary_collection(&self) -> Arc<dyn Collection> {
        Arc::clone(&self.primary)
    }

    fn audit_collection(&self) -> Arc<dyn Collection> {
        Arc::clone(&self.audit)
    }
}
