//! Core data models for audited-store
//!
//! Documents, filters, field values, identifiers and caller identities. The
//! repository treats documents as opaque mappings; nothing here interprets
//! their contents beyond filter evaluation.

pub mod document;
pub mod filter;
pub mod identity;
pub mod ids;
pub mod value;

pub use document::Document;
pub use filter::Filter;
pub use identity::{Identity, IdentityKind};
pub use ids::{DocumentId, ID_FIELD};
pub use value::Value;
