//! Caller identities
//!
//! Every audited operation is attributed to an [`Identity`]. Ordinary callers
//! supply their own user name; maintenance actions such as index creation are
//! attributed to a deployment-configured system identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Who performed an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    /// An application user acting through CRUD calls
    User,
    /// A system-level caller for privileged maintenance
    System,
}

/// A named caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    name: String,
    kind: IdentityKind,
}

impl Identity {
    /// An application user; the name must be non-blank and is kept verbatim
    pub fn user(name: &str) -> StoreResult<Self> {
        Self::validated(name, IdentityKind::User)
    }

    /// A system identity used for administrative actions
    pub fn system(name: &str) -> StoreResult<Self> {
        Self::validated(name, IdentityKind::System)
    }

    fn validated(name: &str, kind: IdentityKind) -> StoreResult<Self> {
        if name.trim().is_empty() {
            return Err(StoreError::invalid("user identity must not be empty"));
        }
        Ok(Self {
            name: name.to_string(),
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> IdentityKind {
        self.kind
    }

    pub fn is_system(&self) -> bool {
        self.kind == IdentityKind::System
    }
}

impl Default for Identity {
    /// The stock administrative identity, `admin`
    fn default() -> Self {
        Self {
            name: "admin".to_string(),
            kind: IdentityKind::System,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
