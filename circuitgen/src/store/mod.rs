//! Circuit persistence.
//!
//! The service layer only sees the [`CircuitStore`] trait. Identifier
//! assignment and the creation timestamp belong to the store; refreshing
//! `updated_at` is left to the caller.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Circuit, CircuitDraft, Component, Connection, Metadata};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Lock error: {0}")]
    Lock(String),
    #[error("Circuit {0} does not exist")]
    Missing(i64),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A circuit that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCircuit {
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<Component>,
    pub connections: Vec<Connection>,
    pub metadata: Metadata,
    pub is_public: bool,
}

impl From<CircuitDraft> for NewCircuit {
    fn from(draft: CircuitDraft) -> Self {
        Self {
            name: draft.name,
            description: draft.description,
            components: draft.components,
            connections: draft.connections,
            metadata: draft.metadata,
            is_public: draft.is_public,
        }
    }
}

/// Storage backend for circuits.
pub trait CircuitStore: Send + Sync {
    /// Look up a circuit by id.
    fn find(&self, id: i64) -> Result<Option<Circuit>>;

    /// Persist a new circuit, assigning its id and `created_at`.
    fn insert(&self, circuit: NewCircuit) -> Result<Circuit>;

    /// Overwrite an existing circuit. Fails with [`StoreError::Missing`]
    /// when no record has that id.
    fn save(&self, circuit: &Circuit) -> Result<()>;

    /// Delete a circuit; returns whether a record was removed.
    fn remove(&self, id: i64) -> Result<bool>;

    /// Page through circuits in id order. The public filter applies before
    /// `offset` and `limit`.
    fn list(&self, offset: usize, limit: usize, public_only: bool) -> Result<Vec<Circuit>>;
}

impl<S: CircuitStore + ?Sized> CircuitStore for Box<S> {
    fn find(&self, id: i64) -> Result<Option<Circuit>> {
        (**self).find(id)
    }

    fn insert(&self, circuit: NewCircuit) -> Result<Circuit> {
        (**self).insert(circuit)
    }

    fn save(&self, circuit: &Circuit) -> Result<()> {
        (**self).save(circuit)
    }

    fn remove(&self, id: i64) -> Result<bool> {
        (**self).remove(id)
    }

    fn list(&self, offset: usize, limit: usize, public_only: bool) -> Result<Vec<Circuit>> {
        (**self).list(offset, limit, public_only)
    }
}
