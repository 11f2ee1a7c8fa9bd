//! Circuit operations shared by every caller (CLI, embedding applications).
//!
//! Every mutation goes read -> validate -> write, and a failed check never
//! reaches the store. A missing circuit is reported as `Ok(None)` (or
//! `Ok(false)` for delete) so callers can tell it apart from a rejection.

use chrono::Utc;

use crate::config::Config;
use crate::model::{name_is_valid, Circuit, CircuitDraft, CircuitExport, CircuitPatch, MAX_NAME_LEN};
use crate::store::{CircuitStore, NewCircuit, StoreError};
use crate::validate::{validate, ValidationError};

const COPY_SUFFIX: &str = " (Copy)";

#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Circuit name must be 1 to {} characters", MAX_NAME_LEN)]
    InvalidName,
    #[error("Circuit has {count} components; the limit is {limit}")]
    TooManyComponents { count: usize, limit: usize },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CircuitError {
    /// Whether the caller's input was at fault, as opposed to the store.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, CircuitError::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, CircuitError>;

pub struct CircuitService<S> {
    store: S,
    config: Config,
}

impl<S: CircuitStore> CircuitService<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List circuits. `limit` defaults to the configured page size and is
    /// clamped to the configured maximum.
    pub fn list(&self, offset: usize, limit: Option<usize>, public_only: bool) -> Result<Vec<Circuit>> {
        let limit = limit
            .unwrap_or(self.config.default_page_limit)
            .min(self.config.max_page_limit);
        let circuits = self.store.list(offset, limit, public_only)?;
        tracing::debug!(
            "Listed {} circuits (offset {}, limit {}, public_only {})",
            circuits.len(),
            offset,
            limit,
            public_only
        );
        Ok(circuits)
    }

    pub fn get(&self, id: i64) -> Result<Option<Circuit>> {
        let circuit = self.store.find(id)?;
        if circuit.is_none() {
            tracing::debug!("Circuit {} not found", id);
        }
        Ok(circuit)
    }

    pub fn create(&self, draft: CircuitDraft) -> Result<Circuit> {
        if let Err(e) = self.check_draft(&draft) {
            tracing::warn!("Rejected new circuit '{}': {}", draft.name, e);
            return Err(e);
        }

        let circuit = self.store.insert(NewCircuit::from(draft))?;
        tracing::info!(
            "Created circuit {} '{}' with {} components, {} connections",
            circuit.id,
            circuit.name,
            circuit.components.len(),
            circuit.connections.len()
        );
        Ok(circuit)
    }

    /// Apply a partial update. Components and connections are re-validated
    /// together, after substitution, whenever either one is supplied.
    pub fn update(&self, id: i64, patch: CircuitPatch) -> Result<Option<Circuit>> {
        let Some(mut circuit) = self.store.find(id)? else {
            tracing::debug!("Update skipped, circuit {} not found", id);
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            if !name_is_valid(name) {
                tracing::warn!("Rejected update of circuit {}: invalid name", id);
                return Err(CircuitError::InvalidName);
            }
        }

        let revalidate = patch.touches_graph();
        patch.apply_to(&mut circuit);

        if revalidate {
            if let Err(e) = self.check_graph(&circuit) {
                tracing::warn!("Rejected update of circuit {}: {}", id, e);
                return Err(e);
            }
        }

        circuit.updated_at = Some(Utc::now());
        self.store.save(&circuit)?;
        tracing::info!("Updated circuit {} '{}'", circuit.id, circuit.name);
        Ok(Some(circuit))
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let removed = self.store.remove(id)?;
        if removed {
            tracing::info!("Deleted circuit {}", id);
        } else {
            tracing::debug!("Delete skipped, circuit {} not found", id);
        }
        Ok(removed)
    }

    /// Copy a circuit into a new private record. The source is consistent by
    /// construction, so the copy is not re-validated.
    pub fn duplicate(&self, id: i64, name: Option<String>) -> Result<Option<Circuit>> {
        let Some(original) = self.store.find(id)? else {
            tracing::debug!("Duplicate skipped, circuit {} not found", id);
            return Ok(None);
        };

        let name = match name {
            Some(name) if !name_is_valid(&name) => return Err(CircuitError::InvalidName),
            Some(name) => name,
            None => copy_name(&original.name),
        };

        let copy = self.store.insert(NewCircuit {
            name,
            description: original.description,
            components: original.components,
            connections: original.connections,
            metadata: original.metadata,
            is_public: false,
        })?;
        tracing::info!("Duplicated circuit {} as {} '{}'", id, copy.id, copy.name);
        Ok(Some(copy))
    }

    pub fn export(&self, id: i64) -> Result<Option<CircuitExport>> {
        let circuit = self.store.find(id)?;
        Ok(circuit.map(|c| {
            tracing::debug!("Exported circuit {}", c.id);
            CircuitExport::from_circuit(&c, Utc::now())
        }))
    }

    fn check_draft(&self, draft: &CircuitDraft) -> Result<()> {
        if !name_is_valid(&draft.name) {
            return Err(CircuitError::InvalidName);
        }
        self.check_limits(draft.components.len())?;
        validate(&draft.components, &draft.connections)?;
        Ok(())
    }

    fn check_graph(&self, circuit: &Circuit) -> Result<()> {
        self.check_limits(circuit.components.len())?;
        validate(&circuit.components, &circuit.connections)?;
        Ok(())
    }

    fn check_limits(&self, count: usize) -> Result<()> {
        let limit = self.config.max_components;
        if count > limit {
            return Err(CircuitError::TooManyComponents { count, limit });
        }
        Ok(())
    }
}

/// `"<name> (Copy)"`, cutting the base name short so the result still fits
/// the name bounds.
fn copy_name(name: &str) -> String {
    let keep = MAX_NAME_LEN - COPY_SUFFIX.chars().count();
    let mut copy: String = name.chars().take(keep).collect();
    copy.push_str(COPY_SUFFIX);
    copy
}
