use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::{CircuitStore, NewCircuit, Result, StoreError};
use crate::model::Circuit;

#[derive(Debug, Default)]
struct Records {
    next_id: i64,
    circuits: BTreeMap<i64, Circuit>,
}

/// In-process store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Records>> {
        self.records
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.records()?.circuits.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.records()?.circuits.is_empty())
    }
}

impl CircuitStore for MemoryStore {
    fn find(&self, id: i64) -> Result<Option<Circuit>> {
        Ok(self.records()?.circuits.get(&id).cloned())
    }

    fn insert(&self, circuit: NewCircuit) -> Result<Circuit> {
        let mut records = self.records()?;
        records.next_id += 1;
        let stored = Circuit {
            id: records.next_id,
            name: circuit.name,
            description: circuit.description,
            components: circuit.components,
            connections: circuit.connections,
            metadata: circuit.metadata,
            is_public: circuit.is_public,
            created_at: Utc::now(),
            updated_at: None,
        };
        records.circuits.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn save(&self, circuit: &Circuit) -> Result<()> {
        let mut records = self.records()?;
        match records.circuits.get_mut(&circuit.id) {
            Some(slot) => {
                *slot = circuit.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(circuit.id)),
        }
    }

    fn remove(&self, id: i64) -> Result<bool> {
        Ok(self.records()?.circuits.remove(&id).is_some())
    }

    fn list(&self, offset: usize, limit: usize, public_only: bool) -> Result<Vec<Circuit>> {
        let records = self.records()?;
        Ok(records
            .circuits
            .values()
            .filter(|c| !public_only || c.is_public)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
