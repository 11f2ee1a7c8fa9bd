use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{CircuitStore, NewCircuit, Result, StoreError};
use crate::model::Circuit;

const SELECT_COLUMNS: &str = "SELECT id, name, description, components_json, connections_json,
        metadata_json, is_public, created_at, updated_at
 FROM circuits";

/// SQLite-backed store. Components, connections and metadata are kept as
/// JSON text columns.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Raw column values, decoded outside the rusqlite row callback.
struct CircuitRow {
    id: i64,
    name: String,
    description: Option<String>,
    components_json: String,
    connections_json: String,
    metadata_json: String,
    is_public: bool,
    created_at: String,
    updated_at: Option<String>,
}

impl CircuitRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CircuitRow {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            components_json: row.get(3)?,
            connections_json: row.get(4)?,
            metadata_json: row.get(5)?,
            is_public: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<Circuit> {
        Ok(Circuit {
            id: self.id,
            name: self.name,
            description: self.description,
            components: from_json(&self.components_json, "components")?,
            connections: from_json(&self.connections_json, "connections")?,
            metadata: from_json(&self.metadata_json, "metadata")?,
            is_public: self.is_public,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: self.updated_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| StoreError::Serialization(format!("Failed to serialize {}: {}", what, e)))
}

fn from_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T> {
    serde_json::from_str(json)
        .map_err(|e| StoreError::Serialization(format!("Failed to deserialize {}: {}", what, e)))
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization(format!("Bad timestamp '{}': {}", text, e)))
}

fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl SqliteStore {
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open(path: &Path) -> Result<Self> {
        Self::new(path)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = SqliteStore { conn: Mutex::new(conn) };
        store.initialize()?;
        Ok(store)
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS circuits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                components_json TEXT NOT NULL,
                connections_json TEXT NOT NULL,
                metadata_json TEXT NOT NULL,
                is_public INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_circuits_public ON circuits(is_public)",
            [],
        )?;

        Ok(())
    }
}

impl CircuitStore for SqliteStore {
    fn find(&self, id: i64) -> Result<Option<Circuit>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                CircuitRow::read,
            )
            .optional()?;
        row.map(CircuitRow::decode).transpose()
    }

    fn insert(&self, circuit: NewCircuit) -> Result<Circuit> {
        let components_json = to_json(&circuit.components, "components")?;
        let connections_json = to_json(&circuit.connections, "connections")?;
        let metadata_json = to_json(&circuit.metadata, "metadata")?;
        let created_at = Utc::now();

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO circuits
             (name, description, components_json, connections_json, metadata_json, is_public, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                circuit.name,
                circuit.description,
                components_json,
                connections_json,
                metadata_json,
                circuit.is_public,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Circuit {
            id,
            name: circuit.name,
            description: circuit.description,
            components: circuit.components,
            connections: circuit.connections,
            metadata: circuit.metadata,
            is_public: circuit.is_public,
            created_at,
            updated_at: None,
        })
    }

    fn save(&self, circuit: &Circuit) -> Result<()> {
        let components_json = to_json(&circuit.components, "components")?;
        let connections_json = to_json(&circuit.connections, "connections")?;
        let metadata_json = to_json(&circuit.metadata, "metadata")?;

        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE circuits
             SET name = ?2, description = ?3, components_json = ?4, connections_json = ?5,
                 metadata_json = ?6, is_public = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                circuit.id,
                circuit.name,
                circuit.description,
                components_json,
                connections_json,
                metadata_json,
                circuit.is_public,
                circuit.updated_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::Missing(circuit.id));
        }
        Ok(())
    }

    fn remove(&self, id: i64) -> Result<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM circuits WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn list(&self, offset: usize, limit: usize, public_only: bool) -> Result<Vec<Circuit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE (?1 = 0 OR is_public = 1) ORDER BY id LIMIT ?2 OFFSET ?3",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(
                params![public_only, to_sql_count(limit), to_sql_count(offset)],
                CircuitRow::read,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(CircuitRow::decode).collect()
    }
}
