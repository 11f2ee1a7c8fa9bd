//! CircuitGen - storage and structural validation for circuit designs
//!
//! This library keeps stored circuit graphs consistent: component ids are
//! unique within a circuit and every connection names components that exist.
//! Create, update, duplicate and export operations run the validator before
//! anything reaches the store.
//!
//! # Quick Start
//!
//! ```no_run
//! use circuitgen::prelude::*;
//!
//! let service = CircuitService::new(MemoryStore::new(), Config::default());
//! let draft = CircuitDraft::new("Blinky")
//!     .with_component(Component::new("bat", ComponentKind::Battery, "9V"))
//!     .with_component(Component::new("led", ComponentKind::Led, "Red LED"))
//!     .with_connection(Connection::new("w1", ("bat", "+"), ("led", "anode")));
//!
//! let circuit = service.create(draft).unwrap();
//! println!("stored circuit {}", circuit.id);
//! ```
//!
//! # Features
//!
//! - **Validation**: duplicate ids, dangling connection references
//! - **Storage**: SQLite and in-memory stores behind one trait
//! - **Connectivity report**: missing source/ground, isolated parts
//! - **Placeholder simulation**: fixed per-kind values, not a solver

pub mod analysis;
pub mod config;
pub mod model;
pub mod service;
pub mod simulation;
pub mod store;
pub mod validate;

// Re-export main types
pub use analysis::{inspect, CircuitReport};
pub use config::{Config, ConfigError};
pub use model::{
    Circuit, CircuitDraft, CircuitExport, CircuitPatch, Component, ComponentKind, Connection,
    Metadata, Position, Properties,
};
pub use service::{CircuitError, CircuitService};
pub use simulation::{run_mock, SimulationError, SimulationReport, SimulationRequest};
pub use store::{CircuitStore, MemoryStore, SqliteStore, StoreError};
pub use validate::{validate, ValidationError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CircuitDraft, CircuitError, CircuitPatch, CircuitService, CircuitStore, Component,
        ComponentKind, Config, Connection, MemoryStore, SqliteStore, ValidationError,
    };
}
