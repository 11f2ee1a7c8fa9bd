//! Simple circuit example: store a circuit, update it, duplicate it and
//! print the connectivity report.

use circuitgen::prelude::*;
use circuitgen::{inspect, CircuitError};

fn main() -> Result<(), CircuitError> {
    let service = CircuitService::new(SqliteStore::in_memory()?, Config::default());

    let draft = CircuitDraft::new("Night light")
        .with_description("Battery, switch and LED")
        .with_component(Component::new("bat", ComponentKind::Battery, "AA pack").with_property("voltage", 3.0))
        .with_component(Component::new("sw", ComponentKind::Switch, "S1").at(60.0, 0.0))
        .with_component(Component::new("led", ComponentKind::Led, "White LED").at(120.0, 0.0))
        .with_connection(Connection::new("w1", ("bat", "positive"), ("sw", "in")))
        .with_connection(Connection::new("w2", ("sw", "out"), ("led", "anode")));

    let circuit = service.create(draft)?;
    println!("Created circuit {} '{}'", circuit.id, circuit.name);

    let rejected = service.update(
        circuit.id,
        CircuitPatch {
            connections: Some(vec![Connection::new("w3", ("led", "cathode"), ("gnd", "gnd"))]),
            ..Default::default()
        },
    );
    if let Err(e) = rejected {
        println!("Update rejected: {}", e);
    }

    if let Some(copy) = service.duplicate(circuit.id, None)? {
        println!("Duplicated as {} '{}' (public: {})", copy.id, copy.name, copy.is_public);
    }

    let report = inspect(&circuit.components, &circuit.connections);
    println!("Valid: {}", report.valid);
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }

    Ok(())
}
