//! Placeholder simulation.
//!
//! This is a fixed per-kind lookup, not a circuit solver: batteries report
//! their nominal voltage, resistors assume 5 V across them, LEDs report their
//! forward operating point. Connections are ignored. Anything needing real
//! node voltages must not rely on these numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use uuid::Uuid;

use crate::config::Config;
use crate::model::{Component, ComponentKind, Connection};

const DEFAULT_BATTERY_VOLTAGE: f64 = 9.0;
const DEFAULT_RESISTANCE: f64 = 1000.0;
const ASSUMED_RESISTOR_DROP: f64 = 5.0;
const DEFAULT_LED_FORWARD_VOLTAGE: f64 = 2.0;
const DEFAULT_LED_FORWARD_CURRENT: f64 = 0.02;
const MAX_TIME_STEP: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("No components provided for simulation")]
    NoComponents,
    #[error("Simulation time must be in (0, {max}] seconds, got {value}")]
    InvalidDuration { value: f64, max: f64 },
    #[error("Time step must be in (0, {max}] seconds, got {value}")]
    InvalidTimeStep { value: f64, max: f64 },
    #[error("Request asks for {requested} time points, at most {max} allowed")]
    TooManyTimePoints { requested: f64, max: usize },
    #[error("Resistor '{0}' has non-positive resistance")]
    InvalidResistance(String),
}

fn default_simulation_time() -> f64 {
    1.0
}

fn default_time_step() -> f64 {
    0.001
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_id: Option<i64>,
    pub components: Vec<Component>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default = "default_simulation_time")]
    pub simulation_time: f64,
    #[serde(default = "default_time_step")]
    pub time_step: f64,
}

impl SimulationRequest {
    pub fn new(components: Vec<Component>, connections: Vec<Connection>) -> Self {
        Self {
            circuit_id: None,
            components,
            connections,
            simulation_time: default_simulation_time(),
            time_step: default_time_step(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationData {
    pub voltages: BTreeMap<String, f64>,
    pub currents: BTreeMap<String, f64>,
    pub power: BTreeMap<String, f64>,
    pub time_points: Vec<f64>,
    pub component_states: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub simulation_id: Uuid,
    pub message: String,
    pub data: SimulationData,
    /// Wall-clock seconds spent producing the report
    pub execution_time: f64,
    pub timestamp: DateTime<Utc>,
}

/// Produce placeholder results for `request`, bounded by `config`'s
/// simulation limits.
pub fn run_mock(
    request: &SimulationRequest,
    config: &Config,
) -> Result<SimulationReport, SimulationError> {
    let started = Instant::now();
    let max_simulation_time = config.max_simulation_time;

    if request.components.is_empty() {
        return Err(SimulationError::NoComponents);
    }
    let duration = request.simulation_time;
    if !(duration > 0.0 && duration <= max_simulation_time) {
        return Err(SimulationError::InvalidDuration {
            value: duration,
            max: max_simulation_time,
        });
    }
    let step = request.time_step;
    if !(step > 0.0 && step <= MAX_TIME_STEP) {
        return Err(SimulationError::InvalidTimeStep {
            value: step,
            max: MAX_TIME_STEP,
        });
    }
    // Truncation matches a whole number of steps; the epsilon absorbs
    // representation error in ratios like 1.0 / 0.001.
    let point_count = (duration / step + 1e-9).floor() + 1.0;
    if !(point_count.is_finite() && point_count <= config.max_time_points as f64) {
        return Err(SimulationError::TooManyTimePoints {
            requested: point_count,
            max: config.max_time_points,
        });
    }

    let mut data = SimulationData::default();
    for component in &request.components {
        let id = component.id.clone();
        match component.kind {
            ComponentKind::Battery => {
                let voltage = component
                    .number_property("voltage")
                    .unwrap_or(DEFAULT_BATTERY_VOLTAGE);
                data.voltages.insert(id.clone(), voltage);
                data.currents.insert(id, 0.0);
            }
            ComponentKind::Resistor => {
                let resistance = component
                    .number_property("resistance")
                    .unwrap_or(DEFAULT_RESISTANCE);
                if resistance <= 0.0 {
                    return Err(SimulationError::InvalidResistance(id));
                }
                let current = ASSUMED_RESISTOR_DROP / resistance;
                data.voltages.insert(id.clone(), ASSUMED_RESISTOR_DROP);
                data.currents.insert(id.clone(), current);
                data.power.insert(id, ASSUMED_RESISTOR_DROP * current);
            }
            ComponentKind::Led => {
                let forward_voltage = component
                    .number_property("forward_voltage")
                    .unwrap_or(DEFAULT_LED_FORWARD_VOLTAGE);
                let forward_current = component
                    .number_property("forward_current")
                    .unwrap_or(DEFAULT_LED_FORWARD_CURRENT);
                data.voltages.insert(id.clone(), forward_voltage);
                data.currents.insert(id.clone(), forward_current);
                data.component_states.insert(id, "on".to_string());
            }
            _ => {}
        }
    }

    data.time_points = (0..point_count as usize).map(|i| i as f64 * step).collect();

    let simulation_id = Uuid::new_v4();
    tracing::info!(
        "Mock simulation {} over {} components, {} time points",
        simulation_id,
        request.components.len(),
        data.time_points.len()
    );

    Ok(SimulationReport {
        simulation_id,
        message: "Simulation completed successfully".to_string(),
        data,
        execution_time: started.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
    })
}
