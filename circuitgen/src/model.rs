//! Circuit Data Types
//!
//! This module defines the stored shape of a circuit design:
//! - Components placed on the canvas, tagged by a closed set of kinds
//! - Connections (wires) between two component pins
//! - The circuit record that owns both, plus free-form metadata
//!
//! Property and metadata maps are loosely typed JSON objects because the
//! recognized keys depend on the component kind and are not a closed set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Free-form, string-keyed values attached to a component (e.g. `resistance`).
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Free-form, string-keyed values attached to a circuit.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Maximum length of a circuit name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Kind of a circuit component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    Led,
    Battery,
    Switch,
    Ground,
    Wire,
    Breadboard,
    Arduino,
    Sensor,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 11] = [
        ComponentKind::Resistor,
        ComponentKind::Capacitor,
        ComponentKind::Inductor,
        ComponentKind::Led,
        ComponentKind::Battery,
        ComponentKind::Switch,
        ComponentKind::Ground,
        ComponentKind::Wire,
        ComponentKind::Breadboard,
        ComponentKind::Arduino,
        ComponentKind::Sensor,
    ];

    /// The lower-case tag used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Resistor => "resistor",
            ComponentKind::Capacitor => "capacitor",
            ComponentKind::Inductor => "inductor",
            ComponentKind::Led => "led",
            ComponentKind::Battery => "battery",
            ComponentKind::Switch => "switch",
            ComponentKind::Ground => "ground",
            ComponentKind::Wire => "wire",
            ComponentKind::Breadboard => "breadboard",
            ComponentKind::Arduino => "arduino",
            ComponentKind::Sensor => "sensor",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a component tag is outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown component type: {0}")]
pub struct UnknownComponentKind(pub String);

impl FromStr for ComponentKind {
    type Err = UnknownComponentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownComponentKind(s.to_string()))
    }
}

/// Position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// A component placed in a circuit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Identifier, unique within its circuit (e.g. "c1", "bat-1")
    pub id: String,

    /// Component kind
    #[serde(rename = "type")]
    pub kind: ComponentKind,

    /// Display name
    pub name: String,

    /// Canvas position
    pub position: Position,

    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f64,

    /// Kind-specific values such as `resistance` or `forward_voltage`
    #[serde(default)]
    pub properties: Properties,
}

impl Component {
    pub fn new(id: impl Into<String>, kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            position: Position::default(),
            rotation: 0.0,
            properties: Properties::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Numeric property lookup; non-numeric values are treated as absent.
    pub fn number_property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(|v| v.as_f64())
    }
}

/// A wire between two component pins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,

    /// Source component id
    pub from_component: String,

    /// Source pin name
    pub from_pin: String,

    /// Target component id
    pub to_component: String,

    /// Target pin name
    pub to_pin: String,

    /// Routing waypoints, in drawing order
    #[serde(default)]
    pub wire_points: Vec<Position>,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        from: (impl Into<String>, impl Into<String>),
        to: (impl Into<String>, impl Into<String>),
    ) -> Self {
        Self {
            id: id.into(),
            from_component: from.0.into(),
            from_pin: from.1.into(),
            to_component: to.0.into(),
            to_pin: to.1.into(),
            wire_points: Vec::new(),
        }
    }

    pub fn with_point(mut self, x: f64, y: f64) -> Self {
        self.wire_points.push(Position::new(x, y));
        self
    }
}

/// A stored circuit design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Store-assigned identifier
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<Component>,
    pub connections: Vec<Connection>,
    pub metadata: Metadata,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Caller-supplied content for a new circuit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub is_public: bool,
}

impl CircuitDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }
}

/// Partial update of a circuit. Absent fields are left untouched; present
/// fields replace the stored value wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Connection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl CircuitPatch {
    /// Whether the patch touches the component graph.
    pub fn touches_graph(&self) -> bool {
        self.components.is_some() || self.connections.is_some()
    }

    /// Replace every present field of `circuit`.
    pub fn apply_to(self, circuit: &mut Circuit) {
        if let Some(name) = self.name {
            circuit.name = name;
        }
        if let Some(description) = self.description {
            circuit.description = Some(description);
        }
        if let Some(components) = self.components {
            circuit.components = components;
        }
        if let Some(connections) = self.connections {
            circuit.connections = connections;
        }
        if let Some(metadata) = self.metadata {
            circuit.metadata = metadata;
        }
        if let Some(is_public) = self.is_public {
            circuit.is_public = is_public;
        }
    }
}

/// Read-only projection of a circuit produced by export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitExport {
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<Component>,
    pub connections: Vec<Connection>,
    pub metadata: Metadata,
    pub exported_at: DateTime<Utc>,
}

impl CircuitExport {
    pub fn from_circuit(circuit: &Circuit, exported_at: DateTime<Utc>) -> Self {
        Self {
            name: circuit.name.clone(),
            description: circuit.description.clone(),
            components: circuit.components.clone(),
            connections: circuit.connections.clone(),
            metadata: circuit.metadata.clone(),
            exported_at,
        }
    }
}

/// Checks a circuit name against the accepted length bounds.
pub fn name_is_valid(name: &str) -> bool {
    let len = name.chars().count();
    (1..=MAX_NAME_LEN).contains(&len)
}
