//! Structural consistency checks for a circuit's component graph.
//!
//! Only referential integrity is checked here: component identifiers must be
//! unique and every connection endpoint must name an existing component.

use std::collections::HashSet;

use crate::model::{Component, Connection};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Every identifier that occurs more than once, in order of first repeat.
    #[error("Duplicate component IDs found: {}", .0.join(", "))]
    DuplicateComponentId(Vec<String>),
    /// The first connection endpoint that names no component.
    #[error("Connection references non-existent component: {0}")]
    DanglingConnectionReference(String),
}

/// Validate a (components, connections) pair.
///
/// An empty component list is always valid, whatever the connections say.
/// Connections are scanned in order and the first unresolved endpoint
/// (source before target) is reported.
pub fn validate(components: &[Component], connections: &[Connection]) -> Result<(), ValidationError> {
    if components.is_empty() {
        return Ok(());
    }

    let mut ids: HashSet<&str> = HashSet::with_capacity(components.len());
    let mut repeated: Vec<String> = Vec::new();
    for component in components {
        if !ids.insert(component.id.as_str()) && !repeated.contains(&component.id) {
            repeated.push(component.id.clone());
        }
    }
    if !repeated.is_empty() {
        return Err(ValidationError::DuplicateComponentId(repeated));
    }

    for connection in connections {
        for endpoint in [&connection.from_component, &connection.to_component] {
            if !ids.contains(endpoint.as_str()) {
                return Err(ValidationError::DanglingConnectionReference(endpoint.clone()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComponentKind;

    fn part(id: &str, kind: ComponentKind) -> Component {
        Component::new(id, kind, id.to_uppercase())
    }

    fn wire(id: &str, from: &str, to: &str) -> Connection {
        Connection::new(id, (from, "+"), (to, "1"))
    }

    #[test]
    fn test_battery_resistor_loop_is_valid() {
        let components = [part("c1", ComponentKind::Battery), part("c2", ComponentKind::Resistor)];
        let connections = [wire("w1", "c1", "c2")];
        assert_eq!(validate(&components, &connections), Ok(()));
    }

    #[test]
    fn test_dangling_target() {
        let components = [part("c1", ComponentKind::Battery), part("c2", ComponentKind::Resistor)];
        let connections = [wire("w1", "c1", "c3")];
        assert_eq!(
            validate(&components, &connections),
            Err(ValidationError::DanglingConnectionReference("c3".to_string()))
        );
    }

    #[test]
    fn test_source_reported_before_target() {
        let components = [part("c1", ComponentKind::Battery)];
        let connections = [wire("w1", "x", "y")];
        assert_eq!(
            validate(&components, &connections),
            Err(ValidationError::DanglingConnectionReference("x".to_string()))
        );
    }

    #[test]
    fn test_first_offending_connection_wins() {
        let components = [part("c1", ComponentKind::Battery), part("c2", ComponentKind::Led)];
        let connections = [
            wire("w1", "c1", "c2"),
            wire("w2", "c2", "gone"),
            wire("w3", "missing", "c1"),
        ];
        assert_eq!(
            validate(&components, &connections),
            Err(ValidationError::DanglingConnectionReference("gone".to_string()))
        );
    }

    #[test]
    fn test_duplicate_ids_checked_before_connections() {
        let components = [
            part("c1", ComponentKind::Battery),
            part("c1", ComponentKind::Resistor),
            part("c2", ComponentKind::Led),
            part("c2", ComponentKind::Led),
            part("c1", ComponentKind::Ground),
        ];
        let connections = [wire("w1", "nowhere", "c1")];
        assert_eq!(
            validate(&components, &connections),
            Err(ValidationError::DuplicateComponentId(vec![
                "c1".to_string(),
                "c2".to_string()
            ]))
        );
    }

    #[test]
    fn test_empty_components_skip_connection_checks() {
        let connections = [wire("w1", "a", "b")];
        assert_eq!(validate(&[], &connections), Ok(()));
        assert_eq!(validate(&[], &[]), Ok(()));
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::DanglingConnectionReference("c3".into());
        assert_eq!(err.to_string(), "Connection references non-existent component: c3");
        let err = ValidationError::DuplicateComponentId(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Duplicate component IDs found: a, b");
    }
}
