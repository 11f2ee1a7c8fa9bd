//! Connectivity Report
//!
//! Pre-simulation sanity pass over a circuit. The graph built here uses
//! petgraph with one node per component and one edge per connection, which
//! gives:
//! - Disconnected component detection
//! - Separate-group detection (connection islands)
//!
//! No electrical reasoning happens here; a missing battery or ground is only
//! a warning.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{Component, ComponentKind, Connection};
use crate::validate::validate;

/// Result of [`inspect`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub component_count: usize,
    pub connection_count: usize,
}

/// Undirected view of a circuit: components are nodes, connections are edges.
pub struct ConnectivityGraph<'a> {
    graph: UnGraph<&'a Component, &'a Connection>,
    /// Every id named by a connection endpoint, resolved or not
    wired: HashSet<&'a str>,
}

impl<'a> ConnectivityGraph<'a> {
    /// Build the graph. Connections with an unknown endpoint add no edge but
    /// still mark their known endpoint as wired.
    pub fn build(components: &'a [Component], connections: &'a [Connection]) -> Self {
        let mut graph = UnGraph::with_capacity(components.len(), connections.len());
        let mut indices = HashMap::with_capacity(components.len());
        let mut wired = HashSet::with_capacity(connections.len() * 2);

        for component in components {
            indices
                .entry(component.id.as_str())
                .or_insert_with(|| graph.add_node(component));
        }

        for connection in connections {
            wired.insert(connection.from_component.as_str());
            wired.insert(connection.to_component.as_str());

            let from = indices.get(connection.from_component.as_str());
            let to = indices.get(connection.to_component.as_str());
            if let (Some(&a), Some(&b)) = (from, to) {
                graph.add_edge(a, b, connection);
            }
        }

        Self { graph, wired }
    }

    /// Ids of components no connection mentions, sorted.
    pub fn isolated(&self) -> Vec<&'a str> {
        let ids: BTreeSet<&str> = self
            .graph
            .node_weights()
            .map(|component| component.id.as_str())
            .filter(|id| !self.wired.contains(id))
            .collect();
        ids.into_iter().collect()
    }

    /// Groups of wired-together components, ignoring ones with no resolved
    /// edge. Each group is sorted, and groups are ordered by their first id.
    pub fn groups(&self) -> Vec<Vec<&'a str>> {
        let mut sets = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                sets.union(a.index(), b.index());
            }
        }

        let mut by_root: HashMap<usize, BTreeSet<&'a str>> = HashMap::new();
        for idx in self.graph.node_indices() {
            if self.graph.neighbors(idx).next().is_none() {
                continue;
            }
            by_root
                .entry(sets.find(idx.index()))
                .or_default()
                .insert(self.graph[idx].id.as_str());
        }

        let mut groups: Vec<Vec<&str>> = by_root
            .into_values()
            .map(|set| set.into_iter().collect())
            .collect();
        groups.sort();
        groups
    }
}

/// Check a circuit before handing it to a simulator.
pub fn inspect(components: &[Component], connections: &[Connection]) -> CircuitReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = validate(components, connections) {
        errors.push(e.to_string());
    }

    if !components.iter().any(|c| c.kind == ComponentKind::Battery) {
        warnings.push("No power source detected in circuit".to_string());
    }
    if !components.iter().any(|c| c.kind == ComponentKind::Ground) {
        warnings.push("No ground connection found".to_string());
    }

    let graph = ConnectivityGraph::build(components, connections);
    let isolated = graph.isolated();
    if !isolated.is_empty() {
        warnings.push(format!("Disconnected components: {}", isolated.join(", ")));
    }

    let groups = graph.groups();
    if groups.len() > 1 {
        warnings.push(format!(
            "Circuit is split into {} separate groups",
            groups.len()
        ));
    }

    CircuitReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        component_count: components.len(),
        connection_count: connections.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(id: &str, kind: ComponentKind) -> Component {
        Component::new(id, kind, id)
    }

    fn wire(id: &str, from: &str, to: &str) -> Connection {
        Connection::new(id, (from, "a"), (to, "b"))
    }

    #[test]
    fn test_complete_loop_has_no_findings() {
        let components = vec![
            part("bat", ComponentKind::Battery),
            part("r1", ComponentKind::Resistor),
            part("gnd", ComponentKind::Ground),
        ];
        let connections = vec![wire("w1", "bat", "r1"), wire("w2", "r1", "gnd")];

        let report = inspect(&components, &connections);
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.component_count, 3);
        assert_eq!(report.connection_count, 2);
    }

    #[test]
    fn test_missing_source_and_ground() {
        let components = vec![part("r1", ComponentKind::Resistor), part("l1", ComponentKind::Led)];
        let connections = vec![wire("w1", "r1", "l1")];

        let report = inspect(&components, &connections);
        assert!(report.valid);
        assert!(report.warnings.contains(&"No power source detected in circuit".to_string()));
        assert!(report.warnings.contains(&"No ground connection found".to_string()));
    }

    #[test]
    fn test_disconnected_components_are_sorted() {
        let components = vec![
            part("bat", ComponentKind::Battery),
            part("z9", ComponentKind::Sensor),
            part("gnd", ComponentKind::Ground),
            part("a1", ComponentKind::Switch),
        ];
        let connections = vec![wire("w1", "bat", "gnd")];

        let report = inspect(&components, &connections);
        assert!(report
            .warnings
            .contains(&"Disconnected components: a1, z9".to_string()));
    }

    #[test]
    fn test_split_circuit_groups() {
        let components = vec![
            part("bat", ComponentKind::Battery),
            part("gnd", ComponentKind::Ground),
            part("r1", ComponentKind::Resistor),
            part("r2", ComponentKind::Resistor),
        ];
        let connections = vec![wire("w1", "bat", "gnd"), wire("w2", "r2", "r1")];
        let graph = ConnectivityGraph::build(&components, &connections);

        assert_eq!(graph.groups(), vec![vec!["bat", "gnd"], vec!["r1", "r2"]]);
        assert!(graph.isolated().is_empty());

        let report = inspect(&components, &connections);
        assert!(report
            .warnings
            .contains(&"Circuit is split into 2 separate groups".to_string()));
    }

    #[test]
    fn test_dangling_reference_is_an_error() {
        let components = vec![part("bat", ComponentKind::Battery)];
        let connections = vec![wire("w1", "bat", "ghost")];

        let report = inspect(&components, &connections);
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["Connection references non-existent component: ghost".to_string()]
        );
    }

    #[test]
    fn test_half_resolved_connection_counts_as_wired() {
        let components = vec![
            part("bat", ComponentKind::Battery),
            part("gnd", ComponentKind::Ground),
            part("sw", ComponentKind::Switch),
        ];
        let connections = vec![wire("w1", "bat", "ghost"), wire("w2", "ghost", "gnd")];

        let report = inspect(&components, &connections);
        assert!(!report.valid);
        assert_eq!(
            report.warnings,
            vec!["Disconnected components: sw".to_string()]
        );
        assert!(ConnectivityGraph::build(&components, &connections)
            .groups()
            .is_empty());
    }
}
