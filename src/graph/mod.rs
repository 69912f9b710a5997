use petgraph::stable_graph::NodeIndex;

use crate::circuit::Circuit;
use crate::logic::Signal;

pub mod graphviz;

pub type GraphNodeId = usize;

#[derive(Default, Debug, Clone)]
pub struct GraphNode {
    id: GraphNodeId,
    name: String,
    state: Signal,
    inputs: Vec<GraphNodeId>,
    outputs: Vec<GraphNodeId>,
}

#[derive(Debug, Clone)]
pub struct GraphEdge {
    from: GraphNodeId,
    to: GraphNodeId,
    signal: Signal,
}

/// Gate level view of a circuit: one node per gate, one edge per wire.
/// Diagnostics only, never consulted while ticking.
#[derive(Default, Debug, Clone)]
pub struct CircuitGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl CircuitGraph {
    pub fn to_petgraph(&self) -> petgraph::Graph<(), ()> {
        self.into()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Gates nothing drives.
    pub fn inputs(&self) -> Vec<GraphNodeId> {
        self.nodes
            .iter()
            .filter(|node| node.inputs.is_empty())
            .map(|node| node.id)
            .collect()
    }

    /// Gates that drive nothing.
    pub fn outputs(&self) -> Vec<GraphNodeId> {
        self.nodes
            .iter()
            .filter(|node| node.outputs.is_empty())
            .map(|node| node.id)
            .collect()
    }

    pub fn has_feedback(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.to_petgraph())
    }
}

impl From<&Circuit> for CircuitGraph {
    fn from(circuit: &Circuit) -> Self {
        let mut nodes = circuit
            .gates()
            .iter()
            .map(|gate| GraphNode {
                id: gate.id.0,
                name: gate.kind.name(),
                state: gate.state(),
                ..Default::default()
            })
            .collect::<Vec<_>>();

        let edges = circuit
            .wires()
            .filter_map(|(output, input)| {
                let from = circuit.output_pin(output)?.gate.0;
                let to = circuit.input_pin(input)?.gate.0;
                Some(GraphEdge {
                    from,
                    to,
                    signal: circuit.output_signal(output),
                })
            })
            .collect::<Vec<_>>();

        for edge in &edges {
            nodes[edge.from].outputs.push(edge.to);
            nodes[edge.to].inputs.push(edge.from);
        }

        Self { nodes, edges }
    }
}

impl From<&CircuitGraph> for petgraph::Graph<(), ()> {
    fn from(value: &CircuitGraph) -> Self {
        let mut graph = petgraph::Graph::<(), ()>::new();
        for _ in &value.nodes {
            graph.add_node(());
        }

        graph.extend_with_edges(
            value
                .edges
                .iter()
                .map(|edge| (NodeIndex::new(edge.from), NodeIndex::new(edge.to))),
        );
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::CircuitGraph;
    use crate::circuit::{Circuit, GateKind};
    use crate::common::Point;

    #[test]
    fn unittest_graph_feed_forward() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(GateKind::Not, Point(0., 0.));
        let b = circuit.add_gate(GateKind::And, Point(100., 0.));
        let c = circuit.add_gate(GateKind::Not, Point(200., 0.));
        circuit.connect(circuit[a].outputs()[0], circuit[b].inputs()[0]);
        circuit.connect(circuit[a].outputs()[0], circuit[b].inputs()[1]);
        circuit.connect(circuit[b].outputs()[0], circuit[c].inputs()[0]);

        let graph = CircuitGraph::from(&circuit);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.inputs(), vec![a.0]);
        assert_eq!(graph.outputs(), vec![c.0]);
        assert!(!graph.has_feedback());
    }

    #[test]
    fn unittest_graph_feedback() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(GateKind::Not, Point(0., 0.));
        circuit.connect(circuit[a].outputs()[0], circuit[a].inputs()[0]);

        assert!(CircuitGraph::from(&circuit).has_feedback());

        let b = circuit.add_gate(GateKind::Or, Point(100., 0.));
        circuit.disconnect(circuit[a].inputs()[0]);
        circuit.connect(circuit[a].outputs()[0], circuit[b].inputs()[0]);
        circuit.connect(circuit[b].outputs()[0], circuit[a].inputs()[0]);

        assert!(CircuitGraph::from(&circuit).has_feedback());
    }
}
