use itertools::Itertools;

use super::{CircuitGraph, GraphNode, GraphNodeId};
use crate::scene::Scene;

pub struct GraphvizBuilder<'a> {
    graph: &'a CircuitGraph,
    clusters: Option<Vec<(String, Vec<GraphNodeId>)>>,
}

impl<'a> GraphvizBuilder<'a> {
    pub fn new(g: &'a CircuitGraph) -> Self {
        Self {
            graph: g,
            clusters: None,
        }
    }

    pub fn with_cluster(&mut self, clusters: Vec<(String, Vec<GraphNodeId>)>) -> &mut Self {
        self.clusters = Some(clusters);
        self
    }

    pub fn build(&self, graph_name: &str) -> String {
        format!(
            r#"
digraph {graph_name} {{
    rankdir=LR
    graph [splines=line, nodesep=0.8]
    node [shape=record]
{}
{}
{}
}}
        "#,
            self.print_nodes(),
            self.print_edges(),
            self.print_cluster(),
        )
    }

    fn print_nodes(&self) -> String {
        self.graph
            .nodes
            .iter()
            .map(Self::print_node)
            .join("\n")
    }

    fn print_node(node: &GraphNode) -> String {
        format!("    node{} [label=\"{} | {}\"]", node.id, node.name, node.state)
    }

    // wires take the colour of the signal they carry
    fn print_edges(&self) -> String {
        self.graph
            .edges
            .iter()
            .map(|edge| {
                format!(
                    "    node{}->node{} [color={}]",
                    edge.from,
                    edge.to,
                    edge.signal.wire_color()
                )
            })
            .join("\n")
    }

    fn print_cluster(&self) -> String {
        let Some(clusters) = &self.clusters else {
            return String::new();
        };

        clusters
            .iter()
            .enumerate()
            .map(|(index, (name, members))| {
                format!(
                    "    subgraph cluster_{index} {{ label=\"{name}\" {} }}",
                    members.iter().map(|id| format!("node{id}")).join(" ")
                )
            })
            .join("\n")
    }
}

pub trait ToGraphviz {
    fn to_graphviz(&self) -> String;
}

impl ToGraphviz for CircuitGraph {
    fn to_graphviz(&self) -> String {
        GraphvizBuilder::new(self).build("Circuit")
    }
}

// sensor columns are drawn as clusters
impl ToGraphviz for Scene {
    fn to_graphviz(&self) -> String {
        let graph = CircuitGraph::from(&self.circuit);
        let clusters = self
            .sensors()
            .iter()
            .map(|sensor| {
                (
                    sensor.id.to_string(),
                    sensor.gates.iter().map(|gate| gate.0).collect_vec(),
                )
            })
            .collect_vec();

        GraphvizBuilder::new(&graph)
            .with_cluster(clusters)
            .build("Scene")
    }
}

#[cfg(test)]
mod tests {
    use super::ToGraphviz;
    use crate::circuit::beam::Beam;
    use crate::circuit::GateKind;
    use crate::common::Point;
    use crate::scene::product::Property;
    use crate::scene::sensor::SENSOR_PANEL_ORIGIN;
    use crate::scene::Scene;

    #[test]
    fn unittest_graphviz_scene() {
        let mut scene = Scene::new(1000., 800.);
        let beam = scene.add_gate(GateKind::Beam(Beam::new(100.)), Point(0., 0.));
        let not = scene.add_gate(GateKind::Not, Point(200., 0.));
        scene.add_sensor(Point(0., 0.), SENSOR_PANEL_ORIGIN, &[Property::Red]);

        let (output, input) = (scene.circuit[beam].outputs()[0], scene.circuit[not].inputs()[0]);
        scene.circuit.connect(output, input);

        let dot = scene.to_graphviz();
        assert!(dot.contains("digraph Scene"));
        assert!(dot.contains("node0 [label=\"beam | unknown\"]"));
        assert!(dot.contains("node0->node1 [color=gray]"));
        assert!(dot.contains("subgraph cluster_0 { label=\"sensor#0\" node2 }"));
    }
}
