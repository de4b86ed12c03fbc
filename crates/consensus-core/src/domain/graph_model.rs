//! Single-user graph editor.
//!
//! A `GraphModel` is owned by one editing user for the lifetime of an
//! editing session. Ids are allocated from counters scoped to the
//! instance, so two editors never need to coordinate. Every rejected
//! operation returns a [`GraphError`] and leaves the model untouched.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use thiserror::Error;

use crate::domain::flow::{FlowDocument, FlowEdge, FlowNode, FlowNodeData, Viewport};
use crate::domain::labels::LabelSet;
use crate::domain::submission::{Node, Position};

/// Editor-local node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Editor-local edge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Global interaction mode of the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Node clicks select connection endpoints
    #[default]
    Connect,
    /// Node and edge clicks delete
    Delete,
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMode::Connect => write!(f, "connect"),
            InteractionMode::Delete => write!(f, "delete"),
        }
    }
}

/// Rendering style of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeStyle {
    /// Regular edge
    Normal,
    /// Highlighted as deletable
    PendingDeletion,
}

impl EdgeStyle {
    /// Style every edge takes while the editor is in `mode`
    pub fn for_mode(mode: InteractionMode) -> Self {
        match mode {
            InteractionMode::Connect => EdgeStyle::Normal,
            InteractionMode::Delete => EdgeStyle::PendingDeletion,
        }
    }
}

/// A node inside the editor, carrying its editor-only id
#[derive(Debug, Clone, PartialEq)]
pub struct EditorNode {
    /// Editor id
    pub id: NodeId,
    /// Label
    pub label: String,
    /// Canvas position
    pub position: Position,
}

/// Directed edge between two editor nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Editor id
    pub id: EdgeId,
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Current style
    pub style: EdgeStyle,
}

impl Edge {
    /// Whether the edge touches `node`
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

/// Local, non-fatal rejection of an editor operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Source and target are the same node
    #[error("cannot connect node {0} to itself")]
    SelfLoop(NodeId),

    /// Unknown node id
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// Unknown edge id
    #[error("edge {0} does not exist")]
    EdgeNotFound(EdgeId),

    /// Operation is gated on another mode
    #[error("operation requires {required} mode, editor is in {current} mode")]
    WrongMode {
        /// Mode the operation needs
        required: InteractionMode,
        /// Mode the editor is in
        current: InteractionMode,
    },

    /// Nothing to submit
    #[error("an empty diagram is not a valid submission")]
    EmptyGraph,

    /// Expected labels that were never placed
    #[error("missing required nodes: {}", .0.join(", "))]
    MissingLabels(Vec<String>),
}

/// What a mode-dispatched click did
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// First endpoint of a connection chosen
    SourceSelected(NodeId),
    /// Second click hit the pending source; selection dropped, no edge
    SelectionCleared,
    /// Edge created between the pending source and the clicked node
    Connected(EdgeId),
    /// Node removed together with its edges
    NodeDeleted {
        /// The removed node
        node: EditorNode,
        /// Edges removed by the cascade
        removed_edges: Vec<Edge>,
    },
    /// Edge removed
    EdgeDeleted(Edge),
}

/// In-progress graph of one editing user
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<EditorNode>,
    edges: Vec<Edge>,
    mode: InteractionMode,
    pending_source: Option<NodeId>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl GraphModel {
    /// Create an empty editor in connect mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor pre-seeded with fixed anchor nodes
    pub fn with_anchors<I, S>(anchors: I) -> Self
    where
        I: IntoIterator<Item = (S, Position)>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for (label, position) in anchors {
            graph.add_node_at(label, position);
        }
        graph
    }

    /// Current nodes in insertion order
    pub fn nodes(&self) -> &[EditorNode] {
        &self.nodes
    }

    /// Current edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Current interaction mode
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Source chosen by a connect-mode click, if any
    pub fn pending_source(&self) -> Option<NodeId> {
        self.pending_source
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&EditorNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Add a node at the placeholder position (canvas origin)
    pub fn add_node(&mut self, label: impl Into<String>) -> &EditorNode {
        self.add_node_at(label, Position::default())
    }

    /// Add a node at a given position
    pub fn add_node_at(&mut self, label: impl Into<String>, position: Position) -> &EditorNode {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.push(EditorNode {
            id,
            label: label.into(),
            position,
        });
        &self.nodes[self.nodes.len() - 1]
    }

    /// Overwrite a node's position. No bounds are enforced.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(GraphError::NodeNotFound(id))?;
        node.position = position;
        Ok(())
    }

    /// Connect two nodes with a new edge styled for the current mode
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source));
        }
        self.require_node(source)?;
        self.require_node(target)?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.push(Edge {
            id,
            source,
            target,
            style: EdgeStyle::for_mode(self.mode),
        });
        Ok(id)
    }

    /// Remove a node and every edge touching it. Delete mode only.
    pub fn delete_node(&mut self, id: NodeId) -> Result<(EditorNode, Vec<Edge>), GraphError> {
        self.require_mode(InteractionMode::Delete)?;
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(GraphError::NodeNotFound(id))?;

        let node = self.nodes.remove(index);
        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            self.edges.drain(..).partition(|e| e.touches(id));
        self.edges = kept;
        if self.pending_source == Some(id) {
            self.pending_source = None;
        }
        Ok((node, removed))
    }

    /// Remove a single edge. Delete mode only.
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<Edge, GraphError> {
        self.require_mode(InteractionMode::Delete)?;
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or(GraphError::EdgeNotFound(id))?;
        Ok(self.edges.remove(index))
    }

    /// Switch interaction mode, restyling existing edges and dropping any
    /// half-made connection.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.pending_source = None;
        let style = EdgeStyle::for_mode(mode);
        for edge in &mut self.edges {
            edge.style = style;
        }
    }

    /// Interpret a click on a node according to the current mode
    pub fn click_node(&mut self, id: NodeId) -> Result<ClickOutcome, GraphError> {
        self.require_node(id)?;
        match self.mode {
            InteractionMode::Delete => {
                let (node, removed_edges) = self.delete_node(id)?;
                Ok(ClickOutcome::NodeDeleted {
                    node,
                    removed_edges,
                })
            }
            InteractionMode::Connect => match self.pending_source.take() {
                None => {
                    self.pending_source = Some(id);
                    Ok(ClickOutcome::SourceSelected(id))
                }
                Some(source) if source == id => Ok(ClickOutcome::SelectionCleared),
                Some(source) => self.connect(source, id).map(ClickOutcome::Connected),
            },
        }
    }

    /// Interpret a click on an edge; only delete mode reacts
    pub fn click_edge(&mut self, id: EdgeId) -> Result<ClickOutcome, GraphError> {
        self.delete_edge(id).map(ClickOutcome::EdgeDeleted)
    }

    /// Flatten the node set into the persisted submission shape
    pub fn finalize(&self) -> Result<Vec<Node>, GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }
        Ok(self
            .nodes
            .iter()
            .map(|n| Node::new(n.label.clone(), n.position))
            .collect())
    }

    /// Like [`finalize`](Self::finalize), but every expected label must be
    /// placed. Nodes outside the vocabulary are left out of the result.
    pub fn finalize_complete(&self, labels: &LabelSet) -> Result<Vec<Node>, GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }
        let missing: Vec<String> = labels
            .iter()
            .filter(|label| !self.nodes.iter().any(|n| n.label == *label))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(GraphError::MissingLabels(missing));
        }
        Ok(self
            .nodes
            .iter()
            .filter(|n| labels.contains(&n.label))
            .map(|n| Node::new(n.label.clone(), n.position))
            .collect())
    }

    /// Serialize the whole graph into the flow document format
    pub fn to_flow(&self, viewport: Viewport) -> FlowDocument {
        FlowDocument {
            nodes: self
                .nodes
                .iter()
                .map(|n| FlowNode {
                    id: n.id.to_string(),
                    data: FlowNodeData {
                        label: n.label.clone(),
                    },
                    position: n.position,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| FlowEdge {
                    id: e.id.to_string(),
                    source: e.source.to_string(),
                    target: e.target.to_string(),
                })
                .collect(),
            viewport,
        }
    }

    /// Whether the edges currently form a DAG.
    ///
    /// Informational only: `connect` accepts edges that close a cycle.
    pub fn is_acyclic(&self) -> bool {
        let mut in_degree: HashMap<NodeId, usize> =
            self.nodes.iter().map(|n| (n.id, 0)).collect();
        let mut outgoing: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for edge in &self.edges {
            *in_degree.entry(edge.target).or_insert(0) += 1;
            outgoing.entry(edge.source).or_default().push(edge.target);
        }

        let mut queue: VecDeque<NodeId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut visited = 0;
        while let Some(id) = queue.pop_front() {
            visited += 1;
            for next in outgoing.get(&id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*next);
                    }
                }
            }
        }
        visited == in_degree.len()
    }

    fn require_node(&self, id: NodeId) -> Result<(), GraphError> {
        if self.nodes.iter().any(|n| n.id == id) {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound(id))
        }
    }

    fn require_mode(&self, required: InteractionMode) -> Result<(), GraphError> {
        if self.mode == required {
            Ok(())
        } else {
            Err(GraphError::WrongMode {
                required,
                current: self.mode,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn three_nodes() -> (GraphModel, NodeId, NodeId, NodeId) {
        let mut graph = GraphModel::new();
        let a = graph.add_node("A").id;
        let b = graph.add_node("B").id;
        let c = graph.add_node("C").id;
        (graph, a, b, c)
    }

    #[test]
    fn test_new_graph_starts_in_connect_mode() {
        let graph = GraphModel::new();
        assert_eq!(graph.mode(), InteractionMode::Connect);
        assert!(graph.nodes().is_empty());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_add_node_uses_placeholder_position_and_unique_ids() {
        let mut graph = GraphModel::new();
        let first = graph.add_node("A").clone();
        let second = graph.add_node("A").clone();

        assert_eq!(first.position, Position::default());
        assert_ne!(first.id, second.id);
        assert_eq!(graph.nodes().len(), 2);
    }

    #[test]
    fn test_anchors_are_seeded() {
        let graph = GraphModel::with_anchors([
            ("Ice cream sales", Position::new(-180.0, 120.0)),
            ("Polio cases", Position::new(180.0, 120.0)),
        ]);
        let labels: Vec<_> = graph.nodes().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Ice cream sales", "Polio cases"]);
        assert_eq!(graph.nodes()[0].position, Position::new(-180.0, 120.0));
    }

    #[test]
    fn test_move_node_allows_out_of_canvas_positions() {
        let mut graph = GraphModel::new();
        let id = graph.add_node("A").id;
        graph.move_node(id, Position::new(-5000.0, 12000.5)).unwrap();
        assert_eq!(graph.node(id).unwrap().position, Position::new(-5000.0, 12000.5));

        assert_eq!(
            graph.move_node(NodeId(99), Position::default()),
            Err(GraphError::NodeNotFound(NodeId(99)))
        );
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let (mut graph, a, b, _) = three_nodes();
        graph.connect(a, b).unwrap();
        let before = graph.edges().len();

        assert_eq!(graph.connect(a, a), Err(GraphError::SelfLoop(a)));
        assert_eq!(graph.edges().len(), before);
    }

    #[test]
    fn test_connect_requires_existing_endpoints() {
        let (mut graph, a, _, _) = three_nodes();
        assert_eq!(
            graph.connect(a, NodeId(42)),
            Err(GraphError::NodeNotFound(NodeId(42)))
        );
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_connect_styles_edge_by_mode() {
        let (mut graph, a, b, c) = three_nodes();
        let normal = graph.connect(a, b).unwrap();
        graph.set_mode(InteractionMode::Delete);
        let pending = graph.connect(b, c).unwrap();

        let style_of = |id: EdgeId, g: &GraphModel| {
            g.edges().iter().find(|e| e.id == id).unwrap().style
        };
        assert_eq!(style_of(pending, &graph), EdgeStyle::PendingDeletion);
        // set_mode restyles existing edges as well
        assert_eq!(style_of(normal, &graph), EdgeStyle::PendingDeletion);

        graph.set_mode(InteractionMode::Connect);
        assert!(graph.edges().iter().all(|e| e.style == EdgeStyle::Normal));
    }

    #[test]
    fn test_delete_node_cascades_exactly_its_edges() {
        let (mut graph, a, b, c) = three_nodes();
        let e1 = graph.connect(a, b).unwrap();
        let e2 = graph.connect(c, a).unwrap();
        let e3 = graph.connect(b, c).unwrap();

        graph.set_mode(InteractionMode::Delete);
        let (node, removed) = graph.delete_node(a).unwrap();

        assert_eq!(node.id, a);
        let mut removed_ids: Vec<_> = removed.iter().map(|e| e.id).collect();
        removed_ids.sort();
        assert_eq!(removed_ids, vec![e1, e2]);
        assert_eq!(graph.edges().iter().map(|e| e.id).collect::<Vec<_>>(), vec![e3]);
        assert!(graph.node(a).is_none());
    }

    #[test]
    fn test_deletes_are_gated_on_delete_mode() {
        let (mut graph, a, b, _) = three_nodes();
        let edge = graph.connect(a, b).unwrap();

        let wrong_mode = GraphError::WrongMode {
            required: InteractionMode::Delete,
            current: InteractionMode::Connect,
        };
        assert_eq!(graph.delete_node(a).unwrap_err(), wrong_mode);
        assert_eq!(graph.delete_edge(edge).unwrap_err(), wrong_mode);
        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.edges().len(), 1);

        graph.set_mode(InteractionMode::Delete);
        assert_eq!(graph.delete_edge(edge).unwrap().id, edge);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.delete_edge(edge), Err(GraphError::EdgeNotFound(edge)));
    }

    #[test]
    fn test_click_node_in_connect_mode_selects_endpoints() {
        let (mut graph, a, b, _) = three_nodes();

        assert_eq!(graph.click_node(a).unwrap(), ClickOutcome::SourceSelected(a));
        assert_eq!(graph.pending_source(), Some(a));

        let outcome = graph.click_node(b).unwrap();
        let edge = match outcome {
            ClickOutcome::Connected(id) => id,
            other => panic!("expected Connected, got {:?}", other),
        };
        assert_eq!(graph.pending_source(), None);
        let created = &graph.edges()[0];
        assert_eq!((created.id, created.source, created.target), (edge, a, b));
    }

    #[test]
    fn test_clicking_pending_source_again_creates_no_edge() {
        let (mut graph, a, _, _) = three_nodes();
        graph.click_node(a).unwrap();
        assert_eq!(graph.click_node(a).unwrap(), ClickOutcome::SelectionCleared);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.pending_source(), None);
    }

    #[test]
    fn test_click_node_in_delete_mode_deletes() {
        let (mut graph, a, b, _) = three_nodes();
        graph.connect(a, b).unwrap();
        graph.set_mode(InteractionMode::Delete);

        match graph.click_node(b).unwrap() {
            ClickOutcome::NodeDeleted { node, removed_edges } => {
                assert_eq!(node.id, b);
                assert_eq!(removed_edges.len(), 1);
            }
            other => panic!("expected NodeDeleted, got {:?}", other),
        }
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_click_edge_only_acts_in_delete_mode() {
        let (mut graph, a, b, _) = three_nodes();
        let edge = graph.connect(a, b).unwrap();

        assert!(matches!(
            graph.click_edge(edge),
            Err(GraphError::WrongMode { .. })
        ));
        graph.set_mode(InteractionMode::Delete);
        assert!(matches!(graph.click_edge(edge), Ok(ClickOutcome::EdgeDeleted(_))));
    }

    #[test]
    fn test_mode_switch_drops_pending_selection() {
        let (mut graph, a, _, _) = three_nodes();
        graph.click_node(a).unwrap();
        graph.set_mode(InteractionMode::Delete);
        graph.set_mode(InteractionMode::Connect);
        assert_eq!(graph.pending_source(), None);
    }

    #[test]
    fn test_finalize_flattens_nodes() {
        let mut graph = GraphModel::new();
        let a = graph.add_node("A").id;
        graph.add_node_at("B", Position::new(5.0, 5.0));
        graph.move_node(a, Position::new(-1.0, 2.0)).unwrap();
        graph.connect(a, NodeId(1)).unwrap();

        assert_eq!(
            graph.finalize().unwrap(),
            vec![
                Node::new("A", Position::new(-1.0, 2.0)),
                Node::new("B", Position::new(5.0, 5.0)),
            ]
        );
    }

    #[test]
    fn test_finalize_rejects_empty_graph() {
        let graph = GraphModel::new();
        assert_eq!(graph.finalize(), Err(GraphError::EmptyGraph));
    }

    #[test]
    fn test_finalize_complete_requires_every_label() {
        let labels = LabelSet::new(["A", "B", "C"]);
        let mut graph = GraphModel::new();
        graph.add_node("A");
        graph.add_node("background");

        assert_eq!(
            graph.finalize_complete(&labels),
            Err(GraphError::MissingLabels(vec!["B".to_string(), "C".to_string()]))
        );

        graph.add_node("B");
        graph.add_node("C");
        let nodes = graph.finalize_complete(&labels).unwrap();
        let placed: Vec<_> = nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(placed, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_cycles_are_permitted_but_reported() {
        let (mut graph, a, b, c) = three_nodes();
        graph.connect(a, b).unwrap();
        graph.connect(b, c).unwrap();
        assert!(graph.is_acyclic());

        graph.connect(c, a).unwrap();
        assert_eq!(graph.edges().len(), 3);
        assert!(!graph.is_acyclic());
    }

    #[test]
    fn test_to_flow_uses_editor_ids() {
        let (mut graph, a, b, _) = three_nodes();
        graph.connect(a, b).unwrap();
        let flow = graph.to_flow(Viewport::default());

        assert_eq!(flow.nodes.len(), 3);
        assert_eq!(flow.nodes[0].id, "n0");
        assert_eq!(flow.edges[0].source, "n0");
        assert_eq!(flow.edges[0].target, "n1");
        assert_eq!(flow.viewport.zoom, 1.0);

        let value = serde_json::to_value(&flow).unwrap();
        assert_eq!(value["nodes"][1]["data"]["label"], "B");
    }
}
