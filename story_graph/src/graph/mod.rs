//! Narrative graph - the complete authored story structure.

mod choice;
mod node;

pub use choice::*;
pub use node::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{GraphError, GraphResult};
use crate::state::{StateMap, StateValue};

/// On-disk shape of a graph document (TOML or JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub start: String,

    #[serde(default)]
    pub initial_state: StateMap,

    /// Targets handled outside the engine, e.g. `"exit:hub"`.
    #[serde(default)]
    pub sentinels: BTreeSet<String>,

    #[serde(default)]
    pub nodes: Vec<NarrativeNode>,
}

/// The full story graph: nodes by id, the start node and the declared initial state.
///
/// Nodes keep their authoring order for iteration and lookups go through an id index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GraphDocument", into = "GraphDocument")]
pub struct NarrativeGraph {
    start: String,
    initial_state: StateMap,
    sentinels: BTreeSet<String>,
    nodes: Vec<NarrativeNode>,
    index: HashMap<String, usize>,
}

impl NarrativeGraph {
    /// Create an empty graph that will start at `start`.
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            initial_state: StateMap::new(),
            sentinels: BTreeSet::new(),
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a graph from a list of nodes, rejecting duplicate ids.
    pub fn from_nodes(
        start: impl Into<String>,
        nodes: impl IntoIterator<Item = NarrativeNode>,
    ) -> GraphResult<Self> {
        let mut graph = Self::new(start);
        for node in nodes {
            graph.insert_node(node)?;
        }
        Ok(graph)
    }

    /// Parse a graph document written in TOML.
    pub fn from_toml_str(source: &str) -> GraphResult<Self> {
        let document: GraphDocument = toml::from_str(source)?;
        Self::try_from(document)
    }

    /// Parse a graph document written in JSON.
    pub fn from_json_str(source: &str) -> GraphResult<Self> {
        let document: GraphDocument = serde_json::from_str(source)?;
        Self::try_from(document)
    }

    /// Add a node. Ids must be unique.
    pub fn insert_node(&mut self, node: NarrativeNode) -> GraphResult<()> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Builder form of [`insert_node`](Self::insert_node).
    pub fn with_node(mut self, node: NarrativeNode) -> GraphResult<Self> {
        self.insert_node(node)?;
        Ok(self)
    }

    /// Declare the initial value of a flag or variable.
    pub fn with_initial(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.initial_state.insert(key.into(), value.into());
        self
    }

    /// Replace the declared initial state.
    pub fn with_initial_state(mut self, state: StateMap) -> Self {
        self.initial_state = state;
        self
    }

    /// Designate a target id that is handled outside the engine.
    pub fn with_sentinel(mut self, id: impl Into<String>) -> Self {
        self.sentinels.insert(id.into());
        self
    }

    /// Fold an independently authored segment into this graph.
    ///
    /// The start node is kept. Initial values already declared here win over the
    /// other segment's values for the same key.
    pub fn merge(&mut self, other: NarrativeGraph) -> GraphResult<()> {
        if let Some(duplicate) = other.nodes.iter().find(|n| self.index.contains_key(&n.id)) {
            return Err(GraphError::DuplicateNode(duplicate.id.clone()));
        }
        for node in other.nodes {
            self.insert_node(node)?;
        }
        for (key, value) in other.initial_state {
            self.initial_state.entry(key).or_insert(value);
        }
        self.sentinels.extend(other.sentinels);
        Ok(())
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn initial_state(&self) -> &StateMap {
        &self.initial_state
    }

    pub fn sentinels(&self) -> &BTreeSet<String> {
        &self.sentinels
    }

    /// Get node by id.
    pub fn node(&self, id: &str) -> Option<&NarrativeNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Authoring position of a node, stable for the life of the graph.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Node at an authoring position obtained from [`position`](Self::position).
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    pub fn node_at(&self, position: usize) -> &NarrativeNode {
        &self.nodes[position]
    }

    /// Check if a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Check if an id is a designated sentinel target.
    pub fn is_sentinel(&self, id: &str) -> bool {
        self.sentinels.contains(id)
    }

    /// All nodes in authoring order.
    pub fn nodes(&self) -> impl Iterator<Item = &NarrativeNode> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Distinct id namespaces present in the graph.
    pub fn segments(&self) -> BTreeSet<&str> {
        self.nodes.iter().filter_map(|n| n.segment()).collect()
    }

    /// Ids of all nodes without outgoing choices.
    pub fn terminal_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.is_terminal())
            .map(|n| n.id.as_str())
            .collect()
    }
}

impl TryFrom<GraphDocument> for NarrativeGraph {
    type Error = GraphError;

    fn try_from(document: GraphDocument) -> GraphResult<Self> {
        let mut graph = NarrativeGraph::new(document.start);
        graph.initial_state = document.initial_state;
        graph.sentinels = document.sentinels;
        for node in document.nodes {
            graph.insert_node(node)?;
        }
        Ok(graph)
    }
}

impl From<NarrativeGraph> for GraphDocument {
    fn from(graph: NarrativeGraph) -> Self {
        GraphDocument {
            start: graph.start,
            initial_state: graph.initial_state,
            sentinels: graph.sentinels,
            nodes: graph.nodes,
        }
    }
}
