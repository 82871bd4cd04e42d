//! Branch map projector - a read-only view of the graph around the current node.
//!
//! The map holds the current node, its immediate neighbors and every node in
//! the history. It does no layout beyond that neighborhood.

use serde::{Deserialize, Serialize};

use story_graph::NarrativeNode;

use crate::controller::TraversalController;

/// One node in the branch map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchNode {
    pub id: String,
    pub label: String,
    pub is_current: bool,
    /// The id appears in the history.
    pub is_visited: bool,
    /// A currently legal choice from the current node leads here.
    pub is_available: bool,
    /// Neighbor ids. Only filled for the current node.
    pub connections: Vec<String>,
}

/// Nodes around the current position, current node first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchMap {
    pub nodes: Vec<BranchNode>,
}

impl BranchMap {
    pub fn get(&self, id: &str) -> Option<&BranchNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn current(&self) -> Option<&BranchNode> {
        self.nodes.iter().find(|n| n.is_current)
    }

    pub fn available(&self) -> impl Iterator<Item = &BranchNode> {
        self.nodes.iter().filter(|n| n.is_available)
    }
}

/// Project the controller's position and history into a branch map.
pub fn project(controller: &TraversalController) -> BranchMap {
    let graph = controller.graph();
    let current = controller.current_node();
    let label_length = controller.config().label_length;

    let available: Vec<&str> = controller
        .available_choices()
        .iter()
        .map(|c| c.target.as_str())
        .collect();

    // Neighbors in choice order, sentinels and dangling targets dropped.
    let mut neighbors: Vec<&str> = Vec::new();
    for choice in &current.choices {
        let target = choice.target.as_str();
        if graph.contains(target) && !neighbors.contains(&target) {
            neighbors.push(target);
        }
    }

    let mut ids: Vec<&str> = vec![current.id.as_str()];
    let history = controller.history().iter().map(|id| id.as_str());
    for id in neighbors.iter().copied().chain(history) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let nodes = ids
        .into_iter()
        .filter_map(|id| graph.node(id))
        .map(|node| {
            let is_current = node.id == current.id;
            BranchNode {
                id: node.id.clone(),
                label: label_for(node, current, label_length),
                is_current,
                is_visited: controller.visited(&node.id),
                is_available: available.contains(&node.id.as_str()),
                connections: if is_current {
                    neighbors.iter().map(|id| id.to_string()).collect()
                } else {
                    Vec::new()
                },
            }
        })
        .collect();

    BranchMap { nodes }
}

/// Explicit label, else the text of the first choice from `current` leading to
/// the node, else truncated literal text, else the id.
fn label_for(node: &NarrativeNode, current: &NarrativeNode, max_chars: usize) -> String {
    if let Some(label) = &node.label {
        return label.clone();
    }
    if let Some(choice) = current.choices.iter().find(|c| c.target == node.id) {
        return choice.text.clone();
    }
    match node.text.as_literal() {
        Some(text) if !text.trim().is_empty() => truncate(text.trim(), max_chars),
        _ => node.id.clone(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_graph::{Choice, Condition, NarrativeGraph, Operator, StateUpdate};

    fn hub_graph() -> NarrativeGraph {
        NarrativeGraph::from_nodes(
            "hub",
            vec![
                NarrativeNode::new("hub", "A quiet junction between timelines.")
                    .with_label("Junction")
                    .with_choice(Choice::new("Enter the archive", "archive"))
                    .with_choice(
                        Choice::new("Open the vault", "vault")
                            .with_condition(Condition::new("coherence", Operator::Ge, 10)),
                    )
                    .with_choice(Choice::new("Re-enter the archive", "archive"))
                    .with_choice(Choice::new("Leave", "exit:hub")),
                NarrativeNode::new(
                    "archive",
                    "Shelves of recorded futures stretch past the edge of sight.",
                )
                .with_choice(
                    Choice::new("Back", "hub").with_update(StateUpdate::increment("coherence", 10)),
                ),
                NarrativeNode::new("vault", "The vault."),
            ],
        )
        .unwrap()
        .with_initial("coherence", 4)
        .with_sentinel("exit:hub")
    }

    #[test]
    fn test_projection_at_start() {
        let ctl = TraversalController::new(hub_graph()).unwrap();
        let map = ctl.branch_map();

        let ids: Vec<_> = map.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["hub", "archive", "vault"]);

        let hub = map.current().unwrap();
        assert_eq!(hub.id, "hub");
        assert_eq!(hub.label, "Junction");
        assert!(hub.is_visited);
        assert_eq!(hub.connections, vec!["archive", "vault"]);

        let archive = map.get("archive").unwrap();
        assert!(archive.is_available);
        assert!(!archive.is_visited);
        assert_eq!(archive.label, "Enter the archive");
        assert!(archive.connections.is_empty());

        let vault = map.get("vault").unwrap();
        assert!(!vault.is_available);
        assert_eq!(map.available().count(), 1);
    }

    #[test]
    fn test_projection_after_moving() {
        let mut ctl = TraversalController::new(hub_graph()).unwrap();
        ctl.select_index(0).unwrap();
        let map = ctl.branch_map();

        let archive = map.current().unwrap();
        assert_eq!(archive.id, "archive");
        assert_eq!(archive.connections, vec!["hub"]);

        let hub = map.get("hub").unwrap();
        assert!(hub.is_visited);
        assert!(hub.is_available);
        assert!(!hub.is_current);
        // Explicit labels win over choice text.
        assert_eq!(hub.label, "Junction");

        assert!(map.get("vault").is_none());
    }

    #[test]
    fn test_gate_opens_after_update() {
        let mut ctl = TraversalController::new(hub_graph()).unwrap();
        ctl.select_index(0).unwrap();
        ctl.select_index(0).unwrap();

        let map = ctl.branch_map();
        assert!(map.get("vault").unwrap().is_available);
        assert!(map.get("archive").unwrap().is_visited);
    }

    #[test]
    fn test_projection_is_read_only() {
        let ctl = TraversalController::new(hub_graph()).unwrap();
        let before = ctl.snapshot();
        let _ = ctl.branch_map();
        assert_eq!(ctl.snapshot(), before);
    }

    #[test]
    fn test_label_truncation() {
        let node = NarrativeNode::new("far", "Shelves of recorded futures stretch past the edge of sight.");
        let elsewhere = NarrativeNode::new("elsewhere", "...");
        assert_eq!(label_for(&node, &elsewhere, 12), "Shelves of r...");
        assert_eq!(label_for(&node, &elsewhere, 200), node.text.as_literal().unwrap());
    }
}
