//! Graph validation - the load-time integrity pass over an authored graph.
//!
//! Catches the data defects that the engine would otherwise only discover
//! mid-playthrough:
//! - **Dangling targets**: a choice pointing at an id that is neither a node nor a sentinel
//! - **Missing start**: the declared start node does not exist
//! - **Unreachable nodes**: nodes no path of choices can reach from the start
//! - **Unknown generators**: computed text naming a generator nobody registered

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::graph::{NarrativeGraph, TextSpec};

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// The graph cannot be traversed safely.
    Error,
    /// Suspicious but traversable.
    Warning,
}

/// A single defect found in a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssue {
    DanglingTarget {
        node_id: String,
        choice_index: usize,
        target: String,
    },
    MissingStartNode {
        start: String,
    },
    UnreachableNode {
        node_id: String,
    },
    UnknownGenerator {
        node_id: String,
        generator: String,
    },
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self {
            ValidationIssue::UnreachableNode { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::DanglingTarget {
                node_id,
                choice_index,
                target,
            } => write!(
                f,
                "node '{}' choice #{} targets missing node '{}'",
                node_id, choice_index, target
            ),
            ValidationIssue::MissingStartNode { start } => {
                write!(f, "start node '{}' does not exist", start)
            }
            ValidationIssue::UnreachableNode { node_id } => {
                write!(f, "node '{}' is unreachable from the start node", node_id)
            }
            ValidationIssue::UnknownGenerator { node_id, generator } => write!(
                f,
                "node '{}' uses unregistered text generator '{}'",
                node_id, generator
            ),
        }
    }
}

/// All issues found by a validation pass, in graph order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no issue has [`Severity::Error`].
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Warning)
    }

    /// `(node_id, target)` pairs of every dangling choice.
    pub fn dangling_targets(&self) -> Vec<(&str, &str)> {
        self.issues
            .iter()
            .filter_map(|issue| match issue {
                ValidationIssue::DanglingTarget {
                    node_id, target, ..
                } => Some((node_id.as_str(), target.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        f.write_str(&rendered.join("; "))
    }
}

/// Validate structure only. Generator names are not checked.
pub fn validate(graph: &NarrativeGraph) -> ValidationReport {
    run(graph, None)
}

/// Validate structure and check every computed text against the known generator names.
pub fn validate_with_generators<'a>(
    graph: &NarrativeGraph,
    generators: impl IntoIterator<Item = &'a str>,
) -> ValidationReport {
    let known: HashSet<&str> = generators.into_iter().collect();
    run(graph, Some(&known))
}

fn run(graph: &NarrativeGraph, generators: Option<&HashSet<&str>>) -> ValidationReport {
    let mut issues = Vec::new();

    if !graph.contains(graph.start()) {
        issues.push(ValidationIssue::MissingStartNode {
            start: graph.start().to_string(),
        });
    }

    for node in graph.nodes() {
        for (choice_index, choice) in node.choices.iter().enumerate() {
            if !graph.contains(&choice.target) && !graph.is_sentinel(&choice.target) {
                issues.push(ValidationIssue::DanglingTarget {
                    node_id: node.id.clone(),
                    choice_index,
                    target: choice.target.clone(),
                });
            }
        }

        if let Some(known) = generators {
            let specs = std::iter::once(&node.text).chain(node.text_after.as_ref());
            for spec in specs {
                if let TextSpec::Computed { generator } = spec {
                    if !known.contains(generator.as_str()) {
                        issues.push(ValidationIssue::UnknownGenerator {
                            node_id: node.id.clone(),
                            generator: generator.clone(),
                        });
                    }
                }
            }
        }
    }

    // Reachability only makes sense from an existing start.
    if graph.contains(graph.start()) {
        let reachable = reachable_from(graph, graph.start());
        for node in graph.nodes() {
            if !reachable.contains(node.id.as_str()) {
                issues.push(ValidationIssue::UnreachableNode {
                    node_id: node.id.clone(),
                });
            }
        }
    }

    ValidationReport { issues }
}

/// Ids of every node reachable from `start`, ignoring conditions.
pub fn reachable_from<'a>(graph: &'a NarrativeGraph, start: &str) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();

    if let Some(node) = graph.node(start) {
        seen.insert(node.id.as_str());
        queue.push_back(node);
    }

    while let Some(node) = queue.pop_front() {
        for choice in &node.choices {
            if let Some(next) = graph.node(&choice.target) {
                if seen.insert(next.id.as_str()) {
                    queue.push_back(next);
                }
            }
        }
    }

    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Choice, NarrativeNode};

    fn well_formed() -> NarrativeGraph {
        NarrativeGraph::from_nodes(
            "origins:start",
            vec![
                NarrativeNode::new("origins:start", "The lab hums.")
                    .with_choice(Choice::new("Investigate", "origins:lab"))
                    .with_choice(Choice::new("Return to hub", "exit:hub")),
                NarrativeNode::new("origins:lab", "Readouts flicker.")
                    .with_choice(Choice::new("Continue", "partII:intro")),
                NarrativeNode::new("partII:intro", "Part two begins."),
            ],
        )
        .unwrap()
        .with_sentinel("exit:hub")
    }

    #[test]
    fn test_well_formed_graph_is_clean() {
        let report = validate(&well_formed());
        assert!(report.is_empty(), "unexpected issues: {}", report);
        assert!(report.is_valid());
    }

    #[test]
    fn test_dangling_reference_reported_exactly() {
        let mut graph = well_formed();
        graph
            .insert_node(
                NarrativeNode::new("partII:fork", "A fork.")
                    .with_choice(Choice::new("Left", "partII:intro"))
                    .with_choice(Choice::new("Right", "partII:missing")),
            )
            .unwrap();
        graph
            .insert_node(NarrativeNode::new("partII:hidden", "Hidden").with_choice(Choice::new(
                "To fork",
                "partII:fork",
            )))
            .unwrap();

        let report = validate(&graph);

        assert_eq!(report.dangling_targets(), vec![("partII:fork", "partII:missing")]);
        assert_eq!(report.errors().count(), 1);
        assert!(!report.is_valid());
        assert!(matches!(
            report.errors().next(),
            Some(ValidationIssue::DanglingTarget { choice_index: 1, .. })
        ));
    }

    #[test]
    fn test_cross_segment_dangling_reference() {
        let graph = NarrativeGraph::from_nodes(
            "origins:start",
            vec![NarrativeNode::new("origins:start", "...")
                .with_choice(Choice::new("Skip ahead", "partIII:intro"))],
        )
        .unwrap();

        let report = validate(&graph);
        assert_eq!(report.dangling_targets(), vec![("origins:start", "partIII:intro")]);
    }

    #[test]
    fn test_missing_start_node() {
        let graph = NarrativeGraph::from_nodes("nowhere", vec![NarrativeNode::new("a", "...")])
            .unwrap();
        let report = validate(&graph);

        assert!(report.issues.contains(&ValidationIssue::MissingStartNode {
            start: "nowhere".to_string()
        }));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_unreachable_node_is_warning() {
        let mut graph = well_formed();
        graph
            .insert_node(NarrativeNode::new("origins:orphan", "Nobody comes here."))
            .unwrap();

        let report = validate(&graph);

        assert!(report.is_valid());
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(
            warnings,
            vec![&ValidationIssue::UnreachableNode {
                node_id: "origins:orphan".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_generator() {
        let graph = NarrativeGraph::from_nodes(
            "a",
            vec![NarrativeNode::new("a", TextSpec::computed("readout"))
                .with_text_after(TextSpec::computed("epilogue"))],
        )
        .unwrap();

        assert!(validate(&graph).is_valid());

        let report = validate_with_generators(&graph, ["readout"]);
        assert_eq!(
            report.issues,
            vec![ValidationIssue::UnknownGenerator {
                node_id: "a".to_string(),
                generator: "epilogue".to_string()
            }]
        );
    }

    #[test]
    fn test_reachable_from_follows_cycles() {
        let graph = NarrativeGraph::from_nodes(
            "a",
            vec![
                NarrativeNode::new("a", "...").with_choice(Choice::new("to b", "b")),
                NarrativeNode::new("b", "...").with_choice(Choice::new("back", "a")),
                NarrativeNode::new("c", "..."),
            ],
        )
        .unwrap();

        let reachable = reachable_from(&graph, "a");
        assert_eq!(reachable.len(), 2);
        assert!(!reachable.contains("c"));
    }
}
