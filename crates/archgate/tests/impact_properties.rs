//! Property tests for impact traversal.
//!
//! Compares the petgraph BFS against a naive shortest-distance computation
//! over random graphs, cycles and duplicate edges included.

use archgate::domain::{
    Criticality, DependencyEdge, DependencyNode, EdgeType, GraphSnapshot, ImpactDirection, NodeId,
};
use archgate::impact::{DependencyGraph, ImpactOptions};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};

fn node_id(index: usize) -> NodeId {
    NodeId::new(format!("n{index}"))
}

fn snapshot(node_count: usize, edges: &[(usize, usize)]) -> GraphSnapshot {
    GraphSnapshot {
        nodes: (0..node_count)
            .map(|i| DependencyNode {
                id: node_id(i),
                display_name: format!("Node {i}"),
                domain: "test".to_string(),
            })
            .collect(),
        edges: edges
            .iter()
            .map(|&(source, target)| DependencyEdge {
                source: node_id(source),
                target: node_id(target),
                edge_type: EdgeType::SyncCall,
                criticality: Criticality::Medium,
            })
            .collect(),
    }
}

/// Hop distance of every node reachable from `root`, root excluded.
fn naive_distances(
    edges: &[DependencyEdge],
    root: &NodeId,
    direction: ImpactDirection,
) -> HashMap<NodeId, u32> {
    let mut distances = HashMap::from([(root.clone(), 0)]);
    let mut queue = VecDeque::from([root.clone()]);
    while let Some(current) = queue.pop_front() {
        let level = distances[&current];
        for edge in edges {
            let (from, to) = endpoints(edge, direction);
            if from == &current && !distances.contains_key(to) {
                distances.insert(to.clone(), level + 1);
                queue.push_back(to.clone());
            }
        }
    }
    distances.remove(root);
    distances
}

/// (near, far) ends of an edge for the traversal direction.
fn endpoints(edge: &DependencyEdge, direction: ImpactDirection) -> (&NodeId, &NodeId) {
    match direction {
        ImpactDirection::Downstream => (&edge.source, &edge.target),
        ImpactDirection::Upstream => (&edge.target, &edge.source),
    }
}

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..40)))
}

fn direction_strategy() -> impl Strategy<Value = ImpactDirection> {
    prop_oneof![Just(ImpactDirection::Downstream), Just(ImpactDirection::Upstream)]
}

proptest! {
    #[test]
    fn traversal_matches_naive_bfs(
        (node_count, pairs) in graph_strategy(),
        root_index in 0usize..12,
        depth in 1i32..6,
        direction in direction_strategy(),
    ) {
        let snapshot = snapshot(node_count, &pairs);
        let root = node_id(root_index % node_count);
        let result = DependencyGraph::build(&snapshot)
            .impact(&root, depth, direction, ImpactOptions::default());

        let expected: HashMap<NodeId, u32> = naive_distances(&snapshot.edges, &root, direction)
            .into_iter()
            .filter(|(_, level)| i64::from(*level) <= i64::from(depth))
            .collect();

        prop_assert!(!result.truncated);
        prop_assert_eq!(result.entries.len(), expected.len());

        let mut seen = HashSet::new();
        let mut levels: HashMap<NodeId, u32> = HashMap::from([(root.clone(), 0)]);
        for entry in &result.entries {
            prop_assert!(seen.insert(entry.reached.clone()), "node reported twice");
            prop_assert_ne!(&entry.reached, &root);
            prop_assert_eq!(Some(&entry.level), expected.get(&entry.reached));

            let (near, far) = endpoints(&entry.edge, direction);
            prop_assert_eq!(far, &entry.reached);
            prop_assert_eq!(levels.get(near).copied(), Some(entry.level - 1));
            levels.insert(entry.reached.clone(), entry.level);
        }

        prop_assert!(result.entries.windows(2).all(|w| w[0].level <= w[1].level));
    }

    #[test]
    fn first_listed_edge_wins_within_a_level(
        (node_count, pairs) in graph_strategy(),
        direction in direction_strategy(),
    ) {
        let snapshot = snapshot(node_count, &pairs);
        let root = node_id(0);
        let result = DependencyGraph::build(&snapshot)
            .impact(&root, 8, direction, ImpactOptions::default());

        let levels: HashMap<&NodeId, u32> = std::iter::once((&root, 0))
            .chain(result.entries.iter().map(|e| (&e.reached, e.level)))
            .collect();

        for entry in &result.entries {
            let first = snapshot.edges.iter().find(|edge| {
                let (near, far) = endpoints(edge, direction);
                far == &entry.reached && levels.get(near) == Some(&(entry.level - 1))
            });
            prop_assert_eq!(first, Some(&entry.edge));
        }
    }

    #[test]
    fn node_cap_truncates_to_a_prefix(
        (node_count, pairs) in graph_strategy(),
        cap in 0usize..6,
    ) {
        let snapshot = snapshot(node_count, &pairs);
        let root = node_id(0);
        let graph = DependencyGraph::build(&snapshot);
        let full = graph.impact(&root, 10, ImpactDirection::Downstream, ImpactOptions::default());
        let capped = graph.impact(
            &root,
            10,
            ImpactDirection::Downstream,
            ImpactOptions { max_nodes: Some(cap) },
        );

        prop_assert!(capped.entries.len() <= cap);
        prop_assert_eq!(capped.truncated, full.entries.len() > cap);
        prop_assert_eq!(&capped.entries[..], &full.entries[..capped.entries.len()]);
    }
}

#[test]
fn non_positive_depth_and_unknown_root_are_empty() {
    let snapshot = snapshot(3, &[(0, 1), (1, 2)]);
    let graph = DependencyGraph::build(&snapshot);

    for depth in [0, -1, i32::MIN] {
        assert!(graph
            .impact(&node_id(0), depth, ImpactDirection::Downstream, ImpactOptions::default())
            .is_empty());
    }
    assert!(graph
        .impact(&NodeId::new("ghost"), 3, ImpactDirection::Downstream, ImpactOptions::default())
        .is_empty());
}

#[test]
fn diamond_reports_shared_node_once() {
    // 0 -> 1 -> 3, 0 -> 2 -> 3
    let snapshot = snapshot(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    let result = DependencyGraph::build(&snapshot).impact(
        &node_id(0),
        5,
        ImpactDirection::Downstream,
        ImpactOptions::default(),
    );

    let reached: Vec<&str> = result.reached_nodes().map(NodeId::as_str).collect();
    assert_eq!(reached, vec!["n1", "n2", "n3"]);
    assert_eq!(result.entries[2].edge.source, node_id(1));
    assert_eq!(result.max_level(), 2);
}
