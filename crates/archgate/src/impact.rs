//! Dependency impact analysis.
//!
//! Computes the blast radius of a change with a level-synchronous BFS over the
//! dependency graph, built with petgraph from a point-in-time
//! [`GraphSnapshot`].
//!
//! # Edge Direction Convention
//!
//! An edge `source -> target` means *source depends on target*.
//!
//! - **Downstream** follows outgoing edges: what the root depends on.
//! - **Upstream** follows incoming edges: what depends on the root.
//!
//! # Ordering
//!
//! Level *k* holds the nodes first reached at exactly *k* hops. Within a level,
//! candidate edges from the whole frontier are visited in store enumeration
//! order, so when two edges reach the same node at the same level the one the
//! store lists first wins. Every node enters the visited set before its own
//! edges are explored, so cycles terminate.

use crate::domain::{
    DependencyEdge, GraphSnapshot, ImpactDirection, ImpactEntry, ImpactResult, NodeId,
};
use crate::error::Result;
use crate::storage::DependencyStore;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Limits applied to a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpactOptions {
    /// Stop after this many reached nodes and mark the result truncated.
    pub max_nodes: Option<usize>,
}

/// Directed dependency graph indexed for traversal.
///
/// Node weights are node ids; edge weights are positions in the snapshot's
/// edge list, which preserves store enumeration order.
pub struct DependencyGraph<'a> {
    snapshot: &'a GraphSnapshot,
    graph: DiGraph<NodeId, usize>,
    node_map: HashMap<NodeId, NodeIndex>,
    catalogued: HashSet<&'a NodeId>,
}

impl<'a> DependencyGraph<'a> {
    /// Index a snapshot.
    ///
    /// Edge endpoints missing from the node list still get graph nodes so they
    /// can be reached, but only catalogued nodes can start a traversal.
    #[must_use]
    pub fn build(snapshot: &'a GraphSnapshot) -> Self {
        let mut graph = DiGraph::with_capacity(snapshot.nodes.len(), snapshot.edges.len());
        let mut node_map = HashMap::with_capacity(snapshot.nodes.len());

        for node in &snapshot.nodes {
            node_map
                .entry(node.id.clone())
                .or_insert_with(|| graph.add_node(node.id.clone()));
        }

        for (position, edge) in snapshot.edges.iter().enumerate() {
            let source = *node_map
                .entry(edge.source.clone())
                .or_insert_with(|| graph.add_node(edge.source.clone()));
            let target = *node_map
                .entry(edge.target.clone())
                .or_insert_with(|| graph.add_node(edge.target.clone()));
            graph.add_edge(source, target, position);
        }

        Self {
            snapshot,
            graph,
            node_map,
            catalogued: snapshot.nodes.iter().map(|n| &n.id).collect(),
        }
    }

    /// Run a bounded BFS from `root`.
    ///
    /// Unknown roots and `depth <= 0` yield an empty result.
    #[must_use]
    pub fn impact(
        &self,
        root: &NodeId,
        depth: i32,
        direction: ImpactDirection,
        options: ImpactOptions,
    ) -> ImpactResult {
        let mut result = ImpactResult::empty(root.clone(), direction, depth);
        if depth <= 0 || !self.catalogued.contains(root) {
            return result;
        }
        let Some(&start) = self.node_map.get(root) else {
            return result;
        };

        let petgraph_direction = match direction {
            ImpactDirection::Downstream => Direction::Outgoing,
            ImpactDirection::Upstream => Direction::Incoming,
        };

        let mut visited = HashSet::from([start]);
        let mut frontier = vec![start];
        let mut level: u32 = 1;

        'levels: while !frontier.is_empty() && i64::from(level) <= i64::from(depth) {
            let mut candidates: Vec<(usize, NodeIndex)> = frontier
                .iter()
                .flat_map(|&node| {
                    self.graph
                        .edges_directed(node, petgraph_direction)
                        .map(move |edge| {
                            let next = match petgraph_direction {
                                Direction::Outgoing => edge.target(),
                                Direction::Incoming => edge.source(),
                            };
                            (*edge.weight(), next)
                        })
                })
                .collect();
            // petgraph yields edges newest-first; restore store order.
            candidates.sort_unstable_by_key(|&(position, _)| position);

            let mut next_frontier = Vec::new();
            for (position, node) in candidates {
                if !visited.insert(node) {
                    continue;
                }
                if options
                    .max_nodes
                    .is_some_and(|cap| result.entries.len() >= cap)
                {
                    result.truncated = true;
                    break 'levels;
                }
                result.entries.push(ImpactEntry {
                    edge: self.edge_at(position).clone(),
                    level,
                    reached: self.graph[node].clone(),
                });
                next_frontier.push(node);
            }

            frontier = next_frontier;
            level += 1;
        }

        result
    }

    fn edge_at(&self, position: usize) -> &DependencyEdge {
        &self.snapshot.edges[position]
    }
}

/// Runs impact queries against a dependency store.
pub struct ImpactAnalyzer {
    store: Arc<dyn DependencyStore>,
    options: ImpactOptions,
}

impl ImpactAnalyzer {
    /// Create an analyzer with no node cap.
    pub fn new(store: Arc<dyn DependencyStore>) -> Self {
        Self::with_options(store, ImpactOptions::default())
    }

    /// Create an analyzer with explicit limits.
    pub fn with_options(store: Arc<dyn DependencyStore>, options: ImpactOptions) -> Self {
        Self { store, options }
    }

    /// Compute the blast radius of `node` within `depth` hops.
    ///
    /// Reads one consistent snapshot from the store; never writes.
    ///
    /// # Errors
    ///
    /// Only store read failures are errors. An unknown node is an empty
    /// result.
    pub async fn analyze_impact(
        &self,
        node: &NodeId,
        depth: i32,
        direction: ImpactDirection,
    ) -> Result<ImpactResult> {
        if depth <= 0 {
            return Ok(ImpactResult::empty(node.clone(), direction, depth));
        }

        let snapshot = self.store.snapshot().await?;
        let result = DependencyGraph::build(&snapshot).impact(node, depth, direction, self.options);

        if result.truncated {
            warn!(
                node = %node,
                %direction,
                depth,
                max_nodes = ?self.options.max_nodes,
                "Impact traversal truncated at node cap"
            );
        }
        debug!(
            node = %node,
            %direction,
            depth,
            reached = result.entries.len(),
            max_level = result.max_level(),
            "Impact analysis complete"
        );
        Ok(result)
    }
}
