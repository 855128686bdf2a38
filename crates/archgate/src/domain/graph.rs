//! Dependency graph reference data and impact query results.

use super::string_id;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

string_id! {
    /// Identifier of a catalogued system or application.
    NodeId
}

/// A catalogued system or application. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    /// Unique identifier
    pub id: NodeId,

    /// Human-readable name
    pub display_name: String,

    /// Business or technical domain the node belongs to
    pub domain: String,
}

/// Kind of interaction a dependency represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    /// Synchronous request/response call
    SyncCall,

    /// Asynchronous message or event
    AsyncMessage,

    /// Shared database, bucket or file store
    SharedStore,
}

/// Business criticality of a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criticality {
    /// Degradation is tolerable
    Low,

    /// Degradation is visible to users
    Medium,

    /// Outage of the target breaks the source
    High,
}

/// A directed dependency: `source` depends on `target`.
///
/// Several edges may connect the same pair as long as their types differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The dependent node
    pub source: NodeId,

    /// The node depended upon
    pub target: NodeId,

    /// Interaction kind
    #[serde(rename = "type")]
    pub edge_type: EdgeType,

    /// Criticality of the dependency
    pub criticality: Criticality,
}

/// Nodes and edges read together from a dependency store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Catalogued nodes
    pub nodes: Vec<DependencyNode>,

    /// Edges in store enumeration order
    pub edges: Vec<DependencyEdge>,
}

/// Traversal direction for impact queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactDirection {
    /// Follow edges whose target is the current node: who depends on me.
    Upstream,

    /// Follow edges whose source is the current node: what I depend on.
    Downstream,
}

impl fmt::Display for ImpactDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactDirection::Upstream => write!(f, "upstream"),
            ImpactDirection::Downstream => write!(f, "downstream"),
        }
    }
}

impl FromStr for ImpactDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upstream" | "up" => Ok(ImpactDirection::Upstream),
            "downstream" | "down" => Ok(ImpactDirection::Downstream),
            other => Err(format!(
                "invalid direction '{other}', expected upstream or downstream"
            )),
        }
    }
}

/// A node reached by an impact query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactEntry {
    /// The edge that first reached `reached`
    pub edge: DependencyEdge,

    /// Hop distance from the root (1 = direct neighbour)
    pub level: u32,

    /// The newly reached node
    pub reached: NodeId,
}

/// Result of an impact query, ordered by level then discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// Node the query started from
    pub root: NodeId,

    /// Traversal direction
    pub direction: ImpactDirection,

    /// Requested depth
    pub depth: i32,

    /// Reached nodes, each exactly once at its minimum level
    pub entries: Vec<ImpactEntry>,

    /// True when a node cap stopped the traversal early
    #[serde(default)]
    pub truncated: bool,
}

impl ImpactResult {
    /// An empty traversal rooted at `root`.
    #[must_use]
    pub fn empty(root: NodeId, direction: ImpactDirection, depth: i32) -> Self {
        Self {
            root,
            direction,
            depth,
            entries: Vec::new(),
            truncated: false,
        }
    }

    /// Reached node ids in result order.
    pub fn reached_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.entries.iter().map(|entry| &entry.reached)
    }

    /// Entries first reached at exactly `level` hops.
    pub fn at_level(&self, level: u32) -> impl Iterator<Item = &ImpactEntry> {
        self.entries.iter().filter(move |entry| entry.level == level)
    }

    /// Deepest level reached, 0 for an empty result.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.entries.iter().map(|e| e.level).max().unwrap_or(0)
    }

    /// True when nothing was reached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_serializes_type_field() {
        let edge = DependencyEdge {
            source: NodeId::new("billing"),
            target: NodeId::new("ledger"),
            edge_type: EdgeType::AsyncMessage,
            criticality: Criticality::High,
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["type"], "ASYNC_MESSAGE");
        assert_eq!(json["criticality"], "HIGH");
        assert_eq!(json["source"], "billing");
    }

    #[test]
    fn direction_parses_short_forms() {
        assert_eq!("UP".parse::<ImpactDirection>(), Ok(ImpactDirection::Upstream));
        assert_eq!(
            "downstream".parse::<ImpactDirection>(),
            Ok(ImpactDirection::Downstream)
        );
        assert!("sideways".parse::<ImpactDirection>().is_err());
    }
}
