//! Domain types for architecture governance.
//!
//! - [`graph`]: catalogued systems and the dependency edges between them
//! - [`rule`]: compliance rules and the checks they produce
//! - [`review`]: change reviews, their attributes, actors and audit events
//! - [`system`]: deployment records used for disaster-recovery validation

/// Defines a string-backed identifier newtype.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

pub(crate) use string_id;

pub mod graph;
pub mod review;
pub mod rule;
pub mod system;

pub use graph::{
    Criticality, DependencyEdge, DependencyNode, EdgeType, GraphSnapshot, ImpactDirection,
    ImpactEntry, ImpactResult, NodeId,
};
pub use review::{
    Actor, ActorRole, ChangeType, DecisionOutcome, DeploymentProfile, NewReview, RerunOutcome,
    Review, ReviewAction, ReviewAttributes, ReviewEvent, ReviewId, ReviewSnapshot, ReviewStatus,
    SubmitOutcome, TechStack, MAX_TARGET_LEVEL, MAX_TITLE_LENGTH, MIN_TARGET_LEVEL,
};
pub use rule::{CheckMethod, ComplianceCheck, Rule, RuleId, RulePredicate, Severity, TextField};
pub use system::{CriticalityTier, SystemRecord};
