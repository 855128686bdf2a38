//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{ActorRole, ChangeType, ImpactDirection};

/// Impact traversal direction for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    /// What the node depends on
    #[value(alias = "down")]
    Downstream,
    /// What depends on the node
    #[value(alias = "up")]
    Upstream,
}

impl From<DirectionArg> for ImpactDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Downstream => ImpactDirection::Downstream,
            DirectionArg::Upstream => ImpactDirection::Upstream,
        }
    }
}

/// Review change type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTypeArg {
    /// A system that does not exist yet
    #[value(name = "new-build", alias = "new_build")]
    NewBuild,
    /// A change to an existing system
    Change,
}

impl From<ChangeTypeArg> for ChangeType {
    fn from(arg: ChangeTypeArg) -> Self {
        match arg {
            ChangeTypeArg::NewBuild => ChangeType::NewBuild,
            ChangeTypeArg::Change => ChangeType::Change,
        }
    }
}

/// Actor role for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleArg {
    /// Submits changes
    Applicant,
    /// Decides on submitted reviews
    Reviewer,
    /// Elevated
    Architect,
    /// Elevated
    Admin,
    /// Automation
    System,
}

impl From<RoleArg> for ActorRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Applicant => ActorRole::Applicant,
            RoleArg::Reviewer => ActorRole::Reviewer,
            RoleArg::Architect => ActorRole::Architect,
            RoleArg::Admin => ActorRole::Admin,
            RoleArg::System => ActorRole::System,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_cover_every_variant() {
        assert_eq!(ImpactDirection::from(DirectionArg::Upstream), ImpactDirection::Upstream);
        assert_eq!(ChangeType::from(ChangeTypeArg::NewBuild), ChangeType::NewBuild);
        for arg in RoleArg::value_variants() {
            let role = ActorRole::from(*arg);
            assert_eq!(role.to_string().to_lowercase(), format!("{arg:?}").to_lowercase());
        }
    }
}
