//! CLI argument structs for all commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::{ChangeTypeArg, DirectionArg, RoleArg};
use super::validators::{validate_name, validate_prefix, validate_review_id, validate_title};
use crate::domain::{MAX_TARGET_LEVEL, MIN_TARGET_LEVEL};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Review id prefix (e.g., "rev" for "rev-a3f8")
    ///
    /// Must be 2-20 alphanumeric characters.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `impact` command
#[derive(Parser, Debug, Clone)]
pub struct ImpactArgs {
    /// Node to start from
    #[arg(value_parser = validate_name)]
    pub node: String,

    /// Maximum hops to follow (clamped to `impact.max-depth`)
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    pub depth: i32,

    /// Direction to traverse
    #[arg(long, value_enum, default_value = "downstream")]
    pub direction: DirectionArg,
}

/// Arguments for the `review` command group
#[derive(Parser, Debug, Clone)]
pub struct ReviewArgs {
    /// Review operation
    #[command(subcommand)]
    pub action: ReviewCommand,
}

/// Review operations
#[derive(Subcommand, Debug, Clone)]
pub enum ReviewCommand {
    /// Create a review in DRAFT
    Create(CreateReviewArgs),

    /// Submit a DRAFT review
    Submit(ReviewActionArgs),

    /// Submit a DRAFT or REJECTED review again
    Resubmit(ReviewActionArgs),

    /// Re-run compliance checks without changing status
    Rerun(ReviewActionArgs),

    /// Approve a REVIEWING review
    Approve(ReviewActionArgs),

    /// Reject a REVIEWING review
    Reject(ReviewActionArgs),

    /// Show a review with its current checks
    Show(ShowReviewArgs),

    /// List all reviews
    List,

    /// Show a review's audit trail, most recent first
    Events(EventsArgs),
}

/// Arguments for `review create`
#[derive(Parser, Debug, Clone)]
pub struct CreateReviewArgs {
    /// Short description of the change (max 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: String,

    /// NEW_BUILD or CHANGE
    #[arg(long, value_enum)]
    pub change_type: ChangeTypeArg,

    /// System the change applies to
    #[arg(long, value_parser = validate_name)]
    pub target_system: String,

    /// Governance level of the target (1 = most critical)
    #[arg(
        long,
        value_parser = clap::value_parser!(u8)
            .range(i64::from(MIN_TARGET_LEVEL)..=i64::from(MAX_TARGET_LEVEL))
    )]
    pub target_level: u8,

    /// Owner of the review
    #[arg(long, value_parser = validate_name)]
    pub applicant: String,

    /// Actor creating the review (defaults to the applicant)
    #[arg(long, value_parser = validate_name)]
    pub actor: Option<String>,

    /// Role the actor presents
    #[arg(long, value_enum, default_value = "applicant")]
    pub role: RoleArg,

    /// YAML file with the review attributes (`kind: new_build` or `kind: change`)
    #[arg(long)]
    pub attributes: PathBuf,
}

/// Arguments for workflow actions on an existing review
#[derive(Parser, Debug, Clone)]
pub struct ReviewActionArgs {
    /// Review id
    #[arg(value_parser = validate_review_id)]
    pub review_id: String,

    /// Actor taking the action
    #[arg(long, value_parser = validate_name)]
    pub actor: String,

    /// Role the actor presents
    #[arg(long, value_enum)]
    pub role: RoleArg,
}

/// Arguments for `review show`
#[derive(Parser, Debug, Clone)]
pub struct ShowReviewArgs {
    /// Review id
    #[arg(value_parser = validate_review_id)]
    pub review_id: String,
}

/// Arguments for `review events`
#[derive(Parser, Debug, Clone)]
pub struct EventsArgs {
    /// Review id
    #[arg(value_parser = validate_review_id)]
    pub review_id: String,

    /// Maximum number of events to display
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

/// Arguments for the `dr-check` command
#[derive(Parser, Debug, Clone)]
pub struct DrCheckArgs {
    /// Exit with an error when a core system violates the site requirement
    #[arg(long)]
    pub strict: bool,
}
