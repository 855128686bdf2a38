//! Command execution logic.

use anyhow::{Context, Result};

use super::args::{
    CreateReviewArgs, DrCheckArgs, EventsArgs, ImpactArgs, InitArgs, ReviewActionArgs,
    ReviewCommand,
};
use crate::app::App;
use crate::domain::{Actor, NewReview, NodeId, ReviewAttributes, ReviewId};
use crate::dr::validate_disaster_recovery;
use crate::output::{self, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir, args.prefix.as_deref()).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "archgate_dir": result.archgate_dir.display().to_string(),
            "config_file": result.config_file.display().to_string(),
            "catalog_file": result.catalog_file.display().to_string(),
            "events_file": result.events_file.display().to_string(),
            "prefix": result.prefix,
        }))?,
        OutputMode::Text if !args.quiet => {
            println!("Initialized archgate in {}", result.archgate_dir.display());
            println!("  Config:  {}", result.config_file.display());
            println!("  Catalog: {}", result.catalog_file.display());
            println!("  Events:  {}", result.events_file.display());
            println!("  Review prefix: {}", result.prefix);
        }
        OutputMode::Text => {}
    }
    Ok(())
}

/// Execute the impact command
pub async fn execute_impact(app: &App, args: &ImpactArgs, output_mode: OutputMode) -> Result<()> {
    let max_depth = app.config().impact.max_depth;
    let depth = args.depth.min(max_depth);
    if depth < args.depth {
        tracing::info!(
            requested = args.depth,
            max_depth,
            "Impact depth clamped to configured maximum"
        );
    }

    let result = app
        .analyzer()
        .analyze_impact(&NodeId::new(args.node.as_str()), depth, args.direction.into())
        .await?;
    output::print_impact(&result, output_mode)?;
    Ok(())
}

/// Execute a review subcommand
pub async fn execute_review(
    app: &App,
    command: &ReviewCommand,
    output_mode: OutputMode,
) -> Result<()> {
    let reviews = app.reviews();
    match command {
        ReviewCommand::Create(args) => execute_create(app, args, output_mode).await,
        ReviewCommand::Submit(args) => {
            let outcome = reviews.submit_review(&review_id(args), &actor(args)).await?;
            output::print_submit_outcome(&outcome, output_mode)?;
            Ok(())
        }
        ReviewCommand::Resubmit(args) => {
            let outcome = reviews
                .resubmit_review(&review_id(args), &actor(args))
                .await?;
            output::print_submit_outcome(&outcome, output_mode)?;
            Ok(())
        }
        ReviewCommand::Rerun(args) => {
            let outcome = reviews.rerun_checks(&review_id(args), &actor(args)).await?;
            output::print_checks(&outcome.checks, output_mode)?;
            Ok(())
        }
        ReviewCommand::Approve(args) => {
            let outcome = reviews.approve_review(&review_id(args), &actor(args)).await?;
            print_decision(args, outcome.status, output_mode)
        }
        ReviewCommand::Reject(args) => {
            let outcome = reviews.reject_review(&review_id(args), &actor(args)).await?;
            print_decision(args, outcome.status, output_mode)
        }
        ReviewCommand::Show(args) => {
            let record = reviews
                .get_review(&ReviewId::new(args.review_id.as_str()))
                .await?;
            output::print_review(&record, output_mode)?;
            Ok(())
        }
        ReviewCommand::List => {
            let all = reviews.list_reviews().await?;
            output::print_reviews(&all, output_mode)?;
            Ok(())
        }
        ReviewCommand::Events(args) => execute_events(app, args, output_mode).await,
    }
}

async fn execute_create(app: &App, args: &CreateReviewArgs, output_mode: OutputMode) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.attributes)
        .await
        .with_context(|| format!("Failed to read {}", args.attributes.display()))?;
    let attributes: ReviewAttributes = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid review attributes in {}", args.attributes.display()))?;

    let new = NewReview {
        title: args.title.clone(),
        change_type: args.change_type.into(),
        target_system: NodeId::new(args.target_system.as_str()),
        target_level: args.target_level,
        applicant: args.applicant.clone(),
        attributes,
    };
    let actor = Actor::new(
        args.actor.clone().unwrap_or_else(|| args.applicant.clone()),
        args.role.into(),
    );

    let review = app.reviews().create_review(new, &actor).await?;
    match output_mode {
        OutputMode::Json => output::print_json(&review)?,
        OutputMode::Text => println!("Created review: {} ({})", review.id, review.status),
    }
    Ok(())
}

async fn execute_events(app: &App, args: &EventsArgs, output_mode: OutputMode) -> Result<()> {
    let events = app
        .reviews()
        .list_events(&ReviewId::new(args.review_id.as_str()), args.limit)
        .await?;
    output::print_events(&events, output_mode)?;
    Ok(())
}

/// Execute the dr-check command
pub async fn execute_dr_check(
    app: &App,
    args: &DrCheckArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let report = validate_disaster_recovery(&app.systems().await);
    output::print_dr_report(&report, output_mode)?;
    if args.strict && !report.core_compliant {
        anyhow::bail!(
            "{} core system(s) below the disaster-recovery site requirement",
            report.core_violations.len()
        );
    }
    Ok(())
}

fn review_id(args: &ReviewActionArgs) -> ReviewId {
    ReviewId::new(args.review_id.as_str())
}

fn actor(args: &ReviewActionArgs) -> Actor {
    Actor::new(args.actor.as_str(), args.role.into())
}

fn print_decision(
    args: &ReviewActionArgs,
    status: crate::domain::ReviewStatus,
    output_mode: OutputMode,
) -> Result<()> {
    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "review_id": args.review_id,
            "status": status,
        }))?,
        OutputMode::Text => println!("Review {}: {}", args.review_id, status),
    }
    Ok(())
}
