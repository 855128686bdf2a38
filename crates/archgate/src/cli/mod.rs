//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a new archgate workspace
//! - `impact`: Compute the blast radius of a change to a node
//! - `review`: Create reviews and drive them through the workflow
//! - `dr-check`: Validate disaster-recovery site counts
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! archgate impact payments --depth 2 --direction upstream
//! archgate review create --title "Split ledger" --change-type change \
//!     --target-system ledger --target-level 1 --applicant alice \
//!     --attributes change.yaml
//! archgate review submit rev-a3f8 --actor alice --role applicant
//! archgate review approve rev-a3f8 --actor bob --role reviewer
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    CreateReviewArgs, DrCheckArgs, EventsArgs, ImpactArgs, InitArgs, ReviewActionArgs,
    ReviewArgs, ReviewCommand, ShowReviewArgs,
};
pub use types::{ChangeTypeArg, DirectionArg, RoleArg};
pub use validators::{validate_name, validate_prefix, validate_review_id, validate_title};

/// Archgate - architecture governance for change reviews
///
/// Computes dependency blast radius and gates change reviews on compliance
/// rules. Data lives in `.archgate/`.
#[derive(Parser, Debug)]
#[command(name = "archgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new archgate workspace
    ///
    /// Creates `.archgate/` with a default config, an example catalog and an
    /// empty review event log.
    Init(InitArgs),

    /// Compute the blast radius of a change to a node
    ///
    /// Lists every node reachable within the given depth, each at its minimum
    /// hop distance.
    Impact(ImpactArgs),

    /// Create and act on change reviews
    Review(ReviewArgs),

    /// Validate disaster-recovery site counts of catalogued systems
    DrCheck(DrCheckArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any error raised by the command.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args, output_mode).await,
            Some(Commands::Impact(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_impact(&app, args, output_mode).await
            }
            Some(Commands::Review(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_review(&app, &args.action, output_mode).await
            }
            Some(Commands::DrCheck(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_dr_check(&app, args, output_mode).await
            }
            None => {
                println!("Archgate architecture governance");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
