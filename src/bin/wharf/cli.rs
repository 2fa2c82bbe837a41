//! CLI definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

/// Wharf - dependency manager for Java projects published to a local package store
#[derive(Parser)]
#[command(name = "wharf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the dependencies of a project
    List,

    /// Update the dependencies of a project
    Update(UpdateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Whether or not to update IntelliJ project files
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 1)]
    pub intellij: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
