//! Bhasha CLI: the `bhasha` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    support::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            skip_images,
            target,
        } => commands::check::run(target, skip_images),

        Commands::CleanTags { dry_run, target } => commands::clean_tags::run(target, dry_run),

        Commands::FillPlaceholders { dry_run, target } => {
            commands::fill_placeholders::run(target, dry_run)
        }

        Commands::Coverage { target } => commands::coverage::run(target),

        Commands::MissingNames { language, target } => {
            commands::missing_names::run(target, language)
        }
    }
}
