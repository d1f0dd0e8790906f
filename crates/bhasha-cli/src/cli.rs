use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bhasha",
    about = "Bhasha: integrity checks and tag maintenance for the FoodBhasha dataset",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Which collections a command operates on.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Repository root; collections live under `<root>/<data_dir>`
    #[arg(long, default_value = ".")]
    pub root: String,

    /// Catalog TOML (built-in catalog when omitted)
    #[arg(long)]
    pub config: Option<String>,

    /// Category id or collection file name (repeatable; default: all)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every record of the selected collections
    Check {
        /// Skip the photo field and image-existence checks
        #[arg(long)]
        skip_images: bool,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Map legacy tags to canonical ones and migrate `category` to `tags`
    CleanTags {
        /// Report changes without rewriting collection files
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Set unfilled language entries to the name placeholder
    FillPlaceholders {
        /// Report changes without rewriting collection files
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Report per-language name coverage
    Coverage {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// List records without a real name in one language
    MissingNames {
        /// Supported language key, e.g. `gujarati`
        language: String,

        #[command(flatten)]
        target: TargetArgs,
    },
}
