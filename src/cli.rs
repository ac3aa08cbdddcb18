use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blossom",
    about = "Expand templates into generated source and resource roots",
    version
)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct ProjectArgs {
    /// Project directory containing blossom.toml
    #[arg(short, long, default_value = ".")]
    pub project: String,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Run a single task (see `blossom tasks`)
    #[arg(long)]
    pub task: Option<String>,

    /// Override a property in every template set (can be repeated: -P key=value)
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Regenerate even when nothing changed
    #[arg(long)]
    pub force: bool,

    /// Skip the post-generate hook
    #[arg(long)]
    pub no_hooks: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate all template sets
    Generate {
        #[command(flatten)]
        run: RunArgs,

        /// Show what would be generated without writing anything
        #[arg(long)]
        dry_run: bool,

        /// With --dry-run, show unified diffs against existing output
        #[arg(long, requires = "dry_run")]
        diff: bool,
    },

    /// Validate configuration, data files and templates
    Check {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Print the generated source and resource roots
    Roots {
        #[command(flatten)]
        project: ProjectArgs,

        /// Print the roots as JSON
        #[arg(long)]
        json: bool,
    },

    /// List generation tasks
    Tasks {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Run the legacy token replacement from [replacements]
    Replace {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Generate, then regenerate whenever inputs change
    Watch {
        #[command(flatten)]
        run: RunArgs,

        /// Milliseconds to wait for further changes before regenerating
        #[arg(long, default_value_t = 300)]
        debounce: u64,
    },
}
