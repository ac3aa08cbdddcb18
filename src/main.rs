mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "blossom=debug" } else { "blossom=warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate { run, dry_run, diff } => commands::generate::run(run, dry_run, diff),
        Commands::Check { project } => commands::check::run(project.project),
        Commands::Roots { project, json } => commands::roots::run(project.project, json),
        Commands::Tasks { project } => commands::tasks::run(project.project),
        Commands::Replace { project } => commands::replace::run(project.project),
        Commands::Watch { run, debounce } => commands::watch::run(run, debounce),
    }
}
