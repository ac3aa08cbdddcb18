use std::time::Duration;

use blossom::schedule::watch::{watch, WatchOptions};
use blossom::GenerateOptions;
use console::style;
use miette::Result;

use crate::cli::RunArgs;
use crate::commands::generate::print_summary;

pub fn run(args: RunArgs, debounce: u64) -> Result<()> {
    let options = GenerateOptions::from(args);
    let run_options = blossom::watch_options(&options)?;
    let watch_options = WatchOptions {
        debounce: Duration::from_millis(debounce),
        max_runs: None,
    };

    println!(
        "{} Watching {} (Ctrl-C to stop)",
        style("...").cyan().bold(),
        style(options.project.display()).cyan()
    );

    watch(&options.project, &run_options, &watch_options, |result| match result {
        Ok(summary) => print_summary(&summary),
        Err(e) => eprintln!("{} {:?}", style("error:").red().bold(), miette::Report::new(e)),
    })?;

    Ok(())
}
