pub mod check;
pub mod config;
pub mod data;
pub mod error;
pub mod hooks;
pub mod render;
pub mod replace;
pub mod schedule;
pub mod sourceset;

use std::path::PathBuf;

use crate::config::load_config;
use crate::data::parse_properties;
use crate::error::{BlossomError, Result};
use crate::replace::{run_replacements, ReplaceSummary};
use crate::schedule::{run_tasks, Project, RunOptions, RunSummary};

pub struct GenerateOptions {
    pub project: PathBuf,
    /// Run only this task, e.g. `generateJavaTemplates`.
    pub task: Option<String>,
    /// Raw `KEY=VALUE` overrides from the command line.
    pub properties: Vec<String>,
    pub force: bool,
    pub no_hooks: bool,
}

impl GenerateOptions {
    fn run_options(&self, dry_run: bool) -> Result<RunOptions> {
        Ok(RunOptions {
            task: self.task.clone(),
            overrides: parse_properties(&self.properties)?,
            force: self.force,
            dry_run,
            no_hooks: self.no_hooks,
        })
    }
}

/// Render every template set in memory without touching the generated directory.
pub fn plan_generation(options: &GenerateOptions) -> Result<RunSummary> {
    let project = Project::load(&options.project)?;
    run_tasks(&project, &options.run_options(true)?)
}

/// Generate every out-of-date template set, publish the generated roots and run hooks.
pub fn generate(options: &GenerateOptions) -> Result<RunSummary> {
    let project = Project::load(&options.project)?;
    run_tasks(&project, &options.run_options(false)?)
}

/// Run the legacy token replacement configured under `[replacements]`.
pub fn replace(project_dir: &std::path::Path) -> Result<ReplaceSummary> {
    let config = load_config(project_dir)?;
    let replacements = config.replacements.ok_or(BlossomError::NoReplacements)?;
    run_replacements(project_dir, &replacements)
}

/// Build the run options `watch` re-uses on every change.
pub fn watch_options(options: &GenerateOptions) -> Result<RunOptions> {
    options.run_options(false)
}
