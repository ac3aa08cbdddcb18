use std::path::Path;

use blossom::schedule::Project;
use blossom::sourceset::SourceRoots;
use console::style;
use miette::{IntoDiagnostic, Result};

pub fn run(path: String, json: bool) -> Result<()> {
    let project = Project::load(Path::new(&path))?;
    let roots = SourceRoots::from_tasks(&project.tasks()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&roots).into_diagnostic()?);
        return Ok(());
    }

    for (source_set, set_roots) in &roots.source_sets {
        println!("{}", style(source_set).bold());
        for (language, dirs) in &set_roots.sources {
            for dir in dirs {
                println!("  {:<10} {}", style(language).cyan(), dir.display());
            }
        }
        for dir in &set_roots.resources {
            println!("  {:<10} {}", style("resources").green(), dir.display());
        }
    }

    Ok(())
}
