use std::path::Path;

use blossom::config::schema::SetTarget;
use blossom::schedule::Project;
use console::style;
use miette::Result;

pub fn run(path: String) -> Result<()> {
    let project = Project::load(Path::new(&path))?;
    let tasks = project.tasks()?;

    if tasks.is_empty() {
        println!("No template sets configured.");
        return Ok(());
    }

    for task in &tasks {
        let kind = match &task.target {
            SetTarget::Resources => "resources".to_string(),
            SetTarget::Sources { language } => language.clone(),
        };
        let variants = if task.config.variants.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = task.config.variants.keys().map(String::as_str).collect();
            format!(" variants: {}", names.join(", "))
        };
        println!(
            "  {} {}{}",
            style(&task.name).bold(),
            style(format!("({}, {kind})", task.source_set)).dim(),
            style(variants).dim()
        );
    }

    Ok(())
}
