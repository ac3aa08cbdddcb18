use std::path::Path;

use console::style;
use miette::Result;

use blossom::check::check_project;

pub fn run(path: String) -> Result<()> {
    let project_dir = Path::new(&path);

    println!(
        "{} {}",
        style("Checking project at").bold(),
        style(project_dir.display()).cyan()
    );

    let result = check_project(project_dir)?;

    println!("  Tasks: {}", result.task_count);
    println!("  Templates: {}", result.template_count);

    if !result.warnings.is_empty() {
        println!("\n{}", style("Warnings:").yellow().bold());
        for w in &result.warnings {
            println!("  {} {}", style("⚠").yellow(), w);
        }
    }

    if !result.errors.is_empty() {
        println!("\n{}", style("Errors:").red().bold());
        for e in &result.errors {
            println!("  {} {}", style("✗").red(), e);
        }
        println!(
            "\n{} Project has {} error(s)",
            style("✗").red().bold(),
            result.errors.len()
        );
        std::process::exit(1);
    } else {
        println!("\n{} Project is valid!", style("✓").green().bold());
    }

    Ok(())
}
