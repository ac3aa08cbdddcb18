use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use blossom::render::diff::{collect_files, unified_diff};
use blossom::schedule::{RunSummary, TaskOutcome, TaskReport};
use blossom::GenerateOptions;
use console::style;
use miette::Result;

use crate::cli::RunArgs;

pub fn run(args: RunArgs, dry_run: bool, diff: bool) -> Result<()> {
    let options = GenerateOptions::from(args);

    if dry_run {
        let summary = blossom::plan_generation(&options)?;
        print_plan(&summary, diff);
        println!(
            "\n{} Dry run \u{2014} no files written.",
            style("\u{2139}").blue().bold()
        );
        return Ok(());
    }

    let summary = blossom::generate(&options)?;
    print_summary(&summary);
    Ok(())
}

pub fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        let detail = match &report.outcome {
            TaskOutcome::Generated(output) => format!(
                "{} rendered, {} copied",
                output.files_rendered.len(),
                output.files_copied.len()
            ),
            _ => String::new(),
        };
        let marker = match report.outcome {
            TaskOutcome::Generated(_) => style("✓").green().bold(),
            TaskOutcome::UpToDate => style("=").dim(),
            _ => style("-").dim(),
        };
        println!(
            "  {} {} {} {}",
            marker,
            style(&report.task.name).bold(),
            style(report.outcome.label()).dim(),
            detail
        );
    }

    if let Some(roots_file) = &summary.roots_file {
        println!(
            "\n{} {} task(s) generated, roots written to {}",
            style("✓").green().bold(),
            summary.generated_count(),
            style(roots_file.display()).cyan()
        );
    }
}

fn print_plan(summary: &RunSummary, diff: bool) {
    for report in &summary.reports {
        let TaskOutcome::Planned(plan) = &report.outcome else {
            println!(
                "\n{} {} {}",
                style("==>").cyan().bold(),
                style(&report.task.name).bold(),
                style(report.outcome.label()).dim()
            );
            continue;
        };

        println!(
            "\n{} {} \u{2192} {}",
            style("==>").cyan().bold(),
            style(&report.task.name).bold(),
            style(report.task.output_dir.display()).cyan()
        );

        let existing = collect_files(&report.task.output_dir);
        let planned: BTreeSet<PathBuf> = plan.files.iter().map(|f| f.relative_path.clone()).collect();

        for file in &plan.files {
            let variant = file
                .variant
                .as_deref()
                .map(|v| format!(" [{v}]"))
                .unwrap_or_default();
            let status = file_status(report, &existing, &file.relative_path, &file.content);
            println!(
                "  {} {}{}",
                style(format!("{status:<6}")).green(),
                file.relative_path.display(),
                style(variant).dim()
            );

            if diff && !file.is_copy && status == "update" {
                let old = std::fs::read_to_string(report.task.output_dir.join(&file.relative_path))
                    .unwrap_or_default();
                let new = String::from_utf8_lossy(&file.content);
                for line in unified_diff(&old, &new, &file.relative_path).lines() {
                    print_diff_line(line);
                }
            }
        }

        for stale in existing.difference(&planned) {
            println!("  {} {}", style("delete").red(), stale.display());
        }

        let rendered = plan.files.iter().filter(|f| !f.is_copy).count();
        let copied = plan.files.len() - rendered;
        println!("  Summary: {rendered} rendered, {copied} copied");
    }
}

fn file_status(report: &TaskReport, existing: &BTreeSet<PathBuf>, rel: &Path, content: &[u8]) -> &'static str {
    if !existing.contains(rel) {
        return "create";
    }
    match std::fs::read(report.task.output_dir.join(rel)) {
        Ok(current) if current == content => "same",
        _ => "update",
    }
}

fn print_diff_line(line: &str) {
    if line.starts_with("+++") || line.starts_with("---") {
        println!("    {}", style(line).bold());
    } else if line.starts_with('+') {
        println!("    {}", style(line).green());
    } else if line.starts_with('-') {
        println!("    {}", style(line).red());
    } else if line.starts_with("@@") {
        println!("    {}", style(line).cyan());
    } else {
        println!("    {line}");
    }
}
