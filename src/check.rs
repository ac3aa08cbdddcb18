use std::error::Error;
use std::path::Path;

use crate::config::load_config;
use crate::data::{prepare_contexts, Variables};
use crate::error::Result;
use crate::render::{build_engine, plan_render, RenderInput};
use crate::sourceset::resolve_tasks;

/// Result of validating a project.
pub struct CheckResult {
    pub task_count: usize,
    pub template_count: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate every template set without writing anything.
///
/// Configuration problems are returned as `Err`; problems local to one set are
/// collected so that a single run reports all of them.
pub fn check_project(project_dir: &Path) -> Result<CheckResult> {
    let config = load_config(project_dir)?;
    let tasks = resolve_tasks(project_dir, &config)?;

    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    let mut template_count = 0;

    for task in &tasks {
        let name = &task.name;

        for file in task.data_files(project_dir) {
            if !file.is_file() {
                warnings.push(format!("{name}: data file not found: {}", file.display()));
            }
        }

        if task.config.header.as_deref().is_some_and(|h| h.trim().is_empty()) {
            warnings.push(format!("{name}: header is empty"));
        }

        let loader = match task.loader() {
            Ok(loader) => loader,
            Err(e) => {
                errors.push(format!("{name}: {e}"));
                continue;
            }
        };

        if !loader.has_sources() {
            let dirs: Vec<String> = task
                .template_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect();
            warnings.push(format!(
                "{name}: no template directory exists ({})",
                dirs.join(", ")
            ));
            continue;
        }

        template_count += loader.template_names().len();

        if let Err(e) = build_engine(&loader, &task.set_name) {
            errors.push(format!("{name}: {e}"));
            continue;
        }

        let contexts = match prepare_contexts(project_dir, &task.set_name, &task.config, &Variables::new()) {
            Ok(contexts) => contexts,
            Err(e) => {
                errors.push(format!("{name}: {e}"));
                continue;
            }
        };

        let input = RenderInput {
            set_name: &task.set_name,
            loader: &loader,
            header: task.config.header.as_deref(),
            suffixes: &task.suffixes,
        };
        if let Err(e) = plan_render(&input, &contexts) {
            errors.push(format!("{name}: {}", render_message(&e)));
        }
    }

    Ok(CheckResult {
        task_count: tasks.len(),
        template_count,
        warnings,
        errors,
    })
}

/// Tera nests the useful part of a render failure in its source chain.
fn render_message(err: &crate::error::BlossomError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
