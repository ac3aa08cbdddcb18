//! Runs generation tasks: ordering, up-to-date checks, locking and hooks.

pub mod fingerprint;
pub mod lock;
pub mod watch;

use std::path::{Path, PathBuf};

use crate::config::{load_config, ProjectConfig};
use crate::data::{prepare_contexts, Variables};
use crate::error::{BlossomError, Result};
use crate::hooks;
use crate::render::{execute_plan, plan_render, GeneratedOutput, GenerationPlan, RenderInput};
use crate::sourceset::{resolve_tasks, write_roots, GenerateTask, SourceRoots};

use self::fingerprint::{clear_state, fingerprint, output_digest, read_state, write_state, TaskState};
use self::lock::GenerationLock;

/// A project directory with its loaded configuration.
pub struct Project {
    pub dir: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    pub fn load(dir: &Path) -> Result<Self> {
        let config = load_config(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            config,
        })
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.dir.join(&self.config.blossom.generated_dir)
    }

    pub fn tasks(&self) -> Result<Vec<GenerateTask>> {
        resolve_tasks(&self.dir, &self.config)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Run only the task with this name.
    pub task: Option<String>,
    /// Applied on top of every context.
    pub overrides: Variables,
    /// Regenerate even when inputs are unchanged.
    pub force: bool,
    /// Plan in memory without writing anything.
    pub dry_run: bool,
    pub no_hooks: bool,
}

pub enum TaskOutcome {
    Generated(GeneratedOutput),
    UpToDate,
    /// No template directory exists.
    NoSource,
    /// Dry run; nothing written.
    Planned(GenerationPlan),
}

impl TaskOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Generated(_) => "generated",
            TaskOutcome::UpToDate => "up-to-date",
            TaskOutcome::NoSource => "no-source",
            TaskOutcome::Planned(_) => "planned",
        }
    }
}

pub struct TaskReport {
    pub task: GenerateTask,
    pub outcome: TaskOutcome,
}

pub struct RunSummary {
    pub reports: Vec<TaskReport>,
    pub roots: SourceRoots,
    /// `None` on dry runs.
    pub roots_file: Option<PathBuf>,
}

impl RunSummary {
    pub fn generated_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, TaskOutcome::Generated(_)))
            .count()
    }
}

/// Pick the tasks to run, in their resolved order.
pub fn select_tasks(tasks: Vec<GenerateTask>, name: Option<&str>) -> Result<Vec<GenerateTask>> {
    let Some(name) = name else {
        return Ok(tasks);
    };

    let selected: Vec<_> = tasks.into_iter().filter(|t| t.name == name).collect();
    if selected.is_empty() {
        return Err(BlossomError::UnknownTask {
            name: name.to_string(),
        });
    }
    Ok(selected)
}

/// Run every selected task, then publish the roots manifest and run the post-generate hook.
pub fn run_tasks(project: &Project, options: &RunOptions) -> Result<RunSummary> {
    let all_tasks = project.tasks()?;
    let roots = SourceRoots::from_tasks(&all_tasks);
    let selected = select_tasks(all_tasks, options.task.as_deref())?;
    let generated_dir = project.generated_dir();

    let _lock = if options.dry_run {
        None
    } else {
        Some(GenerationLock::acquire(&generated_dir)?)
    };

    let mut reports = Vec::with_capacity(selected.len());
    for task in selected {
        let outcome = run_task(project, &generated_dir, &task, options)?;
        tracing::info!(task = %task.name, outcome = outcome.label(), "task finished");
        reports.push(TaskReport { task, outcome });
    }

    let roots_file = if options.dry_run {
        None
    } else {
        Some(write_roots(&generated_dir, &roots)?)
    };

    if !options.dry_run && !options.no_hooks {
        hooks::run_post_generate(&project.config.hooks, &project.dir, &roots)?;
    }

    Ok(RunSummary {
        reports,
        roots,
        roots_file,
    })
}

fn run_task(
    project: &Project,
    generated_dir: &Path,
    task: &GenerateTask,
    options: &RunOptions,
) -> Result<TaskOutcome> {
    let loader = task.loader()?;

    if !loader.has_sources() {
        tracing::debug!(task = %task.name, "no template directories exist");
        if !options.dry_run {
            crate::render::walker::clear_directory(&task.output_dir)?;
            clear_state(generated_dir, task)?;
        }
        return Ok(TaskOutcome::NoSource);
    }

    let digest = fingerprint(&project.dir, task, &options.overrides)?;
    if !options.force && !options.dry_run && is_up_to_date(generated_dir, task, &digest)? {
        return Ok(TaskOutcome::UpToDate);
    }

    let contexts = prepare_contexts(&project.dir, &task.set_name, &task.config, &options.overrides)?;
    let input = RenderInput {
        set_name: &task.set_name,
        loader: &loader,
        header: task.config.header.as_deref(),
        suffixes: &task.suffixes,
    };
    let plan = plan_render(&input, &contexts)?;

    if options.dry_run {
        return Ok(TaskOutcome::Planned(plan));
    }

    let output = execute_plan(&plan, &task.output_dir)?;
    let state = TaskState {
        inputs: digest,
        outputs: output_digest(&task.output_dir)?,
    };
    write_state(generated_dir, task, &state)?;
    Ok(TaskOutcome::Generated(output))
}

/// Inputs unchanged since the last run, and the outputs it wrote still on disk as written.
fn is_up_to_date(generated_dir: &Path, task: &GenerateTask, digest: &str) -> Result<bool> {
    let Some(state) = read_state(generated_dir, task) else {
        return Ok(false);
    };
    if state.inputs != digest || !task.output_dir.is_dir() {
        return Ok(false);
    }
    Ok(output_digest(&task.output_dir)? == state.outputs)
}
