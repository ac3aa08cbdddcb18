//! Maps configured template sets onto generation tasks and generated roots.

pub mod roots;

use std::path::{Path, PathBuf};

use crate::config::schema::{ProjectConfig, SetTarget, TemplateSetConfig};
use crate::data::resolve_paths;
use crate::error::{BlossomError, Result};
use crate::render::TemplateLoader;

pub use roots::{load_roots, write_roots, SourceRoots, SourceSetRoots};

pub const MAIN_SOURCE_SET_NAME: &str = "main";

/// One template set of one source set, ready to be generated.
#[derive(Debug, Clone)]
pub struct GenerateTask {
    /// e.g. `generateJavaTemplates`, `generateTestResourceTemplates`.
    pub name: String,
    pub source_set: String,
    pub set_name: String,
    pub target: SetTarget,
    pub template_dirs: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub suffixes: Vec<String>,
    pub config: TemplateSetConfig,
}

impl GenerateTask {
    pub fn loader(&self) -> Result<TemplateLoader> {
        TemplateLoader::new(
            self.template_dirs.clone(),
            self.include_dirs.clone(),
            &self.config.exclude,
        )
    }

    /// Every data file the task reads, variant files included.
    pub fn data_files(&self, project_dir: &Path) -> Vec<PathBuf> {
        let mut files = resolve_paths(project_dir, &self.config.data_files);
        for variant in self.config.variants.values() {
            files.extend(resolve_paths(project_dir, &variant.data_files));
        }
        files
    }
}

/// Resolve every configured template set into a task, in source set then set name order.
pub fn resolve_tasks(project_dir: &Path, config: &ProjectConfig) -> Result<Vec<GenerateTask>> {
    let generated_dir = project_dir.join(&config.blossom.generated_dir);
    let suffixes = config.blossom.template_suffixes();

    let mut tasks = Vec::new();
    for (source_set, set_name, set) in config.template_sets() {
        let target = set
            .target(set_name)
            .map_err(|reason| BlossomError::ConfigInvalidSet {
                source_set: source_set.to_string(),
                name: set_name.to_string(),
                reason,
            })?;

        let template_dirs = if set.templates.is_empty() {
            vec![default_templates_dir(project_dir, source_set, set_name)]
        } else {
            resolve_paths(project_dir, &set.templates)
        };

        let include_dirs = if set.includes.is_empty() {
            let default = default_includes_dir(project_dir, source_set, set_name);
            if default.is_dir() {
                vec![default]
            } else {
                Vec::new()
            }
        } else {
            resolve_paths(project_dir, &set.includes)
        };

        tasks.push(GenerateTask {
            name: task_name(source_set, set_name),
            source_set: source_set.to_string(),
            set_name: set_name.to_string(),
            output_dir: output_dir(&generated_dir, source_set, set_name, &target),
            target,
            template_dirs,
            include_dirs,
            suffixes: suffixes.clone(),
            config: set.clone(),
        });
    }

    Ok(tasks)
}

/// `generate{SourceSet}{Set}Templates`, with the main source set left out.
pub fn task_name(source_set: &str, set_name: &str) -> String {
    let source_part = if source_set == MAIN_SOURCE_SET_NAME {
        String::new()
    } else {
        capitalize(source_set)
    };
    format!("generate{source_part}{}Templates", capitalize(set_name))
}

pub fn default_templates_dir(project_dir: &Path, source_set: &str, set_name: &str) -> PathBuf {
    project_dir
        .join("src")
        .join(source_set)
        .join(format!("{set_name}-templates"))
}

pub fn default_includes_dir(project_dir: &Path, source_set: &str, set_name: &str) -> PathBuf {
    project_dir
        .join("src")
        .join(source_set)
        .join(format!("{set_name}-includes"))
}

pub fn output_dir(
    generated_dir: &Path,
    source_set: &str,
    set_name: &str,
    target: &SetTarget,
) -> PathBuf {
    let kind = if target.is_resources() {
        "resources"
    } else {
        "sources"
    };
    generated_dir
        .join(kind)
        .join(format!("blossom-{set_name}"))
        .join(source_set)
}

/// Capitalize the first letter and drop `-`/`_`, capitalizing what follows them.
fn capitalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if c == '-' || c == '_' {
            upper = true;
            continue;
        }
        if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
