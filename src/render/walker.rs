use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::data::VariantContext;
use crate::error::{BlossomError, Result};
use crate::render::context::build_context;
use crate::render::file::{is_binary_file, render_relative_path};
use crate::render::loader::{build_engine, TemplateLoader};

pub struct GeneratedOutput {
    pub output_dir: PathBuf,
    pub files_rendered: Vec<PathBuf>,
    pub files_copied: Vec<PathBuf>,
}

/// A file that would be created during generation.
#[derive(Debug)]
pub struct PlannedFile {
    /// Path relative to the output directory.
    pub relative_path: PathBuf,
    /// Template name the file was produced from.
    pub template: String,
    pub variant: Option<String>,
    pub content: Vec<u8>,
    /// Whether this file was copied verbatim (true) or rendered from a template (false).
    pub is_copy: bool,
}

/// The result of planning a template set without writing to disk.
#[derive(Debug)]
pub struct GenerationPlan {
    pub files: Vec<PlannedFile>,
}

/// What a single template set renders from.
pub struct RenderInput<'a> {
    pub set_name: &'a str,
    pub loader: &'a TemplateLoader,
    pub header: Option<&'a str>,
    pub suffixes: &'a [String],
}

/// Render every template once per variant context, in memory.
pub fn plan_render(input: &RenderInput<'_>, contexts: &[VariantContext]) -> Result<GenerationPlan> {
    let tera = build_engine(input.loader, input.set_name)?;
    let mut seen_outputs = HashSet::new();
    let mut files = Vec::new();

    for name in input.loader.template_names() {
        let Some(src_path) = input.loader.find(&name) else {
            continue;
        };
        let is_copy = is_binary_file(&src_path);
        let raw = if is_copy {
            Some(std::fs::read(&src_path).map_err(|e| BlossomError::Io {
                context: format!("reading {}", src_path.display()),
                source: e,
            })?)
        } else {
            None
        };

        for variant in contexts {
            let context = build_context(&variant.variables);
            let relative_path = render_relative_path(Path::new(&name), &context, input.suffixes)?;

            if !seen_outputs.insert(relative_path.clone()) {
                return Err(BlossomError::DuplicateOutput {
                    output: relative_path,
                    input: name.clone(),
                });
            }

            let content = match &raw {
                Some(bytes) => bytes.clone(),
                None => {
                    let rendered =
                        tera.render(&name, &context)
                            .map_err(|e| BlossomError::RenderError {
                                file: name.clone(),
                                source: e,
                            })?;
                    let mut out = String::with_capacity(rendered.len());
                    if let Some(header) = input.header {
                        out.push_str(header);
                        out.push('\n');
                    }
                    out.push_str(&rendered);
                    out.into_bytes()
                }
            };

            tracing::trace!(
                template = %name,
                output = %relative_path.display(),
                variant = variant.name.as_deref().unwrap_or("-"),
                "planned"
            );

            files.push(PlannedFile {
                relative_path,
                template: name.clone(),
                variant: variant.name.clone(),
                content,
                is_copy,
            });
        }
    }

    Ok(GenerationPlan { files })
}

/// Replace the contents of `output_dir` with the files from a generation plan.
pub fn execute_plan(plan: &GenerationPlan, output_dir: &Path) -> Result<GeneratedOutput> {
    clear_directory(output_dir)?;
    std::fs::create_dir_all(output_dir).map_err(|e| BlossomError::Io {
        context: format!("creating output directory {}", output_dir.display()),
        source: e,
    })?;

    let mut files_rendered = Vec::new();
    let mut files_copied = Vec::new();

    for file in &plan.files {
        let dest_path = output_dir.join(&file.relative_path);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BlossomError::Io {
                context: format!("creating directory {}", parent.display()),
                source: e,
            })?;
        }
        std::fs::write(&dest_path, &file.content).map_err(|e| BlossomError::Io {
            context: format!("writing {}", dest_path.display()),
            source: e,
        })?;
        if file.is_copy {
            files_copied.push(file.relative_path.clone());
        } else {
            files_rendered.push(file.relative_path.clone());
        }
    }

    Ok(GeneratedOutput {
        output_dir: output_dir.to_path_buf(),
        files_rendered,
        files_copied,
    })
}

/// Delete everything inside `dir`, keeping `dir` itself.
pub fn clear_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| BlossomError::Io {
        context: format!("listing {}", dir.display()),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| BlossomError::Io {
            context: format!("listing {}", dir.display()),
            source: e,
        })?;
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let removed = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        removed.map_err(|e| BlossomError::Io {
            context: format!("deleting {}", path.display()),
            source: e,
        })?;
    }

    Ok(())
}
