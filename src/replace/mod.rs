//! Literal `token -> value` replacement over whole source directories.
//!
//! This predates template sets: inputs are mirrored into a single output
//! directory and tokens are substituted as plain text, without any engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::schema::ReplacementsConfig;
use crate::error::{BlossomError, Result};
use crate::render::loader::build_glob_set;

#[derive(Debug)]
pub struct ReplaceSummary {
    pub output_dir: PathBuf,
    pub files_replaced: usize,
    pub files_copied: usize,
}

pub fn run_replacements(project_dir: &Path, config: &ReplacementsConfig) -> Result<ReplaceSummary> {
    let output_dir = project_dir.join(&config.output);
    let exclude = build_glob_set(&config.exclude)?;
    let global = tokens(&config.global);
    let by_file: BTreeMap<&str, Vec<(String, String)>> = config
        .by_file
        .iter()
        .map(|(path, map)| (path.as_str(), tokens(map)))
        .collect();

    if output_dir.exists() {
        std::fs::remove_dir_all(&output_dir).map_err(|e| BlossomError::Io {
            context: format!("deleting {}", output_dir.display()),
            source: e,
        })?;
    }
    create_dir(&output_dir)?;

    let mut summary = ReplaceSummary {
        output_dir: output_dir.clone(),
        files_replaced: 0,
        files_copied: 0,
    };

    for input in &config.inputs {
        let input_dir = project_dir.join(input);
        if !input_dir.is_dir() {
            tracing::debug!(dir = %input_dir.display(), "skipping missing input directory");
            continue;
        }

        for entry in WalkDir::new(&input_dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| BlossomError::Io {
                context: format!("walking {}", input_dir.display()),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(rel) = path.strip_prefix(&input_dir) else {
                continue;
            };
            if exclude.is_match(rel) {
                continue;
            }

            let mut applicable: Vec<&(String, String)> = Vec::new();
            if applies_globally(path, &config.global_locations) {
                applicable.extend(global.iter());
            }
            if let Some(file_tokens) = by_file.get(project_path(project_dir, path).as_str()) {
                applicable.extend(file_tokens.iter());
            }

            let dest = output_dir.join(rel);
            if let Some(parent) = dest.parent() {
                create_dir(parent)?;
            }

            if replace_file(path, &dest, &applicable)? {
                summary.files_replaced += 1;
            } else {
                summary.files_copied += 1;
            }
        }
    }

    tracing::info!(
        output = %output_dir.display(),
        replaced = summary.files_replaced,
        copied = summary.files_copied,
        "token replacement finished"
    );
    Ok(summary)
}

/// Write `src` to `dest` with `tokens` substituted in order. Returns `false`
/// when the file was copied unchanged.
fn replace_file(src: &Path, dest: &Path, tokens: &[&(String, String)]) -> Result<bool> {
    let bytes = std::fs::read(src).map_err(|e| BlossomError::Io {
        context: format!("reading {}", src.display()),
        source: e,
    })?;

    let text = match String::from_utf8(bytes) {
        Ok(text) if !tokens.is_empty() => text,
        Ok(text) => return write_file(dest, text.as_bytes()).map(|_| false),
        Err(e) => return write_file(dest, e.as_bytes()).map(|_| false),
    };

    let replaced = tokens
        .iter()
        .fold(text, |acc, (token, value)| acc.replace(token.as_str(), value));
    write_file(dest, replaced.as_bytes())?;
    Ok(true)
}

fn applies_globally(path: &Path, locations: &[String]) -> bool {
    if locations.is_empty() {
        return true;
    }
    let full = slashed(&path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
    locations
        .iter()
        .any(|location| full.ends_with(&location.replace('\\', "/")))
}

/// Path relative to the project root with `/` separators.
fn project_path(project_dir: &Path, path: &Path) -> String {
    slashed(path.strip_prefix(project_dir).unwrap_or(path))
}

fn slashed(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace("//", "/")
}

fn tokens(map: &BTreeMap<String, toml::Value>) -> Vec<(String, String)> {
    map.iter()
        .map(|(token, value)| {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (token.clone(), value)
        })
        .collect()
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| BlossomError::Io {
        context: format!("creating {}", dir.display()),
        source: e,
    })
}

fn write_file(dest: &Path, content: &[u8]) -> Result<()> {
    std::fs::write(dest, content).map_err(|e| BlossomError::Io {
        context: format!("writing {}", dest.display()),
        source: e,
    })
}
