use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tera::Tera;
use walkdir::WalkDir;

use crate::error::{BlossomError, Result};
use crate::render::file::is_binary_file;

/// Looks templates up by relative name across several directories.
///
/// Template directories are searched before include directories, and the first
/// directory holding a regular file of that name wins. Only files in template
/// directories are emitted; include directories exist to be `include`d or
/// `import`ed.
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    include_dirs: Vec<PathBuf>,
    exclude: GlobSet,
}

impl TemplateLoader {
    pub fn new(
        template_dirs: Vec<PathBuf>,
        include_dirs: Vec<PathBuf>,
        exclude: &[String],
    ) -> Result<Self> {
        Ok(Self {
            template_dirs,
            include_dirs,
            exclude: build_glob_set(exclude)?,
        })
    }

    /// Whether any template directory exists on disk.
    pub fn has_sources(&self) -> bool {
        self.template_dirs.iter().any(|d| d.is_dir())
    }

    /// Names of every template to emit, sorted and without duplicates.
    pub fn template_names(&self) -> Vec<String> {
        collect_names(&self.template_dirs, &self.exclude)
    }

    /// Names only reachable through include directories.
    pub fn include_names(&self) -> Vec<String> {
        let templates: BTreeSet<String> = self.template_names().into_iter().collect();
        collect_names(&self.include_dirs, &self.exclude)
            .into_iter()
            .filter(|name| !templates.contains(name))
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<PathBuf> {
        if !is_contained(name) {
            return None;
        }

        self.template_dirs
            .iter()
            .chain(self.include_dirs.iter())
            .map(|dir| dir.join(name))
            .find(|file| file.is_file())
    }

    /// All directories this loader reads from, templates first.
    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.template_dirs
            .iter()
            .chain(self.include_dirs.iter())
            .map(PathBuf::as_path)
    }
}

/// Register every text template and include into a Tera instance, auto-escaping disabled.
pub fn build_engine(loader: &TemplateLoader, set_name: &str) -> Result<Tera> {
    let mut sources = Vec::new();

    for name in loader
        .template_names()
        .into_iter()
        .chain(loader.include_names())
    {
        let Some(path) = loader.find(&name) else {
            continue;
        };
        if is_binary_file(&path) {
            continue;
        }
        let content = std::fs::read_to_string(&path).map_err(|e| BlossomError::Io {
            context: format!("reading template {}", path.display()),
            source: e,
        })?;
        sources.push((name, content));
    }

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(sources)
        .map_err(|e| BlossomError::TemplateParse {
            template: set_name.to_string(),
            source: e,
        })?;

    Ok(tera)
}

/// Template names use `/` separators regardless of platform.
fn collect_names(dirs: &[PathBuf], exclude: &GlobSet) -> Vec<String> {
    let mut names = BTreeSet::new();

    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(rel) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if exclude.is_match(&name) {
                continue;
            }

            names.insert(name);
        }
    }

    names.into_iter().collect()
}

/// Reject names that would resolve outside the directory they are looked up in.
fn is_contained(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

pub(crate) fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| BlossomError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| BlossomError::GlobPattern {
        pattern: "<combined>".into(),
        source: e,
    })
}
