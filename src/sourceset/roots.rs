use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::schema::SetTarget;
use crate::error::{BlossomError, Result};
use crate::sourceset::GenerateTask;

pub const ROOTS_FILE: &str = "blossom-roots.json";

/// Generated directories to add to each source set's compile inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRoots {
    pub source_sets: BTreeMap<String, SourceSetRoots>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSetRoots {
    /// Keyed by language.
    #[serde(default)]
    pub sources: BTreeMap<String, Vec<PathBuf>>,
    #[serde(default)]
    pub resources: Vec<PathBuf>,
}

impl SourceRoots {
    pub fn from_tasks(tasks: &[GenerateTask]) -> Self {
        let mut roots = SourceRoots::default();
        for task in tasks {
            let set_roots = roots.source_sets.entry(task.source_set.clone()).or_default();
            match &task.target {
                SetTarget::Resources => set_roots.resources.push(task.output_dir.clone()),
                SetTarget::Sources { language } => set_roots
                    .sources
                    .entry(language.clone())
                    .or_default()
                    .push(task.output_dir.clone()),
            }
        }
        roots
    }

    pub fn all_sources(&self) -> Vec<&Path> {
        self.source_sets
            .values()
            .flat_map(|s| s.sources.values().flatten())
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn all_resources(&self) -> Vec<&Path> {
        self.source_sets
            .values()
            .flat_map(|s| s.resources.iter())
            .map(PathBuf::as_path)
            .collect()
    }
}

pub fn roots_path(generated_dir: &Path) -> PathBuf {
    generated_dir.join(ROOTS_FILE)
}

pub fn write_roots(generated_dir: &Path, roots: &SourceRoots) -> Result<PathBuf> {
    std::fs::create_dir_all(generated_dir).map_err(|e| BlossomError::Io {
        context: format!("creating {}", generated_dir.display()),
        source: e,
    })?;

    let path = roots_path(generated_dir);
    let json = serde_json::to_string_pretty(roots).map_err(|e| BlossomError::RootsManifest {
        path: path.clone(),
        source: e,
    })?;
    std::fs::write(&path, json + "\n").map_err(|e| BlossomError::Io {
        context: format!("writing {}", path.display()),
        source: e,
    })?;

    Ok(path)
}

pub fn load_roots(generated_dir: &Path) -> Result<SourceRoots> {
    let path = roots_path(generated_dir);
    let content = std::fs::read_to_string(&path).map_err(|e| BlossomError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| BlossomError::RootsManifest { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TemplateSetConfig;

    fn task(source_set: &str, set: &str, target: SetTarget, out: &str) -> GenerateTask {
        GenerateTask {
            name: crate::sourceset::task_name(source_set, set),
            source_set: source_set.into(),
            set_name: set.into(),
            target,
            template_dirs: vec![],
            include_dirs: vec![],
            output_dir: PathBuf::from(out),
            suffixes: vec![],
            config: TemplateSetConfig::default(),
        }
    }

    #[test]
    fn groups_roots_by_source_set_and_language() {
        let tasks = vec![
            task(
                "main",
                "java",
                SetTarget::Sources {
                    language: "java".into(),
                },
                "gen/java",
            ),
            task("main", "resource", SetTarget::Resources, "gen/res"),
            task(
                "test",
                "kotlin",
                SetTarget::Sources {
                    language: "kotlin".into(),
                },
                "gen/kt",
            ),
        ];

        let roots = SourceRoots::from_tasks(&tasks);
        assert_eq!(
            roots.source_sets["main"].sources["java"],
            vec![PathBuf::from("gen/java")]
        );
        assert_eq!(
            roots.source_sets["main"].resources,
            vec![PathBuf::from("gen/res")]
        );
        assert_eq!(roots.all_sources().len(), 2);
        assert_eq!(roots.all_resources(), vec![Path::new("gen/res")]);
    }

    #[test]
    fn manifest_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![task("main", "resource", SetTarget::Resources, "gen/res")];
        let roots = SourceRoots::from_tasks(&tasks);

        let path = write_roots(dir.path(), &roots).unwrap();
        assert!(path.ends_with(ROOTS_FILE));
        assert_eq!(load_roots(dir.path()).unwrap(), roots);
    }

    #[test]
    fn missing_manifest_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_roots(dir.path()),
            Err(BlossomError::Io { .. })
        ));
    }
}
