use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::data::Variables;
use crate::error::{BlossomError, Result};
use crate::sourceset::GenerateTask;

const STATE_DIR: &str = ".blossom-state";

/// SHA-256 over everything a task reads: its configuration, property overrides,
/// and the names and contents of every template, include and data file.
pub fn fingerprint(project_dir: &Path, task: &GenerateTask, overrides: &Variables) -> Result<String> {
    let mut hasher = Sha256::new();

    hasher.update(task.name.as_bytes());
    hasher.update(task.output_dir.to_string_lossy().as_bytes());
    for suffix in &task.suffixes {
        hasher.update(suffix.as_bytes());
    }
    hasher.update(serde_json::to_vec(&task.config).unwrap_or_default());
    hasher.update(serde_json::to_vec(overrides).unwrap_or_default());

    for dir in task.template_dirs.iter().chain(task.include_dirs.iter()) {
        hasher.update(b"\0dir\0");
        hasher.update(dir.to_string_lossy().as_bytes());
        if !dir.is_dir() {
            continue;
        }

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        files.sort();

        for file in files {
            hash_file(&mut hasher, &file)?;
        }
    }

    for file in task.data_files(project_dir) {
        hasher.update(b"\0data\0");
        if file.is_file() {
            hash_file(&mut hasher, &file)?;
        } else {
            hasher.update(file.to_string_lossy().as_bytes());
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn hash_file(hasher: &mut Sha256, file: &Path) -> Result<()> {
    hasher.update(file.to_string_lossy().as_bytes());
    hash_contents(hasher, file)
}

fn hash_contents(hasher: &mut Sha256, file: &Path) -> Result<()> {
    let content = std::fs::read(file).map_err(|e| BlossomError::Io {
        context: format!("reading {}", file.display()),
        source: e,
    })?;
    hasher.update((content.len() as u64).to_le_bytes());
    hasher.update(&content);
    Ok(())
}

/// Digest of every file under `output_dir`, by relative path and content.
/// A missing directory hashes like an empty one.
pub fn output_digest(output_dir: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    if output_dir.is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(output_dir)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        files.sort();

        for file in files {
            let rel = file.strip_prefix(output_dir).unwrap_or(file.as_path());
            hasher.update(b"\0out\0");
            hasher.update(rel.to_string_lossy().as_bytes());
            hash_contents(&mut hasher, &file)?;
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// What was recorded after the last successful generation of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    pub inputs: String,
    pub outputs: String,
}

pub fn state_path(generated_dir: &Path, task: &GenerateTask) -> PathBuf {
    generated_dir
        .join(STATE_DIR)
        .join(format!("{}.sha256", task.name))
}

/// `None` when the state file is missing or not in the expected two-line form.
pub fn read_state(generated_dir: &Path, task: &GenerateTask) -> Option<TaskState> {
    let content = std::fs::read_to_string(state_path(generated_dir, task)).ok()?;
    let mut lines = content.lines().map(str::trim);
    let inputs = lines.next().filter(|l| !l.is_empty())?.to_string();
    let outputs = lines.next().filter(|l| !l.is_empty())?.to_string();
    Some(TaskState { inputs, outputs })
}

pub fn write_state(generated_dir: &Path, task: &GenerateTask, state: &TaskState) -> Result<()> {
    let path = state_path(generated_dir, task);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BlossomError::Io {
            context: format!("creating {}", parent.display()),
            source: e,
        })?;
    }
    std::fs::write(&path, format!("{}\n{}\n", state.inputs, state.outputs)).map_err(|e| {
        BlossomError::Io {
            context: format!("writing {}", path.display()),
            source: e,
        }
    })
}

pub fn clear_state(generated_dir: &Path, task: &GenerateTask) -> Result<()> {
    let path = state_path(generated_dir, task);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BlossomError::Io {
            context: format!("deleting {}", path.display()),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ProjectConfig, TemplateSetConfig};
    use crate::sourceset::resolve_tasks;
    use std::fs;

    fn java_task(project: &Path) -> GenerateTask {
        let config: ProjectConfig = toml::from_str(
            "[source_sets.main.template_sets.java]\ndata_files = [\"data.yaml\"]\n",
        )
        .unwrap();
        resolve_tasks(project, &config).unwrap().remove(0)
    }

    #[test]
    fn stable_for_unchanged_inputs() {
        let project = tempfile::tempdir().unwrap();
        let templates = project.path().join("src/main/java-templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("A.java.peb"), "class A {}").unwrap();

        let task = java_task(project.path());
        let a = fingerprint(project.path(), &task, &Variables::new()).unwrap();
        let b = fingerprint(project.path(), &task, &Variables::new()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn changes_with_template_content() {
        let project = tempfile::tempdir().unwrap();
        let templates = project.path().join("src/main/java-templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("A.java.peb"), "class A {}").unwrap();

        let task = java_task(project.path());
        let before = fingerprint(project.path(), &task, &Variables::new()).unwrap();
        fs::write(templates.join("A.java.peb"), "class A { int x; }").unwrap();
        let after = fingerprint(project.path(), &task, &Variables::new()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn changes_when_data_file_appears() {
        let project = tempfile::tempdir().unwrap();
        let task = java_task(project.path());
        let before = fingerprint(project.path(), &task, &Variables::new()).unwrap();
        fs::write(project.path().join("data.yaml"), "a: b\n").unwrap();
        let after = fingerprint(project.path(), &task, &Variables::new()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn changes_with_overrides_and_config() {
        let project = tempfile::tempdir().unwrap();
        let mut task = java_task(project.path());
        let base = fingerprint(project.path(), &task, &Variables::new()).unwrap();

        let mut overrides = Variables::new();
        overrides.insert("v".into(), tera::Value::String("1".into()));
        assert_ne!(
            base,
            fingerprint(project.path(), &task, &overrides).unwrap()
        );

        task.config = TemplateSetConfig {
            header: Some("// generated".into()),
            ..task.config.clone()
        };
        assert_ne!(
            base,
            fingerprint(project.path(), &task, &Variables::new()).unwrap()
        );
    }

    #[test]
    fn single_line_state_is_ignored() {
        let project = tempfile::tempdir().unwrap();
        let task = java_task(project.path());
        let generated = project.path().join("build/generated");
        let path = state_path(&generated, &task);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "abc\n").unwrap();

        assert!(read_state(&generated, &task).is_none());
    }

    #[test]
    fn output_digest_tracks_files_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let empty = output_digest(&out).unwrap();

        fs::create_dir_all(out.join("pkg")).unwrap();
        fs::write(out.join("pkg/a.txt"), "a").unwrap();
        fs::write(out.join("b.txt"), "b").unwrap();
        let full = output_digest(&out).unwrap();
        assert_ne!(empty, full);
        assert_eq!(full, output_digest(&out).unwrap());

        fs::write(out.join("b.txt"), "tampered").unwrap();
        let edited = output_digest(&out).unwrap();
        assert_ne!(full, edited);

        fs::remove_file(out.join("pkg/a.txt")).unwrap();
        assert_ne!(edited, output_digest(&out).unwrap());
    }

    #[test]
    fn state_round_trip() {
        let project = tempfile::tempdir().unwrap();
        let task = java_task(project.path());
        let generated = project.path().join("build/generated");

        let state = TaskState {
            inputs: "abc".into(),
            outputs: "def".into(),
        };

        assert!(read_state(&generated, &task).is_none());
        write_state(&generated, &task, &state).unwrap();
        assert_eq!(read_state(&generated, &task), Some(state));
        clear_state(&generated, &task).unwrap();
        assert!(read_state(&generated, &task).is_none());
        clear_state(&generated, &task).unwrap();
    }
}
