use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use similar::TextDiff;
use walkdir::WalkDir;

/// Relative paths of every file currently under `dir`.
pub fn collect_files(dir: &Path) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    if !dir.exists() {
        return files;
    }

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(dir) {
            files.insert(rel.to_path_buf());
        }
    }

    files
}

pub fn unified_diff(old: &str, new: &str, path: &Path) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut output = String::new();

    output.push_str(&format!(
        "--- a/{}\n+++ b/{}\n",
        path.display(),
        path.display()
    ));

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        output.push_str(&format!("{hunk}"));
    }

    output
}
