use std::path::{Component, Path, PathBuf};

use tera::{Context, Tera};

use crate::error::{BlossomError, Result};

/// Render template expressions in a path component (e.g. `{{ wrapper }}Box.java.peb`).
pub fn render_path_component(component: &str, context: &Context) -> Result<String> {
    if !component.contains("{{") && !component.contains("{%") {
        return Ok(component.to_string());
    }

    let mut tera = Tera::default();
    tera.add_raw_template("__path__", component).map_err(|e| {
        BlossomError::FilenameRenderError {
            filename: component.to_string(),
            source: e,
        }
    })?;

    tera.render("__path__", context)
        .map_err(|e| BlossomError::FilenameRenderError {
            filename: component.to_string(),
            source: e,
        })
}

/// Render each component of a relative path, and strip a template suffix from the file name.
///
/// Every rendered component must stay a plain name: no `..`, no root, and not empty.
pub fn render_relative_path(
    rel_path: &Path,
    context: &Context,
    suffixes: &[String],
) -> Result<PathBuf> {
    let mut rendered = PathBuf::new();
    let count = rel_path.components().count();
    for (index, component) in rel_path.components().enumerate() {
        let part = component.as_os_str().to_string_lossy();
        let mut rendered_part = render_path_component(&part, context)?;

        if index + 1 == count {
            if let Some(suffix) = suffixes
                .iter()
                .find(|s| !s.is_empty() && rendered_part.ends_with(s.as_str()))
            {
                rendered_part.truncate(rendered_part.len() - suffix.len());
            }
        }

        if !is_plain_name(&rendered_part) {
            return Err(BlossomError::UnsafeOutputPath {
                template: rel_path.to_string_lossy().into_owned(),
                rendered: rendered_part,
            });
        }

        rendered.push(rendered_part);
    }
    Ok(rendered)
}

fn is_plain_name(part: &str) -> bool {
    let mut components = Path::new(part).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

/// Detect binary files using content_inspector (BOM-aware, null-byte scanning).
///
/// Reads only the first 8KB to avoid unnecessary allocation for large files.
pub fn is_binary_file(path: &Path) -> bool {
    use std::io::Read;

    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };

    let mut buf = [0u8; 8192];
    let Ok(n) = file.take(8192).read(&mut buf) else {
        return false;
    };

    !content_inspector::inspect(&buf[..n]).is_text()
}
