use std::ffi::OsString;
use std::path::Path;

use crate::config::schema::HooksConfig;
use crate::error::{BlossomError, Result};
use crate::sourceset::SourceRoots;

pub const SOURCE_ROOTS_ENV: &str = "BLOSSOM_SOURCE_ROOTS";
pub const RESOURCE_ROOTS_ENV: &str = "BLOSSOM_RESOURCE_ROOTS";

/// Run the post-generate command in the project directory, with the generated
/// roots exported as platform path lists.
pub fn run_post_generate(hooks: &HooksConfig, project_dir: &Path, roots: &SourceRoots) -> Result<()> {
    let Some(cmd) = &hooks.post_generate else {
        return Ok(());
    };

    tracing::info!(command = %cmd, "running post_generate hook");

    let status = std::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .current_dir(project_dir)
        .env(SOURCE_ROOTS_ENV, join_paths(&roots.all_sources())?)
        .env(RESOURCE_ROOTS_ENV, join_paths(&roots.all_resources())?)
        .status()
        .map_err(|e| BlossomError::HookError {
            hook: "post_generate".to_string(),
            message: format!("failed to execute: {e}"),
        })?;

    if !status.success() {
        return Err(BlossomError::HookError {
            hook: "post_generate".to_string(),
            message: format!("exited with status {status}"),
        });
    }

    Ok(())
}

fn join_paths(paths: &[&Path]) -> Result<OsString> {
    std::env::join_paths(paths).map_err(|e| BlossomError::HookError {
        hook: "post_generate".to_string(),
        message: format!("cannot export generated roots: {e}"),
    })
}
