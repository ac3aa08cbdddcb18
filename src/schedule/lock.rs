use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::error::{BlossomError, Result};

const LOCK_FILE: &str = ".blossom.lock";

/// Exclusive lock over a generated directory. Released when dropped.
pub struct GenerationLock {
    _file: File,
    path: PathBuf,
}

impl GenerationLock {
    /// Block until no other process is generating into `generated_dir`.
    pub fn acquire(generated_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(generated_dir).map_err(|e| BlossomError::Io {
            context: format!("creating {}", generated_dir.display()),
            source: e,
        })?;

        let path = generated_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| BlossomError::Io {
                context: format!("opening lock file {}", path.display()),
                source: e,
            })?;

        file.lock_exclusive().map_err(|e| BlossomError::Io {
            context: format!("locking {}", path.display()),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "acquired generation lock");

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
