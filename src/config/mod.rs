pub mod schema;

use std::path::Path;

use crate::error::{BlossomError, Result};

pub use schema::ProjectConfig;

pub const CONFIG_FILE: &str = "blossom.toml";

/// Load and validate a ProjectConfig from a blossom.toml file.
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let config_path = if path.ends_with(CONFIG_FILE) {
        path.to_path_buf()
    } else {
        path.join(CONFIG_FILE)
    };

    if !config_path.exists() {
        return Err(BlossomError::ConfigNotFound { path: config_path });
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| BlossomError::Io {
        context: format!("reading {}", config_path.display()),
        source: e,
    })?;

    let config: ProjectConfig =
        toml::from_str(&content).map_err(|e| BlossomError::ConfigParse { source: e })?;

    config.validate()?;

    Ok(config)
}
