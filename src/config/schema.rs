use std::collections::BTreeMap;
use std::path::PathBuf;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BlossomError, Result};

pub const RESOURCE_TEMPLATE_SET_NAME: &str = "resource";
pub const GROOVY_SOURCES_TEMPLATE_SET_NAME: &str = "groovy";
pub const JAVA_SOURCES_TEMPLATE_SET_NAME: &str = "java";
pub const KOTLIN_SOURCES_TEMPLATE_SET_NAME: &str = "kotlin";
pub const SCALA_SOURCES_TEMPLATE_SET_NAME: &str = "scala";

const BUILTIN_LANGUAGES: [&str; 4] = [
    GROOVY_SOURCES_TEMPLATE_SET_NAME,
    JAVA_SOURCES_TEMPLATE_SET_NAME,
    KOTLIN_SOURCES_TEMPLATE_SET_NAME,
    SCALA_SOURCES_TEMPLATE_SET_NAME,
];

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub blossom: BlossomSettings,

    #[serde(default)]
    pub hooks: HooksConfig,

    #[serde(default)]
    pub source_sets: BTreeMap<String, SourceSetConfig>,

    #[serde(default)]
    pub replacements: Option<ReplacementsConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlossomSettings {
    /// Root of all generated output, relative to the project directory.
    #[serde(default = "default_generated_dir")]
    pub generated_dir: PathBuf,

    /// Extra suffix stripped from output names, on top of `.peb` and `.tera`.
    #[serde(default)]
    pub templates_suffix: Option<String>,
}

fn default_generated_dir() -> PathBuf {
    PathBuf::from("build/generated")
}

impl Default for BlossomSettings {
    fn default() -> Self {
        Self {
            generated_dir: default_generated_dir(),
            templates_suffix: None,
        }
    }
}

impl BlossomSettings {
    pub fn template_suffixes(&self) -> Vec<String> {
        let mut suffixes = vec![".peb".to_string(), ".tera".to_string()];
        if let Some(extra) = &self.templates_suffix {
            if !extra.is_empty() && !suffixes.contains(extra) {
                suffixes.push(extra.clone());
            }
        }
        suffixes
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HooksConfig {
    /// Shell command run in the project directory after generation.
    #[serde(default)]
    pub post_generate: Option<String>,
}

impl HooksConfig {
    pub fn has_hooks(&self) -> bool {
        self.post_generate.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SourceSetConfig {
    #[serde(default)]
    pub template_sets: BTreeMap<String, TemplateSetConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    Resource,
    Source,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TemplateSetConfig {
    /// Inferred from the set name for the built-in sets.
    pub kind: Option<SetKind>,
    pub language: Option<String>,

    /// Defaults to `src/<source set>/<set>-templates`.
    #[serde(default)]
    pub templates: Vec<PathBuf>,

    /// Loadable from templates but never emitted.
    #[serde(default)]
    pub includes: Vec<PathBuf>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// YAML files; a top-level `variants` mapping holds per-variant data.
    #[serde(default)]
    pub data_files: Vec<PathBuf>,

    /// Override anything read from data files.
    #[serde(default)]
    pub properties: BTreeMap<String, toml::Value>,

    /// Literal line inserted at the top of every generated file.
    pub header: Option<String>,

    #[serde(default)]
    pub variants: BTreeMap<String, VariantConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct VariantConfig {
    #[serde(default)]
    pub data_files: Vec<PathBuf>,

    #[serde(default)]
    pub properties: BTreeMap<String, toml::Value>,
}

/// Where the output of a template set is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetTarget {
    Resources,
    Sources { language: String },
}

impl SetTarget {
    pub fn is_resources(&self) -> bool {
        matches!(self, SetTarget::Resources)
    }
}

impl TemplateSetConfig {
    /// Resolve the kind and language of the set named `name`.
    pub fn target(&self, name: &str) -> std::result::Result<SetTarget, String> {
        let kind = match self.kind {
            Some(kind) => kind,
            None if name == RESOURCE_TEMPLATE_SET_NAME => SetKind::Resource,
            None if BUILTIN_LANGUAGES.contains(&name) => SetKind::Source,
            None => {
                return Err(
                    "custom template sets must declare kind = \"resource\" or \"source\"".into(),
                )
            }
        };

        match kind {
            SetKind::Resource => {
                if self.language.is_some() {
                    return Err("resource template sets cannot declare a language".into());
                }
                Ok(SetTarget::Resources)
            }
            SetKind::Source => {
                let language = match &self.language {
                    Some(language) => language.clone(),
                    None if BUILTIN_LANGUAGES.contains(&name) => name.to_string(),
                    None => {
                        return Err("source template sets must declare a language".into());
                    }
                };
                if language.trim().is_empty() {
                    return Err("language must not be empty".into());
                }
                Ok(SetTarget::Sources { language })
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplacementsConfig {
    /// Source directories scanned for tokens, relative to the project directory.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,

    pub output: PathBuf,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub global: BTreeMap<String, toml::Value>,

    /// Path suffixes restricting where global tokens apply. Empty means everywhere.
    #[serde(default)]
    pub global_locations: Vec<String>,

    /// Keyed by project-relative path with `/` separators.
    #[serde(default)]
    pub by_file: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

impl ProjectConfig {
    pub fn validate(&self) -> Result<()> {
        let name_pattern = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("static pattern");

        for (source_set, set_config) in &self.source_sets {
            if !name_pattern.is_match(source_set) {
                return Err(BlossomError::ConfigInvalidSet {
                    source_set: source_set.clone(),
                    name: "*".into(),
                    reason: "source set names must start with a letter and contain only letters, digits, '-' or '_'".into(),
                });
            }

            for (name, set) in &set_config.template_sets {
                let invalid = |reason: String| BlossomError::ConfigInvalidSet {
                    source_set: source_set.clone(),
                    name: name.clone(),
                    reason,
                };

                if !name_pattern.is_match(name) {
                    return Err(invalid(
                        "template set names must start with a letter and contain only letters, digits, '-' or '_'".into(),
                    ));
                }

                set.target(name).map_err(invalid)?;

                for variant in set.variants.keys() {
                    if variant.is_empty() {
                        return Err(invalid("variant names must not be empty".into()));
                    }
                }
            }
        }

        Ok(())
    }

    /// Iterate `(source set, template set name, config)` in a stable order.
    pub fn template_sets(&self) -> impl Iterator<Item = (&str, &str, &TemplateSetConfig)> {
        self.source_sets.iter().flat_map(|(source_set, cfg)| {
            cfg.template_sets
                .iter()
                .map(move |(name, set)| (source_set.as_str(), name.as_str(), set))
        })
    }
}
