//! Template data: YAML data files, configured properties, and variant layering.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tera::Value;

use crate::config::schema::TemplateSetConfig;
use crate::error::{BlossomError, Result};

pub type Variables = BTreeMap<String, Value>;

const VARIANTS_KEY: &str = "variants";

/// Data read from a group of YAML files.
#[derive(Debug, Default)]
pub struct LoadedData {
    /// Root mapping of every file, merged in file order. `None` if no file was read.
    pub global: Option<Variables>,
    /// Per-variant sections found under the top-level `variants` key.
    pub variants: BTreeMap<String, Variables>,
}

/// One context to render every template of a set with.
#[derive(Debug, Clone)]
pub struct VariantContext {
    /// `None` for sets without variants.
    pub name: Option<String>,
    pub variables: Variables,
}

/// Load YAML data files. Paths that are not regular files are skipped.
///
/// With `use_variants`, a top-level `variants` key is split out into
/// [`LoadedData::variants`] instead of staying in the global data.
pub fn load_data_files(files: &[PathBuf], use_variants: bool) -> Result<LoadedData> {
    let mut loaded = LoadedData::default();

    for file in files {
        if !file.is_file() {
            tracing::debug!(path = %file.display(), "skipping missing data file");
            continue;
        }

        let content = std::fs::read_to_string(file).map_err(|e| BlossomError::Io {
            context: format!("failed to load data from {}", file.display()),
            source: e,
        })?;

        let document: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| BlossomError::InvalidDataFile {
                path: file.clone(),
                source: e,
            })?;

        unmarshal_data(&mut loaded, file, document, use_variants)?;
    }

    Ok(loaded)
}

fn unmarshal_data(
    output: &mut LoadedData,
    file: &Path,
    document: serde_yaml::Value,
    use_variants: bool,
) -> Result<()> {
    let serde_yaml::Value::Mapping(mut root) = strip_tags(document) else {
        return Err(BlossomError::DataRootNotMapping {
            path: file.to_path_buf(),
        });
    };

    if use_variants {
        if let Some(variants) = root.remove(VARIANTS_KEY) {
            let serde_yaml::Value::Mapping(variants) = strip_tags(variants) else {
                return Err(BlossomError::InvalidVariantsEntry {
                    path: file.to_path_buf(),
                });
            };

            for (key, value) in variants {
                let variant = key_to_string(&key);
                let serde_yaml::Value::Mapping(data) = strip_tags(value.clone()) else {
                    return Err(BlossomError::InvalidVariantData {
                        path: file.to_path_buf(),
                        variant,
                        found: yaml_type_name(&value).to_string(),
                    });
                };
                output
                    .variants
                    .entry(variant)
                    .or_default()
                    .extend(mapping_to_variables(data));
            }
        }
    }

    output
        .global
        .get_or_insert_with(BTreeMap::new)
        .extend(mapping_to_variables(root));

    Ok(())
}

/// Build the contexts for every variant of a template set.
///
/// Layers, later wins: global file data, set properties, the variant's section of
/// the global files, the variant's own data files, the variant's properties, and
/// finally `overrides`. Without variants only the first two layers and
/// `overrides` apply.
pub fn prepare_contexts(
    project_dir: &Path,
    set_name: &str,
    set: &TemplateSetConfig,
    overrides: &Variables,
) -> Result<Vec<VariantContext>> {
    let has_variants = !set.variants.is_empty();
    let data_files = resolve_paths(project_dir, &set.data_files);
    let mut loaded = load_data_files(&data_files, has_variants)?;

    let mut global = loaded.global.take().unwrap_or_default();
    global.extend(properties_to_variables(&set.properties));

    if !has_variants {
        global.extend(overrides.clone());
        return Ok(vec![VariantContext {
            name: None,
            variables: global,
        }]);
    }

    let mut contexts = Vec::with_capacity(set.variants.len());
    for (name, variant) in &set.variants {
        let mut variables = global.clone();

        if let Some(from_global_file) = loaded.variants.remove(name) {
            variables.extend(from_global_file);
        }

        let variant_files = resolve_paths(project_dir, &variant.data_files);
        if let Some(from_variant_file) = load_data_files(&variant_files, false)?.global {
            variables.extend(from_variant_file);
        }

        variables.extend(properties_to_variables(&variant.properties));
        variables.extend(overrides.clone());

        contexts.push(VariantContext {
            name: Some(name.clone()),
            variables,
        });
    }

    if !loaded.variants.is_empty() {
        return Err(BlossomError::UnknownVariants {
            set: set_name.to_string(),
            variants: loaded.variants.into_keys().collect(),
        });
    }

    Ok(contexts)
}

/// Parse a `key=value` property given on the command line.
pub fn parse_property(input: &str) -> Result<(String, Value)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), Value::String(value.to_string())))
        }
        _ => Err(BlossomError::InvalidProperty {
            input: input.to_string(),
        }),
    }
}

pub fn parse_properties(inputs: &[String]) -> Result<Variables> {
    inputs.iter().map(String::as_str).map(parse_property).collect()
}

pub fn properties_to_variables(properties: &BTreeMap<String, toml::Value>) -> Variables {
    properties
        .iter()
        .map(|(k, v)| (k.clone(), toml_to_value(v)))
        .collect()
}

pub fn resolve_paths(project_dir: &Path, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().map(|p| project_dir.join(p)).collect()
}

pub fn toml_to_value(val: &toml::Value) -> Value {
    match val {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(n) => Value::Number(serde_json::Number::from(*n)),
        toml::Value::Float(f) => serde_json::to_value(f).unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Array(arr) => Value::Array(arr.iter().map(toml_to_value).collect()),
        toml::Value::Table(t) => {
            let map: serde_json::Map<String, Value> = t
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_value(v)))
                .collect();
            Value::Object(map)
        }
        toml::Value::Datetime(d) => Value::String(d.to_string()),
    }
}

pub fn yaml_to_value(val: serde_yaml::Value) -> Value {
    match val {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_value).collect()),
        serde_yaml::Value::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (key_to_string(&k), yaml_to_value(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value),
    }
}

fn mapping_to_variables(map: serde_yaml::Mapping) -> Variables {
    map.into_iter()
        .map(|(k, v)| (key_to_string(&k), yaml_to_value(v)))
        .collect()
}

fn key_to_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Tagged(tagged) => key_to_string(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn strip_tags(value: serde_yaml::Value) -> serde_yaml::Value {
    match value {
        serde_yaml::Value::Tagged(tagged) => strip_tags(tagged.value),
        other => other,
    }
}

fn yaml_type_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(tagged) => yaml_type_name(&tagged.value),
    }
}
