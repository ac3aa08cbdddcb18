#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BlossomError {
    #[error("Project config not found at {path}")]
    #[diagnostic(help("Ensure the project directory contains a blossom.toml file"))]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse blossom.toml")]
    #[diagnostic(help("Check the TOML syntax in your blossom.toml file"))]
    ConfigParse {
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid template set '{source_set}.{name}': {reason}")]
    ConfigInvalidSet {
        source_set: String,
        name: String,
        reason: String,
    },

    #[error("Invalid input in {path}")]
    #[diagnostic(help("Check the YAML syntax of the data file"))]
    InvalidDataFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Template data file {path} must have a mapping as the root node")]
    DataRootNotMapping { path: PathBuf },

    #[error("Value of 'variants' entry in {path} must be a mapping of variant name to mapping")]
    InvalidVariantsEntry { path: PathBuf },

    #[error("Variant '{variant}' in {path} was expected to have a mapping value, but it was {found}")]
    InvalidVariantData {
        path: PathBuf,
        variant: String,
        found: String,
    },

    #[error("Unknown variants declared in file for template set {set}: {}", variants.join(", "))]
    #[diagnostic(help("Declare each variant under [..template_sets.<set>.variants] in blossom.toml"))]
    UnknownVariants { set: String, variants: Vec<String> },

    #[error("Failed to parse template '{template}'")]
    #[diagnostic(help("Check your Tera template syntax"))]
    TemplateParse {
        template: String,
        #[source]
        source: tera::Error,
    },

    #[error("Template rendering failed: {file}")]
    #[diagnostic(help("Every variable used by a template must be defined in a data file or property"))]
    RenderError {
        file: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to render filename: {filename}")]
    FilenameRenderError {
        filename: String,
        #[source]
        source: tera::Error,
    },

    #[error("Template '{template}' renders to an unsafe output path component '{rendered}'")]
    #[diagnostic(help("Values used in file names must not be empty, '.', '..' or absolute paths"))]
    UnsafeOutputPath { template: String, rendered: String },

    #[error("Output file {output} (a variant of input {input}) has already been written in another variant")]
    #[diagnostic(help("Use variant properties in the template file name to keep outputs distinct"))]
    DuplicateOutput { output: PathBuf, input: String },

    #[error("Unknown task: {name}")]
    #[diagnostic(help("Run `blossom tasks` to list the available tasks"))]
    UnknownTask { name: String },

    #[error("Invalid property override '{input}'")]
    #[diagnostic(help("Properties are given as -P key=value"))]
    InvalidProperty { input: String },

    #[error("No token replacements configured")]
    #[diagnostic(help("Add a [replacements] section to blossom.toml"))]
    NoReplacements,

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to read roots manifest {path}")]
    #[diagnostic(help("Run `blossom generate` to produce the manifest"))]
    RootsManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Hook '{hook}' failed: {message}")]
    #[diagnostic(help("Check the command configured under [hooks]"))]
    HookError { hook: String, message: String },

    #[error("File watcher failed")]
    Watch {
        #[source]
        source: notify::Error,
    },
}

pub type Result<T> = std::result::Result<T, BlossomError>;
