use std::fs;
use std::path::{Path, PathBuf};

use blossom::check::check_project;
use blossom::config::load_config;
use blossom::error::BlossomError;
use blossom::schedule::{run_tasks, Project, RunOptions, TaskOutcome};
use blossom::sourceset::{load_roots, SourceRoots};
use blossom::GenerateOptions;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Generation writes into the project, so every test works on a copy.
fn copy_fixture(name: &str) -> tempfile::TempDir {
    let src = fixture_path(name);
    let dest = tempfile::tempdir().unwrap();
    for entry in walkdir::WalkDir::new(&src).min_depth(1) {
        let entry = entry.unwrap();
        let target = dest.path().join(entry.path().strip_prefix(&src).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    dest
}

fn options(project: &Path) -> GenerateOptions {
    GenerateOptions {
        project: project.to_path_buf(),
        task: None,
        properties: Vec::new(),
        force: false,
        no_hooks: true,
    }
}

fn read(path: PathBuf) -> String {
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

#[test]
fn test_load_config() {
    let config = load_config(&fixture_path("variant-project")).unwrap();
    let sets: Vec<_> = config.template_sets().map(|(ss, name, _)| (ss, name)).collect();
    assert_eq!(sets, vec![("main", "java"), ("test", "resource")]);

    let java = &config.source_sets["main"].template_sets["java"];
    assert_eq!(java.variants.len(), 2);
    assert!(config.replacements.is_none());
}

#[test]
fn test_generate_resource_set() {
    let project = copy_fixture("resource-project");
    let summary = blossom::generate(&options(project.path())).unwrap();
    assert_eq!(summary.generated_count(), 1);

    let out = project
        .path()
        .join("build/generated/resources/blossom-resource/main");
    assert_eq!(
        read(out.join("build-info.properties")),
        "# Generated by blossom\n\
         name=blossom\n\
         version=1.0.3\n\
         description=Template expansion for generated roots\n\
         contributors=alice,bob\n"
    );
    assert_eq!(
        read(out.join("META-INF/plain.txt")),
        "# Generated by blossom\nblossom is rendered even without a suffix\n"
    );
    assert!(!out.join("build-info.properties.peb").exists());
}

#[test]
fn test_property_overrides_win() {
    let project = copy_fixture("resource-project");
    let mut opts = options(project.path());
    opts.properties = vec!["version=9.9.9".into(), "name=override".into()];
    blossom::generate(&opts).unwrap();

    let content = read(
        project
            .path()
            .join("build/generated/resources/blossom-resource/main/build-info.properties"),
    );
    assert!(content.contains("version=9.9.9"));
    assert!(content.contains("name=override"));
}

#[test]
fn test_generate_variants_with_includes() {
    let project = copy_fixture("variant-project");
    blossom::generate(&options(project.path())).unwrap();

    let out = project
        .path()
        .join("build/generated/sources/blossom-java/main/com/example");

    let paper = read(out.join("paper/Platform.java"));
    assert!(paper.starts_with("// Generated by blossom, do not edit\npackage com.example.paper;"));
    assert!(paper.contains(r#"public static final String NAME = "Paper";"#));
    assert!(paper.contains(r#"public static final String API = "org.bukkit";"#));
    assert!(paper.contains(r#"public static final String VERSION = "2.1.0";"#));

    let velocity = read(out.join("velocity/Platform.java"));
    assert!(velocity.contains(r#"public static final String NAME = "Velocity";"#));
    assert!(velocity.contains(r#"public static final String API = "com.velocitypowered";"#));

    // includes are loadable but never emitted
    assert!(!project
        .path()
        .join("build/generated/sources/blossom-java/main/macros.peb")
        .exists());

    assert_eq!(
        read(
            project
                .path()
                .join("build/generated/resources/blossom-resource/test/suite.txt")
        ),
        "suite=smoke\n"
    );
}

#[test]
fn test_roots_manifest_written() {
    let project = copy_fixture("variant-project");
    let summary = blossom::generate(&options(project.path())).unwrap();

    let generated = project.path().join("build/generated");
    assert_eq!(summary.roots_file, Some(generated.join("blossom-roots.json")));

    let roots: SourceRoots = load_roots(&generated).unwrap();
    assert_eq!(roots, summary.roots);
    assert_eq!(
        roots.source_sets["main"].sources["java"],
        vec![generated.join("sources/blossom-java/main")]
    );
    assert_eq!(
        roots.source_sets["test"].resources,
        vec![generated.join("resources/blossom-resource/test")]
    );
}

#[test]
fn test_task_selection_and_up_to_date() {
    let project = copy_fixture("variant-project");
    let loaded = Project::load(project.path()).unwrap();
    let names: Vec<_> = loaded.tasks().unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["generateJavaTemplates", "generateTestResourceTemplates"]);

    let only_test = RunOptions {
        task: Some("generateTestResourceTemplates".into()),
        no_hooks: true,
        ..Default::default()
    };
    let first = run_tasks(&loaded, &only_test).unwrap();
    assert_eq!(first.reports.len(), 1);
    assert!(matches!(first.reports[0].outcome, TaskOutcome::Generated(_)));

    let second = run_tasks(&loaded, &only_test).unwrap();
    assert!(matches!(second.reports[0].outcome, TaskOutcome::UpToDate));
}

#[test]
fn test_dry_run_plans_every_variant() {
    let project = copy_fixture("variant-project");
    let summary = blossom::plan_generation(&options(project.path())).unwrap();

    let TaskOutcome::Planned(plan) = &summary.reports[0].outcome else {
        panic!("expected a plan");
    };
    let planned: Vec<_> = plan
        .files
        .iter()
        .map(|f| (f.relative_path.clone(), f.variant.clone()))
        .collect();
    assert_eq!(
        planned,
        vec![
            (
                PathBuf::from("com/example/paper/Platform.java"),
                Some("paper".to_string())
            ),
            (
                PathBuf::from("com/example/velocity/Platform.java"),
                Some("velocity".to_string())
            ),
        ]
    );
    assert!(!project.path().join("build").exists());
}

#[test]
fn test_unknown_variant_in_data_file() {
    let project = copy_fixture("variant-project");
    fs::write(
        project.path().join("data/platforms.yaml"),
        "variants:\n  paper: {}\n  sponge: {}\n",
    )
    .unwrap();

    let err = blossom::generate(&options(project.path())).err().unwrap();
    match err {
        BlossomError::UnknownVariants { set, variants } => {
            assert_eq!(set, "java");
            assert_eq!(variants, vec!["sponge"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_output_across_variants() {
    let project = copy_fixture("variant-project");
    let templates = project.path().join("src/main/java-templates");
    fs::write(templates.join("Shared.java.peb"), "class Shared {}").unwrap();

    let err = blossom::generate(&options(project.path())).err().unwrap();
    assert!(matches!(err, BlossomError::DuplicateOutput { .. }));
}

#[test]
fn test_check_fixture_projects() {
    for name in ["resource-project", "variant-project"] {
        let result = check_project(&fixture_path(name)).unwrap();
        assert!(result.is_ok(), "{name}: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "{name}: {:?}", result.warnings);
    }
}

#[test]
fn test_legacy_replacements() {
    let project = copy_fixture("replace-project");
    let summary = blossom::replace(project.path()).unwrap();
    assert_eq!(summary.files_replaced, 2);
    assert_eq!(summary.files_copied, 1);

    let out = project.path().join("build/replaced");
    assert!(read(out.join("com/example/Version.java")).contains(r#"VALUE = "3.0.0";"#));
    assert!(read(out.join("com/example/Untouched.java")).contains(r#""@VERSION@" stays"#));
    assert_eq!(
        read(out.join("app.properties")),
        "name=blossom\nversion=not-global\n"
    );
}

#[test]
fn test_replace_without_section() {
    let project = copy_fixture("resource-project");
    let err = blossom::replace(project.path()).unwrap_err();
    assert!(matches!(err, BlossomError::NoReplacements));
}

#[test]
fn test_file_name_values_cannot_escape_output() {
    let project = copy_fixture("resource-project");
    fs::write(
        project
            .path()
            .join("src/main/resource-templates/{{ name }}.txt.peb"),
        "escaped",
    )
    .unwrap();

    let mut opts = options(project.path());
    opts.properties = vec!["name=../../../../../../escaped".into()];
    let err = blossom::generate(&opts).err().unwrap();
    assert!(matches!(err, BlossomError::UnsafeOutputPath { .. }));

    let generated = project.path().join("build/generated");
    for candidate in [
        project.path().join("escaped.txt"),
        generated.join("escaped.txt"),
        generated.join("resources/escaped.txt"),
    ] {
        assert!(!candidate.exists(), "{} was written", candidate.display());
    }
}
