//! The pipeline driver: configuration validation, the one-shot instance
//! gate, and the generator loop.

use genrunner_core::config::{AppConfig, ProjectConfig};
use genrunner_core::coordination::InstanceCoordinator;
use genrunner_core::error::{GenRunnerError, Result};
use genrunner_core::generator::{ApiExtraction, Generator, GeneratorRegistry};
use genrunner_core::OptionsMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Generator sets linked into this binary.
///
/// Generator implementations live in external crates; a distribution links
/// them in by registering factories here.
pub fn builtin_registry() -> GeneratorRegistry {
    GeneratorRegistry::new()
}

/// Execute one run described by `options`.
///
/// Order matters: configuration problems (bad arguments, bad capacity
/// bound) must surface before the instance gate, and the gate must decide
/// before any extraction or generation work starts. Admission is requested
/// exactly once per run and never released — slot reclamation relies on
/// later competitors observing this process gone.
pub fn run(
    registry: &GeneratorRegistry,
    options: &OptionsMap,
    coordination_dir: Option<&Path>,
) -> Result<()> {
    if options.positional(3).is_some() {
        return Err(GenRunnerError::config("Too many arguments"));
    }

    limit_instances(options, coordination_dir)?;

    let set_name = options
        .get("generator-set")
        // Also accept the camel-case spelling for backward compatibility.
        .or_else(|| options.get("generatorSet"))
        .ok_or_else(|| GenRunnerError::Plugin {
            message: "You need to specify a generator with --generator-set=GENERATOR_NAME"
                .to_string(),
        })?;
    let mut generators = registry.resolve(set_name)?;

    let license_comment = match options.get("license-file") {
        Some(path) if !path.is_empty() => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(GenRunnerError::FileNotFound(path.to_path_buf()));
            }
            Some(
                std::fs::read_to_string(path)
                    .map_err(|e| GenRunnerError::io_with_path(e, path))?,
            )
        }
        _ => None,
    };

    let output_directory = PathBuf::from(
        options
            .get("output-directory")
            .unwrap_or(AppConfig::DEFAULT_OUTPUT_DIR),
    );
    if !output_directory.exists() {
        std::fs::create_dir_all(&output_directory)
            .map_err(|e| GenRunnerError::io_with_path(e, &output_directory))?;
    }

    let extraction = extraction_from_options(options);

    let mut run_count = 0;
    for generator in &mut generators {
        generator.set_output_directory(output_directory.clone());
        generator.set_license_comment(license_comment.clone());
        if generator.setup(&extraction, options)? {
            generator.generate()?;
            run_count += 1;
        }
    }

    info!("Done, {} of {} generators run", run_count, generators.len());
    Ok(())
}

/// Gate this run on the shared instance pool, when a bound is configured.
///
/// Blocks until admitted; a bad bound or missing key is a configuration
/// error surfaced before any shared state is touched.
fn limit_instances(options: &OptionsMap, coordination_dir: Option<&Path>) -> Result<()> {
    let Some(raw_bound) = options.get("max-instances") else {
        return Ok(());
    };

    let bound: i64 = raw_bound.parse().map_err(|_| {
        GenRunnerError::config(format!(
            "max-instances must be numeric, got '{raw_bound}'"
        ))
    })?;
    let bound = u32::try_from(bound).map_err(|_| {
        GenRunnerError::config(format!(
            "max-instances must not be negative, got {bound}"
        ))
    })?;

    let key = options
        .get("coordination-key")
        .ok_or_else(|| GenRunnerError::config("--max-instances requires --coordination-key"))?;

    let mut coordinator = InstanceCoordinator::new();
    if let Some(dir) = coordination_dir {
        coordinator = coordinator.with_base_dir(dir);
    }

    let admission = coordinator.acquire(key, bound)?;
    info!(
        "admitted to instance pool '{}' (slot {})",
        key, admission.slot
    );
    Ok(())
}

fn extraction_from_options(options: &OptionsMap) -> ApiExtraction {
    ApiExtraction {
        header_file: options.positional(1).map(PathBuf::from),
        typesystem_file: options.positional(2).map(PathBuf::from),
        include_paths: split_paths(options.get("include-paths")),
        typesystem_paths: split_paths(options.get("typesystem-paths")),
        api_version: options.get("api-version").map(str::to_string),
    }
}

fn split_paths(raw: Option<&str>) -> Vec<PathBuf> {
    raw.map(|joined| {
        joined
            .split(ProjectConfig::PATH_SPLITTER)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genrunner_core::Result;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    struct NullGenerator;

    impl Generator for NullGenerator {
        fn name(&self) -> &str {
            "null"
        }

        fn options(&self) -> BTreeMap<String, String> {
            BTreeMap::from([(
                "null-style=<style>".to_string(),
                "Formatting style of nothing".to_string(),
            )])
        }

        fn set_output_directory(&mut self, _dir: PathBuf) {}

        fn set_license_comment(&mut self, _comment: Option<String>) {}

        fn setup(&mut self, _extraction: &ApiExtraction, _options: &OptionsMap) -> Result<bool> {
            Ok(true)
        }

        fn generate(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn null_set() -> Vec<Box<dyn Generator>> {
        vec![Box::new(NullGenerator)]
    }

    fn test_registry() -> GeneratorRegistry {
        let mut registry = GeneratorRegistry::new();
        registry.register("null", null_set);
        registry
    }

    #[test]
    fn test_run_without_generator_set_fails() {
        let options = OptionsMap::new();
        let err = run(&test_registry(), &options, None).unwrap_err();
        assert!(err.to_string().contains("--generator-set"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_run_with_unknown_set_fails() {
        let mut options = OptionsMap::new();
        options.insert("generator-set", "qtdoc");
        let err = run(&test_registry(), &options, None).unwrap_err();
        assert!(err.to_string().contains("generator set not found"));
    }

    #[test]
    fn test_run_accepts_camel_case_generator_set() {
        let dir = TempDir::new().unwrap();
        let mut options = OptionsMap::new();
        options.insert("generatorSet", "null");
        options.insert(
            "output-directory",
            dir.path().join("out").to_str().unwrap(),
        );
        run(&test_registry(), &options, None).unwrap();
    }

    #[test]
    fn test_run_creates_output_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");
        let mut options = OptionsMap::new();
        options.insert("generator-set", "null");
        options.insert("output-directory", out.to_str().unwrap());

        run(&test_registry(), &options, None).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_too_many_arguments_is_config_error() {
        let mut options = OptionsMap::new();
        options.insert("generator-set", "null");
        options.set_positional(1, "a.h");
        options.set_positional(2, "t.xml");
        options.set_positional(3, "extra");

        let err = run(&test_registry(), &options, None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Too many arguments"));
    }

    #[test]
    fn test_missing_license_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut options = OptionsMap::new();
        options.insert("generator-set", "null");
        options.insert(
            "license-file",
            dir.path().join("absent.txt").to_str().unwrap(),
        );

        let err = run(&test_registry(), &options, None).unwrap_err();
        assert!(matches!(err, GenRunnerError::FileNotFound(_)));
    }

    #[test]
    fn test_non_numeric_bound_is_config_error() {
        let mut options = OptionsMap::new();
        options.insert("max-instances", "abc");
        options.insert("coordination-key", "pool");

        let err = limit_instances(&options, None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_negative_bound_is_config_error() {
        let mut options = OptionsMap::new();
        options.insert("max-instances", "-3");
        options.insert("coordination-key", "pool");

        let err = limit_instances(&options, None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_bound_without_key_is_config_error() {
        let mut options = OptionsMap::new();
        options.insert("max-instances", "2");

        let err = limit_instances(&options, None).unwrap_err();
        assert!(err.to_string().contains("coordination-key"));
    }

    #[test]
    fn test_gate_admits_first_instance() {
        let dir = TempDir::new().unwrap();
        let mut options = OptionsMap::new();
        options.insert("max-instances", "2");
        options.insert("coordination-key", "pool");

        limit_instances(&options, Some(dir.path())).unwrap();
        // The slot-table segment now exists in the coordination dir.
        assert!(std::fs::read_dir(dir.path()).unwrap().count() >= 1);
    }

    #[test]
    fn test_no_bound_configured_skips_the_gate() {
        let dir = TempDir::new().unwrap();
        let options = OptionsMap::new();
        limit_instances(&options, Some(dir.path())).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_extraction_splits_path_lists() {
        let mut options = OptionsMap::new();
        options.set_positional(1, "global.h");
        options.insert(
            "include-paths",
            format!("/a{}/b", ProjectConfig::PATH_SPLITTER),
        );

        let extraction = extraction_from_options(&options);
        assert_eq!(extraction.header_file, Some(PathBuf::from("global.h")));
        assert_eq!(
            extraction.include_paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }
}
