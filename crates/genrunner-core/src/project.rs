//! Generator project files.
//!
//! A project file is a line-oriented description of a binding project that
//! can stand in for command-line arguments:
//!
//! ```text
//! [generator-project]
//! header-file = global.h
//! typesystem-file = typesystem.xml
//! include-path = /usr/include/foo
//! include-path = /usr/include/bar
//! output-directory = generated
//! ```
//!
//! `include-path` and `typesystem-path` entries accumulate and are joined
//! with the platform path separator under `include-paths` /
//! `typesystem-paths`; `header-file` and `typesystem-file` become the two
//! positional arguments; every other key is passed through verbatim.

use crate::config::ProjectConfig;
use crate::error::{GenRunnerError, Result};
use crate::options::OptionsMap;
use std::path::Path;

/// Load and parse a project file into an options map.
pub fn load(path: &Path) -> Result<OptionsMap> {
    if !path.exists() {
        return Err(GenRunnerError::FileNotFound(path.to_path_buf()));
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| GenRunnerError::io_with_path(e, path))?;
    parse(&content)
}

/// Parse project-file content into an options map.
pub fn parse(content: &str) -> Result<OptionsMap> {
    let mut lines = content.lines();

    let header = lines.next().map(str::trim).unwrap_or_default();
    if header != ProjectConfig::HEADER_LINE {
        return Err(GenRunnerError::Project {
            message: format!(
                "first line of a project file must be \"{}\"",
                ProjectConfig::HEADER_LINE
            ),
        });
    }

    let mut options = OptionsMap::new();
    let mut include_paths: Vec<String> = Vec::new();
    let mut typesystem_paths: Vec<String> = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (line, ""),
        };

        match key {
            "include-path" => include_paths.push(value.to_string()),
            "typesystem-path" => typesystem_paths.push(value.to_string()),
            "header-file" => options.set_positional(1, value),
            "typesystem-file" => options.set_positional(2, value),
            _ => options.insert(key, value),
        }
    }

    if !include_paths.is_empty() {
        options.insert(
            "include-paths",
            include_paths.join(ProjectConfig::PATH_SPLITTER),
        );
    }
    if !typesystem_paths.is_empty() {
        options.insert(
            "typesystem-paths",
            typesystem_paths.join(ProjectConfig::PATH_SPLITTER),
        );
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_project_file() {
        let content = "\
[generator-project]
header-file = global.h
typesystem-file = typesystem.xml
include-path = /usr/include/foo
include-path = /usr/include/bar
typesystem-path = /share/typesystems
output-directory = generated
silent
";
        let options = parse(content).unwrap();

        assert_eq!(options.positional(1), Some("global.h"));
        assert_eq!(options.positional(2), Some("typesystem.xml"));
        assert_eq!(
            options.get("include-paths"),
            Some(
                format!(
                    "/usr/include/foo{}/usr/include/bar",
                    ProjectConfig::PATH_SPLITTER
                )
                .as_str()
            )
        );
        assert_eq!(options.get("typesystem-paths"), Some("/share/typesystems"));
        assert_eq!(options.get("output-directory"), Some("generated"));
        assert_eq!(options.get("silent"), Some(""));
    }

    #[test]
    fn test_missing_header_line_rejected() {
        let err = parse("header-file = global.h\n").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("[generator-project]"));
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let content = "[generator-project]\n\n\nheader-file = a.h\n\n";
        let options = parse(content).unwrap();
        assert_eq!(options.positional(1), Some("a.h"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, GenRunnerError::FileNotFound(_)));
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("project.txt");
        std::fs::write(&path, "[generator-project]\nmax-instances = 4\n").unwrap();

        let options = load(&path).unwrap();
        assert_eq!(options.get("max-instances"), Some("4"));
    }
}
