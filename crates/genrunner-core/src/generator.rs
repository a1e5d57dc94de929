//! Generator plugin seam.
//!
//! Code emission itself lives outside this repo. The runner resolves a
//! named generator set to a list of [`Generator`] implementations, hands
//! each one the extraction inputs and the options map, and invokes
//! generation. Header parsing and type-system modeling happen behind the
//! [`ApiExtraction`] inputs; the runner never looks inside them.

use crate::error::{GenRunnerError, Result};
use crate::options::OptionsMap;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Inputs to the external API-extraction step, as configured for this run.
#[derive(Debug, Clone, Default)]
pub struct ApiExtraction {
    pub header_file: Option<PathBuf>,
    pub typesystem_file: Option<PathBuf>,
    pub include_paths: Vec<PathBuf>,
    pub typesystem_paths: Vec<PathBuf>,
    pub api_version: Option<String>,
}

/// A pluggable code generator.
pub trait Generator {
    /// Display name used in help output and logs.
    fn name(&self) -> &str;

    /// Generator-specific options as `option -> help text`, shown under the
    /// general options in `--help`.
    fn options(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn set_output_directory(&mut self, dir: PathBuf);

    fn set_license_comment(&mut self, comment: Option<String>);

    /// Prepare for generation. Returning `Ok(false)` skips this generator
    /// without failing the run.
    fn setup(&mut self, extraction: &ApiExtraction, options: &OptionsMap) -> Result<bool>;

    fn generate(&mut self) -> Result<()>;
}

/// Produces the generators of one generator set.
pub type GeneratorFactory = fn() -> Vec<Box<dyn Generator>>;

/// Resolves generator-set names to their generators.
#[derive(Default)]
pub struct GeneratorRegistry {
    sets: BTreeMap<String, GeneratorFactory>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator set under `name`. Re-registering replaces.
    pub fn register(&mut self, name: impl Into<String>, factory: GeneratorFactory) {
        self.sets.insert(name.into(), factory);
    }

    /// Names of all registered sets, sorted.
    pub fn set_names(&self) -> Vec<&str> {
        self.sets.keys().map(String::as_str).collect()
    }

    /// Instantiate the generators of the set named `name`.
    pub fn resolve(&self, name: &str) -> Result<Vec<Box<dyn Generator>>> {
        let factory = self.sets.get(name).ok_or_else(|| GenRunnerError::Plugin {
            message: format!("generator set not found: {name}"),
        })?;
        Ok(factory())
    }
}
