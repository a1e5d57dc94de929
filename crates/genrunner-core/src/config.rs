//! Centralized configuration for the generator runner.
//!
//! Constants for instance coordination, file naming, and generation defaults.

use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "genrunner";
    /// Default output directory when none is configured.
    pub const DEFAULT_OUTPUT_DIR: &'static str = "out";
}

/// Instance-coordination parameters.
pub struct CoordinationConfig;

impl CoordinationConfig {
    /// Hard platform cap on concurrent instances. The shared slot table is
    /// always sized for this bound regardless of the configured capacity, so
    /// processes configured with different bounds attach to the same layout.
    pub const MAX_INSTANCES: u64 = 10;

    /// Legacy pacing of the admission retry loop.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

    /// Directory (under the per-user base dir) holding segment files.
    pub const COORDINATION_DIR_NAME: &'static str = "genrunner";

    /// Suffix of slot-table segment files.
    pub const SEGMENT_SUFFIX: &'static str = ".slots";

    /// Suffix of the advisory lock file guarding a segment.
    pub const LOCK_SUFFIX: &'static str = ".lock";
}

/// Project-file format parameters.
pub struct ProjectConfig;

impl ProjectConfig {
    /// Required first line of a generator project file.
    pub const HEADER_LINE: &'static str = "[generator-project]";

    /// Separator used when joining accumulated path lists.
    #[cfg(windows)]
    pub const PATH_SPLITTER: &'static str = ";";
    #[cfg(not(windows))]
    pub const PATH_SPLITTER: &'static str = ":";
}
