//! Platform-specific path utilities.

use crate::config::CoordinationConfig;
use crate::error::{GenRunnerError, Result};
use std::path::PathBuf;

/// Get the per-user coordination directory holding slot-table segments.
///
/// # Platform Behavior
/// - **Linux**: `$XDG_RUNTIME_DIR/genrunner`, falling back to the cache dir
/// - **Windows/macOS**: `{cache_dir}/genrunner`
///
/// Segments placed here are visible to every process of the same user, which
/// is the sharing scope the coordinator needs: competing runs are launched by
/// the same build user.
pub fn coordination_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        if let Some(runtime) = dirs::runtime_dir() {
            return Ok(runtime.join(CoordinationConfig::COORDINATION_DIR_NAME));
        }
    }

    let cache = dirs::cache_dir().ok_or_else(|| GenRunnerError::Config {
        message: "Could not determine cache directory".to_string(),
    })?;
    Ok(cache.join(CoordinationConfig::COORDINATION_DIR_NAME))
}
