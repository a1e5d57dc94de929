//! Named shared-segment lifecycle: create-or-attach, mapping, locking.
//!
//! A segment is a fixed-size file under the coordination directory, named by
//! the sanitized coordination key and memory-mapped read-write. Whichever
//! process first creates the file is the initializer; everyone else attaches.
//! The segment is never removed here — it outlives every process that used
//! it, and reclaiming it is external tooling's call.
#![allow(unsafe_code)] // mmap construction; see the SAFETY note below.

use crate::config::CoordinationConfig;
use crate::coordination::table::{SlotTable, SEGMENT_LEN};
use crate::error::{GenRunnerError, Result};
use fs2::FileExt;
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A per-process handle on the named shared slot-table segment.
///
/// Dropping the handle detaches (unmaps and closes); it never deletes the
/// underlying files.
pub struct SharedSegment {
    path: PathBuf,
    file: File,
    lock_file: File,
    mmap: Option<MmapMut>,
    created: bool,
}

impl SharedSegment {
    /// Create the segment named `key` under `base_dir`, or attach to it if it
    /// already exists.
    ///
    /// Creation is atomic (`create_new`), so exactly one competing process
    /// observes `was_created() == true` for a fresh key. The creator sizes
    /// the file immediately; attachers may observe a not-yet-sized or
    /// not-yet-initialized table and must poll until the creator's header
    /// write lands.
    pub fn open(base_dir: &Path, key: &str) -> Result<Self> {
        std::fs::create_dir_all(base_dir)
            .map_err(|e| GenRunnerError::io_with_path(e, base_dir))?;

        let stem = sanitize_key(key);
        let path = base_dir.join(format!("{stem}{}", CoordinationConfig::SEGMENT_SUFFIX));
        let lock_path = base_dir.join(format!("{stem}{}", CoordinationConfig::LOCK_SUFFIX));

        let (file, created) = match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => {
                file.set_len(SEGMENT_LEN as u64).map_err(|e| GenRunnerError::Ipc {
                    message: format!("failed to size segment {}", path.display()),
                    source: Some(e),
                })?;
                debug!("created slot-table segment {}", path.display());
                (file, true)
            }
            Err(e) => {
                if e.kind() != ErrorKind::AlreadyExists {
                    warn!("failed to create segment {}: {}", path.display(), e);
                }
                // Creation failed; attaching is the fallback either way.
                // Only create-and-attach both failing is an IPC failure.
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(&path)
                    .map_err(|e| GenRunnerError::Ipc {
                        message: format!(
                            "failed to create or attach segment {}",
                            path.display()
                        ),
                        source: Some(e),
                    })?;
                debug!("attached to slot-table segment {}", path.display());
                (file, false)
            }
        };

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| GenRunnerError::Lock {
                message: format!("failed to open lock file {}", lock_path.display()),
                source: Some(e),
            })?;

        Ok(Self {
            path,
            file,
            lock_file,
            mmap: None,
            created,
        })
    }

    /// True if this process created (and must initialize) the segment.
    pub fn was_created(&self) -> bool {
        self.created
    }

    /// Path of the segment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the inter-process lock guarding the table. Blocks until held.
    pub fn lock(&self) -> Result<()> {
        self.lock_file.lock_exclusive().map_err(|e| GenRunnerError::Lock {
            message: format!("failed to lock segment {}", self.path.display()),
            source: Some(e),
        })
    }

    /// Release the inter-process lock. Failures are logged, not surfaced:
    /// by the time unlock fails the admission decision has already been made.
    pub fn unlock(&self) {
        if let Err(e) = FileExt::unlock(&self.lock_file) {
            warn!("failed to unlock segment {}: {}", self.path.display(), e);
        }
    }

    /// Map the segment if it has reached its full size.
    ///
    /// Returns `Ok(false)` when the file is still shorter than a slot table —
    /// the creator has not finished sizing it — in which case the caller
    /// should treat the round as "not admitted, retry".
    pub fn try_map(&mut self) -> Result<bool> {
        if self.mmap.is_some() {
            return Ok(true);
        }
        let len = self.file.metadata().map_err(|e| GenRunnerError::Ipc {
            message: format!("failed to stat segment {}", self.path.display()),
            source: Some(e),
        })?.len();
        if len < SEGMENT_LEN as u64 {
            debug!(
                "segment {} not yet sized ({} of {} bytes)",
                self.path.display(),
                len,
                SEGMENT_LEN
            );
            return Ok(false);
        }
        // SAFETY: the mapping is a plain byte region over a regular file we
        // hold open; all access goes through SlotTable's bounds-checked u64
        // reads/writes, and cross-process mutation is serialized by the
        // segment lock.
        let mmap = unsafe {
            MmapMut::map_mut(&self.file).map_err(|e| GenRunnerError::Ipc {
                message: format!("failed to map segment {}", self.path.display()),
                source: Some(e),
            })?
        };
        self.mmap = Some(mmap);
        Ok(true)
    }

    /// Typed view over the mapped table.
    ///
    /// # Panics
    /// Panics if called before a successful [`try_map`](Self::try_map).
    pub fn table(&mut self) -> SlotTable<'_> {
        let mmap = self
            .mmap
            .as_mut()
            .expect("segment must be mapped before table access");
        SlotTable::new(&mut mmap[..])
    }
}

/// Reduce a coordination key to a portable file-name stem.
///
/// Distinct keys that sanitize to the same stem would share a pool; keys are
/// expected to be short identifiers, not arbitrary text.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
