//! Typed view over the shared slot-table segment.
//!
//! Layout (little-endian, fixed):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Header (16 bytes)                                        │
//! │  - capacity: u64  (0 = table created but not initialized) │
//! │  - count:    u64  (high-water mark of claimed slots)      │
//! ├──────────────────────────────────────────────────────────┤
//! │  slots[1..=10]: u64 process identifiers (80 bytes)        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The slot array is always sized for the platform cap, independent of the
//! configured capacity, so processes launched with different bounds attach
//! to segments of identical size. `count` never decreases: it records how
//! many slots were ever claimed, not how many holders are currently alive.
//! Stale entries are reclaimed in place by overwriting a dead pid.

use crate::config::CoordinationConfig;

const HEADER_LEN: usize = 16;
const SLOT_LEN: usize = 8;

/// Total byte length of a slot-table segment.
pub const SEGMENT_LEN: usize =
    HEADER_LEN + SLOT_LEN * CoordinationConfig::MAX_INSTANCES as usize;

const CAPACITY_OFFSET: usize = 0;
const COUNT_OFFSET: usize = 8;

/// Mutable typed view over a slot-table byte region.
///
/// The view performs no locking itself; callers must hold the segment's
/// inter-process lock across every read-modify-write sequence.
pub struct SlotTable<'a> {
    bytes: &'a mut [u8],
}

impl<'a> SlotTable<'a> {
    /// Wrap a mapped segment region.
    ///
    /// # Panics
    /// Panics if the region is shorter than [`SEGMENT_LEN`]; segment sizing
    /// is enforced before mapping.
    pub fn new(bytes: &'a mut [u8]) -> Self {
        assert!(bytes.len() >= SEGMENT_LEN, "slot table region too short");
        Self { bytes }
    }

    /// Capacity fixed at table creation. Zero means the creator has not yet
    /// written the header; attachers must back off and retry.
    pub fn capacity(&self) -> u64 {
        self.read_u64(CAPACITY_OFFSET)
    }

    /// True once the creating process has written the header.
    pub fn is_initialized(&self) -> bool {
        self.capacity() != 0
    }

    /// High-water mark of claimed slots.
    pub fn count(&self) -> u64 {
        self.read_u64(COUNT_OFFSET)
    }

    pub fn set_count(&mut self, count: u64) {
        self.write_u64(COUNT_OFFSET, count);
    }

    /// Read the pid stored in slot `index` (1-based).
    pub fn slot(&self, index: usize) -> u64 {
        self.read_u64(Self::slot_offset(index))
    }

    /// Overwrite slot `index` (1-based) with `pid`.
    pub fn set_slot(&mut self, index: usize, pid: u64) {
        self.write_u64(Self::slot_offset(index), pid);
    }

    /// Initialize a freshly created table: claims slot 1 for `pid`.
    ///
    /// The capacity field is written last so a concurrent attacher that reads
    /// between these writes still sees the table as uninitialized.
    pub fn initialize(&mut self, capacity: u64, pid: u64) {
        self.set_count(1);
        self.set_slot(1, pid);
        self.write_u64(CAPACITY_OFFSET, capacity);
    }

    fn slot_offset(index: usize) -> usize {
        assert!(
            index >= 1 && index <= CoordinationConfig::MAX_INSTANCES as usize,
            "slot index {index} out of range"
        );
        HEADER_LEN + (index - 1) * SLOT_LEN
    }

    fn read_u64(&self, offset: usize) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.bytes[offset..offset + 8]);
        u64::from_le_bytes(buf)
    }

    fn write_u64(&mut self, offset: usize, value: u64) {
        self.bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
    }
}
