//! Cross-process instance coordination.
//!
//! Independent, unrelated processes that share a coordination key agree on
//! how many of them may run concurrently. The shared state is a slot table
//! in a named, memory-mapped segment; admission is serialized by an
//! inter-process file lock; stale slots are reclaimed by probing whether the
//! recorded pid is still alive.
//!
//! # Example
//!
//! ```rust,no_run
//! use genrunner_core::coordination::InstanceCoordinator;
//!
//! fn main() -> genrunner_core::Result<()> {
//!     let coordinator = InstanceCoordinator::new();
//!     // Blocks until this process is one of at most 4 holders of "mypool".
//!     let admission = coordinator.acquire("mypool", 4)?;
//!     println!("admitted into slot {}", admission.slot);
//!     Ok(())
//! }
//! ```

mod coordinator;
mod liveness;
mod segment;
mod table;

pub use coordinator::{
    Admission, Attempt, AttachPolicy, InstanceCoordinator, LockPolicy, RetryPolicy,
};
pub use liveness::{LivenessProbe, SystemProbe};
pub use segment::SharedSegment;
pub use table::{SlotTable, SEGMENT_LEN};
