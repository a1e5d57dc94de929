//! genrunner core - generator pipeline library with cross-process instance
//! coordination.
//!
//! This crate provides the pieces behind the `genrunner` binary: the options
//! and project-file configuration layer, the generator plugin seam, and the
//! instance coordinator that lets independent runner processes sharing a
//! coordination key cap how many of them run at once.
//!
//! # Example
//!
//! ```rust,no_run
//! use genrunner_core::coordination::InstanceCoordinator;
//!
//! fn main() -> genrunner_core::Result<()> {
//!     // Block until this process is one of at most 2 holders of "bindings".
//!     let admission = InstanceCoordinator::new().acquire("bindings", 2)?;
//!     assert!(admission.slot >= 1);
//!     // ... run extraction and generation ...
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordination;
pub mod error;
pub mod generator;
pub mod options;
pub mod platform;
pub mod project;

// Re-export commonly used types
pub use coordination::{
    Admission, AttachPolicy, Attempt, InstanceCoordinator, LivenessProbe, LockPolicy,
    RetryPolicy, SystemProbe,
};
pub use error::{GenRunnerError, Result};
pub use generator::{ApiExtraction, Generator, GeneratorRegistry};
pub use options::OptionsMap;
