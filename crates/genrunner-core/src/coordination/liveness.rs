//! Liveness probing for slot reclamation.

use crate::platform;

/// Reports whether the process owning a slot is still running.
///
/// # Contract
///
/// A probe that fails for reasons unrelated to true liveness (permission to
/// inspect another process, pid out of platform range) must report **dead**.
/// That keeps reclamation moving, at the documented cost that two processes
/// can each conclude the same slot is free and both consider themselves
/// admitted. Callers that cannot tolerate double admission must run
/// competitors under one uid so probes are authoritative.
pub trait LivenessProbe: Send + Sync {
    fn is_alive(&self, pid: u64) -> bool;
}

impl<P: LivenessProbe + ?Sized> LivenessProbe for std::sync::Arc<P> {
    fn is_alive(&self, pid: u64) -> bool {
        (**self).is_alive(pid)
    }
}

/// Probe backed by the platform's process table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl LivenessProbe for SystemProbe {
    fn is_alive(&self, pid: u64) -> bool {
        match u32::try_from(pid) {
            Ok(pid) => platform::is_process_alive(pid),
            // A pid that doesn't fit the platform's range can't name a live
            // process; per the probe contract it counts as dead.
            Err(_) => false,
        }
    }
}
