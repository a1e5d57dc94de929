//! Cross-process instance admission.
//!
//! Independent processes sharing a coordination key agree on how many of
//! them may run at once. The first process to create the slot-table segment
//! initializes it and is admitted unconditionally into slot 1; later
//! processes claim the next free slot while the high-water `count` is below
//! their configured bound, and once the table is full they reclaim the first
//! slot whose recorded pid is no longer alive. A process that finds neither
//! keeps polling — admission has no fairness and no arrival ordering, and a
//! particular waiter can starve.
//!
//! Nothing ever releases a slot on clean exit. A holder's slot becomes
//! reusable only when a later competitor's liveness probe observes the pid
//! dead. `count` therefore never decreases.

use crate::config::CoordinationConfig;
use crate::coordination::liveness::{LivenessProbe, SystemProbe};
use crate::coordination::segment::SharedSegment;
use crate::error::{GenRunnerError, Result};
use crate::platform;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// How lock-acquisition failures are handled.
///
/// The legacy implementation logged lock failures and mutated the table
/// without mutual exclusion, a real lost-update/double-admission window.
/// `Strict` (the default) makes lock failure fatal; `Lenient` reproduces the
/// legacy behavior for compatibility and logs every unguarded round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    #[default]
    Strict,
    Lenient,
}

/// How segment create-and-attach failures are handled.
///
/// `Strict` (the default) surfaces an IPC error. `Lenient` reproduces the
/// legacy continue-anyway behavior: the caller is admitted without a slot
/// (`Admission::tracked == false`) and the failure is only observable in
/// logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachPolicy {
    #[default]
    Strict,
    Lenient,
}

/// Pacing of the admission retry loop.
///
/// The legacy loop slept a fixed 10 seconds between rounds; that is the
/// default. A multiplier above 1.0 turns the fixed interval into capped
/// exponential backoff. Tests inject zero intervals for determinism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    initial: Duration,
    multiplier: f64,
    max: Duration,
}

impl RetryPolicy {
    /// Fixed interval between rounds.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial: interval,
            multiplier: 1.0,
            max: interval,
        }
    }

    /// Exponential backoff from `initial`, capped at `max`.
    pub fn backoff(initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            initial,
            multiplier,
            max,
        }
    }

    /// Sleep before retry round `round` (0-based).
    pub fn delay(&self, round: u32) -> Duration {
        if self.multiplier <= 1.0 {
            return self.initial.min(self.max);
        }
        let factor = self.multiplier.powi(round.min(63) as i32);
        self.initial.mul_f64(factor).min(self.max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(CoordinationConfig::DEFAULT_POLL_INTERVAL)
    }
}

/// A successful admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// 1-based slot index this process occupies, or 0 when untracked.
    pub slot: usize,
    /// True if this process created and initialized the slot table.
    pub initializer: bool,
    /// False only under [`AttachPolicy::Lenient`] when no table view exists.
    pub tracked: bool,
}

/// Outcome of a single admission round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Admitted(Admission),
    /// Table full of live holders; try again after the retry delay.
    Wait,
}

/// Decides whether this process may run, given a coordination key shared by
/// competing processes and a per-process capacity bound.
///
/// A coordinator is configuration plus seams (liveness probe, claiming pid,
/// segment directory); each [`acquire`](Self::acquire) call opens its own
/// segment handle and detaches when it returns. The segment itself is never
/// removed.
pub struct InstanceCoordinator {
    base_dir: Option<PathBuf>,
    retry: RetryPolicy,
    lock_policy: LockPolicy,
    attach_policy: AttachPolicy,
    probe: Box<dyn LivenessProbe>,
    self_pid: u64,
}

impl Default for InstanceCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceCoordinator {
    pub fn new() -> Self {
        Self {
            base_dir: None,
            retry: RetryPolicy::default(),
            lock_policy: LockPolicy::default(),
            attach_policy: AttachPolicy::default(),
            probe: Box::new(SystemProbe),
            self_pid: u64::from(std::process::id()),
        }
    }

    /// Override the directory holding segment files (default: the per-user
    /// coordination directory).
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_lock_policy(mut self, policy: LockPolicy) -> Self {
        self.lock_policy = policy;
        self
    }

    pub fn with_attach_policy(mut self, policy: AttachPolicy) -> Self {
        self.attach_policy = policy;
        self
    }

    /// Replace the liveness probe. Production code keeps the system probe;
    /// tests inject deterministic ones.
    pub fn with_probe(mut self, probe: impl LivenessProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Claim slots under `pid` instead of this process's own id.
    pub fn with_self_pid(mut self, pid: u64) -> Self {
        self.self_pid = pid;
        self
    }

    /// Block until this process is admitted into the pool named `key`.
    ///
    /// Returns a configuration error immediately (no shared state touched)
    /// for an empty key or a bound outside `1..=10`. Otherwise the call
    /// either returns an admission or keeps polling forever; "rejected for
    /// now" is never surfaced to the caller.
    pub fn acquire(&self, key: &str, max_instances: u32) -> Result<Admission> {
        validate(key, max_instances)?;

        let Some(mut segment) = self.open_segment(key)? else {
            return Ok(Admission {
                slot: 0,
                initializer: false,
                tracked: false,
            });
        };

        let mut round: u32 = 0;
        loop {
            match self.try_admit(&mut segment, max_instances)? {
                Attempt::Admitted(admission) => return Ok(admission),
                Attempt::Wait => {
                    let delay = self.retry.delay(round);
                    debug!(
                        "pool {key} full of live holders; retrying in {:?}",
                        delay
                    );
                    std::thread::sleep(delay);
                    round = round.saturating_add(1);
                }
            }
        }
    }

    /// Run a single admission round without sleeping.
    ///
    /// Same validation and admission rules as [`acquire`](Self::acquire),
    /// but a full table of live holders yields [`Attempt::Wait`] instead of
    /// blocking. The segment handle is still per-call.
    pub fn try_acquire(&self, key: &str, max_instances: u32) -> Result<Attempt> {
        validate(key, max_instances)?;

        let Some(mut segment) = self.open_segment(key)? else {
            return Ok(Attempt::Admitted(Admission {
                slot: 0,
                initializer: false,
                tracked: false,
            }));
        };

        self.try_admit(&mut segment, max_instances)
    }

    fn open_segment(&self, key: &str) -> Result<Option<SharedSegment>> {
        let base_dir = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => platform::coordination_dir()?,
        };
        match SharedSegment::open(&base_dir, key) {
            Ok(segment) => Ok(Some(segment)),
            Err(e) => match self.attach_policy {
                AttachPolicy::Strict => Err(e),
                AttachPolicy::Lenient => {
                    warn!("proceeding without instance tracking: {e}");
                    Ok(None)
                }
            },
        }
    }

    fn try_admit(&self, segment: &mut SharedSegment, max_instances: u32) -> Result<Attempt> {
        let locked = match segment.lock() {
            Ok(()) => true,
            Err(e) => match self.lock_policy {
                LockPolicy::Strict => return Err(e),
                LockPolicy::Lenient => {
                    warn!("mutating slot table without the inter-process lock: {e}");
                    false
                }
            },
        };

        let outcome = self.admit_locked(segment, max_instances);

        if locked {
            segment.unlock();
        }
        outcome
    }

    /// One admission decision. Caller holds the segment lock (strict mode).
    fn admit_locked(&self, segment: &mut SharedSegment, max_instances: u32) -> Result<Attempt> {
        if !segment.try_map()? {
            // Creator hasn't finished sizing the file.
            return Ok(Attempt::Wait);
        }

        let created = segment.was_created();
        let pid = self.self_pid;
        let mut table = segment.table();

        if created && !table.is_initialized() {
            table.initialize(u64::from(max_instances), pid);
            debug!("initialized slot table; pid {pid} claims slot 1");
            return Ok(Attempt::Admitted(Admission {
                slot: 1,
                initializer: true,
                tracked: true,
            }));
        }

        if !table.is_initialized() {
            debug!("slot table created elsewhere but not yet initialized");
            return Ok(Attempt::Wait);
        }

        // Admission compares against the caller's own bound, not the stored
        // capacity: processes configured with a larger bound may claim slots
        // beyond what the creator configured.
        let count = table.count();
        if count < u64::from(max_instances) {
            let slot = (count + 1) as usize;
            table.set_count(count + 1);
            table.set_slot(slot, pid);
            debug!("pid {pid} claims fresh slot {slot}");
            return Ok(Attempt::Admitted(Admission {
                slot,
                initializer: false,
                tracked: true,
            }));
        }

        // Table full: reclaim the first slot whose holder is gone.
        let scan_end = count.min(CoordinationConfig::MAX_INSTANCES) as usize;
        for index in 1..=scan_end {
            let holder = table.slot(index);
            if !self.probe.is_alive(holder) {
                table.set_slot(index, pid);
                debug!("pid {pid} reclaims slot {index} from dead pid {holder}");
                return Ok(Attempt::Admitted(Admission {
                    slot: index,
                    initializer: false,
                    tracked: true,
                }));
            }
        }

        Ok(Attempt::Wait)
    }
}

fn validate(key: &str, max_instances: u32) -> Result<()> {
    if key.is_empty() {
        return Err(GenRunnerError::config("coordination key must not be empty"));
    }
    if max_instances == 0 || u64::from(max_instances) > CoordinationConfig::MAX_INSTANCES {
        return Err(GenRunnerError::config(format!(
            "max-instances must be an integer in [1, {}], got {}",
            CoordinationConfig::MAX_INSTANCES,
            max_instances
        )));
    }
    Ok(())
}
