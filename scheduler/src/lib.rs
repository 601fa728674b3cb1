//! A scheduler library.
//!
//! This library provides the scheduling and resource arbitration engine of
//! a discrete-time process simulator. Once per tick the driver asks the
//! active policy which process runs next, and forwards the running
//! process's resource requests to it.
//!

mod context;
mod error;
mod policy;
mod process;
mod resource;
mod scheduler;

pub use crate::context::Context;
pub use crate::error::SchedulerError;
pub use crate::policy::Policy;
pub use crate::process::{Priority, ProcessDescriptor, MAX_PRIO};
pub use crate::resource::{Resource, ResourceId, NR_RESOURCES};
pub use crate::scheduler::{AcquireResult, Pid, ProcessState, Scheduler, SchedulingDecision};

mod schedulers;

pub use schedulers::{
    Fifo, PriorityCeiling, PriorityInheritance, PriorityScheduler, RoundRobin, ShortestJobFirst,
    ShortestRemainingTimeFirst,
};

/// First come, first served, non-preemptive.
pub fn fifo() -> Policy {
    Policy::Fifo
}

/// Shortest job first, non-preemptive.
pub fn sjf() -> Policy {
    Policy::ShortestJobFirst
}

/// Shortest remaining time first, re-evaluated every tick.
pub fn srtf() -> Policy {
    Policy::ShortestRemainingTimeFirst
}

/// Round robin with a one tick quantum.
pub fn round_robin() -> Policy {
    Policy::RoundRobin
}

/// Preemptive static priority with first come, first served resources.
pub fn priority() -> Policy {
    Policy::Priority
}

/// Priority scheduling with the priority ceiling protocol.
pub fn priority_ceiling() -> Policy {
    Policy::PriorityCeiling
}

/// Priority scheduling with the priority inheritance protocol.
pub fn priority_inheritance() -> Policy {
    Policy::PriorityInheritance
}
