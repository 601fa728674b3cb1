use std::fmt::{self, Display};
use std::str::FromStr;

use crate::schedulers::{
    Fifo, PriorityCeiling, PriorityInheritance, PriorityScheduler, RoundRobin, ShortestJobFirst,
    ShortestRemainingTimeFirst,
};
use crate::{AcquireResult, Context, Pid, ResourceId, Scheduler, SchedulerError};

/// The registered policies.
///
/// Each variant binds one `schedule` rule to one arbitration strategy. A
/// policy is chosen once, before the simulation starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Policy {
    Fifo,
    ShortestJobFirst,
    ShortestRemainingTimeFirst,
    RoundRobin,
    Priority,
    PriorityCeiling,
    PriorityInheritance,
}

macro_rules! dispatch {
    ($policy:expr, $scheduler:ident => $call:expr) => {
        match $policy {
            Policy::Fifo => {
                let $scheduler = &mut Fifo;
                $call
            }
            Policy::ShortestJobFirst => {
                let $scheduler = &mut ShortestJobFirst;
                $call
            }
            Policy::ShortestRemainingTimeFirst => {
                let $scheduler = &mut ShortestRemainingTimeFirst;
                $call
            }
            Policy::RoundRobin => {
                let $scheduler = &mut RoundRobin;
                $call
            }
            Policy::Priority => {
                let $scheduler = &mut PriorityScheduler;
                $call
            }
            Policy::PriorityCeiling => {
                let $scheduler = &mut PriorityCeiling;
                $call
            }
            Policy::PriorityInheritance => {
                let $scheduler = &mut PriorityInheritance;
                $call
            }
        }
    };
}

impl Policy {
    pub const ALL: [Policy; 7] = [
        Policy::Fifo,
        Policy::ShortestJobFirst,
        Policy::ShortestRemainingTimeFirst,
        Policy::RoundRobin,
        Policy::Priority,
        Policy::PriorityCeiling,
        Policy::PriorityInheritance,
    ];

    /// The short name used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Policy::Fifo => "fifo",
            Policy::ShortestJobFirst => "sjf",
            Policy::ShortestRemainingTimeFirst => "srtf",
            Policy::RoundRobin => "rr",
            Policy::Priority => "prio",
            Policy::PriorityCeiling => "pcp",
            Policy::PriorityInheritance => "pip",
        }
    }

    /// Whether the running process is put back in the ready queue every tick.
    pub fn is_preemptive(&self) -> bool {
        !matches!(self, Policy::Fifo | Policy::ShortestJobFirst)
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Policy {
    type Err = SchedulerError;

    /// Accepts the key or the full name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Policy::ALL
            .into_iter()
            .find(|policy| {
                policy.key().eq_ignore_ascii_case(s) || policy.name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| SchedulerError::UnknownPolicy(s.to_string()))
    }
}

impl Scheduler for Policy {
    fn name(&self) -> &'static str {
        dispatch!(self, scheduler => scheduler.name())
    }

    fn initialize(&mut self, ctx: &mut Context) -> Result<(), SchedulerError> {
        dispatch!(self, scheduler => scheduler.initialize(ctx))
    }

    fn finalize(&mut self, ctx: &mut Context) {
        dispatch!(self, scheduler => scheduler.finalize(ctx))
    }

    fn schedule(&mut self, ctx: &mut Context) -> Option<Pid> {
        dispatch!(self, scheduler => scheduler.schedule(ctx))
    }

    fn acquire(&mut self, ctx: &mut Context, resource: ResourceId) -> AcquireResult {
        dispatch!(self, scheduler => scheduler.acquire(ctx, resource))
    }

    fn release(&mut self, ctx: &mut Context, resource: ResourceId) {
        dispatch!(self, scheduler => scheduler.release(ctx, resource))
    }
}
