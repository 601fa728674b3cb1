use std::fmt::{self, Display};
use std::num::NonZeroUsize;

use crate::{Context, ResourceId, SchedulerError};

/// The PID of a process
///
/// The PID cannot be 0, PIDs start from 1.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Pid(NonZeroUsize);

impl Pid {
    /// Panics if `pid` is 0.
    pub fn new(pid: usize) -> Pid {
        match NonZeroUsize::new(pid) {
            Some(pid) => Pid(pid),
            None => panic!("PID 0 is reserved"),
        }
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl PartialEq<usize> for Pid {
    fn eq(&self, other: &usize) -> bool {
        self.0.get() == *other
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the processor did during one tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SchedulingDecision {
    /// The process with PID `pid` ran for one tick.
    Run(Pid),

    /// Nothing was runnable, but a process may still arrive or be woken up.
    Idle,

    /// Every live process waits on a resource and no process is left to arrive,
    /// so no resource can ever be released again.
    Deadlock,

    /// There are no more processes to schedule.
    Done,

    /// The tick limit was reached before the simulation finished.
    Halted,
}

impl Display for SchedulingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingDecision::Run(pid) => write!(f, "Run {}", pid),
            SchedulingDecision::Idle => write!(f, "Idle"),
            SchedulingDecision::Deadlock => {
                write!(f, "Deadlock, every process waits on a resource")
            }
            SchedulingDecision::Done => write!(f, "Done, no more processes"),
            SchedulingDecision::Halted => write!(f, "Halted, tick limit reached"),
        }
    }
}

/// The outcome of [`Scheduler::acquire`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AcquireResult {
    /// The running process now owns the resource.
    Granted,

    /// The resource is taken. The running process was moved to the resource's
    /// wait queue and the driver has to call [`Scheduler::schedule`] again.
    Blocked,
}

/// The state of a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    /// The process is in the ready queue.
    Ready,

    /// The process is the current process.
    Running,

    /// The process is blocked in the wait queue of a resource.
    Waiting {
        /// The resource the process waits for.
        resource: ResourceId,
    },

    /// The process consumed its whole lifespan and left the system.
    Exited,
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Waiting { resource } => write!(f, "WAIT {}", resource),
            ProcessState::Exited => write!(f, "EXITED"),
        }
    }
}

/// The hooks that every scheduling policy provides to the driver.
///
/// The driver calls exactly one hook at a time and every hook leaves the
/// [`Context`] partitioned (see [`Context::assert_partitioned`]).
pub trait Scheduler: Send {
    /// Human readable name of the policy.
    fn name(&self) -> &'static str;

    /// Called once before the first tick.
    fn initialize(&mut self, _ctx: &mut Context) -> Result<(), SchedulerError> {
        Ok(())
    }

    /// Called once after the last tick.
    fn finalize(&mut self, _ctx: &mut Context) {}

    /// Returns the process that runs next, or [`None`] if the CPU idles.
    ///
    /// The returned process has been removed from the ready queue.
    fn schedule(&mut self, ctx: &mut Context) -> Option<Pid>;

    /// The current process asks for `resource`.
    fn acquire(&mut self, ctx: &mut Context, resource: ResourceId) -> AcquireResult {
        crate::schedulers::fcfs::acquire(ctx, resource)
    }

    /// The current process gives `resource` back.
    ///
    /// Panics if the current process does not own `resource`.
    fn release(&mut self, ctx: &mut Context, resource: ResourceId) {
        crate::schedulers::fcfs::release(ctx, resource)
    }
}
