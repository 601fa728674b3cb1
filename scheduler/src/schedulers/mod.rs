//! The scheduling policies and the resource arbitration strategies.
//!
//! Every policy starts with the same preamble (see [`preempt_or_retain`]),
//! then picks from the ready queue with its own selection rule.

pub(crate) mod fcfs;

mod fifo;
pub use fifo::Fifo;

mod sjf;
pub use sjf::ShortestJobFirst;

mod srtf;
pub use srtf::ShortestRemainingTimeFirst;

mod round_robin;
pub use round_robin::RoundRobin;

mod priority;
pub use priority::PriorityScheduler;

mod ceiling;
pub use ceiling::PriorityCeiling;

mod inheritance;
pub use inheritance::PriorityInheritance;

use crate::{Context, Pid, ProcessState};

/// How a policy treats a current process that still has work left.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Preemption {
    /// The process keeps the CPU until it finishes or blocks.
    Never,
    /// The process goes back to the ready queue tail every tick.
    EveryTick,
}

/// Returns the current process if the policy keeps it on the CPU.
///
/// With [`Preemption::EveryTick`] an unfinished current process is appended
/// to the ready queue instead. A current process that is blocked on a
/// resource or that consumed its lifespan is left alone.
pub(crate) fn preempt_or_retain(ctx: &mut Context, preemption: Preemption) -> Option<Pid> {
    let pid = ctx.current()?;
    let process = ctx.process(pid)?;
    if process.state() != ProcessState::Running || process.is_finished() {
        return None;
    }

    match preemption {
        Preemption::Never => Some(pid),
        Preemption::EveryTick => {
            ctx.enqueue_ready(pid);
            None
        }
    }
}
