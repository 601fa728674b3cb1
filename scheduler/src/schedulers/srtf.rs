use crate::schedulers::{preempt_or_retain, Preemption};
use crate::{Context, Pid, Scheduler};

/// Shortest remaining time first. The running process competes with the
/// ready queue again every tick.
#[derive(Debug, Default, Copy, Clone)]
pub struct ShortestRemainingTimeFirst;

impl Scheduler for ShortestRemainingTimeFirst {
    fn name(&self) -> &'static str {
        "Shortest Remaining Time First"
    }

    fn schedule(&mut self, ctx: &mut Context) -> Option<Pid> {
        preempt_or_retain(ctx, Preemption::EveryTick);
        ctx.take_ready_min_by_key(|process| process.remaining())
    }
}
