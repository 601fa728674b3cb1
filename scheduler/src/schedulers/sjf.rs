use crate::schedulers::{preempt_or_retain, Preemption};
use crate::{Context, Pid, Scheduler};

/// Shortest job first, non-preemptive: the shortest lifespan in the ready
/// queue wins once the CPU is free.
#[derive(Debug, Default, Copy, Clone)]
pub struct ShortestJobFirst;

impl Scheduler for ShortestJobFirst {
    fn name(&self) -> &'static str {
        "Shortest-Job First"
    }

    fn schedule(&mut self, ctx: &mut Context) -> Option<Pid> {
        preempt_or_retain(ctx, Preemption::Never)
            .or_else(|| ctx.take_ready_min_by_key(|process| process.lifespan()))
    }
}
