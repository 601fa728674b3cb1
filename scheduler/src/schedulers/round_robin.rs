use crate::schedulers::{preempt_or_retain, Preemption};
use crate::{Context, Pid, Scheduler};

/// Round robin with a quantum of one tick.
#[derive(Debug, Default, Copy, Clone)]
pub struct RoundRobin;

impl Scheduler for RoundRobin {
    fn name(&self) -> &'static str {
        "Round-Robin"
    }

    fn schedule(&mut self, ctx: &mut Context) -> Option<Pid> {
        preempt_or_retain(ctx, Preemption::EveryTick);
        ctx.take_ready_front()
    }
}
