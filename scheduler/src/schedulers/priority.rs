use crate::schedulers::{preempt_or_retain, Preemption};
use crate::{Context, Pid, Scheduler};

/// Preemptive static priority. Among equal priorities the process closest
/// to the ready queue head wins, so equal priorities rotate.
#[derive(Debug, Default, Copy, Clone)]
pub struct PriorityScheduler;

impl Scheduler for PriorityScheduler {
    fn name(&self) -> &'static str {
        "Priority"
    }

    fn schedule(&mut self, ctx: &mut Context) -> Option<Pid> {
        pick_highest_priority(ctx)
    }
}

/// The selection rule shared by every priority based policy.
pub(crate) fn pick_highest_priority(ctx: &mut Context) -> Option<Pid> {
    preempt_or_retain(ctx, Preemption::EveryTick);
    ctx.take_ready_highest_priority()
}
