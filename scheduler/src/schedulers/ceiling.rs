//! Priority scheduling with the priority ceiling protocol.
//!
//! Whoever owns a resource runs at the system ceiling [`MAX_PRIO`], above
//! every base priority, so an owner is never preempted by a process that
//! holds nothing. Inversion is bounded by the longest critical section.
//! Waiters are served in arrival order.

use log::debug;

use crate::process::MAX_PRIO;
use crate::schedulers::fcfs;
use crate::schedulers::priority::pick_highest_priority;
use crate::{AcquireResult, Context, Pid, ResourceId, Scheduler, SchedulerError};

#[derive(Debug, Default, Copy, Clone)]
pub struct PriorityCeiling;

impl Scheduler for PriorityCeiling {
    fn name(&self) -> &'static str {
        "Priority + Priority Ceiling Protocol"
    }

    fn initialize(&mut self, ctx: &mut Context) -> Result<(), SchedulerError> {
        ensure_no_owner(ctx)
    }

    fn finalize(&mut self, ctx: &mut Context) {
        restore_all(ctx);
    }

    fn schedule(&mut self, ctx: &mut Context) -> Option<Pid> {
        pick_highest_priority(ctx)
    }

    fn acquire(&mut self, ctx: &mut Context, resource: ResourceId) -> AcquireResult {
        let current = ctx.running();
        match fcfs::try_take(ctx, current, resource) {
            Some(_) => {
                ctx.block(current, resource);
                AcquireResult::Blocked
            }
            None => {
                ctx.set_priority(current, MAX_PRIO);
                AcquireResult::Granted
            }
        }
    }

    fn release(&mut self, ctx: &mut Context, resource: ResourceId) {
        let owner = fcfs::give_back(ctx, resource);
        // The ceiling lasts as long as any resource is held.
        if ctx.held_by(owner).next().is_none() {
            ctx.restore_priority(owner);
        }

        let head = ctx.resource(resource).waiters().next();
        if let Some(waiter) = head {
            ctx.wake(waiter, resource);
        }
        debug!("{} released resource {} under PCP", owner, resource);
    }
}

/// Fails if any resource is owned: that owner never went through the
/// protocol's `acquire` and would run with the wrong priority.
pub(crate) fn ensure_no_owner(ctx: &Context) -> Result<(), SchedulerError> {
    match ctx
        .resources()
        .find_map(|(id, resource)| resource.owner().map(|owner| (id, owner)))
    {
        Some((resource, owner)) => Err(SchedulerError::ResourceHeld { resource, owner }),
        None => Ok(()),
    }
}

/// Puts every process back on its original priority.
pub(crate) fn restore_all(ctx: &mut Context) {
    let pids: Vec<Pid> = ctx.processes().map(|process| process.pid()).collect();
    for pid in pids {
        ctx.restore_priority(pid);
    }
}
