//! Priority scheduling with the priority inheritance protocol.
//!
//! An owner runs at the highest priority among the processes waiting on any
//! resource it holds, and never below its own original priority. When a
//! boosted owner is itself blocked, the boost travels on to the owner of the
//! resource it waits for. Wait queues are ordered by priority and a release
//! wakes the most urgent waiter.

use std::cmp::Reverse;

use log::debug;

use crate::process::Priority;
use crate::schedulers::ceiling::{ensure_no_owner, restore_all};
use crate::schedulers::fcfs;
use crate::schedulers::priority::pick_highest_priority;
use crate::{AcquireResult, Context, Pid, ProcessState, ResourceId, Scheduler, SchedulerError};

#[derive(Debug, Default, Copy, Clone)]
pub struct PriorityInheritance;

impl Scheduler for PriorityInheritance {
    fn name(&self) -> &'static str {
        "Priority + Priority Inheritance Protocol"
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
            Some(owner) => {
                ctx.block_by_priority(current, resource);
                propagate(ctx, owner);
                AcquireResult::Blocked
            }
            None => {
                // Waiters left over from an earlier release donate to the new owner.
                propagate(ctx, current);
                AcquireResult::Granted
            }
        }
    }

    fn release(&mut self, ctx: &mut Context, resource: ResourceId) {
        let owner = fcfs::give_back(ctx, resource);

        let next = ctx
            .resource(resource)
            .waiters()
            .min_by_key(|&waiter| Reverse(ctx.process(waiter).map_or(0, |p| p.priority())));
        if let Some(waiter) = next {
            ctx.wake(waiter, resource);
        }

        // Other held resources may still carry inheritances.
        propagate(ctx, owner);
        debug!("{} released resource {} under PIP", owner, resource);
    }
}

/// `max(priority_original, priority of every process waiting on a resource
/// held by pid)`
fn inherited_priority(ctx: &Context, pid: Pid) -> Priority {
    let original = ctx.process(pid).map_or(0, |p| p.priority_original());
    ctx.held_by(pid)
        .flat_map(move |id| ctx.resource(id).waiters())
        .filter_map(|waiter| ctx.process(waiter).map(|p| p.priority()))
        .fold(original, Priority::max)
}

/// Re-derives the priority of `pid` and walks down the chain of owners it
/// is blocked behind.
fn propagate(ctx: &mut Context, pid: Pid) {
    let mut pid = pid;
    // A wait cycle would otherwise walk forever.
    for _ in 0..ctx.live_count() {
        let priority = inherited_priority(ctx, pid);
        if ctx.process(pid).map(|p| p.priority()) == Some(priority) {
            return;
        }
        ctx.set_priority(pid, priority);

        let state = ctx.process(pid).map(|p| p.state());
        let Some(ProcessState::Waiting { resource }) = state else {
            return;
        };
        // Keep the wait queue sorted after the priority change.
        ctx.resource_mut(resource).remove_waiter(pid);
        ctx.block_by_priority(pid, resource);

        match ctx.resource(resource).owner() {
            Some(owner) => pid = owner,
            None => return,
        }
    }
}
