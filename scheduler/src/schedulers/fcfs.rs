//! Default resource arbitration: requests are served in arrival order,
//! priorities are ignored.

use log::debug;

use crate::{AcquireResult, Context, Pid, ResourceId};

pub(crate) fn acquire(ctx: &mut Context, resource: ResourceId) -> AcquireResult {
    let current = ctx.running();
    match try_take(ctx, current, resource) {
        Some(_) => {
            // Taken: wait at the tail of the queue.
            ctx.block(current, resource);
            AcquireResult::Blocked
        }
        None => AcquireResult::Granted,
    }
}

pub(crate) fn release(ctx: &mut Context, resource: ResourceId) {
    let owner = give_back(ctx, resource);

    let head = ctx.resource(resource).waiters().next();
    if let Some(waiter) = head {
        ctx.wake(waiter, resource);
    }
    debug!("{} released resource {}", owner, resource);
}

/// Makes `current` the owner of `resource` if it is free.
///
/// Returns the owner otherwise; the caller decides how `current` waits.
pub(crate) fn try_take(ctx: &mut Context, current: Pid, resource: ResourceId) -> Option<Pid> {
    match ctx.resource(resource).owner() {
        Some(owner) => {
            assert!(
                owner != current,
                "process {} acquires resource {} it already owns",
                current,
                resource
            );
            debug!(
                "{} blocks on resource {} owned by {}",
                current, resource, owner
            );
            Some(owner)
        }
        None => {
            ctx.resource_mut(resource).owner = Some(current);
            debug!("{} acquired resource {}", current, resource);
            None
        }
    }
}

/// Clears the ownership of `resource`, which must belong to the running
/// process. Returns that process.
pub(crate) fn give_back(ctx: &mut Context, resource: ResourceId) -> Pid {
    let current = ctx.running();
    let owner = ctx.resource(resource).owner();
    assert!(
        owner == Some(current),
        "process {} releases resource {} owned by {:?}",
        current,
        resource,
        owner
    );
    ctx.resource_mut(resource).owner = None;
    current
}
