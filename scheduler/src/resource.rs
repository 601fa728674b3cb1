use std::collections::VecDeque;

use crate::Pid;

/// Index into the resource table.
pub type ResourceId = usize;

/// Number of resources in the system.
pub const NR_RESOURCES: usize = 32;

/// An exclusive resource.
///
/// `owner` is a back reference kept by the engine; the process does not
/// own the resource object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub(crate) owner: Option<Pid>,
    pub(crate) wait_queue: VecDeque<Pid>,
}

impl Resource {
    pub fn owner(&self) -> Option<Pid> {
        self.owner
    }

    /// The blocked processes, head first.
    pub fn waiters(&self) -> impl Iterator<Item = Pid> + '_ {
        self.wait_queue.iter().copied()
    }

    pub(crate) fn remove_waiter(&mut self, pid: Pid) -> bool {
        match self.wait_queue.iter().position(|&waiter| waiter == pid) {
            Some(index) => {
                self.wait_queue.remove(index);
                true
            }
            None => false,
        }
    }
}
