use crate::{Pid, ProcessState};

/// Process priority. Larger values are more urgent.
pub type Priority = i8;

/// Base priorities live in `0..MAX_PRIO`. `MAX_PRIO` itself is the
/// system ceiling used by the priority ceiling protocol.
pub const MAX_PRIO: Priority = 32;

/// The schedulable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDescriptor {
    pub(crate) pid: Pid,
    pub(crate) age: usize,
    pub(crate) lifespan: usize,
    pub(crate) priority: Priority,
    pub(crate) priority_original: Priority,
    pub(crate) state: ProcessState,
}

impl ProcessDescriptor {
    pub(crate) fn new(pid: Pid, lifespan: usize, priority: Priority) -> Self {
        ProcessDescriptor {
            pid,
            age: 0,
            lifespan,
            priority,
            priority_original: priority,
            state: ProcessState::Ready,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Ticks this process has run so far.
    pub fn age(&self) -> usize {
        self.age
    }

    pub fn lifespan(&self) -> usize {
        self.lifespan
    }

    /// `lifespan - age`
    pub fn remaining(&self) -> usize {
        self.lifespan - self.age
    }

    /// The current priority, which may be boosted by a resource protocol.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn priority_original(&self) -> Priority {
        self.priority_original
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.age == self.lifespan
    }
}
