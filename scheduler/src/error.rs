use std::fmt::{self, Display};

use crate::{Pid, ResourceId};

/// Recoverable errors reported by the engine.
///
/// Broken invariants (releasing a resource the caller does not own, a
/// process in two queues, ...) are not errors; they panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No policy is registered under this name.
    UnknownPolicy(String),

    /// A resource protocol was bound while a resource was already owned.
    ResourceHeld { resource: ResourceId, owner: Pid },
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::UnknownPolicy(name) => write!(f, "unknown policy `{}`", name),
            SchedulerError::ResourceHeld { resource, owner } => write!(
                f,
                "resource {} is already owned by process {}",
                resource, owner
            ),
        }
    }
}

impl std::error::Error for SchedulerError {}
