use std::cmp::Reverse;
use std::collections::{BTreeMap, VecDeque};

use log::{debug, trace};

use crate::process::{Priority, ProcessDescriptor, MAX_PRIO};
use crate::resource::{Resource, ResourceId, NR_RESOURCES};
use crate::{Pid, ProcessState};

/// The state shared by the driver and the scheduling hooks.
///
/// Processes live in an arena keyed by PID. The ready queue and the wait
/// queues only hold PIDs. At every tick boundary each live process is in
/// exactly one of: the current slot, the ready queue, a wait queue.
#[derive(Debug, Clone)]
pub struct Context {
    processes: BTreeMap<Pid, ProcessDescriptor>,
    ready_queue: VecDeque<Pid>,
    resources: Vec<Resource>,
    current: Option<Pid>,
    ticks: usize,
    next_pid: usize,
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Context {
            processes: BTreeMap::new(),
            ready_queue: VecDeque::new(),
            resources: vec![Resource::default(); NR_RESOURCES],
            current: None,
            ticks: 0,
            next_pid: 1,
        }
    }

    /// Creates a process and appends it to the ready queue.
    ///
    /// Panics if `lifespan` is 0 or `priority` is outside `0..MAX_PRIO`.
    pub fn fork(&mut self, lifespan: usize, priority: Priority) -> Pid {
        assert!(lifespan > 0, "a process needs a non-zero lifespan");
        assert!(
            (0..MAX_PRIO).contains(&priority),
            "priority {} outside 0..{}",
            priority,
            MAX_PRIO
        );

        let pid = Pid::new(self.next_pid);
        self.next_pid += 1;
        self.processes
            .insert(pid, ProcessDescriptor::new(pid, lifespan, priority));
        self.ready_queue.push_back(pid);
        debug!(
            "fork {} lifespan={} priority={} at tick {}",
            pid, lifespan, priority, self.ticks
        );
        pid
    }

    /// Installs the process returned by [`Scheduler::schedule`](crate::Scheduler::schedule)
    /// as the current process.
    ///
    /// A previous current process that consumed its lifespan and was not
    /// selected again leaves the system here. Its PID is returned.
    pub fn dispatch(&mut self, next: Option<Pid>) -> Option<Pid> {
        let mut exited = None;
        if let Some(prev) = self.current.take() {
            let process = self.process(prev);
            let finished = process.map_or(false, |p| {
                p.state == ProcessState::Running && p.is_finished()
            });
            if Some(prev) != next && finished {
                self.exit(prev);
                exited = Some(prev);
            }
        }

        if let Some(pid) = next {
            debug_assert!(
                !self.ready_queue.contains(&pid),
                "process {} dispatched while still in the ready queue",
                pid
            );
            let process = self.process_mut(pid);
            assert!(
                matches!(process.state, ProcessState::Ready | ProcessState::Running),
                "process {} dispatched in state {}",
                pid,
                process.state
            );
            assert!(!process.is_finished(), "process {} already finished", pid);
            process.state = ProcessState::Running;
        }
        self.current = next;
        exited
    }

    /// Advances time by one tick, aging the running process.
    pub fn tick(&mut self) {
        if let Some(pid) = self.current {
            let process = self.process_mut(pid);
            if process.state == ProcessState::Running {
                assert!(
                    process.age < process.lifespan,
                    "process {} ran past its lifespan",
                    pid
                );
                process.age += 1;
                trace!("{} age {}/{}", pid, process.age, process.lifespan);
            }
        }
        self.ticks += 1;
    }

    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn process(&self, pid: Pid) -> Option<&ProcessDescriptor> {
        self.processes.get(&pid)
    }

    /// Every process ever forked, including the exited ones, by PID.
    pub fn processes(&self) -> impl Iterator<Item = &ProcessDescriptor> + '_ {
        self.processes.values()
    }

    pub fn ready_queue(&self) -> impl Iterator<Item = Pid> + '_ {
        self.ready_queue.iter().copied()
    }

    /// Panics if `id` is outside the resource table.
    pub fn resource(&self, id: ResourceId) -> &Resource {
        match self.resources.get(id) {
            Some(resource) => resource,
            None => panic!("resource {} outside the table of {}", id, NR_RESOURCES),
        }
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &Resource)> + '_ {
        self.resources.iter().enumerate()
    }

    /// The resources owned by `pid`.
    pub fn held_by(&self, pid: Pid) -> impl Iterator<Item = ResourceId> + '_ {
        self.resources
            .iter()
            .enumerate()
            .filter(move |(_, resource)| resource.owner == Some(pid))
            .map(|(id, _)| id)
    }

    /// Processes that have not exited yet.
    pub fn live_count(&self) -> usize {
        self.processes
            .values()
            .filter(|process| process.state != ProcessState::Exited)
            .count()
    }

    pub fn waiting_count(&self) -> usize {
        self.resources
            .iter()
            .map(|resource| resource.wait_queue.len())
            .sum()
    }

    /// Panics unless every live process is in exactly one of the current
    /// slot, the ready queue or a wait queue, with a state that matches.
    pub fn assert_partitioned(&self) {
        let mut seen: BTreeMap<Pid, usize> = BTreeMap::new();

        if let Some(pid) = self.current {
            if self.process_ref(pid).state == ProcessState::Running {
                *seen.entry(pid).or_default() += 1;
            }
        }

        for &pid in &self.ready_queue {
            let state = self.process_ref(pid).state;
            assert!(
                state == ProcessState::Ready,
                "process {} in the ready queue is {}",
                pid,
                state
            );
            *seen.entry(pid).or_default() += 1;
        }

        for (id, resource) in self.resources.iter().enumerate() {
            if let Some(owner) = resource.owner {
                assert!(
                    self.process_ref(owner).state != ProcessState::Exited,
                    "resource {} owned by exited process {}",
                    id,
                    owner
                );
            }
            for &pid in &resource.wait_queue {
                assert!(
                    resource.owner != Some(pid),
                    "process {} waits on its own resource {}",
                    pid,
                    id
                );
                let state = self.process_ref(pid).state;
                assert!(
                    state == ProcessState::Waiting { resource: id },
                    "process {} in the wait queue of resource {} is {}",
                    pid,
                    id,
                    state
                );
                *seen.entry(pid).or_default() += 1;
            }
        }

        for process in self.processes.values() {
            let count = seen.get(&process.pid).copied().unwrap_or(0);
            let expected = match process.state {
                ProcessState::Exited => 0,
                _ => 1,
            };
            assert!(
                count == expected,
                "process {} ({}) found in {} places",
                process.pid,
                process.state,
                count
            );
        }
    }

    fn exit(&mut self, pid: Pid) {
        if let Some(resource) = self.held_by(pid).next() {
            panic!("process {} exited while owning resource {}", pid, resource);
        }
        self.process_mut(pid).state = ProcessState::Exited;
        debug!("exit {} at tick {}", pid, self.ticks);
    }

    fn process_ref(&self, pid: Pid) -> &ProcessDescriptor {
        match self.processes.get(&pid) {
            Some(process) => process,
            None => panic!("unknown process {}", pid),
        }
    }

    pub(crate) fn process_mut(&mut self, pid: Pid) -> &mut ProcessDescriptor {
        match self.processes.get_mut(&pid) {
            Some(process) => process,
            None => panic!("unknown process {}", pid),
        }
    }

    pub(crate) fn resource_mut(&mut self, id: ResourceId) -> &mut Resource {
        match self.resources.get_mut(id) {
            Some(resource) => resource,
            None => panic!("resource {} outside the table of {}", id, NR_RESOURCES),
        }
    }

    /// The current process, which must be running.
    pub(crate) fn running(&self) -> Pid {
        match self.current {
            Some(pid) if self.process_ref(pid).state == ProcessState::Running => pid,
            Some(pid) => panic!("current process {} is not running", pid),
            None => panic!("no process is running"),
        }
    }

    pub(crate) fn priority_of(&self, pid: Pid) -> Priority {
        self.process_ref(pid).priority
    }

    pub(crate) fn set_priority(&mut self, pid: Pid, priority: Priority) {
        let process = self.process_mut(pid);
        if process.priority != priority {
            debug!(
                "{} priority {} -> {} (original {})",
                pid, process.priority, priority, process.priority_original
            );
            process.priority = priority;
        }
    }

    pub(crate) fn restore_priority(&mut self, pid: Pid) {
        let original = self.process_ref(pid).priority_original;
        self.set_priority(pid, original);
    }

    /// Appends `pid` to the ready queue tail.
    pub(crate) fn enqueue_ready(&mut self, pid: Pid) {
        assert!(
            !self.ready_queue.contains(&pid),
            "process {} is already in the ready queue",
            pid
        );
        self.process_mut(pid).state = ProcessState::Ready;
        self.ready_queue.push_back(pid);
    }

    #[cfg(test)]
    pub(crate) fn remove_ready(&mut self, pid: Pid) -> bool {
        match self.ready_queue.iter().position(|&ready| ready == pid) {
            Some(index) => {
                self.ready_queue.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_ready_front(&mut self) -> Option<Pid> {
        self.ready_queue.pop_front()
    }

    /// Removes the ready process with the smallest key. Ties go to the
    /// process closest to the head of the queue.
    pub(crate) fn take_ready_min_by_key<K, F>(&mut self, key: F) -> Option<Pid>
    where
        K: Ord,
        F: Fn(&ProcessDescriptor) -> K,
    {
        let index = self
            .ready_queue
            .iter()
            .enumerate()
            .min_by_key(|(_, pid)| key(self.process_ref(**pid)))
            .map(|(index, _)| index)?;
        self.ready_queue.remove(index)
    }

    /// Removes the ready process with the highest priority, ties in queue order.
    pub(crate) fn take_ready_highest_priority(&mut self) -> Option<Pid> {
        self.take_ready_min_by_key(|process| Reverse(process.priority))
    }

    /// Parks `pid` at the tail of the wait queue of `resource`.
    pub(crate) fn block(&mut self, pid: Pid, resource: ResourceId) {
        self.process_mut(pid).state = ProcessState::Waiting { resource };
        self.resource_mut(resource).wait_queue.push_back(pid);
    }

    /// Parks `pid` in the wait queue of `resource` behind every waiter with
    /// the same or a higher priority.
    pub(crate) fn block_by_priority(&mut self, pid: Pid, resource: ResourceId) {
        let priority = self.priority_of(pid);
        let index = self
            .resource(resource)
            .wait_queue
            .iter()
            .position(|&waiter| self.priority_of(waiter) < priority);
        self.process_mut(pid).state = ProcessState::Waiting { resource };
        let queue = &mut self.resource_mut(resource).wait_queue;
        match index {
            Some(index) => queue.insert(index, pid),
            None => queue.push_back(pid),
        }
    }

    /// Moves `pid` from the wait queue of `resource` to the ready queue tail.
    pub(crate) fn wake(&mut self, pid: Pid, resource: ResourceId) {
        let state = self.process_ref(pid).state;
        assert!(
            state == ProcessState::Waiting { resource },
            "woke process {} in state {}",
            pid,
            state
        );
        let removed = self.resource_mut(resource).remove_waiter(pid);
        assert!(removed, "process {} not queued on resource {}", pid, resource);
        self.enqueue_ready(pid);
        debug!("wake {} from resource {}", pid, resource);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fork_appends_to_ready_queue() {
        let mut ctx = Context::new();
        let a = ctx.fork(3, 1);
        let b = ctx.fork(2, 4);

        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(ctx.ready_queue().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(ctx.process(b).map(|p| p.priority()), Some(4));
        assert_eq!(ctx.live_count(), 2);
        ctx.assert_partitioned();
    }

    #[test]
    #[should_panic(expected = "priority")]
    fn fork_rejects_the_ceiling() {
        Context::new().fork(1, MAX_PRIO);
    }

    #[test]
    fn tick_ages_only_the_running_process() {
        let mut ctx = Context::new();
        let a = ctx.fork(2, 0);
        let b = ctx.fork(2, 0);

        let next = ctx.take_ready_front();
        ctx.dispatch(next);
        ctx.tick();

        assert_eq!(ctx.ticks(), 1);
        assert_eq!(ctx.process(a).map(|p| p.age()), Some(1));
        assert_eq!(ctx.process(b).map(|p| p.age()), Some(0));
        ctx.assert_partitioned();
    }

    #[test]
    fn dispatch_reaps_a_finished_process() {
        let mut ctx = Context::new();
        let a = ctx.fork(1, 0);
        let b = ctx.fork(1, 0);

        let next = ctx.take_ready_front();
        ctx.dispatch(next);
        ctx.tick();

        let next = ctx.take_ready_front();
        assert_eq!(ctx.dispatch(next), Some(a));
        assert_eq!(ctx.current(), Some(b));
        assert_eq!(ctx.process(a).map(|p| p.state()), Some(ProcessState::Exited));
        assert_eq!(ctx.live_count(), 1);
        ctx.assert_partitioned();
    }

    #[test]
    fn min_by_key_breaks_ties_in_queue_order() {
        let mut ctx = Context::new();
        ctx.fork(5, 3);
        let b = ctx.fork(2, 7);
        let c = ctx.fork(2, 7);

        assert_eq!(ctx.take_ready_min_by_key(|p| p.lifespan()), Some(b));
        assert_eq!(ctx.take_ready_highest_priority(), Some(c));
    }

    #[test]
    fn block_by_priority_keeps_arrival_order_among_equals() {
        let mut ctx = Context::new();
        let low = ctx.fork(1, 1);
        let high = ctx.fork(1, 9);
        let other_high = ctx.fork(1, 9);
        for pid in [low, high, other_high] {
            ctx.remove_ready(pid);
        }

        ctx.block_by_priority(low, 0);
        ctx.block_by_priority(high, 0);
        ctx.block_by_priority(other_high, 0);

        assert_eq!(
            ctx.resource(0).waiters().collect::<Vec<_>>(),
            vec![high, other_high, low]
        );
        ctx.assert_partitioned();
    }

    #[test]
    #[should_panic(expected = "found in 0 places")]
    fn partition_catches_a_lost_process() {
        let mut ctx = Context::new();
        let a = ctx.fork(1, 0);
        ctx.remove_ready(a);
        ctx.assert_partitioned();
    }

    #[test]
    #[should_panic(expected = "already in the ready queue")]
    fn double_enqueue_is_fatal() {
        let mut ctx = Context::new();
        let a = ctx.fork(1, 0);
        ctx.enqueue_ready(a);
    }

    #[test]
    #[should_panic(expected = "outside the table")]
    fn resource_out_of_range_is_fatal() {
        Context::new().resource(NR_RESOURCES);
    }
}
