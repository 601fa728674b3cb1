//! A processor simulation library
//!
//! This is used for simulating the policies from the [`scheduler`] crate,
//! one tick at a time.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::{self, Display};

use log::{debug, info};
use scheduler::{
    AcquireResult, Context, Pid, Priority, ProcessDescriptor, ProcessState, ResourceId, Scheduler,
    SchedulerError, SchedulingDecision,
};

mod scenario;

pub use scenario::{ProcessSpec, ResourceUsage, Scenario, ScenarioError, ScenarioErrorKind};

/// Ticks simulated before giving up.
pub const DEFAULT_MAX_TICKS: usize = 10_000;

/// Something that happened during a tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    Forked(Pid),
    Acquired { pid: Pid, resource: ResourceId },
    Blocked { pid: Pid, resource: ResourceId },
    Released { pid: Pid, resource: ResourceId },
    Exited(Pid),
}

impl Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Forked(pid) => write!(f, "{}: FORK", pid),
            Event::Acquired { pid, resource } => write!(f, "{}: ACQUIRE {}", pid, resource),
            Event::Blocked { pid, resource } => write!(f, "{}: BLOCKED ON {}", pid, resource),
            Event::Released { pid, resource } => write!(f, "{}: RELEASE {}", pid, resource),
            Event::Exited(pid) => write!(f, "{}: EXIT", pid),
        }
    }
}

/// Running iteration log
#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    /// The tick this entry describes.
    pub tick: usize,

    /// What the processor did during the tick.
    pub decision: SchedulingDecision,

    /// Forks, resource traffic and exits, in the order they happened.
    pub events: Vec<Event>,

    /// Every process at the end of the tick.
    pub processes: BTreeMap<Pid, ProcessInfo>,
}

impl Display for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.decision)?;
        for event in &self.events {
            writeln!(f, "{}", event)?;
        }
        writeln!(f, "PID\tSTATE\t\tPRI\tORIG\tAGE")?;
        for process in self.processes.values() {
            writeln!(f, "{}", process)?;
        }
        Ok(())
    }
}

/// Information about a process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    /// The PID of the process.
    pub pid: Pid,

    /// The process state.
    pub state: ProcessState,

    /// The current, possibly inherited, priority.
    pub priority: Priority,

    pub priority_original: Priority,

    pub age: usize,

    pub lifespan: usize,
}

impl From<&ProcessDescriptor> for ProcessInfo {
    fn from(process: &ProcessDescriptor) -> Self {
        ProcessInfo {
            pid: process.pid(),
            state: process.state(),
            priority: process.priority(),
            priority_original: process.priority_original(),
            age: process.age(),
            lifespan: process.lifespan(),
        }
    }
}

impl Display for ProcessInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t\t{}\t{}\t{}/{}",
            self.pid, self.state, self.priority, self.priority_original, self.age, self.lifespan
        )
    }
}

/// The processor simulator.
pub struct Processor<S: Scheduler> {
    scheduler: S,
    context: Context,
    /// Processes not forked yet, by arrival.
    pending: VecDeque<ProcessSpec>,
    usages: HashMap<Pid, Vec<ResourceUsage>>,
    logs: Vec<Log>,
    max_ticks: usize,
}

impl<S: Scheduler> Processor<S> {
    /// Simulates `scenario` under `scheduler` until every process exited,
    /// the processes deadlock, or [`DEFAULT_MAX_TICKS`] ticks elapsed.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use processor::{Processor, ProcessSpec, Scenario};
    ///
    /// let scenario = Scenario::new("example")
    ///     .process(ProcessSpec::new(3).priority(1).acquire(0, 0, 2))
    ///     .process(ProcessSpec::new(2).priority(5).arrives_at(1));
    ///
    /// let logs = Processor::run(scheduler::priority_ceiling(), &scenario).unwrap();
    /// println!("{}", processor::format_logs(&logs));
    /// ```
    pub fn run(scheduler: S, scenario: &Scenario) -> Result<Vec<Log>, SchedulerError> {
        Processor::new(scheduler, scenario).simulate()
    }

    /// The scenario is trusted: an invalid one panics while simulating, see
    /// [`Scenario::validate`].
    pub fn new(scheduler: S, scenario: &Scenario) -> Self {
        let mut pending = scenario.processes.clone();
        pending.sort_by_key(|spec| spec.arrival);
        Processor {
            scheduler,
            context: Context::new(),
            pending: pending.into(),
            usages: HashMap::new(),
            logs: vec![],
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn simulate(mut self) -> Result<Vec<Log>, SchedulerError> {
        self.scheduler.initialize(&mut self.context)?;
        info!(
            "simulating {} processes under {}",
            self.pending.len(),
            self.scheduler.name()
        );

        loop {
            let tick = self.context.ticks();
            let mut events = vec![];

            if tick >= self.max_ticks {
                self.record(tick, SchedulingDecision::Halted, events);
                break;
            }

            self.fork_arrivals(&mut events);
            let decision = self.pick(&mut events);
            match decision {
                SchedulingDecision::Run(pid) => {
                    self.context.tick();
                    self.release_due(pid, &mut events);
                }
                SchedulingDecision::Idle => self.context.tick(),
                _ => {}
            }
            self.context.assert_partitioned();

            let stop = matches!(
                decision,
                SchedulingDecision::Deadlock | SchedulingDecision::Done
            );
            self.record(tick, decision, events);
            if stop {
                break;
            }
        }

        self.scheduler.finalize(&mut self.context);
        info!(
            "{} finished after {} ticks",
            self.scheduler.name(),
            self.context.ticks()
        );
        Ok(self.logs)
    }

    fn fork_arrivals(&mut self, events: &mut Vec<Event>) {
        let tick = self.context.ticks();
        while self
            .pending
            .front()
            .map_or(false, |spec| spec.arrival <= tick)
        {
            let Some(spec) = self.pending.pop_front() else {
                break;
            };
            let pid = self.context.fork(spec.lifespan, spec.priority);
            self.usages.insert(pid, spec.usages);
            events.push(Event::Forked(pid));
        }
    }

    /// Asks the scheduler for a process until one gets every resource it
    /// needs at its current age.
    fn pick(&mut self, events: &mut Vec<Event>) -> SchedulingDecision {
        loop {
            let next = self.scheduler.schedule(&mut self.context);
            if let Some(exited) = self.context.dispatch(next) {
                events.push(Event::Exited(exited));
            }

            let Some(pid) = next else {
                return self.nothing_to_run();
            };
            if self.acquire_due(pid, events) {
                debug!("tick {}: run {}", self.context.ticks(), pid);
                return SchedulingDecision::Run(pid);
            }
        }
    }

    fn nothing_to_run(&self) -> SchedulingDecision {
        if !self.pending.is_empty() {
            SchedulingDecision::Idle
        } else if self.context.live_count() == 0 {
            SchedulingDecision::Done
        } else {
            debug!(
                "tick {}: {} processes wait forever",
                self.context.ticks(),
                self.context.waiting_count()
            );
            SchedulingDecision::Deadlock
        }
    }

    /// Returns false if `pid` blocked.
    fn acquire_due(&mut self, pid: Pid, events: &mut Vec<Event>) -> bool {
        let age = self.age(pid);
        for resource in self.due(pid, |usage| usage.at == age) {
            // Granted before blocking on another resource at the same age.
            if self.context.resource(resource).owner() == Some(pid) {
                continue;
            }
            match self.scheduler.acquire(&mut self.context, resource) {
                AcquireResult::Granted => events.push(Event::Acquired { pid, resource }),
                AcquireResult::Blocked => {
                    events.push(Event::Blocked { pid, resource });
                    return false;
                }
            }
        }
        true
    }

    fn release_due(&mut self, pid: Pid, events: &mut Vec<Event>) {
        let age = self.age(pid);
        for resource in self.due(pid, |usage| usage.release_at() == age) {
            self.scheduler.release(&mut self.context, resource);
            events.push(Event::Released { pid, resource });
        }
    }

    fn due<F>(&self, pid: Pid, filter: F) -> Vec<ResourceId>
    where
        F: Fn(&ResourceUsage) -> bool,
    {
        self.usages
            .get(&pid)
            .into_iter()
            .flatten()
            .filter(|&usage| filter(usage))
            .map(|usage| usage.resource)
            .collect()
    }

    fn age(&self, pid: Pid) -> usize {
        self.context.process(pid).map_or(0, |process| process.age())
    }

    fn record(&mut self, tick: usize, decision: SchedulingDecision, events: Vec<Event>) {
        let processes = self
            .context
            .processes()
            .map(|process| (process.pid(), ProcessInfo::from(process)))
            .collect();
        self.logs.push(Log {
            tick,
            decision,
            events,
            processes,
        });
    }
}

/// Format the [`Processor`]'s logs to a [`String`].
///
/// * `logs` - the logs returned by the [`Processor`].
///
/// ## Example
///
/// ```rust
/// use processor::{format_logs, Processor, ProcessSpec, Scenario};
///
/// let scenario = Scenario::new("single").process(ProcessSpec::new(2));
/// let logs = Processor::run(scheduler::fifo(), &scenario).unwrap();
///
/// println!("{}", format_logs(&logs));
/// ```
pub fn format_logs(logs: &[Log]) -> String {
    let mut s = String::new();
    for log in logs {
        s.push_str(&format!("===== Tick: {} =====\n{}\n", log.tick, log));
    }
    s
}

/// The process selected at each simulated tick, [`None`] for idle ticks.
pub fn run_trace(logs: &[Log]) -> Vec<Option<Pid>> {
    logs.iter()
        .filter_map(|log| match log.decision {
            SchedulingDecision::Run(pid) => Some(Some(pid)),
            SchedulingDecision::Idle => Some(None),
            _ => None,
        })
        .collect()
}

/// The last decision, which tells how the simulation ended.
pub fn outcome(logs: &[Log]) -> Option<SchedulingDecision> {
    logs.last().map(|log| log.decision)
}
