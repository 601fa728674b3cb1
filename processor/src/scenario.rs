//! Workloads for the [`Processor`](crate::Processor).
//!
//! A scenario lists the processes to fork, when they arrive and which
//! resources they hold at which point of their lifetime. Scenarios are built
//! in code or read from text:
//!
//! ```text
//! # arrival lifespan priority
//! process 0 6 1
//!     # resource at duration
//!     acquire 0 1 3
//! end
//! process 2 2 10
//! end
//! ```

use std::fmt::{self, Display};
use std::str::FromStr;

use scheduler::{Priority, ResourceId, MAX_PRIO, NR_RESOURCES};

/// Hold `resource` from the moment the process's age is `at` until its age
/// reaches `at + duration`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResourceUsage {
    pub resource: ResourceId,
    pub at: usize,
    pub duration: usize,
}

impl ResourceUsage {
    /// Saturates, so an absurd `at` is reported as past the lifespan.
    pub fn release_at(&self) -> usize {
        self.at.saturating_add(self.duration)
    }

    fn overlaps(&self, other: &ResourceUsage) -> bool {
        self.resource == other.resource
            && self.at < other.release_at()
            && other.at < self.release_at()
    }
}

/// A process to fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// The tick at which the process is forked.
    pub arrival: usize,
    pub lifespan: usize,
    pub priority: Priority,
    pub usages: Vec<ResourceUsage>,
}

impl ProcessSpec {
    /// A priority 0 process arriving at tick 0.
    pub fn new(lifespan: usize) -> Self {
        ProcessSpec {
            arrival: 0,
            lifespan,
            priority: 0,
            usages: vec![],
        }
    }

    pub fn arrives_at(mut self, tick: usize) -> Self {
        self.arrival = tick;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn acquire(mut self, resource: ResourceId, at: usize, duration: usize) -> Self {
        self.usages.push(ResourceUsage {
            resource,
            at,
            duration,
        });
        self
    }

    pub fn validate(&self) -> Result<(), ScenarioErrorKind> {
        if self.lifespan == 0 {
            return Err(ScenarioErrorKind::ZeroLifespan);
        }
        if !(0..MAX_PRIO).contains(&self.priority) {
            return Err(ScenarioErrorKind::PriorityOutOfRange(self.priority.into()));
        }
        for usage in &self.usages {
            if usage.resource >= NR_RESOURCES {
                return Err(ScenarioErrorKind::ResourceOutOfRange(usage.resource));
            }
            if usage.duration == 0 {
                return Err(ScenarioErrorKind::ZeroDuration);
            }
            if usage.release_at() > self.lifespan {
                return Err(ScenarioErrorKind::UsagePastLifespan {
                    release_at: usage.release_at(),
                    lifespan: self.lifespan,
                });
            }
        }
        for (index, usage) in self.usages.iter().enumerate() {
            if self.usages[index + 1..]
                .iter()
                .any(|other| usage.overlaps(other))
            {
                return Err(ScenarioErrorKind::OverlappingUsage {
                    resource: usage.resource,
                });
            }
        }
        Ok(())
    }
}

/// A named list of processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub processes: Vec<ProcessSpec>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Scenario {
            name: name.into(),
            processes: vec![],
        }
    }

    pub fn process(mut self, spec: ProcessSpec) -> Self {
        self.processes.push(spec);
        self
    }

    /// Checks every process. The error carries no line number.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for spec in &self.processes {
            spec.validate().map_err(|kind| ScenarioError { line: None, kind })?;
        }
        Ok(())
    }

    /// Parses the text format, see the module documentation.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Scenario, ScenarioError> {
        let mut scenario = Scenario::new(name);
        let mut open: Option<(usize, ProcessSpec)> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }

            let mut tokens = content.split_whitespace();
            let directive = tokens.next().unwrap_or("");
            let at_line = |kind| ScenarioError {
                line: Some(line),
                kind,
            };

            match directive {
                "process" => {
                    if let Some((start, _)) = open {
                        return Err(ScenarioError {
                            line: Some(start),
                            kind: ScenarioErrorKind::UnterminatedProcess,
                        });
                    }
                    let arrival = number(&mut tokens, "arrival").map_err(at_line)?;
                    let lifespan = number(&mut tokens, "lifespan").map_err(at_line)?;
                    let priority: i64 = number(&mut tokens, "priority").map_err(at_line)?;
                    let priority = Priority::try_from(priority)
                        .map_err(|_| at_line(ScenarioErrorKind::PriorityOutOfRange(priority)))?;
                    trailing(&mut tokens).map_err(at_line)?;
                    open = Some((
                        line,
                        ProcessSpec::new(lifespan)
                            .arrives_at(arrival)
                            .priority(priority),
                    ));
                }
                "acquire" => {
                    let Some((_, spec)) = open.as_mut() else {
                        return Err(at_line(ScenarioErrorKind::AcquireOutsideProcess));
                    };
                    let resource = number(&mut tokens, "resource").map_err(at_line)?;
                    let at = number(&mut tokens, "at").map_err(at_line)?;
                    let duration = number(&mut tokens, "duration").map_err(at_line)?;
                    trailing(&mut tokens).map_err(at_line)?;
                    spec.usages.push(ResourceUsage {
                        resource,
                        at,
                        duration,
                    });
                }
                "end" => {
                    let Some((start, spec)) = open.take() else {
                        return Err(at_line(ScenarioErrorKind::UnexpectedEnd));
                    };
                    trailing(&mut tokens).map_err(at_line)?;
                    spec.validate().map_err(|kind| ScenarioError {
                        line: Some(start),
                        kind,
                    })?;
                    scenario.processes.push(spec);
                }
                other => {
                    return Err(at_line(ScenarioErrorKind::UnknownDirective(
                        other.to_string(),
                    )))
                }
            }
        }

        match open {
            Some((start, _)) => Err(ScenarioError {
                line: Some(start),
                kind: ScenarioErrorKind::UnterminatedProcess,
            }),
            None => Ok(scenario),
        }
    }
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::parse("", s)
    }
}

fn number<'a, T, I>(tokens: &mut I, field: &'static str) -> Result<T, ScenarioErrorKind>
where
    T: FromStr,
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or(ScenarioErrorKind::MissingField(field))?;
    token
        .parse()
        .map_err(|_| ScenarioErrorKind::InvalidNumber {
            field,
            value: token.to_string(),
        })
}

fn trailing<'a, I>(tokens: &mut I) -> Result<(), ScenarioErrorKind>
where
    I: Iterator<Item = &'a str>,
{
    match tokens.next() {
        Some(token) => Err(ScenarioErrorKind::TrailingInput(token.to_string())),
        None => Ok(()),
    }
}

/// A scenario that cannot be simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioError {
    /// The offending line, for parsed scenarios.
    pub line: Option<usize>,
    pub kind: ScenarioErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioErrorKind {
    UnknownDirective(String),
    MissingField(&'static str),
    InvalidNumber { field: &'static str, value: String },
    TrailingInput(String),
    AcquireOutsideProcess,
    UnexpectedEnd,
    UnterminatedProcess,
    ZeroLifespan,
    PriorityOutOfRange(i64),
    ResourceOutOfRange(ResourceId),
    ZeroDuration,
    UsagePastLifespan { release_at: usize, lifespan: usize },
    /// The same resource is held twice at once.
    OverlappingUsage { resource: ResourceId },
}

impl Display for ScenarioErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioErrorKind::UnknownDirective(directive) => {
                write!(f, "unknown directive `{}`", directive)
            }
            ScenarioErrorKind::MissingField(field) => write!(f, "missing {}", field),
            ScenarioErrorKind::InvalidNumber { field, value } => {
                write!(f, "invalid {} `{}`", field, value)
            }
            ScenarioErrorKind::TrailingInput(token) => write!(f, "unexpected `{}`", token),
            ScenarioErrorKind::AcquireOutsideProcess => {
                write!(f, "`acquire` outside a process block")
            }
            ScenarioErrorKind::UnexpectedEnd => write!(f, "`end` without a process block"),
            ScenarioErrorKind::UnterminatedProcess => write!(f, "process block without `end`"),
            ScenarioErrorKind::ZeroLifespan => write!(f, "lifespan must be at least 1"),
            ScenarioErrorKind::PriorityOutOfRange(priority) => {
                write!(f, "priority {} outside 0..{}", priority, MAX_PRIO)
            }
            ScenarioErrorKind::ResourceOutOfRange(resource) => {
                write!(f, "resource {} outside 0..{}", resource, NR_RESOURCES)
            }
            ScenarioErrorKind::ZeroDuration => write!(f, "resource held for 0 ticks"),
            ScenarioErrorKind::UsagePastLifespan {
                release_at,
                lifespan,
            } => write!(
                f,
                "resource released at age {} but the lifespan is {}",
                release_at, lifespan
            ),
            ScenarioErrorKind::OverlappingUsage { resource } => {
                write!(f, "resource {} acquired while already held", resource)
            }
        }
    }
}

impl Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ScenarioError {}
