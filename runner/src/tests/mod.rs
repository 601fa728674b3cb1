use std::env;
use std::fs;

use processor::{format_logs, run_trace, Event, Log, Processor, Scenario};
use scheduler::{Policy, Scheduler};

mod invariants;
mod resources;
mod simple;

fn write_logs(policy: Policy, folder: &str, name: &str, logs: &str) {
    let folder = format!("../outputs/{}/{folder}", policy.key());
    fs::create_dir_all(&folder).unwrap();
    fs::write(format!("{folder}/{name}.log"), logs).unwrap();
}

/// Simulates `scenario` under `policy`. With `WRITE_OUTPUT` set, the
/// formatted logs are kept under `outputs/<policy>/<folder>/`.
fn run(policy: Policy, folder: &str, scenario: &Scenario) -> Vec<Log> {
    scenario.validate().unwrap();
    let logs = Processor::run(policy, scenario).unwrap();

    if env::var("WRITE_OUTPUT").is_ok() {
        println!("{} under {}", scenario.name, policy.name());
        write_logs(policy, folder, &scenario.name, &format_logs(&logs));
    }
    logs
}

/// The PID that ran at each tick, 0 for idle ticks.
fn pids(logs: &[Log]) -> Vec<usize> {
    run_trace(logs)
        .into_iter()
        .map(|pid| pid.map_or(0, |pid| pid.get()))
        .collect()
}

/// The processes that obtained `resource`, in order.
fn holders(logs: &[Log], resource: usize) -> Vec<usize> {
    logs.iter()
        .flat_map(|log| log.events.iter())
        .filter_map(|event| match *event {
            Event::Acquired { pid, resource: r } if r == resource => Some(pid.get()),
            _ => None,
        })
        .collect()
}

/// The current priority of every process, by PID.
fn priorities(log: &Log) -> Vec<i8> {
    log.processes.values().map(|process| process.priority).collect()
}
