use core::module_path;
use function_name::named;
use pretty_assertions::assert_eq;
use processor::{outcome, run_trace, ProcessSpec, Processor, Scenario};
use scheduler::{Policy, ProcessState, SchedulingDecision};

use super::{pids, run};

fn folder() -> &'static str {
    module_path!().split("::").last().unwrap()
}

/// Every process holds at most one resource at a time, so no policy can
/// deadlock on it.
fn mixed(name: &str) -> Scenario {
    Scenario::new(name)
        .process(ProcessSpec::new(5).priority(1).acquire(0, 1, 3))
        .process(
            ProcessSpec::new(3)
                .arrives_at(1)
                .priority(8)
                .acquire(0, 0, 2),
        )
        .process(ProcessSpec::new(2).arrives_at(2).priority(4))
        .process(
            ProcessSpec::new(2)
                .arrives_at(6)
                .priority(2)
                .acquire(1, 0, 2),
        )
}

#[test]
#[named]
pub fn every_policy_runs_every_process_to_completion() {
    let scenario = mixed(function_name!());

    for policy in Policy::ALL {
        let logs = run(policy, folder(), &scenario);
        assert_eq!(outcome(&logs), Some(SchedulingDecision::Done), "{}", policy);

        let trace = pids(&logs);
        for (index, spec) in scenario.processes.iter().enumerate() {
            let ran = trace.iter().filter(|&&pid| pid == index + 1).count();
            assert_eq!(ran, spec.lifespan, "{}: process {}", policy, index + 1);
        }

        let last = logs.last().unwrap();
        for process in last.processes.values() {
            assert_eq!(process.state, ProcessState::Exited, "{}", policy);
            assert_eq!(process.age, process.lifespan, "{}", policy);
            assert_eq!(process.priority, process.priority_original, "{}", policy);
        }
    }
}

#[test]
#[named]
pub fn simulation_is_deterministic() {
    let scenario = mixed(function_name!());

    for policy in Policy::ALL {
        let first = Processor::run(policy, &scenario).unwrap();
        let second = Processor::run(policy, &scenario).unwrap();
        assert_eq!(first, second, "{}", policy);
    }
}

#[test]
#[named]
pub fn processes_never_run_before_arrival() {
    let scenario = mixed(function_name!());

    for policy in Policy::ALL {
        let logs = run(policy, folder(), &scenario);
        for (tick, pid) in run_trace(&logs).into_iter().enumerate() {
            if let Some(pid) = pid {
                let arrival = scenario.processes[pid.get() - 1].arrival;
                assert!(arrival <= tick, "{}: {} ran at {}", policy, pid, tick);
            }
        }
    }
}

#[test]
#[named]
pub fn halts_after_the_tick_limit() {
    let scenario = Scenario::new(function_name!()).process(ProcessSpec::new(10));

    let logs = Processor::new(Policy::RoundRobin, &scenario)
        .with_max_ticks(3)
        .simulate()
        .unwrap();

    assert_eq!(pids(&logs), vec![1, 1, 1]);
    assert_eq!(outcome(&logs), Some(SchedulingDecision::Halted));
}
