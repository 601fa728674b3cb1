use core::module_path;
use function_name::named;
use pretty_assertions::assert_eq;
use processor::{outcome, ProcessSpec, Scenario};
use scheduler::{fifo, priority, round_robin, sjf, srtf, SchedulingDecision};

use super::{pids, run};

fn folder() -> &'static str {
    module_path!().split("::").last().unwrap()
}

#[test]
#[named]
pub fn fifo_runs_to_completion() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(2))
        .process(ProcessSpec::new(1))
        .process(ProcessSpec::new(2).arrives_at(1));

    let logs = run(fifo(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 1, 2, 3, 3]);
    assert_eq!(outcome(&logs), Some(SchedulingDecision::Done));
}

#[test]
#[named]
pub fn idle_between_arrivals() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(1))
        .process(ProcessSpec::new(1).arrives_at(3));

    let logs = run(fifo(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 0, 0, 2]);
}

#[test]
#[named]
pub fn sjf_does_not_preempt() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(4))
        .process(ProcessSpec::new(1).arrives_at(1));

    let logs = run(sjf(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 1, 1, 1, 2]);
}

#[test]
#[named]
pub fn sjf_picks_the_shortest_ready_job() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(3))
        .process(ProcessSpec::new(2))
        .process(ProcessSpec::new(1));

    let logs = run(sjf(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![3, 2, 2, 1, 1, 1]);
}

#[test]
#[named]
pub fn srtf_preempts_for_a_shorter_arrival() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(4))
        .process(ProcessSpec::new(1).arrives_at(1));

    let logs = run(srtf(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 2, 1, 1, 1]);
}

#[test]
#[named]
pub fn round_robin_rotates_every_tick() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(3))
        .process(ProcessSpec::new(3))
        .process(ProcessSpec::new(3));

    let logs = run(round_robin(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
}

#[test]
#[named]
pub fn round_robin_skips_exited_processes() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(1))
        .process(ProcessSpec::new(3));

    let logs = run(round_robin(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 2, 2, 2]);
}

#[test]
#[named]
pub fn priority_preempts_for_a_higher_arrival() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(2).priority(1))
        .process(ProcessSpec::new(2).arrives_at(1).priority(5));

    let logs = run(priority(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 2, 2, 1]);
}

#[test]
#[named]
pub fn equal_priorities_rotate() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(2).priority(3))
        .process(ProcessSpec::new(2).priority(3));

    let logs = run(priority(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 2, 1, 2]);
}
