use core::module_path;
use function_name::named;
use pretty_assertions::assert_eq;
use processor::{Event, ProcessSpec, Scenario};
use scheduler::{priority, round_robin};

use super::{holders, pids, run};

fn folder() -> &'static str {
    module_path!().split("::").last().unwrap()
}

#[test]
#[named]
pub fn waiters_are_served_in_arrival_order() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(4).acquire(0, 0, 3))
        .process(ProcessSpec::new(2).acquire(0, 0, 1))
        .process(ProcessSpec::new(2).acquire(0, 0, 1));

    let logs = run(round_robin(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 1, 1, 2, 1, 3, 2, 3]);
    assert_eq!(holders(&logs, 0), vec![1, 2, 3]);
}

#[test]
#[named]
pub fn blocked_process_is_replaced_in_the_same_tick() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(4).acquire(0, 0, 3))
        .process(ProcessSpec::new(2).acquire(0, 0, 1))
        .process(ProcessSpec::new(2).acquire(0, 0, 1));

    let logs = run(round_robin(), folder(), &scenario);

    let pid = |n| scheduler::Pid::new(n);
    assert_eq!(
        logs[1].events,
        vec![
            Event::Blocked {
                pid: pid(2),
                resource: 0
            },
            Event::Blocked {
                pid: pid(3),
                resource: 0
            },
        ]
    );
    assert_eq!(logs[1].decision, scheduler::SchedulingDecision::Run(pid(1)));
}

#[test]
#[named]
pub fn fcfs_wakes_regardless_of_priority() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(4).acquire(0, 0, 3))
        .process(
            ProcessSpec::new(1)
                .arrives_at(1)
                .priority(2)
                .acquire(0, 0, 1),
        )
        .process(
            ProcessSpec::new(1)
                .arrives_at(2)
                .priority(5)
                .acquire(0, 0, 1),
        );

    let logs = run(priority(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 1, 1, 2, 3, 1]);
    assert_eq!(holders(&logs, 0), vec![1, 2, 3]);
}

#[test]
#[named]
pub fn resources_are_independent() {
    let scenario = Scenario::new(function_name!())
        .process(ProcessSpec::new(2).acquire(0, 0, 2))
        .process(ProcessSpec::new(2).acquire(1, 0, 2));

    let logs = run(round_robin(), folder(), &scenario);

    assert_eq!(pids(&logs), vec![1, 2, 1, 2]);
    assert_eq!(holders(&logs, 0), vec![1]);
    assert_eq!(holders(&logs, 1), vec![2]);
}
