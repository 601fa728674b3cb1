use std::fs;

use anyhow::{Context, Result};
use log::info;
use processor::{format_logs, outcome, run_trace, ProcessSpec, Processor, Scenario};
use scheduler::Scheduler;

mod config;

use config::Config;

/// A low priority process holds a resource that a high priority process
/// needs, while a medium priority process competes for the CPU.
fn demo() -> Scenario {
    Scenario::new("demo")
        .process(ProcessSpec::new(5).priority(1).acquire(0, 0, 4))
        .process(
            ProcessSpec::new(2)
                .arrives_at(1)
                .priority(10)
                .acquire(0, 0, 1),
        )
        .process(ProcessSpec::new(3).arrives_at(1).priority(5))
}

fn load_scenario(config: &Config) -> Result<Scenario> {
    let Some(path) = &config.scenario else {
        return Ok(demo());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read scenario {}", path.display()))?;
    Scenario::parse(path.display().to_string(), &text)
        .with_context(|| format!("invalid scenario {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let scenario = load_scenario(&config)?;
    scenario
        .validate()
        .with_context(|| format!("invalid scenario {}", scenario.name))?;
    info!("loaded scenario {}", scenario.name);

    let logs = Processor::new(config.policy, &scenario)
        .with_max_ticks(config.max_ticks)
        .simulate()
        .with_context(|| format!("{} cannot start", config.policy.name()))?;

    if !config.quiet {
        println!("{}", format_logs(&logs));
    }

    let trace: Vec<String> = run_trace(&logs)
        .into_iter()
        .map(|pid| pid.map_or("-".to_string(), |pid| pid.to_string()))
        .collect();
    println!("Policy: {}", config.policy);
    println!("Trace: {}", trace.join(" "));
    if let Some(last) = outcome(&logs) {
        println!("Outcome: {}", last);
    }

    Ok(())
}

// Do not delete this line
#[cfg(test)]
mod tests;
