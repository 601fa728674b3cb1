use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use scheduler::Policy;

const DEFAULT_MAX_TICKS: usize = 1000;

/// What to simulate and how to report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub policy: Policy,
    /// A scenario file, the built-in demo when missing.
    pub scenario: Option<PathBuf>,
    pub max_ticks: usize,
    /// Print only the summary, not every tick.
    pub quiet: bool,
}

impl Config {
    /// Reads `POLICY`, `SCENARIO`, `MAX_TICKS` and `QUIET`, then lets the
    /// command line `[-q] [policy] [scenario-file]` override them.
    pub fn from_env() -> Result<Config> {
        Config::load(|key| env::var(key).ok(), env::args().skip(1))
    }

    fn load<F, I>(var: F, args: I) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = String>,
    {
        let policy = match var("POLICY") {
            Some(value) => parse_policy(&value)?,
            None => Policy::Fifo,
        };
        let max_ticks = match var("MAX_TICKS") {
            Some(value) => value
                .parse::<usize>()
                .with_context(|| format!("MAX_TICKS={} is not a tick count", value))?,
            None => DEFAULT_MAX_TICKS,
        };

        let mut config = Config {
            policy,
            scenario: var("SCENARIO").map(PathBuf::from),
            max_ticks,
            quiet: var("QUIET").is_some(),
        };

        let mut positional = 0;
        for arg in args {
            match (arg.as_str(), positional) {
                ("-q" | "--quiet", _) => config.quiet = true,
                (flag, _) if flag.starts_with('-') => bail!("unknown option {}", flag),
                (policy, 0) => {
                    config.policy = parse_policy(policy)?;
                    positional += 1;
                }
                (path, 1) => {
                    config.scenario = Some(PathBuf::from(path));
                    positional += 1;
                }
                (extra, _) => bail!("unexpected argument {}", extra),
            }
        }

        Ok(config)
    }
}

fn parse_policy(value: &str) -> Result<Policy> {
    value.parse::<Policy>().with_context(|| {
        let keys: Vec<_> = Policy::ALL.iter().map(|policy| policy.key()).collect();
        format!("expected one of {}", keys.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], args: &[&str]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::load(
            |key| vars.get(key).cloned(),
            args.iter().map(|arg| arg.to_string()),
        )
    }

    #[test]
    fn defaults() {
        assert_eq!(
            load(&[], &[]).unwrap(),
            Config {
                policy: Policy::Fifo,
                scenario: None,
                max_ticks: DEFAULT_MAX_TICKS,
                quiet: false,
            }
        );
    }

    #[test]
    fn arguments_override_the_environment() {
        let config = load(
            &[("POLICY", "rr"), ("SCENARIO", "a.txt"), ("MAX_TICKS", "50")],
            &["-q", "pip", "b.txt"],
        )
        .unwrap();

        assert_eq!(config.policy, Policy::PriorityInheritance);
        assert_eq!(config.scenario, Some(PathBuf::from("b.txt")));
        assert_eq!(config.max_ticks, 50);
        assert!(config.quiet);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(load(&[("POLICY", "lottery")], &[]).is_err());
        assert!(load(&[("MAX_TICKS", "soon")], &[]).is_err());
        assert!(load(&[], &["--verbose"]).is_err());
        assert!(load(&[], &["fifo", "a.txt", "b.txt"]).is_err());
    }
}
