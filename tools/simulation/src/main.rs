//! `vault-sim`: run a vault scenario and print the JSON report.
//!
//! ```text
//! vault-sim <scenario.json>
//! vault-sim --generate <seed> [steps]
//! ```
//!
//! `VAULT_WITHDRAW_LIMIT` / `VAULT_BANK_CAP` override the scenario's config.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vault_simulation::engine::run_scenario;
use vault_simulation::export::export_json;
use vault_simulation::scenario::Scenario;
use vault_simulation::workload::{generate, WorkloadConfig};

const USAGE: &str = "usage: vault-sim <scenario.json> | vault-sim --generate <seed> [steps]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(PathBuf),
    Generate { seed: u64, steps: Option<usize> },
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args {
        [flag, rest @ ..] if flag == "--generate" => {
            let (seed, steps) = match rest {
                [seed] => (seed, None),
                [seed, steps] => (seed, Some(steps)),
                _ => bail!(USAGE),
            };
            let seed = seed.parse::<u64>().context("seed must be an unsigned integer")?;
            let steps = steps
                .map(|s| s.parse::<usize>().context("steps must be an unsigned integer"))
                .transpose()?;
            Ok(Command::Generate { seed, steps })
        }
        [path] if !path.starts_with("--") => Ok(Command::Run(PathBuf::from(path))),
        _ => bail!(USAGE),
    }
}

fn load_scenario(command: Command) -> Result<Scenario> {
    match command {
        Command::Run(path) => Scenario::from_file(&path)
            .with_context(|| format!("failed to load scenario {}", path.display())),
        Command::Generate { seed, steps } => {
            let mut config = WorkloadConfig::default();
            if let Some(steps) = steps {
                config.steps = steps;
            }
            info!(seed, steps = config.steps, "Generating workload");
            Ok(generate(config, seed))
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let scenario = load_scenario(parse_args(&args)?)?;

    let config = scenario
        .config
        .clone()
        .with_env_overrides()
        .context("invalid vault configuration")?;
    let scenario = Scenario { config, ..scenario };

    let report = run_scenario(&scenario)?;
    println!("{}", export_json(&report)?);

    if !report.replay.matches() {
        warn!(replay = ?report.replay, "Event log does not reproduce ledger");
        bail!("event replay diverged from ledger state");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_scenario_path() {
        assert_eq!(
            parse_args(&args(&["scenarios/reference.json"])).unwrap(),
            Command::Run(PathBuf::from("scenarios/reference.json"))
        );
    }

    #[test]
    fn test_parse_generate() {
        assert_eq!(
            parse_args(&args(&["--generate", "42"])).unwrap(),
            Command::Generate {
                seed: 42,
                steps: None
            }
        );
        assert_eq!(
            parse_args(&args(&["--generate", "7", "500"])).unwrap(),
            Command::Generate {
                seed: 7,
                steps: Some(500)
            }
        );
    }

    #[test]
    fn test_parse_bad_numbers() {
        let err = parse_args(&args(&["--generate", "-1"])).unwrap_err();
        assert!(err.to_string().contains("seed"));

        let err = parse_args(&args(&["--generate", "1", "many"])).unwrap_err();
        assert!(err.to_string().contains("steps"));
    }

    #[test]
    fn test_parse_usage_errors() {
        for raw in [
            &[][..],
            &["a.json", "b.json"][..],
            &["--generate"][..],
            &["--generate", "1", "2", "3"][..],
            &["--verbose"][..],
        ] {
            let err = parse_args(&args(raw)).unwrap_err();
            assert_eq!(err.to_string(), USAGE);
        }
    }

    #[test]
    fn test_load_generated_scenario() {
        let scenario = load_scenario(Command::Generate {
            seed: 3,
            steps: Some(25),
        })
        .unwrap();
        assert_eq!(scenario.steps.len(), 25);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_scenario(Command::Run(PathBuf::from("/nonexistent.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent.json"));
    }
}
