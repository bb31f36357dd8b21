mod error;
mod runner;
mod scenario;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use simplelog::{Config, LevelFilter, WriteLogger};

use crate::error::SimError;
use crate::runner::Runner;
use crate::scenario::Scenario;

const USAGE: &str = "usage: snapsheet-sim <scenario.json> [--log <path>] [--level <level>]";

struct Args {
    scenario: PathBuf,
    log: PathBuf,
    level: LevelFilter,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, SimError> {
        let mut scenario = None;
        let mut log = PathBuf::from("snapsheet-sim.log");
        let mut level = LevelFilter::Debug;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--log" => {
                    log = args
                        .next()
                        .map(PathBuf::from)
                        .ok_or_else(|| SimError::Usage("--log needs a path".into()))?;
                }
                "--level" => {
                    let value = args
                        .next()
                        .ok_or_else(|| SimError::Usage("--level needs a value".into()))?;
                    level = LevelFilter::from_str(&value)
                        .map_err(|_| SimError::Usage(format!("unknown log level '{value}'")))?;
                }
                "-h" | "--help" => return Err(SimError::Usage(USAGE.into())),
                _ if scenario.is_none() => scenario = Some(PathBuf::from(arg)),
                _ => return Err(SimError::Usage(format!("unexpected argument '{arg}'"))),
            }
        }

        Ok(Self {
            scenario: scenario.ok_or_else(|| SimError::Usage(USAGE.into()))?,
            log,
            level,
        })
    }
}

async fn run() -> Result<(), SimError> {
    let args = Args::parse(std::env::args().skip(1))?;

    let log_file = File::create(&args.log)?;
    if let Err(err) = WriteLogger::init(args.level, Config::default(), log_file) {
        eprintln!("logger unavailable: {err}");
    }

    let scenario = Scenario::load(&args.scenario)?;
    log::info!("[sim] loaded {}", args.scenario.display());
    Runner::new(scenario, std::io::stdout())?.run().await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, SimError> {
        Args::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_log_file_and_level() {
        let args = parse(&["drag.json"]).unwrap();
        assert_eq!(args.scenario, PathBuf::from("drag.json"));
        assert_eq!(args.log, PathBuf::from("snapsheet-sim.log"));
        assert_eq!(args.level, LevelFilter::Debug);
    }

    #[test]
    fn reads_flags() {
        let args = parse(&["--level", "trace", "drag.json", "--log", "/tmp/sim.log"]).unwrap();
        assert_eq!(args.level, LevelFilter::Trace);
        assert_eq!(args.log, PathBuf::from("/tmp/sim.log"));
    }

    #[test]
    fn rejects_missing_scenario_and_bad_level() {
        assert!(matches!(parse(&[]), Err(SimError::Usage(_))));
        assert!(matches!(parse(&["a.json", "--level", "loud"]), Err(SimError::Usage(_))));
    }
}
