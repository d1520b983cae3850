use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

use hll_distinct::registers::{MAX_PRECISION, MIN_PRECISION};
use hll_distinct::report::{measure_estimate, measure_exact, Comparison, ProcessMemory};
use hll_distinct::{CorrectionDomain, EstimationPolicy, Result};
use tracing::{error, info};

const USAGE: &str =
    "usage: hll-compare [INPUT] [-p PRECISION] [--policy raw|corrected] [--domain 32|64]";

struct Config {
    input: String,
    precision: u8,
    policy: EstimationPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: "input.txt".to_string(),
            precision: 16,
            policy: EstimationPolicy::default(),
        }
    }
}

fn parse_args(args: &[String]) -> std::result::Result<Config, String> {
    let mut cfg = Config::default();
    let mut raw = false;
    let mut domain = CorrectionDomain::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-p" | "--precision" => {
                let value = iter.next().ok_or("missing precision value")?;
                cfg.precision = value
                    .parse::<u8>()
                    .ok()
                    .filter(|p| (MIN_PRECISION..=MAX_PRECISION).contains(p))
                    .ok_or_else(|| {
                        format!(
                            "invalid precision '{}': must be in [{}..={}]",
                            value, MIN_PRECISION, MAX_PRECISION
                        )
                    })?;
            }
            "--policy" => {
                let value = iter.next().ok_or("missing policy value")?;
                match value.parse::<EstimationPolicy>().map_err(|e| e.to_string())? {
                    EstimationPolicy::Raw(_) => raw = true,
                    EstimationPolicy::Corrected(policy) => {
                        raw = false;
                        domain = policy.domain;
                    }
                }
            }
            "--domain" => {
                let value = iter.next().ok_or("missing domain value")?;
                domain = value.parse().map_err(|e: hll_distinct::Error| e.to_string())?;
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
            input => cfg.input = input.to_string(),
        }
    }
    cfg.policy = if raw {
        EstimationPolicy::raw()
    } else {
        EstimationPolicy::corrected(domain)
    };
    Ok(cfg)
}

fn run(cfg: &Config) -> Result<Comparison> {
    info!(input = %cfg.input, precision = cfg.precision, policy = %cfg.policy, "starting comparison");
    let exact = measure_exact(BufReader::new(File::open(&cfg.input)?), &ProcessMemory)?;
    let estimate = measure_estimate(
        BufReader::new(File::open(&cfg.input)?),
        cfg.precision,
        cfg.policy,
        &ProcessMemory,
    )?;
    Ok(Comparison { exact, estimate })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = match parse_args(&args) {
        Ok(cfg) => cfg,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(&cfg) {
        Ok(comparison) => {
            println!("{}", comparison);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("comparison of {} failed: {}", cfg.input, e);
            ExitCode::FAILURE
        }
    }
}
