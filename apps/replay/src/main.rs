//! Replays scripted page activity through the console interceptor.
//!
//! Usage: `consolerelay-replay [--config <path>] [script]`
//!
//! Reads the script from the given path, or stdin when omitted or `-`.
//! Relayed messages go to stdout as JSON lines; logs go to stderr.

mod config;
mod script;

use std::cell::RefCell;
use std::io::BufRead;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;

use crate::config::ReplayConfig;

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().context("--config requires a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "-" => parsed.script = None,
                other if other.starts_with('-') => bail!("unknown option: {other}"),
                other => {
                    if parsed.script.is_some() {
                        bail!("only one script may be given");
                    }
                    parsed.script = Some(PathBuf::from(other));
                }
            }
        }
        Ok(parsed)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = ReplayConfig::load(args.config.as_deref())?;

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            Box::new(std::io::BufReader::new(file))
        }
        None => Box::new(std::io::stdin().lock()),
    };

    let stats = script::run(&config, input, Rc::new(RefCell::new(std::io::stdout())))?;
    tracing::info!(
        relayed = stats.relayed,
        failed = stats.failed,
        undelivered = stats.undelivered,
        suppressed = stats.suppressed,
        "replay finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_config_and_script() {
        let args = parse(&["--config", "relay.toml", "steps.jsonl"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("relay.toml")));
        assert_eq!(args.script, Some(PathBuf::from("steps.jsonl")));
    }

    #[test]
    fn dash_means_stdin() {
        assert_eq!(parse(&["-"]).unwrap(), Args::default());
    }

    #[test]
    fn rejects_unknown_options() {
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["a.jsonl", "b.jsonl"]).is_err());
    }
}
