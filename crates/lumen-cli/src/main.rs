//! lumen: runs the harmony/rhythm engine offline and prints its events as JSON lines

mod config;
mod simulate;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use lumen_core::{Engine, SeedWindow};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: lumen [--config PATH] [--seed TEXT] [--window hour|day] \
                     [--start SECS] [--phrases N]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<String>,
    window: SeedWindow,
    start: Option<f64>,
    phrases: u32,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args {
            phrases: 4,
            ..Default::default()
        };
        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .with_context(|| format!("{flag} needs a value\n{USAGE}"))
            };
            match flag.as_str() {
                "--config" => parsed.config = Some(PathBuf::from(value()?)),
                "--seed" => parsed.seed = Some(value()?),
                "--window" => {
                    parsed.window = match value()?.as_str() {
                        "hour" => SeedWindow::Hour,
                        "day" => SeedWindow::Day,
                        other => bail!("Unknown seed window {other:?}\n{USAGE}"),
                    }
                }
                "--start" => {
                    parsed.start = Some(value()?.parse().context("--start expects seconds")?)
                }
                "--phrases" => {
                    parsed.phrases = value()?.parse().context("--phrases expects a count")?
                }
                other => bail!("Unknown argument {other:?}\n{USAGE}"),
            }
        }
        Ok(parsed)
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("lumen=debug".parse()?))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let params = config::load_params(args.config.as_deref())?;

    let start = match args.start {
        Some(start) => start,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs_f64(),
    };
    let seed = args.seed.unwrap_or_else(|| args.window.material(start));

    tracing::info!("Starting lumen with seed {:?} at t={}", seed, start);

    let mut engine: Engine = Engine::new(seed, start, params);
    let stdout = std::io::stdout();
    simulate::run(&mut engine, start, args.phrases, &mut stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&[
            "--seed", "dawn", "--start", "32", "--phrases", "8", "--window", "day",
        ])
        .unwrap();
        assert_eq!(parsed.seed.as_deref(), Some("dawn"));
        assert_eq!(parsed.start, Some(32.0));
        assert_eq!(parsed.phrases, 8);
        assert_eq!(parsed.window, SeedWindow::Day);
        assert_eq!(parsed.config, None);
    }

    #[test]
    fn test_parse_defaults_and_errors() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.phrases, 4);
        assert_eq!(parsed.window, SeedWindow::Hour);

        assert!(args(&["--phrases"]).is_err());
        assert!(args(&["--bogus"]).is_err());
        assert!(args(&["--window", "week"]).is_err());
    }
}
