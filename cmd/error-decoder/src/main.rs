//! error-decoder — turn zerror trace ids back into call-site details.
//!
//! Usage:
//!   error-decoder [--json] [--no-color] [-v] <ID>
//!   some-command | error-decoder --batch
//!
//! Log level: `-v` / `-vv`, or `ZERROR_LOG=debug`.

mod output;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use output::Renderer;

#[derive(Debug, Parser)]
#[command(name = "error-decoder", version, about = "Decode zerror trace ids")]
struct Cli {
    /// Trace id to decode
    #[arg(value_name = "ID", required_unless_present = "batch")]
    id: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Read ids from stdin, one per line
    #[arg(long, conflicts_with = "id")]
    batch: bool,

    /// Show raw record and nanosecond timestamp; repeat for debug logs
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let renderer = Renderer {
        json: cli.json,
        color: !cli.no_color,
        verbose: cli.verbose > 0,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.batch {
        let stdin = io::stdin();
        return run_batch(&renderer, stdin.lock(), &mut out);
    }

    let id = cli.id.unwrap_or_default();
    run_single(&renderer, &id, &mut out)
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 | 1 => EnvFilter::try_from_env("ZERROR_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_single<W: Write>(renderer: &Renderer, id: &str, out: &mut W) -> Result<()> {
    let id = id.trim();
    anyhow::ensure!(!id.is_empty(), "error id is empty");

    let record = zerror::decode(id).with_context(|| format!("cannot decode {:?}", id))?;
    renderer.record(out, &record)?;
    out.flush()?;
    Ok(())
}

/// Decode every non-blank line. Failures are reported inline and never
/// change the exit status.
fn run_batch<R: BufRead, W: Write>(renderer: &Renderer, input: R, out: &mut W) -> Result<()> {
    let mut count = 0usize;
    let mut failed = 0usize;

    for line in input.lines() {
        let line = line.context("reading stdin")?;
        let id = line.trim();
        if id.is_empty() {
            continue;
        }
        count += 1;

        renderer.batch_header(out, count)?;
        match zerror::decode(id) {
            Ok(record) => renderer.record(out, &record)?,
            Err(err) => {
                failed += 1;
                tracing::debug!(input = id, error = %err, "decode failed");
                renderer.failure(out, id, &err)?;
            }
        }
    }

    renderer.batch_summary(out, count, failed)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn plain() -> Renderer {
        Renderer {
            json: false,
            color: false,
            verbose: false,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn single_decodes() {
        let id = zerror::codec::generate();
        let mut out = Vec::new();
        run_single(&plain(), id.as_str(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Process:"), "{}", text);
    }

    #[test]
    fn single_rejects_garbage() {
        let mut out = Vec::new();
        assert!(run_single(&plain(), "!!!", &mut out).is_err());
        assert!(run_single(&plain(), "   ", &mut out).is_err());
    }

    #[test]
    fn batch_skips_blank_lines_and_keeps_going() {
        let good = zerror::codec::generate();
        let input = format!("\n{}\nnot-an-id\n\n", good);
        let mut out = Vec::new();
        run_batch(&plain(), input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("#1"), "{}", text);
        assert!(text.contains("#2"), "{}", text);
        assert!(!text.contains("#3"), "{}", text);
        assert!(text.contains("2 ids, 1 failed"), "{}", text);
    }
}
