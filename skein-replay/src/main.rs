//! Replays a recorded event log through the spec reporter.
//!
//! The log holds one JSON event per line, e.g.
//! `{"event":"test:pass","cid":"0-0","title":"works"}`. Blank lines are skipped.

use anyhow::Context;
use async_std::task::block_on;
use clap::{App, Arg};
use skein::{Event, Skein};
use std::fs;
use std::io::{self, Read};
use std::process::exit;
use tracing::{debug, error};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn parse_events(text: &str) -> anyhow::Result<Vec<Event>> {
    let mut events = vec![];
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(line)
            .with_context(|| format!("Invalid event on line {}", n + 1))?;
        events.push(event);
    }
    Ok(events)
}

fn read_log(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Could not read events from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Could not read {}", path))
}

fn run() -> anyhow::Result<()> {
    let app = App::new("skein-replay")
        .about("Print a spec-style report for a recorded test event log")
        .arg(
            Arg::with_name("events")
                .required(true)
                .value_name("EVENTS")
                .help("JSON-lines event log, or - for stdin"),
        );

    let skein = Skein::builder().build_with_app_from(app, std::env::args_os())?;
    let path = skein.options().opts.value_of("events").unwrap_or("-");

    let events = parse_events(&read_log(path)?)?;
    debug!(count = events.len(), path, "replaying");
    block_on(skein.replay(events))
}

fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(e) = run() {
        if let Some(e) = e.downcast_ref::<clap::Error>() {
            e.exit();
        }
        error!("replay failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}
