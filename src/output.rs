use std::io::{self, Write};

use camino::Utf8Path;
use serde::Serialize;

use crate::app::{BatchResult, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

/// Prints every progress message on its own stdout line.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn event(&self, event: ProgressEvent) {
        println!("{}", event.message);
    }
}

impl ConsoleProgress {
    pub fn print_done(result: &BatchResult, output: &Utf8Path) {
        println!(
            "Fetched {} of {} records ({} failed)",
            result.succeeded,
            result.total(),
            result.failed
        );
        println!("\nDone! Results saved to {output}");
    }
}

#[derive(Debug, Serialize)]
struct BatchSummary<'a> {
    output: &'a str,
    total: usize,
    succeeded: usize,
    failed: usize,
    started_at: &'a str,
    finished_at: &'a str,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_batch(result: &BatchResult, output: &Utf8Path) -> io::Result<()> {
        Self::print_json(&BatchSummary {
            output: output.as_str(),
            total: result.total(),
            succeeded: result.succeeded,
            failed: result.failed,
            started_at: &result.started_at,
            finished_at: &result.finished_at,
        })
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
