//! Text and JSON rendering of decoded records.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use zerror::{DebugRecord, DecodeError, RecordKind};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";

/// JSON shape of one decoded id.
#[derive(Debug, Serialize)]
struct RecordJson<'a> {
    #[serde(flatten)]
    record: &'a DebugRecord,
    human_time: String,
}

#[derive(Debug, Serialize)]
struct FailureJson<'a> {
    input: &'a str,
    error: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub json: bool,
    pub color: bool,
    pub verbose: bool,
}

impl Renderer {
    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn field<W: Write>(&self, out: &mut W, label: &str, color: &str, value: &str) -> Result<()> {
        writeln!(out, "{} {}", self.paint(BOLD, label), self.paint(color, value))?;
        Ok(())
    }

    pub fn record<W: Write>(&self, out: &mut W, record: &DebugRecord) -> Result<()> {
        if self.json {
            return self.record_json(out, record);
        }

        writeln!(out, "{}", self.paint(CYAN, "Trace id"))?;
        writeln!(out, "{}", "=".repeat(50))?;

        match record.kind {
            RecordKind::Full => {
                self.field(out, "Function:", YELLOW, &record.function)?;
                let location = format!("{}:{}", record.file, record.line);
                self.field(out, "Location:", CYAN, &location)?;
            }
            RecordKind::Fallback => {
                self.field(out, "Kind:    ", YELLOW, "fallback (call site was unavailable)")?;
            }
        }

        let time = format!("{} UTC", record.time_formatted());
        self.field(out, "Time:    ", MAGENTA, &time)?;
        if record.kind == RecordKind::Full {
            self.field(out, "Thread:  ", BLUE, &record.thread_id.to_string())?;
        }
        self.field(out, "Process: ", BLUE, &record.process_id.to_string())?;
        self.field(out, "Random:  ", GREEN, &record.random_suffix)?;

        if self.verbose {
            writeln!(out)?;
            self.field(out, "Timestamp (ns):", BLUE, &record.timestamp_ns.to_string())?;
            self.field(out, "Raw:           ", GREEN, &record.raw)?;
        }
        Ok(())
    }

    fn record_json<W: Write>(&self, out: &mut W, record: &DebugRecord) -> Result<()> {
        let json = RecordJson {
            record,
            human_time: record.time_formatted(),
        };
        serde_json::to_writer_pretty(&mut *out, &json)?;
        writeln!(out)?;
        Ok(())
    }

    pub fn failure<W: Write>(&self, out: &mut W, input: &str, err: &DecodeError) -> Result<()> {
        if self.json {
            let json = FailureJson {
                input,
                error: err.to_string(),
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", self.paint(RED, &format!("cannot decode: {}", err)))?;
        }
        Ok(())
    }

    pub fn batch_header<W: Write>(&self, out: &mut W, n: usize) -> Result<()> {
        if !self.json {
            if n > 1 {
                writeln!(out)?;
            }
            writeln!(out, "{}", self.paint(YELLOW, &format!("=== #{} ===", n)))?;
        }
        Ok(())
    }

    pub fn batch_summary<W: Write>(&self, out: &mut W, count: usize, failed: usize) -> Result<()> {
        if self.json {
            return Ok(());
        }
        writeln!(out)?;
        let summary = if count == 0 {
            self.paint(YELLOW, "no ids received")
        } else {
            self.paint(GREEN, &format!("{} ids, {} failed", count, failed))
        };
        writeln!(out, "{}", summary)?;
        Ok(())
    }
}
