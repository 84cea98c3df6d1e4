use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use log::Level;
use serde_json::{json, Value};

/// Receives structured per-stage facts. Implementations decide where the JSON
/// goes (a JSONL file, a collector, nowhere).
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Receives human-readable diagnostics alongside the structured facts.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Default sink discarding both channels.
#[derive(Default)]
pub struct NullSink;

impl FactsEmitter for NullSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for NullSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Fact sink appending one JSON object per line to a file.
pub struct JsonlSink {
    out: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl FactsEmitter for JsonlSink {
    fn emit(&self, subsystem: &str, _event: &str, _decision: &str, fields: Value) {
        // The envelope already carries stage and decision; only the subsystem
        // needs adding.
        let mut record = fields;
        if let Some(obj) = record.as_object_mut() {
            obj.insert("subsystem".to_string(), json!(subsystem));
        }
        if let Ok(mut out) = self.out.lock() {
            let _ = serde_json::to_writer(&mut *out, &record);
            let _ = out.write_all(b"\n");
            let _ = out.flush();
        }
    }
}
