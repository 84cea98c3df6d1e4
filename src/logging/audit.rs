// Audit helpers that emit structured facts across bootstrap stages.
//
// Every fact carries a minimal envelope: `schema_version`, `ts`,
// `bootstrap_id`, `run_id`, `dry_run`. Dry runs use the zero timestamp so
// their fact streams compare stable across executions.
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::logging::FactsEmitter;
use crate::types::BootstrapMode;

pub(crate) const SCHEMA_VERSION: i64 = 1;

/// Zero timestamp used for dry-run facts.
pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

/// Current UTC time in RFC 3339, or the zero timestamp if formatting fails.
#[must_use]
pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

/// Envelope timestamp for a run: real time in Commit, zero in DryRun.
#[must_use]
pub fn ts_for_mode(mode: BootstrapMode) -> String {
    match mode {
        BootstrapMode::DryRun => TS_ZERO.to_string(),
        BootstrapMode::Commit => now_iso(),
    }
}

/// Fresh per-run identifier.
#[must_use]
pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone, Debug, Default)]
pub(crate) struct AuditMode {
    pub dry_run: bool,
}

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub bootstrap_id: String,
    pub run_id: String,
    pub ts: String,
    pub mode: AuditMode,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(
        facts: &'a dyn FactsEmitter,
        bootstrap_id: String,
        run_id: String,
        ts: String,
        mode: AuditMode,
    ) -> Self {
        Self {
            facts,
            bootstrap_id,
            run_id,
            ts,
            mode,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    StorageProbe,
    FlagWrite,
    ServiceStart,
    Summary,
}

impl Stage {
    fn as_event(self) -> &'static str {
        match self {
            Stage::StorageProbe => "storage.probe",
            Stage::FlagWrite => "flag.write",
            Stage::ServiceStart => "service.start",
            Stage::Summary => "bootstrap.summary",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over fact emission with a centralized envelope.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn storage_probe(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::StorageProbe)
    }
    pub fn flag_write(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::FlagWrite)
    }
    pub fn service_start(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ServiceStart)
    }
    pub fn summary(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Summary)
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.fields.insert("path".into(), json!(path.into()));
        self
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn merge(mut self, extra: Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj.iter() {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("decision").or_insert(json!(decision.as_str()));
            obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
            obj.entry("ts").or_insert(json!(self.ctx.ts));
            obj.entry("bootstrap_id")
                .or_insert(json!(self.ctx.bootstrap_id));
            obj.entry("run_id").or_insert(json!(self.ctx.run_id));
            obj.entry("dry_run").or_insert(json!(self.ctx.mode.dry_run));
        }
        self.ctx
            .facts
            .emit("evtbox", self.stage.as_event(), decision.as_str(), fields);
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success);
    }
    pub fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
    pub fn emit_warn(self) {
        self.emit(Decision::Warn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<(String, String, Value)>>>,
    }
    impl FactsEmitter for Capture {
        fn emit(&self, _subsystem: &str, event: &str, decision: &str, fields: Value) {
            self.events
                .lock()
                .unwrap()
                .push((event.into(), decision.into(), fields));
        }
    }

    #[test]
    fn envelope_is_stamped_on_every_fact() {
        let facts = Capture::default();
        let ctx = AuditCtx::new(
            &facts,
            "bid".into(),
            "rid".into(),
            TS_ZERO.into(),
            AuditMode { dry_run: true },
        );
        StageLogger::new(&ctx)
            .storage_probe()
            .field("device", json!("mmcblk0p1"))
            .emit_success();

        let evs = facts.events.lock().unwrap();
        let (event, decision, fields) = &evs[0];
        assert_eq!(event, "storage.probe");
        assert_eq!(decision, "success");
        assert_eq!(fields["bootstrap_id"], "bid");
        assert_eq!(fields["run_id"], "rid");
        assert_eq!(fields["ts"], TS_ZERO);
        assert_eq!(fields["dry_run"], true);
        assert_eq!(fields["schema_version"], 1);
        assert_eq!(fields["device"], "mmcblk0p1");
    }
}
