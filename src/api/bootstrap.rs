//! Bootstrap stage: storage classification, flag persistence, gated start.
//!
//! Side-effects:
//! - Emits facts for `storage.probe`, `flag.write`, `service.start` and a
//!   `bootstrap.summary`.
//! - Writes the flag file only on flash detection; a fixed-disk or failed
//!   classification leaves any prior content untouched.
//! - Starts the target service only when the liveness marker exists.

use std::path::Path;
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::api::errors::{id_str, ErrorId};
use crate::api::Bootstrapper;
use crate::constants::ROOT_MOUNT_POINT;
use crate::fs::{self, DaemonArgs};
use crate::logging::audit::{new_run_id, ts_for_mode, AuditCtx, AuditMode};
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::ids::bootstrap_id;
use crate::types::{BootstrapMode, BootstrapReport, StorageClass};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Bootstrapper<E, A>,
    mode: BootstrapMode,
) -> BootstrapReport {
    let t0 = Instant::now();
    let dry = matches!(mode, BootstrapMode::DryRun);
    let bid = bootstrap_id(&api.policy);

    let ctx = AuditCtx::new(
        &api.facts,
        bid.to_string(),
        new_run_id(),
        ts_for_mode(mode),
        AuditMode { dry_run: dry },
    );
    let slog = StageLogger::new(&ctx);
    let mut report = BootstrapReport::default();

    api.audit.log(Level::Info, "bootstrap: starting");
    classify_storage(api, &slog, dry, &mut report);
    start_if_coordinated(api, &slog, dry, &mut report);

    report.duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
    let summary = slog.summary().merge(json!({
        "storage_class": report.storage,
        "flag_written": report.flag_written,
        "start_attempted": report.start_attempted,
        "service_started": report.service_started,
        "warnings": report.warnings,
        "errors": report.errors,
        "duration_ms": report.duration_ms,
    }));
    if report.errors.is_empty() {
        summary.emit_success();
    } else {
        summary.emit_failure();
    }
    report
}

/// Step 1: probe the root partition and persist the flash flag when it
/// applies. Classification failure is non-fatal by design: the install must
/// not abort just because storage type could not be determined.
fn classify_storage<E: FactsEmitter, A: AuditSink>(
    api: &Bootstrapper<E, A>,
    slog: &StageLogger<'_>,
    dry: bool,
    report: &mut BootstrapReport,
) {
    let dev = match api.inspector.partition_for(Path::new(ROOT_MOUNT_POINT)) {
        Ok(dev) => dev,
        Err(e) => {
            report
                .warnings
                .push(format!("storage type could not be determined: {e}"));
            slog.storage_probe()
                .field("error", json!(e.to_string()))
                .field("error_id", json!(id_str(ErrorId::E_PROBE)))
                .emit_warn();
            api.audit.log(
                Level::Warn,
                "unable to classify root storage; service will run with default arguments",
            );
            return;
        }
    };

    let class = dev.storage_class();
    report.storage = Some(class);
    slog.storage_probe()
        .field("device", json!(dev.name))
        .field("storage_class", json!(class))
        .emit_success();

    if class != StorageClass::Flash {
        // Deliberately leave any prior flag-file content as-is.
        return;
    }

    api.audit.log(
        Level::Info,
        "flash storage detected: requesting reduced write frequency for the event database",
    );
    if dry {
        slog.flag_write()
            .path(api.policy.flag.path.display().to_string())
            .field("skipped", json!(true))
            .emit_success();
        return;
    }
    match fs::write_daemon_args(&api.policy.flag.path, DaemonArgs { flash_memory: true }) {
        Ok(()) => {
            report.flag_written = true;
            slog.flag_write()
                .path(api.policy.flag.path.display().to_string())
                .emit_success();
        }
        Err(e) => {
            // Degrades like a failed classification: the service will start
            // with default arguments.
            report.warnings.push(format!("flag file not written: {e}"));
            slog.flag_write()
                .path(api.policy.flag.path.display().to_string())
                .field("error", json!(e.to_string()))
                .field("error_id", json!(id_str(ErrorId::E_FLAGFILE)))
                .emit_failure();
            api.audit
                .log(Level::Warn, &format!("flag file not written: {e}"));
        }
    }
}

/// Step 2: start the service only when the coordination daemon is running.
/// Without the marker the framework's own startup ordering will start it, and
/// an install-time start would be redundant or premature.
fn start_if_coordinated<E: FactsEmitter, A: AuditSink>(
    api: &Bootstrapper<E, A>,
    slog: &StageLogger<'_>,
    dry: bool,
    report: &mut BootstrapReport,
) {
    let svc = &api.policy.service;
    if !fs::liveness_marker_present(&svc.marker_path) {
        slog.service_start()
            .field("service", json!(svc.name))
            .field("skipped", json!(true))
            .field("reason", json!("coordination daemon not running"))
            .emit_success();
        api.audit.log(
            Level::Debug,
            "liveness marker absent; leaving the start to the framework sequence",
        );
        return;
    }

    report.start_attempted = true;
    if dry {
        slog.service_start()
            .field("service", json!(svc.name))
            .field("skipped", json!(true))
            .emit_success();
        return;
    }
    match api.service.start(&svc.name) {
        Ok(()) => {
            report.service_started = true;
            slog.service_start()
                .field("service", json!(svc.name))
                .emit_success();
            api.audit
                .log(Level::Info, &format!("service {} started", svc.name));
        }
        Err(e) => {
            if let crate::adapters::ServiceError::Failed(code) = e {
                report.service_exit_code = Some(code);
            }
            report.errors.push(format!("service start failed: {e}"));
            slog.service_start()
                .field("service", json!(svc.name))
                .field("error", json!(e.to_string()))
                .field("error_id", json!(id_str(ErrorId::E_SERVICE_START)))
                .emit_failure();
            api.audit
                .log(Level::Error, &format!("service start failed: {e}"));
        }
    }
}
