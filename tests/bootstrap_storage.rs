//! Storage classification behavior of the bootstrapper.

use std::path::Path;
use std::sync::{Arc, Mutex};

use log::Level;
use serde_json::Value;

use evtbox::adapters::{BlockDeviceInspector, ServiceController, ServiceError};
use evtbox::logging::{AuditSink, FactsEmitter};
use evtbox::policy::Policy;
use evtbox::types::{BlockDevice, BootstrapMode, ProbeError, StorageClass};
use evtbox::Bootstrapper;

#[derive(Clone, Default)]
struct TestEmitter {
    events: Arc<Mutex<Vec<(String, String, Value)>>>,
}
impl FactsEmitter for TestEmitter {
    fn emit(&self, _subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), decision.to_string(), fields));
    }
}

#[derive(Clone, Default)]
struct TestAudit {
    lines: Arc<Mutex<Vec<String>>>,
}
impl AuditSink for TestAudit {
    fn log(&self, _level: Level, msg: &str) {
        self.lines.lock().unwrap().push(msg.to_string());
    }
}

struct FixedInspector(Result<BlockDevice, ProbeError>);
impl BlockDeviceInspector for FixedInspector {
    fn partition_for(&self, _mount_point: &Path) -> Result<BlockDevice, ProbeError> {
        self.0.clone()
    }
}

/// Controller that must never be reached by these tests.
struct NoStart;
impl ServiceController for NoStart {
    fn start(&self, service: &str) -> Result<(), ServiceError> {
        panic!("unexpected start of {service}");
    }
}

fn partition(name: &str) -> Result<BlockDevice, ProbeError> {
    Ok(BlockDevice {
        name: name.to_string(),
        kind: "part".to_string(),
    })
}

fn sandboxed_policy(root: &Path) -> Policy {
    let policy = Policy::rooted(root);
    std::fs::create_dir_all(policy.flag.path.parent().unwrap()).unwrap();
    policy
}

#[test]
fn flash_device_writes_flag_with_exactly_the_flash_option() {
    let td = tempfile::tempdir().unwrap();
    let policy = sandboxed_policy(td.path());
    let flag_path = policy.flag.path.clone();
    let facts = TestEmitter::default();
    let audit = TestAudit::default();

    let boot = Bootstrapper::new(facts.clone(), audit.clone(), policy)
        .with_inspector(Box::new(FixedInspector(partition("mmcblk0p1"))))
        .with_controller(Box::new(NoStart));
    let report = boot.run(BootstrapMode::Commit);

    assert_eq!(report.storage, Some(StorageClass::Flash));
    assert!(report.flag_written);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        std::fs::read_to_string(&flag_path).unwrap(),
        "DAEMON_ARGS=\"--flash_memory\"\n"
    );

    let evs = facts.events.lock().unwrap();
    assert!(evs
        .iter()
        .any(|(ev, dec, f)| ev == "storage.probe" && dec == "success" && f["storage_class"] == "flash"));
    assert!(evs.iter().any(|(ev, dec, _)| ev == "flag.write" && dec == "success"));
    assert!(audit
        .lines
        .lock()
        .unwrap()
        .iter()
        .any(|l| l.contains("flash storage detected")));
}

#[test]
fn fixed_device_leaves_missing_flag_absent() {
    let td = tempfile::tempdir().unwrap();
    let policy = sandboxed_policy(td.path());
    let flag_path = policy.flag.path.clone();

    let boot = Bootstrapper::new(TestEmitter::default(), TestAudit::default(), policy)
        .with_inspector(Box::new(FixedInspector(partition("sda1"))))
        .with_controller(Box::new(NoStart));
    let report = boot.run(BootstrapMode::Commit);

    assert_eq!(report.storage, Some(StorageClass::Fixed));
    assert!(!report.flag_written);
    assert!(!flag_path.exists());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn fixed_device_leaves_prior_flag_content_untouched() {
    let td = tempfile::tempdir().unwrap();
    let policy = sandboxed_policy(td.path());
    let flag_path = policy.flag.path.clone();
    std::fs::write(&flag_path, "DAEMON_ARGS=\"--stale_option\"\n").unwrap();

    let boot = Bootstrapper::new(TestEmitter::default(), TestAudit::default(), policy)
        .with_inspector(Box::new(FixedInspector(partition("sda1"))))
        .with_controller(Box::new(NoStart));
    boot.run(BootstrapMode::Commit);

    // Current behavior by design: the non-flash path never touches the file,
    // even when it holds stale options.
    assert_eq!(
        std::fs::read_to_string(&flag_path).unwrap(),
        "DAEMON_ARGS=\"--stale_option\"\n"
    );
}

#[test]
fn probe_failure_degrades_without_aborting() {
    let td = tempfile::tempdir().unwrap();
    let policy = sandboxed_policy(td.path());
    let flag_path = policy.flag.path.clone();
    let facts = TestEmitter::default();
    let audit = TestAudit::default();

    let boot = Bootstrapper::new(facts.clone(), audit.clone(), policy)
        .with_inspector(Box::new(FixedInspector(Err(ProbeError::Unavailable(
            "lsblk exited with 1".into(),
        )))))
        .with_controller(Box::new(NoStart));
    let report = boot.run(BootstrapMode::Commit);

    assert_eq!(report.storage, None);
    assert!(!flag_path.exists());
    assert_eq!(report.exit_code(), 0);
    assert!(!report.warnings.is_empty());
    assert!(report.errors.is_empty());

    let evs = facts.events.lock().unwrap();
    assert!(evs
        .iter()
        .any(|(ev, dec, f)| ev == "storage.probe" && dec == "warn" && f["error_id"] == "E_PROBE"));
    assert!(audit
        .lines
        .lock()
        .unwrap()
        .iter()
        .any(|l| l.contains("unable to classify root storage")));
}

#[test]
fn empty_listing_degrades_the_same_way() {
    let td = tempfile::tempdir().unwrap();
    let policy = sandboxed_policy(td.path());
    let flag_path = policy.flag.path.clone();

    let boot = Bootstrapper::new(TestEmitter::default(), TestAudit::default(), policy)
        .with_inspector(Box::new(FixedInspector(Err(ProbeError::NotFound("/".into())))))
        .with_controller(Box::new(NoStart));
    let report = boot.run(BootstrapMode::Commit);

    assert_eq!(report.exit_code(), 0);
    assert!(!flag_path.exists());
}

#[test]
fn rerun_on_flash_is_idempotent() {
    let td = tempfile::tempdir().unwrap();
    let policy = sandboxed_policy(td.path());
    let flag_path = policy.flag.path.clone();

    let boot = Bootstrapper::new(TestEmitter::default(), TestAudit::default(), policy)
        .with_inspector(Box::new(FixedInspector(partition("mmcblk0p1"))))
        .with_controller(Box::new(NoStart));

    boot.run(BootstrapMode::Commit);
    let first = std::fs::read_to_string(&flag_path).unwrap();
    boot.run(BootstrapMode::Commit);
    let second = std::fs::read_to_string(&flag_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.lines().count(), 1, "overwrite, not append");
}

#[test]
fn dry_run_detects_but_writes_nothing() {
    let td = tempfile::tempdir().unwrap();
    let policy = sandboxed_policy(td.path());
    let flag_path = policy.flag.path.clone();
    let facts = TestEmitter::default();

    let boot = Bootstrapper::new(facts.clone(), TestAudit::default(), policy)
        .with_inspector(Box::new(FixedInspector(partition("mmcblk0p1"))))
        .with_controller(Box::new(NoStart));
    let report = boot.run(BootstrapMode::DryRun);

    assert_eq!(report.storage, Some(StorageClass::Flash));
    assert!(!report.flag_written);
    assert!(!flag_path.exists());

    let evs = facts.events.lock().unwrap();
    assert!(evs
        .iter()
        .any(|(ev, _, f)| ev == "flag.write" && f["skipped"] == true && f["dry_run"] == true));
}
