pub mod audit;
pub mod facts;

pub use audit::{new_run_id, ts_for_mode, Decision, EventBuilder, Stage, StageLogger, TS_ZERO};
pub use facts::{AuditSink, FactsEmitter, JsonlSink, NullSink};
