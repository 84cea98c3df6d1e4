//! Stable error identifiers and exit codes for bootstrap facts.

// Kept SCREAMING_SNAKE_CASE to match the IDs emitted in fact streams.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
pub enum ErrorId {
    /// Storage classification failed; degraded path, never an exit status.
    E_PROBE,
    /// The flag file could not be written.
    E_FLAGFILE,
    /// The service manager reported a failed start.
    E_SERVICE_START,
    E_GENERIC,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_PROBE => "E_PROBE",
        ErrorId::E_FLAGFILE => "E_FLAGFILE",
        ErrorId::E_SERVICE_START => "E_SERVICE_START",
        ErrorId::E_GENERIC => "E_GENERIC",
    }
}

/// Fallback exit codes per error category. The service-start path prefers the
/// service manager's own status when it has one.
#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_PROBE => 10,
        ErrorId::E_FLAGFILE => 20,
        ErrorId::E_SERVICE_START => 30,
        ErrorId::E_GENERIC => 1,
    }
}
