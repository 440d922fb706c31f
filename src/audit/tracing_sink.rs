//! Audit sink backed by `tracing`.
//!
//! Records are emitted as structured events on the [`AUDIT_TARGET`] target,
//! so a subscriber can route the audit channel separately from the rest of
//! the application's logs.

use super::{AuditOutcome, AuditRecord, AuditSink, AuditTier};

/// Tracing target every audit record is emitted on.
pub const AUDIT_TARGET: &str = "audit";

/// Emits audit records as `tracing` events.
///
/// `Audit` and `Info` tier records are emitted at `INFO` level, `Error`
/// tier records at `ERROR` level. The rendered line is the event message;
/// tier, operation, actor, outcome and reason code are structured fields.
///
/// # Example
///
/// ```
/// use audited_security::audit::{AuditField, AuditRecord, AuditSink, Operation, TracingAuditSink};
///
/// let sink = TracingAuditSink::new();
/// sink.emit(&AuditRecord::success(Operation::DeleteTable, "root").with(AuditField::Table, "t1"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink {
    _private: (),
}

impl TracingAuditSink {
    /// Creates a new `TracingAuditSink`.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl AuditSink for TracingAuditSink {
    fn emit(&self, record: &AuditRecord) {
        let code = match record.outcome() {
            AuditOutcome::Success => None,
            AuditOutcome::Failure { code } => Some(code),
        };

        match record.tier() {
            AuditTier::Error => tracing::error!(
                target: AUDIT_TARGET,
                tier = %record.tier(),
                operation = %record.operation(),
                actor = %record.actor(),
                outcome = %record.outcome(),
                code = ?code,
                "{}",
                record.line()
            ),
            AuditTier::Audit | AuditTier::Info => tracing::info!(
                target: AUDIT_TARGET,
                tier = %record.tier(),
                operation = %record.operation(),
                actor = %record.actor(),
                outcome = %record.outcome(),
                "{}",
                record.line()
            ),
        }
    }
}
