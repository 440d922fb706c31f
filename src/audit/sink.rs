use std::sync::Arc;

use super::AuditRecord;

/// Destination for audit records.
///
/// `emit` is infallible: a sink that cannot write must deal with the
/// failure itself, it is never surfaced as a failure of the audited
/// operation. Implementations must be callable from many threads at once.
///
/// # Examples
///
/// ```
/// use audited_security::audit::{AuditRecord, AuditSink, MemoryAuditSink, Operation};
///
/// let sink = MemoryAuditSink::new();
/// sink.emit(&AuditRecord::success(Operation::ListUsers, "root"));
/// assert_eq!(sink.lines(), vec!["Using credentials root: listUsers"]);
/// ```
pub trait AuditSink: Send + Sync {
    /// Writes one record.
    fn emit(&self, record: &AuditRecord);
}

impl<S: AuditSink + ?Sized> AuditSink for Arc<S> {
    fn emit(&self, record: &AuditRecord) {
        (**self).emit(record);
    }
}

impl<S: AuditSink + ?Sized> AuditSink for &S {
    fn emit(&self, record: &AuditRecord) {
        (**self).emit(record);
    }
}

impl<S: AuditSink + ?Sized> AuditSink for Box<S> {
    fn emit(&self, record: &AuditRecord) {
        (**self).emit(record);
    }
}
