//! In-memory audit sink.

use parking_lot::Mutex;

use super::{AuditRecord, AuditSink};

/// Thread-safe in-memory recorder for audit records.
///
/// Records are kept in the order `emit` was called. Useful in tests and
/// for embedders that want to inspect the trail after a batch of calls.
///
/// # Example
///
/// ```
/// use audited_security::audit::{AuditField, AuditRecord, AuditSink, MemoryAuditSink, Operation};
///
/// let sink = MemoryAuditSink::new();
/// sink.emit(&AuditRecord::success(Operation::DeleteTable, "root").with(AuditField::Table, "t1"));
///
/// assert_eq!(sink.len(), 1);
/// assert_eq!(sink.records()[0].actor(), "root");
/// ```
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded records.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Returns the rendered line of every record.
    pub fn lines(&self) -> Vec<String> {
        self.records.lock().iter().map(AuditRecord::line).collect()
    }

    /// Returns the number of recorded records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<AuditRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Clears all recorded records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&self, record: &AuditRecord) {
        self.records.lock().push(record.clone());
    }
}
