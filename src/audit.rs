//! Audit records and the sinks they are written to.
//!
//! This module provides:
//! - `AuditRecord`: structured record of one audited call
//! - `AuditSink`: destination trait for records
//! - `TracingAuditSink`: production sink on the `audit` tracing target
//! - `MemoryAuditSink`: thread-safe in-memory recorder
//!
//! Records are safe to log by construction: they carry the acting user and
//! the arguments their message names, never credentials or result sets.

mod memory;
mod record;
mod sink;
mod tracing_sink;

pub use memory::MemoryAuditSink;
pub use record::{AuditArg, AuditField, AuditOutcome, AuditRecord, AuditTier, Operation};
pub use sink::AuditSink;
pub use tracing_sink::{AUDIT_TARGET, TracingAuditSink};
