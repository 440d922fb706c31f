//! Audit-logging decorator for table store security operations.
//!
//! This crate puts an audit trail in front of a security service:
//! - **Contract**: [`SecurityService`] covers authentication, authorizations,
//!   user lifecycle and system/table permissions
//! - **Decorator**: [`AuditedSecurityService`] implements the same trait,
//!   delegating every call and writing exactly one audit record for it
//! - **Sinks**: records go to an [`audit::AuditSink`], by default the
//!   `audit` tracing target
//! - **Shared instance**: [`SecurityInstance`] builds the audited service
//!   once and hands out `Arc`s
//!
//! The decorator never changes what the wrapped service returns. Errors come
//! back exactly as the backend produced them, after their audit record has
//! been written.
//!
//! # Core Types
//!
//! - [`Credentials`]: caller identity plus redacted authentication token
//! - [`SecurityError`]: reason-coded failure passed through untouched
//! - [`audit::AuditRecord`]: structured record rendered to text at the sink
//! - [`SecurityConfig`]: settings for wiring the shared instance
//!
//! # Examples
//!
//! ```
//! use audited_security::audit::{AuditRecord, AuditField, Operation};
//!
//! let record = AuditRecord::success(Operation::GrantTablePermission, "root")
//!     .with(AuditField::Permission, "WRITE")
//!     .with(AuditField::Table, "orders")
//!     .with(AuditField::User, "bob");
//!
//! assert_eq!(
//!     record.line(),
//!     "Using credentials root: granted permission WRITE on table orders for bob"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod audited;
mod config;
mod credentials;
mod error;
mod instance;
mod permission;
mod secret;
mod service;

pub use audited::AuditedSecurityService;
pub use config::SecurityConfig;
pub use credentials::Credentials;
pub use error::{ConfigError, InitializeError, SecurityError, SecurityErrorCode, SecurityResult};
pub use instance::SecurityInstance;
pub use permission::{Authorizations, SystemPermission, TablePermission};
pub use secret::Secret;
pub use service::SecurityService;
