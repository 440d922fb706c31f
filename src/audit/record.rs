//! Structured audit records and their rendered form.
//!
//! An [`AuditRecord`] is built by the audited service for every call and
//! turned into text only when a sink asks for [`AuditRecord::message`] or
//! [`AuditRecord::line`].

use std::fmt;

use serde::Serialize;

use crate::error::SecurityErrorCode;

/// The security operation an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Password verification for a user
    AuthenticateUser,
    /// Lookup of a user's authorizations
    GetUserAuthorizations,
    /// Replacement of a user's authorizations
    ChangeAuthorizations,
    /// Password change
    ChangePassword,
    /// User creation
    CreateUser,
    /// User removal
    DropUser,
    /// Instance-wide permission grant
    GrantSystemPermission,
    /// Table permission grant
    GrantTablePermission,
    /// Instance-wide permission revocation
    RevokeSystemPermission,
    /// Table permission revocation
    RevokeTablePermission,
    /// Instance-wide permission check
    HasSystemPermission,
    /// Table permission check
    HasTablePermission,
    /// User listing
    ListUsers,
    /// Removal of a table's permissions
    DeleteTable,
    /// One-time bootstrap of the security stores
    InitializeSecurity,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 15] = [
        Operation::AuthenticateUser,
        Operation::GetUserAuthorizations,
        Operation::ChangeAuthorizations,
        Operation::ChangePassword,
        Operation::CreateUser,
        Operation::DropUser,
        Operation::GrantSystemPermission,
        Operation::GrantTablePermission,
        Operation::RevokeSystemPermission,
        Operation::RevokeTablePermission,
        Operation::HasSystemPermission,
        Operation::HasTablePermission,
        Operation::ListUsers,
        Operation::DeleteTable,
        Operation::InitializeSecurity,
    ];

    /// Returns the stable operation name.
    pub fn name(self) -> &'static str {
        match self {
            Self::AuthenticateUser => "authenticateUser",
            Self::GetUserAuthorizations => "getUserAuthorizations",
            Self::ChangeAuthorizations => "changeAuthorizations",
            Self::ChangePassword => "changePassword",
            Self::CreateUser => "createUser",
            Self::DropUser => "dropUser",
            Self::GrantSystemPermission => "grantSystemPermission",
            Self::GrantTablePermission => "grantTablePermission",
            Self::RevokeSystemPermission => "revokeSystemPermission",
            Self::RevokeTablePermission => "revokeTablePermission",
            Self::HasSystemPermission => "hasSystemPermission",
            Self::HasTablePermission => "hasTablePermission",
            Self::ListUsers => "listUsers",
            Self::DeleteTable => "deleteTable",
            Self::InitializeSecurity => "initializeSecurity",
        }
    }

    /// Returns the message template used when the operation succeeded.
    ///
    /// Placeholders name an [`AuditField`] key, e.g. `{user}`.
    pub fn success_template(self) -> &'static str {
        match self {
            Self::AuthenticateUser => "{result}",
            Self::GetUserAuthorizations => "got authorizations for {user}",
            Self::ChangeAuthorizations => "changed authorizations for {user} to {authorizations}",
            Self::ChangePassword => "changed password for {user}",
            Self::CreateUser => "createUser",
            Self::DropUser => "dropUser",
            Self::GrantSystemPermission => "granted permission {permission} for {user}",
            Self::GrantTablePermission => {
                "granted permission {permission} on table {table} for {user}"
            }
            Self::RevokeSystemPermission => "revoked permission {permission} for {user}",
            Self::RevokeTablePermission => {
                "revoked permission {permission} on table {table} for {user}"
            }
            Self::HasSystemPermission => "checked permission {permission} on {user}",
            Self::HasTablePermission => {
                "checked permission {permission} on table {table} for {user}"
            }
            Self::ListUsers => "listUsers",
            Self::DeleteTable => "deleted table {table}",
            Self::InitializeSecurity => {
                "Initialized root user with username: {root_user} at the request of user {user}"
            }
        }
    }

    /// Returns the message template used when the operation failed.
    ///
    /// The table grant and revoke templates name the table where the
    /// success template names the user; the table check template names the
    /// user only. Audit consumers match on these exact strings.
    pub fn failure_template(self) -> &'static str {
        match self {
            Self::AuthenticateUser => "authenticateUser",
            Self::GetUserAuthorizations => "getting authorizations for {user}",
            Self::ChangeAuthorizations => "changing authorizations for {user}",
            Self::ChangePassword => "changing password for {user}",
            Self::CreateUser => "createUser {user}",
            Self::DropUser => "dropUser {user}",
            Self::GrantSystemPermission => "granting permission {permission} for {user}",
            Self::GrantTablePermission => "granting permission {permission} on table for {table}",
            Self::RevokeSystemPermission => "revoking permission {permission} on {user}",
            Self::RevokeTablePermission => "revoking permission {permission} on table for {table}",
            Self::HasSystemPermission => "checking permission {permission} on {user}",
            Self::HasTablePermission => "checking permission {permission} on {user}",
            Self::ListUsers => "listUsers",
            Self::DeleteTable => "deleting table {table}",
            Self::InitializeSecurity => "initializeSecurity",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key of an argument carried by an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditField {
    /// Rendered outcome of an authentication attempt
    Result,
    /// Target user of the operation
    User,
    /// System or table permission
    Permission,
    /// Target table
    Table,
    /// New authorization set
    Authorizations,
    /// Root user named during bootstrap
    RootUser,
}

impl AuditField {
    /// Returns the placeholder key used in message templates.
    pub fn key(self) -> &'static str {
        match self {
            Self::Result => "result",
            Self::User => "user",
            Self::Permission => "permission",
            Self::Table => "table",
            Self::Authorizations => "authorizations",
            Self::RootUser => "root_user",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "result" => Some(Self::Result),
            "user" => Some(Self::User),
            "permission" => Some(Self::Permission),
            "table" => Some(Self::Table),
            "authorizations" => Some(Self::Authorizations),
            "root_user" => Some(Self::RootUser),
            _ => None,
        }
    }
}

/// One keyed argument of an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditArg {
    /// Which argument this is
    pub field: AuditField,
    /// The argument rendered with `Display`
    pub value: String,
}

/// Severity tier of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditTier {
    /// A completed security operation
    Audit,
    /// A security operation that failed
    Error,
    /// An informational notice outside the audit contract
    Info,
}

impl fmt::Display for AuditTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditTier::Audit => write!(f, "AUDIT"),
            AuditTier::Error => write!(f, "ERROR"),
            AuditTier::Info => write!(f, "INFO"),
        }
    }
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The wrapped operation returned normally
    Success,
    /// The wrapped operation failed with a security error
    Failure {
        /// Reason code of the error that was passed through
        code: SecurityErrorCode,
    },
}

impl AuditOutcome {
    /// Returns `true` for [`AuditOutcome::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, AuditOutcome::Success)
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Failure { code } => write!(f, "failure({})", code),
        }
    }
}

/// A structured record of one audited call.
///
/// Holds exactly the arguments its message names; nothing else about the
/// call (results, credentials) is retained.
///
/// # Example
///
/// ```
/// use audited_security::audit::{AuditField, AuditRecord, Operation};
///
/// let record = AuditRecord::success(Operation::DeleteTable, "alice")
///     .with(AuditField::Table, "orders");
///
/// assert_eq!(record.message(), "deleted table orders");
/// assert_eq!(record.line(), "Using credentials alice: deleted table orders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    operation: Operation,
    actor: String,
    tier: AuditTier,
    outcome: AuditOutcome,
    args: Vec<AuditArg>,
}

impl AuditRecord {
    /// Creates an `Audit`-tier record for a successful call.
    pub fn success(operation: Operation, actor: impl Into<String>) -> Self {
        Self::new(operation, actor, AuditTier::Audit, AuditOutcome::Success)
    }

    /// Creates an `Error`-tier record for a call that failed with `code`.
    pub fn failure(
        operation: Operation,
        actor: impl Into<String>,
        code: SecurityErrorCode,
    ) -> Self {
        Self::new(
            operation,
            actor,
            AuditTier::Error,
            AuditOutcome::Failure { code },
        )
    }

    /// Creates an `Info`-tier notice for a successful call.
    pub fn info(operation: Operation, actor: impl Into<String>) -> Self {
        Self::new(operation, actor, AuditTier::Info, AuditOutcome::Success)
    }

    fn new(
        operation: Operation,
        actor: impl Into<String>,
        tier: AuditTier,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            operation,
            actor: actor.into(),
            tier,
            outcome,
            args: Vec::new(),
        }
    }

    /// Appends a keyed argument.
    pub fn with(mut self, field: AuditField, value: impl fmt::Display) -> Self {
        self.args.push(AuditArg {
            field,
            value: value.to_string(),
        });
        self
    }

    /// Returns the operation.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the subject the call is attributed to.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Returns the severity tier.
    pub fn tier(&self) -> AuditTier {
        self.tier
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the keyed arguments in insertion order.
    pub fn args(&self) -> &[AuditArg] {
        &self.args
    }

    /// Returns the value of `field`, if the record carries it.
    pub fn arg(&self, field: AuditField) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.field == field)
            .map(|a| a.value.as_str())
    }

    /// Renders the operation message from its template.
    pub fn message(&self) -> String {
        let template = if self.outcome.is_success() {
            self.operation.success_template()
        } else {
            self.operation.failure_template()
        };
        self.render(template)
    }

    /// Renders the full audit line, prefixed according to the tier.
    pub fn line(&self) -> String {
        match self.tier {
            AuditTier::Audit => format!("Using credentials {}: {}", self.actor, self.message()),
            AuditTier::Error => format!(
                "Error: authenticated operation failed: {}: {}",
                self.actor,
                self.message()
            ),
            AuditTier::Info => self.message(),
        }
    }

    fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + 32);
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let key = &after[..close];
            match AuditField::from_key(key).and_then(|f| self.arg(f)) {
                Some(value) => out.push_str(value),
                // unfilled placeholders stay visible
                None => out.push_str(&rest[open..open + close + 2]),
            }
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        out
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line())
    }
}
