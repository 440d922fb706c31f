use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type returned by every [`SecurityService`](crate::SecurityService) operation.
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Reason code carried by a [`SecurityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityErrorCode {
    /// Credentials did not verify
    BadCredentials,
    /// The caller lacks the permission the operation needs
    PermissionDenied,
    /// The target user is unknown
    UserDoesntExist,
    /// The user being created already exists
    UserExists,
    /// The target table is unknown
    TableDoesntExist,
    /// An argument was rejected before the operation ran
    BadArgument,
    /// Credentials target a different instance
    InvalidInstanceId,
    /// The system user cannot be dropped or altered
    CannotRemoveSystemUser,
    /// The backing store could not be reached
    ConnectionError,
    /// Any other security failure
    DefaultSecurityError,
}

impl SecurityErrorCode {
    /// Returns a short human-readable description of the code.
    pub fn description(self) -> &'static str {
        match self {
            Self::BadCredentials => "username or password is invalid",
            Self::PermissionDenied => "user does not have permission to perform this action",
            Self::UserDoesntExist => "the user does not exist",
            Self::UserExists => "the user exists",
            Self::TableDoesntExist => "the table does not exist",
            Self::BadArgument => "invalid argument",
            Self::InvalidInstanceId => "credentials target a different instance",
            Self::CannotRemoveSystemUser => "the system user cannot be removed",
            Self::ConnectionError => "connection error",
            Self::DefaultSecurityError => "unknown security exception",
        }
    }
}

impl fmt::Display for SecurityErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadCredentials => "BAD_CREDENTIALS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::UserDoesntExist => "USER_DOESNT_EXIST",
            Self::UserExists => "USER_EXISTS",
            Self::TableDoesntExist => "TABLE_DOESNT_EXIST",
            Self::BadArgument => "BAD_ARGUMENT",
            Self::InvalidInstanceId => "INVALID_INSTANCEID",
            Self::CannotRemoveSystemUser => "CANNOT_REMOVE_SYSTEM_USER",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::DefaultSecurityError => "DEFAULT_SECURITY_ERROR",
        };
        f.write_str(name)
    }
}

/// A failed security operation.
///
/// Carries the reason code, the user the failure concerns and an optional
/// diagnostic message. The audit layer passes these through untouched.
///
/// # Examples
///
/// ```
/// use audited_security::{SecurityError, SecurityErrorCode};
///
/// let err = SecurityError::new("bob", SecurityErrorCode::PermissionDenied);
/// assert_eq!(err.code(), SecurityErrorCode::PermissionDenied);
/// assert_eq!(err.user(), "bob");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error {code} for user {user} - {}{}", .code.description(), detail(.message.as_deref()))]
pub struct SecurityError {
    user: String,
    code: SecurityErrorCode,
    message: Option<String>,
}

impl SecurityError {
    /// Creates an error for `user` with the given reason code.
    pub fn new(user: impl Into<String>, code: SecurityErrorCode) -> Self {
        Self {
            user: user.into(),
            code,
            message: None,
        }
    }

    /// Attaches a diagnostic message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the reason code.
    pub fn code(&self) -> SecurityErrorCode {
        self.code
    }

    /// Returns the user the failure concerns.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the diagnostic message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

fn detail(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

/// Failure of the one-time security bootstrap.
///
/// Initialization can fail either with a regular [`SecurityError`] or with a
/// bootstrap-specific error raised before the security layer is in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitializeError {
    /// The security layer rejected the request
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// The backing stores could not be bootstrapped
    #[error("security initialization failed: {message}")]
    Bootstrap {
        /// What went wrong
        message: String,
    },
}

/// Invalid [`SecurityConfig`](crate::SecurityConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed
    #[error("failed to parse security configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required field was empty
    #[error("security configuration field '{0}' must not be empty")]
    Empty(&'static str),
}
