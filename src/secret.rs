use std::fmt;

/// Authentication material that must never reach an audit line.
///
/// `Secret<T>` holds passwords and tokens carried by [`Credentials`](crate::Credentials).
/// Its `Debug` and `Display` output is always `[REDACTED]`, so a credential
/// formatted by accident into a log or error message leaks nothing.
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Borrow` or `Copy`
/// - Debug and Display output is always `[REDACTED]`
/// - Access requires the explicit [`expose_secret`](Self::expose_secret) call
///
/// # Examples
///
/// ```
/// use audited_security::Secret;
///
/// let token = Secret::new(b"hunter2".to_vec());
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(token.expose_secret(), b"hunter2");
/// ```
// BREAKING CHANGE WARNING: Do NOT derive Debug or Display.
// Credentials are attached to every audited call; a derived impl would print the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps authentication material.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the wrapped value.
    ///
    /// Only the wrapped security service should call this, to verify the
    /// material. The audit layer never does.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl Secret<Vec<u8>> {
    /// Returns the length of the wrapped material in bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no material was supplied.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
