use crate::secret::Secret;

/// The caller's identity as presented for one call.
///
/// Holds the user name, the opaque authentication token and the instance the
/// caller targets. Only the user name is ever written to an audit record.
///
/// # Examples
///
/// ```
/// use audited_security::Credentials;
///
/// let creds = Credentials::new("alice", b"secret".to_vec(), "instance-1");
/// assert_eq!(creds.user(), "alice");
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    token: Secret<Vec<u8>>,
    instance_id: String,
}

impl Credentials {
    /// Creates credentials for `user` on `instance_id`.
    pub fn new(
        user: impl Into<String>,
        token: impl Into<Vec<u8>>,
        instance_id: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            token: Secret::new(token.into()),
            instance_id: instance_id.into(),
        }
    }

    /// Returns the subject the call is attributed to.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the authentication token.
    pub fn token(&self) -> &Secret<Vec<u8>> {
        &self.token
    }

    /// Returns the instance the caller targets.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
}
