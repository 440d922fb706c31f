use serde::Deserialize;

use crate::credentials::Credentials;
use crate::error::ConfigError;

fn default_root_user() -> String {
    "root".to_string()
}

/// Settings used when wiring the shared audited service.
///
/// Usually embedded in the host server's own configuration file; it can
/// also be parsed on its own with [`from_toml_str`](Self::from_toml_str).
///
/// # Examples
///
/// ```
/// use audited_security::SecurityConfig;
///
/// let config = SecurityConfig::from_toml_str(r#"instance_id = "prod-1""#).unwrap();
/// assert_eq!(config.instance_id, "prod-1");
/// assert_eq!(config.root_user, "root");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Instance the security stores belong to
    pub instance_id: String,
    /// Name of the bootstrap user created by security initialization
    #[serde(default = "default_root_user")]
    pub root_user: String,
}

impl SecurityConfig {
    /// Creates a config for `instance_id` with the default root user.
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            root_user: default_root_user(),
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Empty`] if a required field is blank.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that required fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] naming the first blank field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instance_id.trim().is_empty() {
            return Err(ConfigError::Empty("instance_id"));
        }
        if self.root_user.trim().is_empty() {
            return Err(ConfigError::Empty("root_user"));
        }
        Ok(())
    }

    /// Builds credentials for `user` targeting this instance.
    pub fn credentials(&self, user: impl Into<String>, token: impl Into<Vec<u8>>) -> Credentials {
        Credentials::new(user, token, self.instance_id.clone())
    }
}
