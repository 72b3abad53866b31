//! Sources for the app credentials used in a token exchange.

use secrecy::SecretString;
use std::env;
use std::fmt;

use crate::errors::ConfigError;

/// Environment variable holding the Feishu app ID
pub const APP_ID_VAR: &str = "FEISHU_APP_ID";
/// Environment variable holding the Feishu app secret
pub const APP_SECRET_VAR: &str = "FEISHU_APP_SECRET";

/// Supplies the `client_id` and `client_secret` of an exchange.
///
/// Injected into the client rather than looked up ambiently, so exchanges
/// can run against fabricated credentials.
pub trait SecretSource {
    fn client_id(&self) -> Result<String, ConfigError>;
    fn client_secret(&self) -> Result<SecretString, ConfigError>;
}

/// Reads credentials from environment variables at call time.
#[derive(Debug, Clone)]
pub struct EnvSecretSource {
    id_var: String,
    secret_var: String,
}

impl EnvSecretSource {
    pub fn new(id_var: impl Into<String>, secret_var: impl Into<String>) -> Self {
        Self {
            id_var: id_var.into(),
            secret_var: secret_var.into(),
        }
    }
}

impl Default for EnvSecretSource {
    fn default() -> Self {
        Self::new(APP_ID_VAR, APP_SECRET_VAR)
    }
}

impl SecretSource for EnvSecretSource {
    fn client_id(&self) -> Result<String, ConfigError> {
        read_credential(&self.id_var)
    }

    fn client_secret(&self) -> Result<SecretString, ConfigError> {
        read_credential(&self.secret_var).map(SecretString::new)
    }
}

/// Absent and blank are treated alike; no placeholder is ever substituted.
fn read_credential(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::missing_credential(name)),
    }
}

/// Fixed credentials, validated when the request is built.
pub struct StaticSecretSource {
    client_id: String,
    client_secret: String,
}

impl StaticSecretSource {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for StaticSecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecretSource")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl SecretSource for StaticSecretSource {
    fn client_id(&self) -> Result<String, ConfigError> {
        Ok(self.client_id.clone())
    }

    fn client_secret(&self) -> Result<SecretString, ConfigError> {
        Ok(SecretString::new(self.client_secret.clone()))
    }
}
