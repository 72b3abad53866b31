//! Per-invocation exchange settings resolved from CLI flags and the environment.

use std::time::Duration;

use crate::client::MAX_TIMEOUT;
use crate::commands::Cli;
use crate::endpoint::{DEFAULT_TOKEN_ENDPOINT, TokenEndpoint};
use crate::errors::ConfigError;
use crate::util::env::get_optional_env_var;

pub const AUTH_CODE_VAR: &str = "FEISHU_AUTH_CODE";
pub const REDIRECT_URI_VAR: &str = "FEISHU_REDIRECT_URI";
pub const TOKEN_ENDPOINT_VAR: &str = "FEISHU_TOKEN_ENDPOINT";
pub const TIMEOUT_SECS_VAR: &str = "FEISHU_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything an exchange needs apart from the credentials.
///
/// The authorization code and redirect URI have no defaults: the code comes
/// from the OAuth redirect callback and the redirect URI from the app's
/// registration, both per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSettings {
    pub endpoint: TokenEndpoint,
    pub code: String,
    pub redirect_uri: String,
    pub timeout: Duration,
}

impl ExchangeSettings {
    /// Resolve settings with flag > environment > default precedence.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let code = cli
            .code
            .clone()
            .or_else(|| get_optional_env_var(AUTH_CODE_VAR))
            .ok_or_else(|| ConfigError::missing_field("code"))?;

        let redirect_uri = cli
            .redirect_uri
            .clone()
            .or_else(|| get_optional_env_var(REDIRECT_URI_VAR))
            .ok_or_else(|| ConfigError::missing_field("redirect_uri"))?;

        let endpoint = cli
            .endpoint
            .clone()
            .or_else(|| get_optional_env_var(TOKEN_ENDPOINT_VAR))
            .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string());
        let endpoint = TokenEndpoint::parse(&endpoint)?;

        let timeout = match cli.timeout_secs {
            Some(secs) => secs,
            None => match get_optional_env_var(TIMEOUT_SECS_VAR) {
                Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidSetting {
                    name: TIMEOUT_SECS_VAR.to_string(),
                    reason: format!("{}", e),
                })?,
                None => DEFAULT_TIMEOUT.as_secs(),
            },
        };
        if timeout == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if timeout > MAX_TIMEOUT.as_secs() {
            return Err(ConfigError::InvalidSetting {
                name: "timeout_secs".to_string(),
                reason: format!("must be at most {} seconds", MAX_TIMEOUT.as_secs()),
            });
        }

        Ok(Self {
            endpoint,
            code,
            redirect_uri,
            timeout: Duration::from_secs(timeout),
        })
    }
}
