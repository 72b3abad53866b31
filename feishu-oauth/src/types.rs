//! Token request and response types for the authorization code grant.
//!
//! The request serializes to the flat JSON object the token endpoint
//! expects. The response side classifies a raw status/body pair into
//! either a [`TokenResult`] or an [`ErrorResult`].

use secrecy::{ExposeSecret, SecretString};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use url::Url;

use crate::errors::{ConfigError, ExchangeError};
use crate::secrets::SecretSource;

/// The grant type for authorization code requests
pub const AUTHORIZATION_CODE_GRANT_TYPE: &str = "authorization_code";

/// Longest body prefix carried in a [`ExchangeError::MalformedResponse`]
const BODY_EXCERPT_CHARS: usize = 256;

/// An authorization code grant token request.
///
/// Built once per exchange attempt. The client secret is only exposed when
/// the request is serialized onto the wire; `Debug` and `Display` redact it.
pub struct TokenRequest {
    client_id: String,
    client_secret: SecretString,
    code: String,
    redirect_uri: String,
}

impl TokenRequest {
    /// Create a new token request.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingCredential`] for an empty `client_id` or
    /// `client_secret`, [`ConfigError::MissingField`] for an empty `code` or
    /// `redirect_uri`, and [`ConfigError::InvalidRedirectUri`] when the
    /// redirect URI is not an absolute URI.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(ConfigError::missing_credential("client_id"));
        }
        if client_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::missing_credential("client_secret"));
        }

        let code = code.into();
        if code.trim().is_empty() {
            return Err(ConfigError::missing_field("code"));
        }

        let redirect_uri = redirect_uri.into();
        if redirect_uri.trim().is_empty() {
            return Err(ConfigError::missing_field("redirect_uri"));
        }
        // Validate only; the registered string is sent back verbatim since
        // Url normalization could alter it (e.g. a trailing slash).
        Url::parse(&redirect_uri).map_err(|e| ConfigError::InvalidRedirectUri {
            uri: redirect_uri.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client_id,
            client_secret,
            code,
            redirect_uri,
        })
    }

    /// Create a request with credentials pulled from a secret source.
    pub fn from_source<S: SecretSource + ?Sized>(
        source: &S,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = source.client_id()?;
        let client_secret = source.client_secret()?;
        Self::new(client_id, client_secret, code, redirect_uri)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

impl Serialize for TokenRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("grant_type", AUTHORIZATION_CODE_GRANT_TYPE)?;
        map.serialize_entry("client_id", &self.client_id)?;
        map.serialize_entry("client_secret", self.client_secret.expose_secret())?;
        map.serialize_entry("code", &self.code)?;
        map.serialize_entry("redirect_uri", &self.redirect_uri)?;
        map.end()
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &AUTHORIZATION_CODE_GRANT_TYPE)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("code", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl fmt::Display for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuthorizationCodeGrant(client_id={}, redirect_uri={}, code_len={})",
            self.client_id,
            self.redirect_uri,
            self.code.len()
        )
    }
}

/// Success response from the token endpoint.
///
/// Unknown fields in the provider's body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResult {
    pub access_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Refresh token lifetime in seconds, when the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_in: Option<u64>,
}

/// Error details read from a rejected exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    pub error_code: String,
    pub error_description: String,
}

impl ErrorResult {
    /// Pull the error fields out of a provider body.
    ///
    /// Standard OAuth2 `error`/`error_description` win. Feishu also reports
    /// failures as a numeric `code` with a `msg`, used when the standard
    /// fields are absent. A zero `code` means success and is not an error code.
    pub fn from_body(body: &Value) -> Self {
        let error_code = match body.get("error").and_then(Value::as_str) {
            Some(error) => error.to_string(),
            None => match body.get("code") {
                Some(Value::Number(n)) if n.as_i64() != Some(0) => n.to_string(),
                Some(Value::String(s)) if s != "0" => s.clone(),
                _ => String::new(),
            },
        };
        let error_description = body
            .get("error_description")
            .and_then(Value::as_str)
            .or_else(|| body.get("msg").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        Self {
            error_code,
            error_description,
        }
    }
}

/// The two shapes a token endpoint answer can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResponse {
    Token(TokenResult),
    Error(ErrorResult),
}

impl TokenResponse {
    /// Classify a raw HTTP status and body.
    ///
    /// A 2xx body with a non-null `access_token` is a token. Any other JSON
    /// body, and any non-2xx body at all, is an error. Only a 2xx body that
    /// does not decode fails with [`ExchangeError::MalformedResponse`].
    pub fn classify(status: u16, body: &str) -> Result<Self, ExchangeError> {
        let success = (200..300).contains(&status);

        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) if success => {
                return Err(ExchangeError::MalformedResponse {
                    raw_body_excerpt: body_excerpt(body),
                });
            }
            Err(_) => return Ok(TokenResponse::Error(ErrorResult::default())),
        };

        let has_token = value
            .get("access_token")
            .is_some_and(|token| !token.is_null());

        if success && has_token {
            serde_json::from_value(value)
                .map(TokenResponse::Token)
                .map_err(|_| ExchangeError::MalformedResponse {
                    raw_body_excerpt: body_excerpt(body),
                })
        } else {
            Ok(TokenResponse::Error(ErrorResult::from_body(&value)))
        }
    }
}

fn body_excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
