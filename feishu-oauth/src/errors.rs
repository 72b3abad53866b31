use thiserror::Error;

/// Problems with the inputs of an exchange, detected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing credential: `{name}` is absent or empty")]
    MissingCredential { name: String },
    #[error("Missing required field: `{name}` is empty")]
    MissingField { name: String },
    #[error("Invalid redirect URI `{uri}`: {reason}")]
    InvalidRedirectUri { uri: String, reason: String },
    #[error("Invalid token endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("Invalid setting `{name}`: {reason}")]
    InvalidSetting { name: String, reason: String },
}

impl ConfigError {
    pub(crate) fn missing_credential(name: impl Into<String>) -> Self {
        ConfigError::MissingCredential { name: name.into() }
    }

    pub(crate) fn missing_field(name: impl Into<String>) -> Self {
        ConfigError::MissingField { name: name.into() }
    }
}

/// Why the HTTP layer failed to produce a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Could not connect: {0}")]
    Connect(String),
    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display omits the underlying io/tls cause
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        if err.is_timeout() {
            TransportFailure::Timeout(message)
        } else if err.is_connect() {
            TransportFailure::Connect(message)
        } else {
            TransportFailure::Request(message)
        }
    }
}

/// Failures of a token exchange once the request has been built.
///
/// None of these are retried: an authorization code is single-use, so a
/// second attempt would present an already consumed code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Token endpoint could not be reached")]
    TransportError {
        #[source]
        cause: TransportFailure,
    },
    #[error(
        "Token endpoint rejected the exchange with status {status}: `{error_code}` {error_description}"
    )]
    ProviderError {
        status: u16,
        error_code: String,
        error_description: String,
    },
    #[error("Token endpoint returned a body that is not valid JSON: `{raw_body_excerpt}`")]
    MalformedResponse { raw_body_excerpt: String },
}

impl From<TransportFailure> for ExchangeError {
    fn from(cause: TransportFailure) -> Self {
        ExchangeError::TransportError { cause }
    }
}

/// Either half of the taxonomy, for callers that build the request and
/// run the exchange in one step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}
