//! The token exchange itself: one request, one response, no retries.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::endpoint::TokenEndpoint;
use crate::errors::{Error, ExchangeError, TransportFailure};
use crate::secrets::SecretSource;
use crate::transport::{HttpTransport, Transport};
use crate::types::{TokenRequest, TokenResponse, TokenResult};

/// Longest wait allowed for one exchange; larger timeouts are clamped
pub const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

/// Exchanges authorization codes for tokens over an injected transport.
///
/// Holds nothing across calls except the transport, whose connection
/// pooling (if any) belongs to whoever built it.
#[derive(Debug, Clone)]
pub struct TokenExchangeClient<T = HttpTransport> {
    transport: T,
}

impl<T: Transport> TokenExchangeClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exchange the request's authorization code at `endpoint`.
    ///
    /// Issues exactly one POST bounded by `timeout`. A zero timeout fails as
    /// a timed out transport without touching the network, and a timeout
    /// above [`MAX_TIMEOUT`] is clamped to it.
    pub fn exchange(
        &self,
        endpoint: &TokenEndpoint,
        request: &TokenRequest,
        timeout: Duration,
    ) -> Result<TokenResult, ExchangeError> {
        if timeout.is_zero() {
            let cause = TransportFailure::Timeout("timeout must be greater than zero".to_string());
            return Err(cause.into());
        }
        let timeout = if timeout > MAX_TIMEOUT {
            debug!("Clamping timeout of {:?} to {:?}", timeout, MAX_TIMEOUT);
            MAX_TIMEOUT
        } else {
            timeout
        };

        debug!("Exchanging authorization code at {} ({})", endpoint, request);

        let response = self
            .transport
            .post_json(endpoint.as_url(), request, timeout)
            .map_err(|cause| {
                warn!("Token exchange transport failure: {}", cause);
                ExchangeError::from(cause)
            })?;

        debug!("Token endpoint answered with status {}", response.status);

        match TokenResponse::classify(response.status, &response.body)? {
            TokenResponse::Token(token) => {
                info!(
                    "Obtained {} token expiring in {}s",
                    token.token_type, token.expires_in
                );
                Ok(token)
            }
            TokenResponse::Error(error) => {
                warn!(
                    "Token endpoint rejected exchange: status={} error={:?}",
                    response.status, error.error_code
                );
                Err(ExchangeError::ProviderError {
                    status: response.status,
                    error_code: error.error_code,
                    error_description: error.error_description,
                })
            }
        }
    }

    /// Build the request from a secret source and exchange it.
    ///
    /// Credential problems surface as [`Error::Config`] before any network
    /// call is made.
    pub fn exchange_with_source<S: SecretSource + ?Sized>(
        &self,
        endpoint: &TokenEndpoint,
        source: &S,
        code: &str,
        redirect_uri: &str,
        timeout: Duration,
    ) -> Result<TokenResult, Error> {
        let request = TokenRequest::from_source(source, code, redirect_uri)?;
        Ok(self.exchange(endpoint, &request, timeout)?)
    }
}

/// Exchange an authorization code using a fresh [`HttpTransport`].
pub fn exchange(
    endpoint: &TokenEndpoint,
    request: &TokenRequest,
    timeout: Duration,
) -> Result<TokenResult, ExchangeError> {
    let transport = HttpTransport::new()?;
    TokenExchangeClient::new(transport).exchange(endpoint, request, timeout)
}
