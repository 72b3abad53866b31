use reqwest::{blocking, header, redirect};
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::errors::TransportFailure;

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// The minimal "send JSON, receive JSON" capability the token client needs.
///
/// One call is one outbound request. Implementations must not retry.
pub trait Transport {
    fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportFailure>;
}

impl<T: Transport> Transport for &T {
    fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportFailure> {
        (**self).post_json(url, body, timeout)
    }
}

/// Blocking reqwest transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: blocking::Client,
}

impl HttpTransport {
    /// Create a transport with its own connection pool.
    ///
    /// Redirects are not followed: a 3xx comes back as-is, so the code and
    /// secret are only ever sent to the validated endpoint.
    pub fn new() -> Result<Self, TransportFailure> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = blocking::Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    /// Borrow connections from an externally managed client.
    ///
    /// The client must be built with `redirect::Policy::none()`; reqwest's
    /// default policy re-posts the body to the `Location` target.
    pub fn with_client(client: blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportFailure> {
        let response = self
            .client
            .post(url.clone())
            .timeout(timeout)
            .json(body)
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(TransportResponse { status, body })
    }
}
