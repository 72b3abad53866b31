pub mod client;
pub mod commands;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod secrets;
pub mod transport;
pub mod types;
pub mod util;

use anyhow::Result;

pub use client::{TokenExchangeClient, exchange};
pub use endpoint::{DEFAULT_TOKEN_ENDPOINT, TokenEndpoint};
pub use errors::{ConfigError, Error, ExchangeError, TransportFailure};
pub use secrets::{EnvSecretSource, SecretSource, StaticSecretSource};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{ErrorResult, TokenRequest, TokenResponse, TokenResult};

/// The main entry point for the CLI
/// Library consumers normally want [`exchange`] or [`TokenExchangeClient`]
pub fn run() -> Result<()> {
    commands::execute()
}
