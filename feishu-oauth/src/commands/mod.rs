#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::client::TokenExchangeClient;
use crate::config::ExchangeSettings;
use crate::errors::ExchangeError;
use crate::secrets::{EnvSecretSource, SecretSource};
use crate::transport::{HttpTransport, Transport};
use crate::types::TokenRequest;
use crate::util::env;

/// Exchange a Feishu OAuth authorization code for a user access token
#[derive(Parser, Debug)]
#[command(name = "feishu-token", author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging for additional debugging information
    #[arg(short, long)]
    pub verbose: bool,

    /// Authorization code from the OAuth redirect callback (or FEISHU_AUTH_CODE)
    pub code: Option<String>,

    /// Redirect URI registered for the app (or FEISHU_REDIRECT_URI)
    #[arg(long)]
    pub redirect_uri: Option<String>,

    /// Token endpoint URL (or FEISHU_TOKEN_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Seconds to wait for the token endpoint (or FEISHU_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Dotenv file to load before reading settings and credentials
    #[arg(long, env = "FEISHU_ENV_FILE")]
    pub env_file: Option<PathBuf>,
}

/// Parse arguments, run one exchange and print the result
pub fn execute() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(path) = env::load_env(cli.env_file.as_deref())? {
        debug!("Loaded environment from {}", path.display());
    }

    let settings = ExchangeSettings::resolve(&cli).context("Invalid exchange settings")?;
    let transport = HttpTransport::new()
        .map_err(ExchangeError::from)
        .context("Failed to build HTTP client")?;

    match run(&settings, &EnvSecretSource::default(), transport) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(err) => {
            // Keep stdout machine-readable for provider rejections too
            if let Some(rendered) = err
                .downcast_ref::<ExchangeError>()
                .and_then(render_provider_error)
            {
                println!("{}", rendered);
            }
            if let Some(hint) = err.downcast_ref::<ExchangeError>().and_then(provider_hint) {
                eprintln!("HINT: {}", hint);
            }
            Err(err)
        }
    }
}

/// Run one exchange and render the token as indented JSON
pub fn run<S, T>(settings: &ExchangeSettings, source: &S, transport: T) -> Result<String>
where
    S: SecretSource + ?Sized,
    T: Transport,
{
    let request = TokenRequest::from_source(source, &settings.code, &settings.redirect_uri)
        .context("Failed to build token request")?;

    let token = TokenExchangeClient::new(transport)
        .exchange(&settings.endpoint, &request, settings.timeout)
        .with_context(|| format!("Token exchange with {} failed", settings.endpoint))?;

    serde_json::to_string_pretty(&token).context("Failed to render token response")
}

/// Indented JSON for a provider rejection, `None` for any other error
pub fn render_provider_error(err: &ExchangeError) -> Option<String> {
    match err {
        ExchangeError::ProviderError {
            status,
            error_code,
            error_description,
        } => serde_json::to_string_pretty(&json!({
            "status": status,
            "error": error_code,
            "error_description": error_description,
        }))
        .ok(),
        _ => None,
    }
}

/// What to do next for Feishu error codes that need user action.
///
/// The numeric code may arrive as the error code itself or inside the
/// description when the standard `error` field is also present.
pub fn provider_hint(err: &ExchangeError) -> Option<&'static str> {
    let ExchangeError::ProviderError {
        error_code,
        error_description,
        ..
    } = err
    else {
        return None;
    };
    let mentions = |code: &str| error_code == code || error_description.contains(code);

    if mentions("20037") {
        Some("The authorization code has expired; authorize again to get a fresh one")
    } else if mentions("20064") || mentions("20073") {
        Some("The authorization code was revoked or already used; authorize again")
    } else if mentions("20010") {
        Some("The user has no permission to use this app; check the app's availability settings")
    } else {
        None
    }
}

/// Exit status for a failed run: 2 when the exchange itself failed, 1 otherwise
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ExchangeError>().is_some() {
        2
    } else {
        1
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,feishu_oauth=debug"
    } else {
        "warn"
    };

    // Logs go to stderr so stdout stays pure JSON
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();
}
