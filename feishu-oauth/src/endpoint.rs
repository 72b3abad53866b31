use std::fmt;
use std::str::FromStr;
use url::{Host, Url};

use crate::errors::ConfigError;

/// Feishu's v2 OAuth token endpoint
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://open.feishu.cn/open-apis/authen/v2/oauth/token";

/// A validated token endpoint URL.
///
/// Must be absolute `https`. Plain `http` is accepted for loopback hosts
/// (`localhost`, 127.0.0.0/8, `[::1]`) only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEndpoint(Url);

impl TokenEndpoint {
    pub fn parse(endpoint: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(endpoint).map_err(|e| invalid(endpoint, e.to_string()))?;
        Self::try_from(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<Url> for TokenEndpoint {
    type Error = ConfigError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        let host = url
            .host()
            .ok_or_else(|| invalid(url.as_str(), "URL has no host"))?;

        match url.scheme() {
            "https" => Ok(Self(url)),
            "http" if is_loopback_host(&host) => Ok(Self(url)),
            "http" => Err(invalid(
                url.as_str(),
                "plain http is only allowed for loopback hosts",
            )),
            other => Err(invalid(
                url.as_str(),
                format!("unsupported scheme `{}`, expected https", other),
            )),
        }
    }
}

impl FromStr for TokenEndpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TokenEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_loopback_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => ip.is_loopback(),
        Host::Ipv6(ip) => ip.is_loopback(),
    }
}

fn invalid(endpoint: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.into(),
    }
}
