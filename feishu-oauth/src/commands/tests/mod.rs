use crate::commands::{Cli, exit_code, provider_hint, render_provider_error, run};
use crate::config::ExchangeSettings;
use crate::endpoint::TokenEndpoint;
use crate::errors::{ConfigError, ExchangeError};
use crate::secrets::StaticSecretSource;
use crate::transport::HttpTransport;
use clap::Parser;
use mockito::Matcher;
use serde_json::{Value, json};
use std::time::Duration;

fn settings_for(server: &mockito::Server) -> ExchangeSettings {
    ExchangeSettings {
        endpoint: TokenEndpoint::parse(&format!(
            "{}/open-apis/authen/v2/oauth/token",
            server.url()
        ))
        .unwrap(),
        code: "auth-code-xyz".to_string(),
        redirect_uri: "https://open.feishu.cn/api-explorer/loading".to_string(),
        timeout: Duration::from_secs(5),
    }
}

#[test]
fn test_run_prints_token_as_indented_json() {
    let mut server = mockito::Server::new();
    let token_mock = server
        .mock("POST", "/open-apis/authen/v2/oauth/token")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "grant_type": "authorization_code",
            "client_id": "cli_test",
            "client_secret": "test-secret",
            "code": "auth-code-xyz",
            "redirect_uri": "https://open.feishu.cn/api-explorer/loading"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"code":0,"access_token":"u-tok","expires_in":7200,"refresh_token":"r-tok","refresh_token_expires_in":604800,"scope":"auth:user.id:read","token_type":"Bearer"}"#,
        )
        .create();

    let output = run(
        &settings_for(&server),
        &StaticSecretSource::new("cli_test", "test-secret"),
        HttpTransport::new().unwrap(),
    )
    .unwrap();

    token_mock.assert();
    assert!(output.contains('\n'), "output should be indented");

    let printed: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(printed["access_token"], "u-tok");
    assert_eq!(printed["refresh_token"], "r-tok");
    assert_eq!(printed["expires_in"], 7200);
    assert!(printed.get("code").is_none());
}

#[test]
fn test_run_surfaces_provider_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/open-apis/authen/v2/oauth/token")
        .with_status(400)
        .with_body(r#"{"code":20003,"error":"invalid_grant","error_description":"The authorization code is expired"}"#)
        .create();

    let err = run(
        &settings_for(&server),
        &StaticSecretSource::new("cli_test", "test-secret"),
        HttpTransport::new().unwrap(),
    )
    .unwrap_err();

    let exchange_err = err.downcast_ref::<ExchangeError>().unwrap();
    assert_eq!(
        exchange_err,
        &ExchangeError::ProviderError {
            status: 400,
            error_code: "invalid_grant".to_string(),
            error_description: "The authorization code is expired".to_string(),
        }
    );
    assert_eq!(exit_code(&err), 2);

    let rendered: Value =
        serde_json::from_str(&render_provider_error(exchange_err).unwrap()).unwrap();
    assert_eq!(rendered["status"], 400);
    assert_eq!(rendered["error"], "invalid_grant");
}

#[test]
fn test_run_rejects_missing_secret_without_calling_endpoint() {
    let mut server = mockito::Server::new();
    let token_mock = server
        .mock("POST", "/open-apis/authen/v2/oauth/token")
        .expect(0)
        .create();

    let err = run(
        &settings_for(&server),
        &StaticSecretSource::new("cli_test", ""),
        HttpTransport::new().unwrap(),
    )
    .unwrap_err();

    token_mock.assert();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::MissingCredential {
            name: "client_secret".to_string()
        })
    );
    assert_eq!(exit_code(&err), 1);
}

#[test]
fn test_render_ignores_non_provider_errors() {
    let err = ExchangeError::MalformedResponse {
        raw_body_excerpt: "oops".to_string(),
    };
    assert_eq!(render_provider_error(&err), None);
}

#[test]
fn test_provider_hints_for_known_feishu_codes() {
    let provider_error = |error_code: &str, error_description: &str| ExchangeError::ProviderError {
        status: 400,
        error_code: error_code.to_string(),
        error_description: error_description.to_string(),
    };

    assert!(
        provider_hint(&provider_error("20037", "code expired"))
            .unwrap()
            .contains("expired")
    );
    assert!(
        provider_hint(&provider_error("invalid_grant", "error 20073: code used"))
            .unwrap()
            .contains("already used")
    );
    assert!(
        provider_hint(&provider_error("20064", ""))
            .unwrap()
            .contains("revoked")
    );
    assert!(
        provider_hint(&provider_error("20010", ""))
            .unwrap()
            .contains("permission")
    );
    assert_eq!(provider_hint(&provider_error("invalid_client", "bad secret")), None);
    assert_eq!(
        provider_hint(&ExchangeError::MalformedResponse {
            raw_body_excerpt: "20037".to_string()
        }),
        None
    );
}

#[test]
fn test_cli_parses_all_flags() {
    let cli = Cli::try_parse_from([
        "feishu-token",
        "-v",
        "the-code",
        "--redirect-uri",
        "https://example.com/callback",
        "--endpoint",
        "https://auth.example.com/token",
        "--timeout-secs",
        "7",
        "--env-file",
        "/tmp/feishu.env",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert_eq!(cli.code.as_deref(), Some("the-code"));
    assert_eq!(cli.redirect_uri.as_deref(), Some("https://example.com/callback"));
    assert_eq!(cli.endpoint.as_deref(), Some("https://auth.example.com/token"));
    assert_eq!(cli.timeout_secs, Some(7));
    assert_eq!(
        cli.env_file.as_deref(),
        Some(std::path::Path::new("/tmp/feishu.env"))
    );
}
