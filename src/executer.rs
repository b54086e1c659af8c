//! Provides an asynchronous execution framework for sending HTTP requests to LINE.
//!
//! This module:
//! - Defines the Executer trait, which provides a unified interface for making HTTP requests.
//! - Implements executers for the token exchange and the ID token verification.
//!
//! Each call is a single form-encoded POST. Only HTTP 200 is a success; the body of
//! any other status is discarded. Nothing is retried.

use std::{error::Error, pin::Pin};

use http::StatusCode;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    token::{TokenBundle, TokenRequest},
    verify::{IdentityClaims, VerifyRequest},
};

/// generic asynchronous execution interface for sending HTTP requests.
/// Key Components:
/// - Req: The request type that the executer will handle.
/// - Response: The expected response type.
/// - Error: The error type that will be returned on failure.
/// - Future: The asynchronous execution result, returning either Response or Error
pub trait Executer<'a, Req>
where
    Req: Send,
{
    type Response;
    type Error: Error;
    type Future: Future<Output = Result<Self::Response, Self::Error>> + Send + 'a;

    fn execute(&'a self, req: &'a Req) -> Self::Future;
}

/// Defines possible errors that can occur during request execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecuteError {
    #[error("Failed to build request")]
    Request,
    #[error("Failed to send request")]
    Send,
    #[error("Request timed out")]
    Timeout,
    #[error("Invalid status code: {0}")]
    Status(StatusCode),
    #[error("Failed to parse data")]
    Parse,
}

impl ExecuteError {
    /// Whether the same request may succeed later (network trouble, 5xx, 429).
    pub fn is_transient(&self) -> bool {
        match self {
            ExecuteError::Send | ExecuteError::Timeout => true,
            ExecuteError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ExecuteError::Request | ExecuteError::Parse => false,
        }
    }
}

impl From<reqwest::Error> for ExecuteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExecuteError::Timeout
        } else if e.is_builder() {
            ExecuteError::Request
        } else {
            ExecuteError::Send
        }
    }
}

/// Request Workflow
/// 1. Parse the endpoint URL.
/// 2. Send an HTTP POST request with the form body.
/// 3. Reject anything but 200.
/// 4. Deserialize the JSON body.
async fn post_form<T>(
    client: &Client,
    endpoint: &str,
    params: &[(&str, &str)],
) -> Result<T, ExecuteError>
where
    T: DeserializeOwned,
{
    let url = Url::parse(endpoint).map_err(|e| {
        error!("Failed to parse url: {:?}", e);
        ExecuteError::Request
    })?;

    let res = client
        .post(url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .form(params)
        .send()
        .await
        .map_err(|e| {
            error!("Failed to send request: {:?}", e);
            ExecuteError::from(e)
        })?;

    let status = res.status();
    if status != StatusCode::OK {
        error!("Invalid status code: {}", status);
        return Err(ExecuteError::Status(status));
    }

    let body = res.bytes().await.map_err(|e| {
        error!("Failed to read body: {:?}", e);
        ExecuteError::from(e)
    })?;
    serde_json::from_slice::<T>(&body).map_err(|e| {
        error!("Failed to parse JSON: {:?}", e);
        ExecuteError::Parse
    })
}

/// Exchanges an authorization code for a `TokenBundle`.
#[derive(Debug, Clone, Default)]
pub struct TokenExe {
    client: Client,
}

impl TokenExe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-configured client (timeouts, proxies, connection pool).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl<'a> Executer<'a, TokenRequest> for TokenExe {
    type Response = TokenBundle;
    type Error = ExecuteError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

    fn execute(&'a self, req: &'a TokenRequest) -> Self::Future {
        Box::pin(async move {
            let bundle: TokenBundle =
                post_form(&self.client, req.token_endpoint(), &req.params()).await?;
            debug!(
                token_type = bundle.token_type(),
                expires_in = bundle.expires_in(),
                scope = bundle.scope(),
                "Token exchange succeeded"
            );
            Ok(bundle)
        })
    }
}

/// Sends an ID token to the verification endpoint and returns its claims.
#[derive(Debug, Clone, Default)]
pub struct VerifyExe {
    client: Client,
}

impl VerifyExe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl<'a> Executer<'a, VerifyRequest> for VerifyExe {
    type Response = IdentityClaims;
    type Error = ExecuteError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

    fn execute(&'a self, req: &'a VerifyRequest) -> Self::Future {
        Box::pin(async move {
            let claims: IdentityClaims =
                post_form(&self.client, req.verify_endpoint(), &req.params()).await?;
            debug!(iss = %claims.iss, "IDToken verified");
            Ok(claims)
        })
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::StatusCode;
    use mockito::{Matcher, Server};
    use reqwest::Client;
    use tokio::net::TcpListener;

    use crate::{
        authorize::Code,
        config::{Config, ConfigBuilder, RedirectURI},
        token::{IDTokenRaw, TokenRequest},
        verify::VerifyRequest,
    };

    use super::{ExecuteError, Executer, TokenExe, VerifyExe};

    fn config_for(server_url: &str) -> Config {
        ConfigBuilder::new()
            .client_id("1234567890")
            .client_secret("channel_secret")
            .token_endpoint(&format!("{}/oauth2/v2.1/token", server_url))
            .verify_endpoint(&format!("{}/oauth2/v2.1/verify", server_url))
            .build()
    }

    fn token_request(config: &Config) -> TokenRequest {
        let redirect = RedirectURI::parse("http://localhost:3000/callback").unwrap();
        TokenRequest::new(config, Code::from("auth_code"), &redirect)
    }

    #[tokio::test]
    async fn test_token_exe_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth2/v2.1/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "auth_code".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://localhost:3000/callback".into(),
                ),
                Matcher::UrlEncoded("client_id".into(), "1234567890".into()),
                Matcher::UrlEncoded("client_secret".into(), "channel_secret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id_token":"abc123","access_token":"x"}"#)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let req = token_request(&config);
        let bundle = TokenExe::new().execute(&req).await.unwrap();

        assert_eq!(bundle.id_token().value(), "abc123");
        assert_eq!(bundle.access_token().value(), "x");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_exe_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/v2.1/token")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_client","error_description":"invalid secret"}"#)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let req = token_request(&config);
        let res = TokenExe::new().execute(&req).await;

        assert_eq!(
            res.unwrap_err(),
            ExecuteError::Status(StatusCode::UNAUTHORIZED)
        );
    }

    #[tokio::test]
    async fn test_token_exe_unexpected_shape() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/v2.1/token")
            .with_status(200)
            .with_body(r#"{"access_token":"x"}"#)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let req = token_request(&config);
        let res = TokenExe::new().execute(&req).await;

        assert_eq!(res.unwrap_err(), ExecuteError::Parse);
    }

    #[tokio::test]
    async fn test_token_exe_invalid_endpoint() {
        let config = ConfigBuilder::new().token_endpoint("::not a url::").build();
        let req = token_request(&config);
        let res = TokenExe::new().execute(&req).await;

        assert_eq!(res.unwrap_err(), ExecuteError::Request);
    }

    #[tokio::test]
    async fn test_token_exe_connection_refused() {
        // bind then drop so nothing listens on the port
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = config_for(&format!("http://{}", addr));
        let req = token_request(&config);
        let err = TokenExe::new().execute(&req).await.unwrap_err();

        assert_eq!(err, ExecuteError::Send);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_token_exe_timeout() {
        // accepts the connection but never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let client = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let config = config_for(&format!("http://{}", addr));
        let req = token_request(&config);
        let err = TokenExe::with_client(client).execute(&req).await.unwrap_err();

        assert_eq!(err, ExecuteError::Timeout);
        assert!(err.is_transient());
        server.abort();
    }

    #[tokio::test]
    async fn test_verify_exe_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth2/v2.1/verify")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id_token".into(), "id.token.value".into()),
                Matcher::UrlEncoded("client_id".into(), "1234567890".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"sub":"U1234","iss":"https://access.line.me"}"#)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let req = VerifyRequest::new(&config, IDTokenRaw::from("id.token.value"));
        let claims = VerifyExe::new().execute(&req).await.unwrap();

        assert_eq!(claims.sub, "U1234");
        assert_eq!(claims.iss, "https://access.line.me");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_exe_malformed_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/v2.1/verify")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"sub":"U1234","iss":"#)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let req = VerifyRequest::new(&config, IDTokenRaw::from("id.token.value"));
        let res = VerifyExe::new().execute(&req).await;

        assert_eq!(res.unwrap_err(), ExecuteError::Parse);
    }

    #[tokio::test]
    async fn test_verify_exe_bad_request() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/v2.1/verify")
            .with_status(400)
            .with_body(r#"{"error":"invalid_request","error_description":"IdToken expired."}"#)
            .create_async()
            .await;

        let config = config_for(&server.url());
        let req = VerifyRequest::new(&config, IDTokenRaw::from("expired"));
        let err = VerifyExe::new().execute(&req).await.unwrap_err();

        assert_eq!(err, ExecuteError::Status(StatusCode::BAD_REQUEST));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_is_transient() {
        assert!(ExecuteError::Timeout.is_transient());
        assert!(ExecuteError::Status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(ExecuteError::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(!ExecuteError::Status(StatusCode::UNAUTHORIZED).is_transient());
        assert!(!ExecuteError::Parse.is_transient());
        assert!(!ExecuteError::Request.is_transient());
    }
}
