//! Defines structures and builders related to LINE Login configuration.
//!
//! Provides a structured way to handle channel credentials
//! and the provider endpoints used by the login flow.
//!
//! ## Structures
//! - `Config`: Stores the channel credentials and endpoints.
//! - `ConfigBuilder`: A builder for constructing a `Config` instance.
//! - `RedirectURI`: A callback URI that passed validation.
//!
//! # Example
//! ```rust,no_run
//! use tiny_line_login::config::Config;
//!
//! let config = Config::builder()
//!     .client_id("your-channel-id")
//!     .client_secret("your-channel-secret")
//!     .build();
//! ```
//!
//! The LINE Login v2.1 endpoints are used unless overridden.
use std::fmt;

use tracing::error;
use url::{Host, Url};

use crate::error::Error;

pub const DEFAULT_AUTH_ENDPOINT: &str = "https://access.line.me/oauth2/v2.1/authorize";
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.line.me/oauth2/v2.1/token";
pub const DEFAULT_VERIFY_ENDPOINT: &str = "https://api.line.me/oauth2/v2.1/verify";

pub const CHANNEL_ID_ENV: &str = "LINE_CHANNEL_ID";
pub const CHANNEL_SECRET_ENV: &str = "LINE_CHANNEL_SECRET";

#[derive(Debug, Clone)]
pub(crate) struct AuthEndPoint(pub String);

#[derive(Debug, Clone)]
pub(crate) struct TokenEndPoint(pub String);

#[derive(Debug, Clone)]
pub(crate) struct VerifyEndPoint(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientID(pub String);

#[derive(Clone, Default, PartialEq)]
pub(crate) struct ClientSecret(pub String);

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

/// Holds the channel credentials and endpoints required for LINE Login.
///
/// It is immutable once constructed and meant to be built once at startup,
/// then shared by reference with every request.
///
/// # Fields
/// - `auth_endpoint`: The authorization endpoint URL.
/// - `client_id`: The channel ID from the LINE Developers console.
/// - `client_secret`: The channel secret linked to the channel ID.
/// - `token_endpoint`: The token exchange endpoint URL.
/// - `verify_endpoint`: The ID token verification endpoint URL.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) auth_endpoint: AuthEndPoint,
    pub(crate) client_id: ClientID,
    pub(crate) client_secret: ClientSecret,
    pub(crate) token_endpoint: TokenEndPoint,
    pub(crate) verify_endpoint: VerifyEndPoint,
}

// ==========impl Config==========
impl Config {
    /// Returns a new `ConfigBuilder` preloaded with the LINE endpoints.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reads `LINE_CHANNEL_ID` and `LINE_CHANNEL_SECRET` from the environment
    /// (a `.env` file is honored). Both are required.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Same as `from_env`, with a caller-supplied variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| {
                error!("Missing environment variable: {}", key);
                Error::Env(key.to_string())
            })
        };
        let client_id = read(CHANNEL_ID_ENV)?;
        let client_secret = read(CHANNEL_SECRET_ENV)?;

        Ok(Self::builder()
            .client_id(&client_id)
            .client_secret(&client_secret)
            .build())
    }

    pub fn client_id(&self) -> &str {
        &self.client_id.0
    }

    pub fn auth_endpoint(&self) -> &str {
        &self.auth_endpoint.0
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint.0
    }

    pub fn verify_endpoint(&self) -> &str {
        &self.verify_endpoint.0
    }
}

/// Provides a convenient way to create a `Config` instance step by step.
///
/// # Example
/// ```rust,no_run
/// use tiny_line_login::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .client_id("your-channel-id")
///     .client_secret("your-channel-secret")
///     .token_endpoint("http://127.0.0.1:8080/token")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    auth_endpoint: AuthEndPoint,
    client_id: ClientID,
    client_secret: ClientSecret,
    token_endpoint: TokenEndPoint,
    verify_endpoint: VerifyEndPoint,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            auth_endpoint: AuthEndPoint(DEFAULT_AUTH_ENDPOINT.to_string()),
            client_id: ClientID::default(),
            client_secret: ClientSecret::default(),
            token_endpoint: TokenEndPoint(DEFAULT_TOKEN_ENDPOINT.to_string()),
            verify_endpoint: VerifyEndPoint(DEFAULT_VERIFY_ENDPOINT.to_string()),
        }
    }
}

// ==========impl ConfigBuilder==========
impl ConfigBuilder {
    /// Creates a new `ConfigBuilder` instance with default values.
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    /// Sets the authorization endpoint URL.
    pub fn auth_endpoint(mut self, auth_endpoint: &str) -> Self {
        self.auth_endpoint = AuthEndPoint(auth_endpoint.to_string());
        self
    }

    /// Sets the channel ID.
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = ClientID(client_id.to_string());
        self
    }

    /// Sets the channel secret associated with the channel ID.
    pub fn client_secret(mut self, client_secret: &str) -> Self {
        self.client_secret = ClientSecret(client_secret.to_string());
        self
    }

    /// Sets the token exchange endpoint URL.
    pub fn token_endpoint(mut self, token_endpoint: &str) -> Self {
        self.token_endpoint = TokenEndPoint(token_endpoint.to_string());
        self
    }

    /// Sets the ID token verification endpoint URL.
    pub fn verify_endpoint(mut self, verify_endpoint: &str) -> Self {
        self.verify_endpoint = VerifyEndPoint(verify_endpoint.to_string());
        self
    }

    /// Constructs a `Config` instance with the provided values.
    pub fn build(self) -> Config {
        Config {
            auth_endpoint: self.auth_endpoint,
            client_id: self.client_id,
            client_secret: self.client_secret,
            token_endpoint: self.token_endpoint,
            verify_endpoint: self.verify_endpoint,
        }
    }
}

/// The callback URI registered for the channel.
///
/// Must be an absolute URL without a fragment. Plain `http` is only
/// accepted for loopback hosts.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectURI(pub(crate) String);

impl RedirectURI {
    pub fn parse(value: &str) -> Result<Self, Error> {
        let url = Url::parse(value).map_err(|e| {
            error!("Failed to parse redirect uri: {}", e);
            Error::RedirectURI
        })?;

        let loopback = match url.host() {
            Some(Host::Domain(domain)) => domain == "localhost",
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        };
        let secure = match url.scheme() {
            "https" => url.host().is_some(),
            "http" => loopback,
            _ => false,
        };
        if !secure || url.fragment().is_some() {
            error!("Rejected redirect uri: {}", value);
            return Err(Error::RedirectURI);
        }
        Ok(Self(value.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RedirectURI {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
