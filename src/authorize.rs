//! This module handles the authorization request and the callback
//! in the LINE Login flow.
//!
//! It provides the following key functionalities:
//! - Generating an authorization request URL (`AuthorizationRequest`).
//! - Parsing and verifying the authorization code received on the callback (`UnCheckedCodeResponse`).
//!
//! # Key Structures and Features
//!
//! ## `AuthorizationRequest`
//! Builds the URL the user is redirected to.
//! - Includes the channel ID, redirect URI, CSRF token (`state`), scope and an optional nonce.
//!
//! ## `UnCheckedCodeResponse`
//! Represents the query LINE appends to the redirect URI.
//! - This response must be validated using a CSRF token before it can be used.
//!
//! ## `Code`
//! Represents a verified authorization code that can be exchanged for tokens.
//!
//! # Examples
//! ## Generating an Authorization Request URL
//! ```rust,no_run
//! use tiny_line_login::{
//!     authorize::AuthorizationRequest, config::{Config, RedirectURI}, csrf_token::CSRFToken,
//! };
//!
//! let config = Config::builder().client_id("your_channel_id").build();
//! let redirect_uri = RedirectURI::parse("https://example.com/callback").unwrap();
//! let csrf_token = CSRFToken::new().unwrap();
//!
//! let url = AuthorizationRequest::new(&config, &redirect_uri, &csrf_token)
//!     .into_url()
//!     .unwrap();
//! println!("Auth URL: {}", url);
//! ```
//!
//! ## Handling the Callback
//! ```rust,no_run
//! use tiny_line_login::authorize::UnCheckedCodeResponse;
//!
//! let response = UnCheckedCodeResponse::from_url("https://example.com/callback?code=abc&state=xyz").unwrap();
//! let code = response.exchange_with_code("xyz").expect("CSRF token mismatch!");
//! ```
//!
//! # Notes
//! - Nothing here enforces the order of calls. Storing the `state` and
//!   comparing it on the callback is the caller's job.
use itertools::Itertools;
use tracing::error;
use url::Url;

use crate::{
    config::{Config, RedirectURI},
    csrf_token::{CSRFToken, UnCheckedCSRFToken},
    error::Error,
    nonce::Nonce,
};
use std::collections::{HashMap, HashSet};

/// Scope values accepted by LINE Login.
///
/// `openid` is always sent. With no explicit scope the request asks for `openid profile`.
/// `Email` requires the email permission to be enabled for the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    OpenID,
    Profile,
    Email,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::OpenID => "openid",
            Scope::Profile => "profile",
            Scope::Email => "email",
        }
    }

    /// Joins scopes into the space delimited form, `openid` first.
    pub(crate) fn join<I>(scopes: I) -> String
    where
        I: IntoIterator<Item = Scope>,
    {
        let rest = scopes
            .into_iter()
            .filter(|s| *s != Scope::OpenID)
            .map(|s| s.as_str())
            .collect::<HashSet<_>>();

        std::iter::once(Scope::OpenID.as_str())
            .chain(rest.into_iter().sorted())
            .join(" ")
    }
}

pub const DEFAULT_SCOPE: [Scope; 2] = [Scope::OpenID, Scope::Profile];

/// The value of the `code` query parameter LINE sends to the redirect URI.
#[derive(Debug, Clone, PartialEq)]
pub struct Code(pub(crate) String);

impl Code {
    /// Checks if `res.state` matches `csrf_token_val` (the stored value).
    /// If valid, returns a `Code`; otherwise, returns `Error::CSRFNotMatch`.
    pub fn new_with_verify_csrf(
        res: UnCheckedCodeResponse,
        csrf_token_val: &str,
    ) -> Result<Self, Error> {
        res.exchange_with_code(csrf_token_val)
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<String> for Code {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Generates the URL that starts the login.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    auth_endpoint: String,
    client_id: String,
    response_type: &'static str,
    redirect_uri: RedirectURI,
    state: CSRFToken,
    scope: Vec<Scope>,
    nonce: Option<Nonce>,
}

impl AuthorizationRequest {
    pub fn new(config: &Config, redirect_uri: &RedirectURI, state: &CSRFToken) -> Self {
        Self {
            auth_endpoint: config.auth_endpoint.0.to_owned(),
            client_id: config.client_id.0.to_owned(),
            response_type: "code",
            redirect_uri: redirect_uri.to_owned(),
            state: state.to_owned(),
            scope: DEFAULT_SCOPE.to_vec(),
            nonce: None,
        }
    }

    /// Replaces the requested scopes. `openid` is added if missing.
    pub fn scope<I>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = Scope>,
    {
        self.scope = scope.into_iter().collect();
        self
    }

    /// Adds a `nonce` parameter, echoed back in the ID token claims.
    pub fn nonce(mut self, nonce: &Nonce) -> Self {
        self.nonce = Some(nonce.to_owned());
        self
    }

    /// Form-encodes the parameters onto the authorization endpoint.
    pub fn into_url(&self) -> Result<String, Error> {
        let mut url = Url::parse(&self.auth_endpoint).map_err(|e| {
            error!("Failed to parse authorization endpoint: {}", e);
            Error::URL
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", self.response_type)
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", self.redirect_uri.value())
                .append_pair("state", self.state.value())
                .append_pair("scope", &Scope::join(self.scope.iter().copied()));
            if let Some(nonce) = &self.nonce {
                query.append_pair("nonce", nonce.value());
            }
        }
        Ok(url.into())
    }
}

/// The callback query from LINE containing an unverified code and state.
/// Must be validated using a CSRF token before use.
#[derive(Debug, Clone)]
pub struct UnCheckedCodeResponse {
    state: UnCheckedCSRFToken,
    code: Code,
}

impl UnCheckedCodeResponse {
    /// Parses the full callback URL.
    pub fn from_url(response_url: &str) -> Result<Self, Error> {
        let url = Url::parse(response_url).map_err(|e| {
            error!("Failed to parse callback url: {}", e);
            Error::URL
        })?;
        Self::from_query(url.query().unwrap_or_default())
    }

    /// Parses only the query part (`code=...&state=...`).
    ///
    /// A denied consent (`error=...`) is surfaced as `Error::Authorization`.
    pub fn from_query(query: &str) -> Result<Self, Error> {
        let params: HashMap<_, _> = url::form_urlencoded::parse(query.as_bytes()).collect();

        if let Some(err) = params.get("error") {
            error!("Authorization failed on callback: {}", err);
            return Err(Error::Authorization {
                error: err.to_string(),
                description: params.get("error_description").map(|v| v.to_string()),
            });
        }

        let state = params.get("state").ok_or_else(|| {
            error!("Missing state on callback");
            Error::URL
        })?;
        let code = params.get("code").ok_or_else(|| {
            error!("Missing code on callback");
            Error::URL
        })?;

        Ok(Self {
            state: state.to_string().into(),
            code: code.to_string().into(),
        })
    }

    pub fn state(&self) -> &str {
        &self.state.0
    }

    /// Must be validated using a CSRF token before use.
    pub fn exchange_with_code(self, csrf_token_val: &str) -> Result<Code, Error> {
        if !csrf_token_val.is_empty() && self.state.0 == csrf_token_val {
            Ok(self.code)
        } else {
            error!("CSRF token not matched");
            Err(Error::CSRFNotMatch)
        }
    }
}
