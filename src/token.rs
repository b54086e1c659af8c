//! Provides the request and response of the authorization code exchange.
//!
//! This module:
//! TokenRequest: A data structure for sending requests to the token endpoint.
//! TokenBundle: A data structure for parsing the response from the token endpoint.
//! AccessToken / IDTokenRaw / RefreshToken: the individual tokens in the bundle.

use serde::{Deserialize, Serialize};

use crate::{
    authorize::Code,
    config::{ClientID, ClientSecret, Config, RedirectURI, TokenEndPoint},
};

/// Represents an OAuth 2.0 access token.
/// This token is used to call the LINE APIs on behalf of the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken(pub(crate) String);

impl AccessToken {
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// An encoded ID token (JWT), as issued by LINE.
///
/// It is **not** verified locally; pass it to the verification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IDTokenRaw(pub(crate) String);

impl IDTokenRaw {
    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for IDTokenRaw {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IDTokenRaw {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Represents an OAuth 2.0 refresh token. This crate never refreshes on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshToken(pub(crate) String);

impl RefreshToken {
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// A structure used to send the authorization code to the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    token_endpoint: TokenEndPoint,
    code: Code,
    client_id: ClientID,
    client_secret: ClientSecret,
    redirect_uri: RedirectURI,
    grant_type: &'static str,
}

impl TokenRequest {
    /// `redirect_uri` must be the one used for the authorization request.
    pub fn new(config: &Config, code: Code, redirect_uri: &RedirectURI) -> Self {
        Self {
            token_endpoint: config.token_endpoint.to_owned(),
            code,
            client_id: config.client_id.to_owned(),
            client_secret: config.client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
            grant_type: "authorization_code",
        }
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint.0
    }

    pub(crate) fn params(&self) -> [(&'static str, &str); 5] {
        [
            ("grant_type", self.grant_type),
            ("code", &self.code.0),
            ("redirect_uri", self.redirect_uri.value()),
            ("client_id", &self.client_id.0),
            ("client_secret", &self.client_secret.0),
        ]
    }
}

/// The response of the token endpoint.
///
/// Only `access_token` and `id_token` are required; the remaining fields
/// fall back to their defaults when LINE omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    access_token: AccessToken,
    #[serde(default)]
    expires_in: u64,
    id_token: IDTokenRaw,
    #[serde(default)]
    refresh_token: Option<RefreshToken>,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    token_type: String,
}

impl TokenBundle {
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Lifetime of the access token in seconds.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    pub fn id_token(&self) -> &IDTokenRaw {
        &self.id_token
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn into_id_token(self) -> IDTokenRaw {
        self.id_token
    }
}
