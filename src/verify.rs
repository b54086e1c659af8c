//! Provides the request to LINE's ID token verification endpoint and the claims it returns.
//!
//! LINE checks the signature, expiry and audience of the token remotely. The
//! claims returned here are trusted as-is; `IdentityClaims::validate` is an
//! optional local re-check for callers who want one.
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    config::{ClientID, Config, VerifyEndPoint},
    error::Error,
    nonce::Nonce,
    token::IDTokenRaw,
};

/// A structure used to send an ID token to the verification endpoint.
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    verify_endpoint: VerifyEndPoint,
    id_token: IDTokenRaw,
    client_id: ClientID,
}

impl VerifyRequest {
    pub fn new(config: &Config, id_token: IDTokenRaw) -> Self {
        Self {
            verify_endpoint: config.verify_endpoint.to_owned(),
            id_token,
            client_id: config.client_id.to_owned(),
        }
    }

    pub fn verify_endpoint(&self) -> &str {
        &self.verify_endpoint.0
    }

    pub(crate) fn params(&self) -> [(&'static str, &str); 2] {
        [
            ("id_token", &self.id_token.0),
            ("client_id", &self.client_id.0),
        ]
    }
}

/// The claims of a verified ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub iss: String, // "https://access.line.me"
    pub sub: String, // LINE user ID
    #[serde(default)]
    pub aud: Option<String>, // Channel ID
    #[serde(default)]
    pub exp: Option<u64>, // Expiration (UNIX time)
    #[serde(default)]
    pub iat: Option<u64>, // Issued at (UNIX time)
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub auth_time: Option<u64>,
    #[serde(default)]
    pub amr: Vec<String>, // e.g. "pwd", "lineautologin"
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email: Option<String>, // Only with the email scope
}

impl IdentityClaims {
    /// Checks audience, expiry and (when given) nonce against the current time.
    pub fn validate(&self, config: &Config, nonce: Option<&Nonce>) -> Result<(), Error> {
        self.validate_with_clock(config, nonce, SystemTime::now())
    }

    fn validate_with_clock(
        &self,
        config: &Config,
        nonce: Option<&Nonce>,
        clock: SystemTime,
    ) -> Result<(), Error> {
        // a clock before the epoch cannot prove the token is still valid
        let now = clock.duration_since(UNIX_EPOCH).map_err(|e| {
            error!("System clock is before UNIX epoch: {}", e);
            Error::Expired
        })?;
        self.validate_at(config, nonce, now.as_secs())
    }

    /// Same as `validate` with an explicit UNIX time.
    pub fn validate_at(
        &self,
        config: &Config,
        nonce: Option<&Nonce>,
        now: u64,
    ) -> Result<(), Error> {
        if self.aud.as_deref() != Some(config.client_id()) {
            error!("IDToken audience mismatch: {:?}", self.aud);
            return Err(Error::Audience);
        }
        match self.exp {
            Some(exp) if exp > now => {}
            _ => {
                error!("IDToken expired: exp={:?} now={}", self.exp, now);
                return Err(Error::Expired);
            }
        }
        if let Some(nonce) = nonce
            && self.nonce.as_deref() != Some(nonce.value())
        {
            error!("Nonce not matched");
            return Err(Error::NonceNotMatch);
        }
        Ok(())
    }
}
