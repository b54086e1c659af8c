//! `LineLogin` bundles a `Config` with the executers and exposes the
//! three steps of the login as plain methods.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), tiny_line_login::error::Error> {
//! use tiny_line_login::{authorize::UnCheckedCodeResponse, client::LineLogin, config::Config};
//!
//! let login = LineLogin::new(Config::from_env()?);
//! let callback = "http://localhost:3000/callback";
//!
//! // 1. redirect the user, keep `state` around
//! let (url, state) = login.authorization_url(callback)?;
//!
//! // 2. LINE redirects back with ?code=...&state=...
//! let code = UnCheckedCodeResponse::from_query("code=abc&state=...")?
//!     .exchange_with_code(state.value())?;
//! let id_token = login.exchange_code(code, callback).await?;
//!
//! // 3. ask LINE to verify the ID token
//! let claims = login.verify_id_token(&id_token).await?;
//! println!("{} logged in", claims.sub);
//! # Ok(())
//! # }
//! ```
use reqwest::Client;

use crate::{
    authorize::{AuthorizationRequest, Code},
    config::{Config, RedirectURI},
    csrf_token::CSRFToken,
    error::Error,
    executer::{Executer, TokenExe, VerifyExe},
    token::{TokenBundle, TokenRequest},
    verify::{IdentityClaims, VerifyRequest},
};

#[derive(Debug, Clone)]
pub struct LineLogin {
    config: Config,
    token_exe: TokenExe,
    verify_exe: VerifyExe,
}

impl LineLogin {
    pub fn new(config: Config) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Shares one `reqwest::Client` between both endpoints.
    pub fn with_client(config: Config, client: Client) -> Self {
        Self {
            config,
            token_exe: TokenExe::with_client(client.clone()),
            verify_exe: VerifyExe::with_client(client),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the authorization URL with a fresh `state` and the
    /// `openid profile` scope. The returned `CSRFToken` must be stored
    /// to check the callback.
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<(String, CSRFToken), Error> {
        let redirect_uri = RedirectURI::parse(redirect_uri)?;
        let state = CSRFToken::new()?;
        let url = AuthorizationRequest::new(&self.config, &redirect_uri, &state).into_url()?;
        Ok((url, state))
    }

    /// Exchanges `code` and returns the whole token response.
    pub async fn exchange_tokens(
        &self,
        code: impl Into<Code>,
        redirect_uri: &str,
    ) -> Result<TokenBundle, Error> {
        let redirect_uri = RedirectURI::parse(redirect_uri)?;
        let req = TokenRequest::new(&self.config, code.into(), &redirect_uri);
        Ok(self.token_exe.execute(&req).await?)
    }

    /// Exchanges `code` and returns only the raw ID token.
    pub async fn exchange_code(
        &self,
        code: impl Into<Code>,
        redirect_uri: &str,
    ) -> Result<String, Error> {
        let bundle = self.exchange_tokens(code, redirect_uri).await?;
        Ok(bundle.into_id_token().into_inner())
    }

    /// Asks LINE to verify `id_token`. No local check is made on the claims.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<IdentityClaims, Error> {
        let req = VerifyRequest::new(&self.config, id_token.into());
        Ok(self.verify_exe.execute(&req).await?)
    }
}
