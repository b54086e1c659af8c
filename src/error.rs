use thiserror::Error;

use crate::executer::ExecuteError;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Environment variable {0} is not set")]
    Env(String),
    #[error("Invalid redirect uri")]
    RedirectURI,
    #[error("Failed to generate CSRF token")]
    GenToken,
    #[error("CSRF token not matched")]
    CSRFNotMatch,
    #[error("Failed to parse url")]
    URL,
    #[error("Authorization denied: {error}")]
    Authorization {
        error: String,
        description: Option<String>,
    },
    #[error("IDToken audience does not match client id")]
    Audience,
    #[error("IDToken has expired")]
    Expired,
    #[error("Nonce not matched")]
    NonceNotMatch,
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}
