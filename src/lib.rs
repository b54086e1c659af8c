//! Tiny library for LINE Login (OAuth 2.0 / OpenID Connect).
//!
//! This library covers the server side of the authorization code flow against LINE:
//! building the authorization URL, exchanging the code for tokens and verifying the
//! ID token through LINE's verification endpoint.
//! [LINE Login document](https://developers.line.biz/en/docs/line-login/integrate-line-login/)
//! # Feature
//! - Generate a `state` (CSRF token) from the OS random generator
//! - Generate an authorization request URL for LINE
//! - Verify the `state` on the callback and retrieve the code
//! - Exchange the code for access/ID/refresh tokens (using reqwest)
//! - Verify the ID token with LINE and get the user's claims (using reqwest)
//! # Caution
//! - The ID token is **not** verified locally. The claims are only as trustworthy as the
//!   HTTPS connection to LINE's verification endpoint.
//!   `IdentityClaims::validate` can re-check audience, expiry and nonce locally.
//! - Nothing enforces the order of the steps or stores the `state`; that is up to the caller.
//! - Tokens are never stored or refreshed.
//! # Examples
//! See `client::LineLogin` and the `axum_server` example.
pub mod authorize;
pub mod client;
pub mod config;
pub mod csrf_token;
pub mod error;
pub mod executer;
pub mod nonce;
pub mod token;
pub mod verify;
