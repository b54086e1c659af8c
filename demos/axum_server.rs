// In the LINE Developers console
// Set
// - Callback URL: http://localhost:3000/callback
// Set .env file
// ```.env
// LINE_CHANNEL_ID="your_channel_id"
// LINE_CHANNEL_SECRET="your_channel_secret"
// ```
// finally ```cargo run --example axum_server```
//
// The front end at localhost:3000 calls `/line/auth`, redirects to the returned url,
// then forwards `code` and `state` from its callback to `/line/user`.
// Both calls are cross-origin and must be made with `credentials: "include"`
// so the state cookie travels with them.
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use http::{HeaderValue, StatusCode};
use serde_json::json;
use tiny_line_login::{
    authorize::UnCheckedCodeResponse, client::LineLogin, config::Config, error::Error,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

const FRONTEND_ORIGIN: &str = "http://localhost:3000";
const CALLBACK: &str = "http://localhost:3000/callback";
static COOKIE_KEY: &str = "line_state";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log settings
    tracing_subscriber::fmt::init();

    // LINE_CHANNEL_ID / LINE_CHANNEL_SECRET
    let config = Config::from_env()?;
    let login = Arc::new(LineLogin::new(config));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    let app = app(login)?;

    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    anyhow::Ok(())
}

fn app(login: Arc<LineLogin>) -> anyhow::Result<Router> {
    // credentialed CORS needs an explicit origin
    let cors = CorsLayer::new()
        .allow_origin(FRONTEND_ORIGIN.parse::<HeaderValue>()?)
        .allow_credentials(true);

    Ok(Router::new()
        .route("/hello", get(hello))
        .route("/line/auth", get(web_authorization))
        .route("/line/user", get(user))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(login))
}

async fn hello() -> impl IntoResponse {
    Json(json!({ "message": "Hello, World!" }))
}

async fn web_authorization(
    State(login): State<Arc<LineLogin>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, StatusCode> {
    let (url, state) = login.authorization_url(CALLBACK).map_err(internal)?;
    info!("authorization url: {}", url);

    // keep the state until the callback comes back
    let cookie = Cookie::build((COOKIE_KEY, state.value().to_string()))
        .http_only(true)
        .path("/");
    Ok((jar.add(cookie), Json(json!({ "url": url }))))
}

async fn user(
    State(login): State<Arc<LineLogin>>,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, StatusCode> {
    let stored = jar
        .get(COOKIE_KEY)
        .map(|c| c.value().to_string())
        .ok_or(StatusCode::BAD_REQUEST)?;

    // ?code=...&state=...
    let code = UnCheckedCodeResponse::from_query(query.as_deref().unwrap_or_default())
        .and_then(|res| res.exchange_with_code(&stored))
        .map_err(|e| {
            error!("Rejected callback: {}", e);
            StatusCode::BAD_REQUEST
        })?;

    let id_token = login.exchange_code(code, CALLBACK).await.map_err(internal)?;
    let claims = login.verify_id_token(&id_token).await.map_err(internal)?;

    Ok((
        jar.remove(Cookie::build(COOKIE_KEY).path("/")),
        Json(json!({ "user_id": claims.sub })),
    ))
}

fn internal(e: Error) -> StatusCode {
    error!("LINE login failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
