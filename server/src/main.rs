mod config;
mod error;
mod launcher;
mod routes;
mod state;

use tracing_subscriber::EnvFilter;

use crate::config::LauncherConfig;
use crate::error::ServerError;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // A missing .env is normal; variables may come from the shell instead.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let config = LauncherConfig::from_env()?;
    let addr = config.addr();
    let url = config.browser_url();

    match config.upstream.as_deref() {
        Some(upstream) => tracing::info!(%upstream, "relaying /conversation"),
        None => tracing::warn!("CHAT_API_UPSTREAM not set; /conversation will answer 503"),
    }
    if !config.static_dir.join("index.html").is_file() {
        tracing::warn!(dir = %config.static_dir.display(), "static dir has no index.html; build the client first");
    }

    let open_browser = config.open_browser;
    let browser_delay = config.browser_delay;
    let state = state::AppState::new(config)?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    if open_browser {
        let _browser = launcher::spawn_browser_after(url.clone(), browser_delay);
    }

    tracing::info!(%addr, %url, "chat launcher listening");
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
