//! Binary entrypoint for the maintenance HTTP server.
//!
//! Configuration comes from environment variables, see [`ServerConfig`].

use maint_server::config::ServerConfig;
use maint_server::router::build_router;
use maint_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    maint_server::logging::init();

    let config = ServerConfig::from_env();
    let state = AppState::new(&config)?;
    let app = build_router(state);

    let addr = config.bind_addr();
    tracing::info!("maintenance server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
