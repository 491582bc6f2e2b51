use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;
mod game;
mod protocol;
mod transport;

use app::AppState;
use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = ServerConfig::from_env();
  let state = AppState::new();
  state.scheduler().spawn();

  let app = app::router(state);
  let address = config.listen_address();
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
